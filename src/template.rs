use crate::record::{Properties, ScalarValue};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Text(String),
    /// `raw` keeps the placeholder as written, braces included, so an
    /// unbound placeholder can be rendered back verbatim.
    Property { name: String, raw: String },
}

/// A parsed message template such as `"Tester requested weather at {Time}"`.
///
/// Placeholders are `{Name}` or positional `{0}`, optionally prefixed with
/// `@`/`$` and suffixed with `:format` or `,alignment` (both ignored when
/// rendering). `{{` and `}}` produce literal braces. Anything that does not
/// parse as a placeholder is kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    text: String,
    tokens: Vec<Token>,
}

impl MessageTemplate {
    pub fn parse(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();
            match c {
                '{' if next == Some('{') => {
                    literal.push('{');
                    i += 2;
                }
                '{' => {
                    let close = chars[i + 1..].iter().position(|&c| c == '}');
                    let parsed = close.and_then(|offset| {
                        let raw: String = chars[i..=i + 1 + offset].iter().collect();
                        placeholder_name(&raw[1..raw.len() - 1]).map(|name| (name, raw, offset))
                    });
                    match parsed {
                        Some((name, raw, offset)) => {
                            if !literal.is_empty() {
                                tokens.push(Token::Text(std::mem::take(&mut literal)));
                            }
                            tokens.push(Token::Property { name, raw });
                            i += offset + 2;
                        }
                        None => {
                            literal.push('{');
                            i += 1;
                        }
                    }
                }
                '}' if next == Some('}') => {
                    literal.push('}');
                    i += 2;
                }
                _ => {
                    literal.push(c);
                    i += 1;
                }
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Text(literal));
        }

        MessageTemplate { text: text.to_string(), tokens }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn property_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let Token::Property { name, .. } = token {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Pair positional arguments with placeholders.
    ///
    /// When every placeholder is numeric, `{n}` takes `args[n]`; otherwise
    /// names take arguments in order of first appearance. Surplus arguments
    /// are ignored.
    pub fn bind(&self, args: &[ScalarValue]) -> Properties {
        let names = self.property_names();
        let positional = !names.is_empty() && names.iter().all(|n| n.chars().all(|c| c.is_ascii_digit()));

        let mut properties = Properties::new();
        if positional {
            for name in names {
                if let Some(value) = name.parse::<usize>().ok().and_then(|idx| args.get(idx)) {
                    properties.insert(name.to_string(), value.clone());
                }
            }
        } else {
            for (name, value) in names.into_iter().zip(args) {
                properties.insert(name.to_string(), value.clone());
            }
        }
        properties
    }

    pub fn render(&self, properties: &Properties) -> String {
        let mut out = String::with_capacity(self.text.len());
        for token in &self.tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Property { name, raw } => match properties.get(name) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

fn placeholder_name(inner: &str) -> Option<String> {
    let inner = inner.strip_prefix(['@', '$']).unwrap_or(inner);
    let name = inner.split([':', ',']).next().unwrap_or_default();
    if !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        Some(name.to_string())
    } else {
        None
    }
}
