use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogEvent`](crate::record::LogEvent), ordered from least
/// to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Debug,
    Information,
    Warning,
    Error,
    Fatal,
}

impl Level {
    /// Full name, as understood by the collector (`@l` in CLEF).
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "Debug",
            Level::Information => "Information",
            Level::Warning => "Warning",
            Level::Error => "Error",
            Level::Fatal => "Fatal",
        }
    }

    /// Three-letter code used by the text console format.
    pub fn short(self) -> &'static str {
        match self {
            Level::Debug => "DBG",
            Level::Information => "INF",
            Level::Warning => "WRN",
            Level::Error => "ERR",
            Level::Fatal => "FTL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `tracing` has no fatal level; TRACE folds into Debug.
impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Information,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

impl From<&tracing::Level> for Level {
    fn from(level: &tracing::Level) -> Self {
        Level::from(*level)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level `{0}`")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "dbg" | "trace" | "verbose" => Ok(Level::Debug),
            "information" | "info" | "inf" => Ok(Level::Information),
            "warning" | "warn" | "wrn" => Ok(Level::Warning),
            "error" | "err" => Ok(Level::Error),
            "fatal" | "ftl" | "critical" => Ok(Level::Fatal),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_severity() {
        assert!(Level::Debug < Level::Information);
        assert!(Level::Information < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Fatal);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("Information".parse::<Level>(), Ok(Level::Information));
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warning));
        assert_eq!(" FATAL ".parse::<Level>(), Ok(Level::Fatal));
        assert_eq!("trace".parse::<Level>(), Ok(Level::Debug));
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn maps_tracing_levels() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from(tracing::Level::INFO), Level::Information);
        assert_eq!(Level::from(tracing::Level::ERROR), Level::Error);
    }
}
