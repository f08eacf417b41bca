//! Ambient logging context.
//!
//! A scope is an ordinary `tracing` span: `info_span!("request", request_id = %id)`.
//! [`LoggerLayer`](crate::layer::LoggerLayer) stores each span's fields in the
//! span's extensions, and an event's ambient context is the merge of the
//! enclosing spans from the root inwards, so inner keys win.

use crate::record::Properties;
use tracing_subscriber::registry::{LookupSpan, Registry, Scope};

/// Fields recorded on one span.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScopeFields(pub(crate) Properties);

pub(crate) fn merge<'a, R: LookupSpan<'a>>(scope: Scope<'a, R>) -> Properties {
    let mut merged = Properties::new();
    for span in scope.from_root() {
        if let Some(fields) = span.extensions().get::<ScopeFields>() {
            merged.extend(fields.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }
    merged
}

/// Ambient context at the call site.
///
/// Empty outside any span, or when the current subscriber is not built on a
/// [`Registry`] carrying the logger layer.
pub fn current() -> Properties {
    tracing::Span::current()
        .with_subscriber(|(id, dispatch)| {
            dispatch
                .downcast_ref::<Registry>()
                .and_then(|registry| registry.span(id))
                .map(|span| merge(span.scope()))
        })
        .flatten()
        .unwrap_or_default()
}
