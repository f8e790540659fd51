//! Per-call request context.
//!
//! Carries the correlation identifiers of the inbound request through every
//! service layer so that downstream proxy calls can propagate them as
//! `X-Request-Id` / `X-Forwarded-For` headers.

use uuid::Uuid;

/// Correlation identifiers for a single inbound call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Request id supplied by the caller (or generated at the edge).
    pub request_id: String,

    /// Client address chain from `X-Forwarded-For`.
    pub forwarded_for: String,
}

impl RequestContext {
    /// Create a context from explicit identifiers.
    #[must_use]
    pub fn new(request_id: impl Into<String>, forwarded_for: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            forwarded_for: forwarded_for.into(),
        }
    }

    /// Create a context with a freshly generated request id and no
    /// forwarded-for chain. Used for calls that do not originate from an
    /// inbound HTTP request.
    #[must_use]
    pub fn generated() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            forwarded_for: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_context_has_unique_request_ids() {
        let a = RequestContext::generated();
        let b = RequestContext::generated();

        assert_ne!(a.request_id, b.request_id);
        assert!(a.forwarded_for.is_empty());
    }

    #[test]
    fn test_new_context() {
        let ctx = RequestContext::new("req-1", "10.0.0.1");
        assert_eq!(ctx.request_id, "req-1");
        assert_eq!(ctx.forwarded_for, "10.0.0.1");
    }
}
