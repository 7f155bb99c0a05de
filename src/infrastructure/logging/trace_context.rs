use axum::http::HeaderMap;

pub const TRACE_HEADER: &str = "x-trace-id";

/// Creates and propagates per-request trace ids.
pub struct TraceContext;

impl TraceContext {
    pub fn new_trace_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Reads x-trace-id from the request, generating one if absent.
    pub fn extract_or_generate(headers: &HeaderMap) -> String {
        headers
            .get(TRACE_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_else(Self::new_trace_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trace_id_is_unique() {
        let id1 = TraceContext::new_trace_id();
        let id2 = TraceContext::new_trace_id();

        assert_ne!(id1, id2);
        assert!(!id1.is_empty());
    }

    #[test]
    fn test_extract_or_generate_with_existing() {
        let mut headers = HeaderMap::new();
        headers.insert(TRACE_HEADER, "test-trace-id".parse().unwrap());

        let trace_id = TraceContext::extract_or_generate(&headers);
        assert_eq!(trace_id, "test-trace-id");
    }

    #[test]
    fn test_extract_or_generate_without_existing() {
        let headers = HeaderMap::new();
        let trace_id = TraceContext::extract_or_generate(&headers);

        assert!(!trace_id.is_empty());
        assert!(trace_id.contains('-'));
    }
}
