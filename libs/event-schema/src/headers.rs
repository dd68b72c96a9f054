//! Correlation-id helpers for rdkafka message headers
use rdkafka::message::{Header, Headers, OwnedHeaders};

pub const CORRELATION_ID_HEADER: &str = "correlation-id";

pub fn inject_correlation_id(headers: OwnedHeaders, correlation_id: &str) -> OwnedHeaders {
    headers.insert(Header {
        key: CORRELATION_ID_HEADER,
        value: Some(correlation_id.as_bytes()),
    })
}

pub fn extract_correlation_id<H: Headers>(headers: &H) -> Option<String> {
    headers.iter().find_map(|h| {
        if h.key == CORRELATION_ID_HEADER {
            h.value
                .and_then(|v| std::str::from_utf8(v).ok())
                .map(str::to_string)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inject_then_extract() {
        let headers = inject_correlation_id(OwnedHeaders::new(), "abc-123");
        assert_eq!(extract_correlation_id(&headers), Some("abc-123".to_string()));
    }

    #[test]
    fn test_extract_missing_header() {
        let headers = OwnedHeaders::new().insert(Header {
            key: "content-type",
            value: Some(b"application/json".as_slice()),
        });
        assert_eq!(extract_correlation_id(&headers), None);
    }
}
