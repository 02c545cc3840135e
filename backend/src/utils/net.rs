use axum::http::HeaderMap;

/// Sentinel identifier when no client address header is present.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address: first `x-forwarded-for` entry, then
/// `x-real-ip`. Proxy headers are spoofable; treat as advisory only.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(',').next().unwrap_or(value).trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Identifier the rate limiter keys on.
pub fn client_identifier(headers: &HeaderMap) -> String {
    extract_client_ip(headers).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_first_forwarded_for_entry() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.1, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "203.0.113.2".parse().unwrap());
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("203.0.113.1"));
    }

    #[test]
    fn falls_back_to_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.2".parse().unwrap());
        assert_eq!(extract_client_ip(&headers).as_deref(), Some("203.0.113.2"));
    }

    #[test]
    fn unknown_when_no_headers() {
        let headers = HeaderMap::new();
        assert!(extract_client_ip(&headers).is_none());
        assert_eq!(client_identifier(&headers), UNKNOWN_CLIENT);
    }
}
