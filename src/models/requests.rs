//! Request DTOs for the cache inspection API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Request body for PUT /cache/:key
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// Arbitrary JSON to store under the key
    pub value: Value,
}

/// Query string for GET /cache/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetQuery {
    /// Freshness window in milliseconds (service default if omitted)
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Validates a cache key taken from the request path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_request_deserialize_list() {
        let json = r#"{"value": [{"id": 1, "name": "Rosa"}]}"#;
        let req: SetRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.value[0]["name"], "Rosa");
    }

    #[test]
    fn test_set_request_requires_value() {
        let result: Result<SetRequest, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_get_query_optional_ttl() {
        let query: GetQuery = serde_json::from_str("{}").unwrap();
        assert!(query.ttl.is_none());

        let query: GetQuery = serde_json::from_str(r#"{"ttl": 180000}"#).unwrap();
        assert_eq!(query.ttl, Some(180_000));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("").is_some());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key("users_list").is_none());
    }
}
