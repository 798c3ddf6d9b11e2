use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UrlRecord {
    pub id: i64,
    pub url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: i64,
}

/// Read-only view returned by the stats endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlStats {
    pub id: i64,
    pub url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub access_count: i64,
}

impl From<UrlRecord> for UrlStats {
    fn from(record: UrlRecord) -> Self {
        Self {
            id: record.id,
            url: record.url,
            short_code: record.short_code,
            created_at: record.created_at,
            updated_at: record.updated_at,
            access_count: record.access_count,
        }
    }
}

/// Body of `POST /shorten` and `PUT /shorten/{code}`.
///
/// Kept as raw JSON so a wrong shape or type is reported as a validation
/// failure instead of a deserialization rejection. Only a JSON object
/// carries a `url`.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct UrlPayload(serde_json::Value);

impl UrlPayload {
    /// Returns the target URL when the body is an object whose `url` is a
    /// non-empty string.
    pub fn valid_url(&self) -> Option<&str> {
        match self.0.as_object()?.get("url") {
            Some(serde_json::Value::String(url)) if !url.is_empty() => Some(url.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: serde_json::Value) -> UrlPayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_valid_url_accepts_non_empty_string() {
        let body = payload(json!({ "url": "https://example.com" }));
        assert_eq!(body.valid_url(), Some("https://example.com"));
    }

    #[test]
    fn test_valid_url_rejects_missing_empty_and_non_string() {
        assert_eq!(payload(json!({})).valid_url(), None);
        assert_eq!(payload(json!({ "url": "" })).valid_url(), None);
        assert_eq!(payload(json!({ "url": 123 })).valid_url(), None);
        assert_eq!(payload(json!({ "url": null })).valid_url(), None);
        assert_eq!(payload(json!({ "url": ["https://a.com"] })).valid_url(), None);
    }

    #[test]
    fn test_valid_url_requires_object_body() {
        assert_eq!(payload(json!(["https://example.com"])).valid_url(), None);
        assert_eq!(payload(json!("https://example.com")).valid_url(), None);
        assert_eq!(payload(json!(null)).valid_url(), None);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let now = Utc::now();
        let record = UrlRecord {
            id: 7,
            url: "https://example.com".to_string(),
            short_code: "abc123".to_string(),
            created_at: now,
            updated_at: now,
            access_count: 3,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["shortCode"], "abc123");
        assert_eq!(value["accessCount"], 3);
        assert!(value["createdAt"].is_string());
        assert!(value["updatedAt"].is_string());
        assert!(value.get("short_code").is_none());
    }
}
