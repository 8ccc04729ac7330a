//! Wire types shared across all Content Moderator crates.
//!
//! Every moderate and list-management endpoint returns a `Status` block and
//! a `TrackingId`; several also carry `AdvancedInfo`/`Metadata` arrays of
//! key/value pairs. Field names are PascalCase on the wire.

use serde::{Deserialize, Serialize};

/// Operation status block returned by most endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    /// Numeric status code (3000 means success).
    #[serde(rename = "Code", skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,

    /// Human-readable status description.
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Exception detail, if the operation failed server-side.
    #[serde(rename = "Exception", skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
}

/// A key/value entry in `AdvancedInfo` and `Metadata` arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyValuePair {
    #[serde(rename = "Key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// The body sent to endpoints that take an image by reference.
#[derive(Debug, Clone, Serialize)]
pub struct UrlInput {
    #[serde(rename = "DataRepresentation")]
    pub data_representation: String,

    #[serde(rename = "Value")]
    pub value: String,
}

impl UrlInput {
    /// Wrap an image URL in the service's `DataRepresentation` envelope.
    pub fn url(value: impl Into<String>) -> Self {
        Self {
            data_representation: "URL".to_string(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_deserializes_from_service_payload() {
        let json = r#"{"Code": 3000, "Description": "OK", "Exception": null}"#;
        let status: Status = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(status.code, Some(3000));
        assert_eq!(status.description.as_deref(), Some("OK"));
        assert!(status.exception.is_none());
    }

    #[test]
    fn key_value_pair_round_trips() {
        let json = r#"{"Key": "CacheExpirationTime", "Value": "2024-01-01T00:00:00"}"#;
        let pair: KeyValuePair = serde_json::from_str(json).expect("should deserialize");
        assert_eq!(pair.key.as_deref(), Some("CacheExpirationTime"));

        let back = serde_json::to_value(&pair).expect("should serialize");
        assert_eq!(back["Key"], "CacheExpirationTime");
    }

    #[test]
    fn url_input_serializes_with_data_representation() {
        let input = UrlInput::url("https://example.com/sample.png");
        let json = serde_json::to_value(&input).expect("should serialize");
        assert_eq!(json["DataRepresentation"], "URL");
        assert_eq!(json["Value"], "https://example.com/sample.png");
    }
}
