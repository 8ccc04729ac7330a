//! Shared types for the list-management endpoints.

use content_moderator_core::models::Status;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Base path for list-management requests.
pub(crate) const LISTS_BASE: &str = "/contentmoderator/lists/v1.0";

/// Name, description, and metadata for creating or updating a list.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListDetails {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

impl ListDetails {
    /// Details with just a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the metadata map.
    pub fn metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Result of a `RefreshIndex` call.
///
/// Index changes are applied asynchronously server-side; a success here
/// only means the refresh was accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshIndex {
    #[serde(rename = "ContentSourceId", skip_serializing_if = "Option::is_none")]
    pub content_source_id: Option<String>,

    #[serde(rename = "IsUpdateSuccess", skip_serializing_if = "Option::is_none")]
    pub is_update_success: Option<bool>,

    #[serde(rename = "AdvancedInfo", skip_serializing_if = "Option::is_none")]
    pub advanced_info: Option<Vec<serde_json::Value>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_details_serializes_only_set_fields() {
        let details = ListDetails::named("Greetings");
        let json = serde_json::to_value(&details).expect("should serialize");

        assert_eq!(json["Name"], "Greetings");
        assert!(json.get("Description").is_none());
        assert!(json.get("Metadata").is_none());
    }

    #[test]
    fn list_details_with_metadata() {
        let mut metadata = HashMap::new();
        metadata.insert("good".to_string(), "Acceptable".to_string());

        let details = ListDetails::named("Generic name")
            .description("A list of sport and swimsuit images")
            .metadata(metadata);
        let json = serde_json::to_value(&details).expect("should serialize");

        assert_eq!(json["Metadata"]["good"], "Acceptable");
    }

    #[test]
    fn refresh_index_deserializes() {
        let json = serde_json::json!({
            "ContentSourceId": "1234",
            "IsUpdateSuccess": true,
            "AdvancedInfo": [],
            "Status": {"Code": 3000, "Description": "RefreshIndex successfully completed."},
            "TrackingId": "WE_refresh1"
        });

        let refresh: RefreshIndex = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(refresh.is_update_success, Some(true));
        assert_eq!(refresh.content_source_id.as_deref(), Some("1234"));
    }
}
