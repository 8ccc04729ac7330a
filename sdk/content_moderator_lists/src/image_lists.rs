//! Custom image list management.
//!
//! An image list holds reference images that `ProcessImage/Match` compares
//! candidates against. After adding or removing images the list's search
//! index must be refreshed before matches reflect the change.
//!
//! ## Example
//!
//! ```rust,no_run
//! use content_moderator_core::client::ModeratorClient;
//! use content_moderator_core::auth::ModeratorCredential;
//! use content_moderator_lists::image_lists;
//! use content_moderator_lists::models::ListDetails;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModeratorClient::builder()
//!     .region("westus")
//!     .credential(ModeratorCredential::new("your-subscription-key"))
//!     .build()?;
//!
//! let list = image_lists::create(&client, &ListDetails::named("Sports")).await?;
//! let list_id = list.id.expect("created list has an id").to_string();
//!
//! image_lists::add_image_url(
//!     &client,
//!     &list_id,
//!     "https://example.com/sample4.png",
//!     Some("Sports"),
//!     None,
//! )
//! .await?;
//! image_lists::refresh_index(&client, &list_id).await?;
//! # Ok(())
//! # }
//! ```

use content_moderator_core::client::ModeratorClient;
use content_moderator_core::error::ModeratorResult;
use content_moderator_core::models::{KeyValuePair, Status, UrlInput};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{ListDetails, RefreshIndex, LISTS_BASE};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A custom image list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageList {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, String>>,
}

/// Result of adding an image to a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedImage {
    /// Identifier of the stored image, used to delete it later.
    #[serde(rename = "ContentId", skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,

    #[serde(rename = "AdditionalInfo", skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Vec<KeyValuePair>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

/// The identifiers of all images in a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageIds {
    #[serde(rename = "ContentSource", skip_serializing_if = "Option::is_none")]
    pub content_source: Option<String>,

    #[serde(rename = "ContentIds", skip_serializing_if = "Option::is_none")]
    pub content_ids: Option<Vec<i64>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// Create a new image list.
///
/// # Tracing
///
/// Emits a span named `moderator::image_lists::create`.
#[tracing::instrument(name = "moderator::image_lists::create", skip(client, details))]
pub async fn create(client: &ModeratorClient, details: &ListDetails) -> ModeratorResult<ImageList> {
    tracing::debug!("creating image list");

    let path = format!("{LISTS_BASE}/imagelists");
    let response = client.post(&path, details).await?;
    let list = response.json::<ImageList>().await?;

    tracing::debug!(list_id = ?list.id, "image list created");
    Ok(list)
}

/// Get all image lists for the subscription.
#[tracing::instrument(name = "moderator::image_lists::get_all", skip(client))]
pub async fn get_all(client: &ModeratorClient) -> ModeratorResult<Vec<ImageList>> {
    let path = format!("{LISTS_BASE}/imagelists");
    let response = client.get(&path).await?;
    let lists = response.json::<Vec<ImageList>>().await?;
    Ok(lists)
}

/// Get the details of one image list.
#[tracing::instrument(
    name = "moderator::image_lists::get_details",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn get_details(client: &ModeratorClient, list_id: &str) -> ModeratorResult<ImageList> {
    let path = format!("{LISTS_BASE}/imagelists/{list_id}");
    let response = client.get(&path).await?;
    let list = response.json::<ImageList>().await?;
    Ok(list)
}

/// Update the name, description, or metadata of an image list.
#[tracing::instrument(
    name = "moderator::image_lists::update",
    skip(client, details),
    fields(list_id = %list_id)
)]
pub async fn update(
    client: &ModeratorClient,
    list_id: &str,
    details: &ListDetails,
) -> ModeratorResult<ImageList> {
    tracing::debug!("updating image list");

    let path = format!("{LISTS_BASE}/imagelists/{list_id}");
    let response = client.put(&path, details).await?;
    let list = response.json::<ImageList>().await?;
    Ok(list)
}

/// Delete an image list entirely.
#[tracing::instrument(
    name = "moderator::image_lists::delete",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn delete(client: &ModeratorClient, list_id: &str) -> ModeratorResult<()> {
    tracing::debug!("deleting image list");

    let path = format!("{LISTS_BASE}/imagelists/{list_id}");
    client.delete(&path).await?;
    Ok(())
}

/// Refresh the search index of an image list.
///
/// Required after adding or removing images; matches against the list do
/// not see the change until the refreshed index has propagated.
#[tracing::instrument(
    name = "moderator::image_lists::refresh_index",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn refresh_index(
    client: &ModeratorClient,
    list_id: &str,
) -> ModeratorResult<RefreshIndex> {
    tracing::debug!("refreshing image list index");

    let path = format!("{LISTS_BASE}/imagelists/{list_id}/RefreshIndex");
    let response = client.post(&path, &serde_json::json!({})).await?;
    let refresh = response.json::<RefreshIndex>().await?;

    tracing::debug!(success = ?refresh.is_update_success, "index refresh accepted");
    Ok(refresh)
}

/// Add an image to a list by URL, optionally labeled and tagged.
///
/// # Tracing
///
/// Emits a span named `moderator::image_lists::add_image` with field `list_id`.
#[tracing::instrument(
    name = "moderator::image_lists::add_image",
    skip(client, image_url),
    fields(list_id = %list_id, label = ?label)
)]
pub async fn add_image_url(
    client: &ModeratorClient,
    list_id: &str,
    image_url: &str,
    label: Option<&str>,
    tag: Option<i32>,
) -> ModeratorResult<AddedImage> {
    tracing::debug!("adding image to list");

    let mut path = format!("{LISTS_BASE}/imagelists/{list_id}/images");
    let mut sep = '?';
    if let Some(label) = label {
        path.push_str(&format!("{sep}label={label}"));
        sep = '&';
    }
    if let Some(tag) = tag {
        path.push_str(&format!("{sep}tag={tag}"));
    }

    let body = UrlInput::url(image_url.trim());
    let response = client.post(&path, &body).await?;
    let added = response.json::<AddedImage>().await?;

    tracing::debug!(content_id = ?added.content_id, "image added");
    Ok(added)
}

/// Get the identifiers of all images in a list.
#[tracing::instrument(
    name = "moderator::image_lists::get_all_image_ids",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn get_all_image_ids(
    client: &ModeratorClient,
    list_id: &str,
) -> ModeratorResult<ImageIds> {
    let path = format!("{LISTS_BASE}/imagelists/{list_id}/images");
    let response = client.get(&path).await?;
    let ids = response.json::<ImageIds>().await?;
    Ok(ids)
}

/// Remove a single image from a list.
#[tracing::instrument(
    name = "moderator::image_lists::delete_image",
    skip(client),
    fields(list_id = %list_id, image_id = %image_id)
)]
pub async fn delete_image(
    client: &ModeratorClient,
    list_id: &str,
    image_id: &str,
) -> ModeratorResult<()> {
    let path = format!("{LISTS_BASE}/imagelists/{list_id}/images/{image_id}");
    client.delete(&path).await?;
    Ok(())
}

/// Remove every image from a list, leaving it empty.
#[tracing::instrument(
    name = "moderator::image_lists::delete_all_images",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn delete_all_images(client: &ModeratorClient, list_id: &str) -> ModeratorResult<()> {
    let path = format!("{LISTS_BASE}/imagelists/{list_id}/images");
    client.delete(&path).await?;
    Ok(())
}
