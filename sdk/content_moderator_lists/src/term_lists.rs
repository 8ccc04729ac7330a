//! Custom term list management.
//!
//! A term list holds words that `ProcessText/Screen` flags in addition to
//! the built-in profanity dictionary when the screen request names the
//! list. Terms are language-scoped, and like image lists the index must be
//! refreshed after changes before screening reflects them.

use content_moderator_core::client::ModeratorClient;
use content_moderator_core::error::ModeratorResult;
use content_moderator_core::models::Status;
use serde::{Deserialize, Serialize};

use crate::models::{ListDetails, RefreshIndex, LISTS_BASE};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A custom term list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermList {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The terms stored in a list for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terms {
    #[serde(rename = "Data", skip_serializing_if = "Option::is_none")]
    pub data: Option<TermsData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsData {
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(rename = "Terms", skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<TermsInList>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsInList {
    #[serde(rename = "Term", skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// Create a new term list.
///
/// # Tracing
///
/// Emits a span named `moderator::term_lists::create`.
#[tracing::instrument(name = "moderator::term_lists::create", skip(client, details))]
pub async fn create(client: &ModeratorClient, details: &ListDetails) -> ModeratorResult<TermList> {
    tracing::debug!("creating term list");

    let path = format!("{LISTS_BASE}/termlists");
    let response = client.post(&path, details).await?;
    let list = response.json::<TermList>().await?;

    tracing::debug!(list_id = ?list.id, "term list created");
    Ok(list)
}

/// Get all term lists for the subscription.
#[tracing::instrument(name = "moderator::term_lists::get_all", skip(client))]
pub async fn get_all(client: &ModeratorClient) -> ModeratorResult<Vec<TermList>> {
    let path = format!("{LISTS_BASE}/termlists");
    let response = client.get(&path).await?;
    let lists = response.json::<Vec<TermList>>().await?;
    Ok(lists)
}

/// Get the details of one term list.
#[tracing::instrument(
    name = "moderator::term_lists::get_details",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn get_details(client: &ModeratorClient, list_id: &str) -> ModeratorResult<TermList> {
    let path = format!("{LISTS_BASE}/termlists/{list_id}");
    let response = client.get(&path).await?;
    let list = response.json::<TermList>().await?;
    Ok(list)
}

/// Update the name or description of a term list.
#[tracing::instrument(
    name = "moderator::term_lists::update",
    skip(client, details),
    fields(list_id = %list_id)
)]
pub async fn update(
    client: &ModeratorClient,
    list_id: &str,
    details: &ListDetails,
) -> ModeratorResult<TermList> {
    tracing::debug!("updating term list");

    let path = format!("{LISTS_BASE}/termlists/{list_id}");
    let response = client.put(&path, details).await?;
    let list = response.json::<TermList>().await?;
    Ok(list)
}

/// Delete a term list entirely.
#[tracing::instrument(
    name = "moderator::term_lists::delete",
    skip(client),
    fields(list_id = %list_id)
)]
pub async fn delete(client: &ModeratorClient, list_id: &str) -> ModeratorResult<()> {
    tracing::debug!("deleting term list");

    let path = format!("{LISTS_BASE}/termlists/{list_id}");
    client.delete(&path).await?;
    Ok(())
}

/// Refresh the search index of a term list for one language.
#[tracing::instrument(
    name = "moderator::term_lists::refresh_index",
    skip(client),
    fields(list_id = %list_id, language = %language)
)]
pub async fn refresh_index(
    client: &ModeratorClient,
    list_id: &str,
    language: &str,
) -> ModeratorResult<RefreshIndex> {
    tracing::debug!("refreshing term list index");

    let path = format!("{LISTS_BASE}/termlists/{list_id}/RefreshIndex?language={language}");
    let response = client.post(&path, &serde_json::json!({})).await?;
    let refresh = response.json::<RefreshIndex>().await?;

    tracing::debug!(success = ?refresh.is_update_success, "index refresh accepted");
    Ok(refresh)
}

/// Add a term to a list under the given language.
///
/// # Tracing
///
/// Emits a span named `moderator::term_lists::add_term` with field `list_id`.
#[tracing::instrument(
    name = "moderator::term_lists::add_term",
    skip(client, term),
    fields(list_id = %list_id, language = %language)
)]
pub async fn add_term(
    client: &ModeratorClient,
    list_id: &str,
    term: &str,
    language: &str,
) -> ModeratorResult<()> {
    tracing::debug!("adding term to list");

    let path = format!("{LISTS_BASE}/termlists/{list_id}/terms/{term}?language={language}");
    client.post(&path, &serde_json::json!({})).await?;
    Ok(())
}

/// Get all terms in a list for one language.
#[tracing::instrument(
    name = "moderator::term_lists::get_all_terms",
    skip(client),
    fields(list_id = %list_id, language = %language)
)]
pub async fn get_all_terms(
    client: &ModeratorClient,
    list_id: &str,
    language: &str,
) -> ModeratorResult<Terms> {
    let path = format!("{LISTS_BASE}/termlists/{list_id}/terms?language={language}");
    let response = client.get(&path).await?;
    let terms = response.json::<Terms>().await?;
    Ok(terms)
}

/// Remove a single term from a list.
#[tracing::instrument(
    name = "moderator::term_lists::delete_term",
    skip(client, term),
    fields(list_id = %list_id, language = %language)
)]
pub async fn delete_term(
    client: &ModeratorClient,
    list_id: &str,
    term: &str,
    language: &str,
) -> ModeratorResult<()> {
    let path = format!("{LISTS_BASE}/termlists/{list_id}/terms/{term}?language={language}");
    client.delete(&path).await?;
    Ok(())
}

/// Remove every term from a list for one language.
#[tracing::instrument(
    name = "moderator::term_lists::delete_all_terms",
    skip(client),
    fields(list_id = %list_id, language = %language)
)]
pub async fn delete_all_terms(
    client: &ModeratorClient,
    list_id: &str,
    language: &str,
) -> ModeratorResult<()> {
    let path = format!("{LISTS_BASE}/termlists/{list_id}/terms?language={language}");
    client.delete(&path).await?;
    Ok(())
}
