//! Text screening endpoint.
//!
//! `ProcessText/Screen` runs profanity term matching, spell autocorrect,
//! PII detection, and three-category classification over a block of text in
//! a single call. The text is sent as the raw `text/plain` request body and
//! must be between 1 and 1024 characters.
//!
//! ## Example
//!
//! ```rust,no_run
//! use content_moderator_core::client::ModeratorClient;
//! use content_moderator_core::auth::ModeratorCredential;
//! use content_moderator_moderation::text::{self, ScreenOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModeratorClient::builder()
//!     .region("westus")
//!     .credential(ModeratorCredential::new("your-subscription-key"))
//!     .build()?;
//!
//! let options = ScreenOptions::builder()
//!     .autocorrect(true)
//!     .pii(true)
//!     .classify(true)
//!     .build()?;
//!
//! let screen = text::screen(&client, "Is this a grabage email abcdef@abcd.com", &options).await?;
//! if let Some(pii) = &screen.pii {
//!     println!("emails found: {:?}", pii.email);
//! }
//! # Ok(())
//! # }
//! ```

use content_moderator_core::client::ModeratorClient;
use content_moderator_core::error::{ModeratorError, ModeratorResult};
use content_moderator_core::models::Status;
use serde::{Deserialize, Serialize};

use crate::models::MODERATE_BASE;

/// Maximum text length accepted by the screen endpoint.
pub const MAX_SCREEN_TEXT_LEN: usize = 1024;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Options for a text screening request.
///
/// Use the builder to construct:
///
/// ```rust
/// use content_moderator_moderation::text::ScreenOptions;
///
/// let options = ScreenOptions::builder()
///     .language("eng")
///     .autocorrect(true)
///     .pii(true)
///     .classify(true)
///     .build()
///     .expect("valid options");
/// ```
#[derive(Debug, Clone)]
pub struct ScreenOptions {
    language: String,
    autocorrect: bool,
    pii: bool,
    classify: bool,
    list_id: Option<String>,
}

impl ScreenOptions {
    /// Creates a new builder for screen options.
    pub fn builder() -> ScreenOptionsBuilder {
        ScreenOptionsBuilder::default()
    }

    /// Builds the query string for the screen request.
    pub(crate) fn query_string(&self) -> String {
        let mut params = format!(
            "language={}&autocorrect={}&PII={}&classify={}",
            self.language, self.autocorrect, self.pii, self.classify
        );
        if let Some(ref list_id) = self.list_id {
            params.push_str(&format!("&listId={list_id}"));
        }
        params
    }
}

impl Default for ScreenOptions {
    /// English, with autocorrect, PII detection, and classification off.
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            autocorrect: false,
            pii: false,
            classify: false,
            list_id: None,
        }
    }
}

/// Builder for [`ScreenOptions`].
#[derive(Debug, Default)]
pub struct ScreenOptionsBuilder {
    language: Option<String>,
    autocorrect: bool,
    pii: bool,
    classify: bool,
    list_id: Option<String>,
}

impl ScreenOptionsBuilder {
    /// Sets the language of the text (three-letter code, defaults to `"eng"`).
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Enables spell autocorrection of the text before screening.
    pub fn autocorrect(mut self, value: bool) -> Self {
        self.autocorrect = value;
        self
    }

    /// Enables detection of personally identifying information.
    pub fn pii(mut self, value: bool) -> Self {
        self.pii = value;
        self
    }

    /// Enables classification into the three content categories.
    pub fn classify(mut self, value: bool) -> Self {
        self.classify = value;
        self
    }

    /// Screens against a custom term list in addition to the default one.
    pub fn list_id(mut self, list_id: impl Into<String>) -> Self {
        self.list_id = Some(list_id.into());
        self
    }

    /// Builds the options, validating all fields.
    ///
    /// # Errors
    ///
    /// Returns [`ModeratorError::Builder`] if the language is empty.
    pub fn build(self) -> ModeratorResult<ScreenOptions> {
        let language = self.language.unwrap_or_else(|| "eng".to_string());
        if language.is_empty() {
            return Err(ModeratorError::Builder("language must not be empty".into()));
        }

        Ok(ScreenOptions {
            language,
            autocorrect: self.autocorrect,
            pii: self.pii,
            classify: self.classify,
            list_id: self.list_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A detected email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedEmail {
    #[serde(rename = "Detected", skip_serializing_if = "Option::is_none")]
    pub detected: Option<String>,

    #[serde(rename = "SubType", skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "Index", skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// A detected IP address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedIpAddress {
    #[serde(rename = "SubType", skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "Index", skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// A detected phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedPhone {
    #[serde(rename = "CountryCode", skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,

    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "Index", skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// A detected postal address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedAddress {
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "Index", skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// A detected social security number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedSsn {
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "Index", skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

/// Personally identifying information found in the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pii {
    #[serde(rename = "Email", skip_serializing_if = "Option::is_none")]
    pub email: Option<Vec<DetectedEmail>>,

    #[serde(rename = "IPA", skip_serializing_if = "Option::is_none")]
    pub ip_addresses: Option<Vec<DetectedIpAddress>>,

    #[serde(rename = "Phone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Vec<DetectedPhone>>,

    #[serde(rename = "Address", skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<DetectedAddress>>,

    #[serde(rename = "SSN", skip_serializing_if = "Option::is_none")]
    pub ssn: Option<Vec<DetectedSsn>>,
}

/// Score for one classification category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationCategory {
    #[serde(rename = "Score", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Three-category text classification.
///
/// Category 1: sexually explicit; category 2: sexually suggestive;
/// category 3: offensive language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "Category1", skip_serializing_if = "Option::is_none")]
    pub category1: Option<ClassificationCategory>,

    #[serde(rename = "Category2", skip_serializing_if = "Option::is_none")]
    pub category2: Option<ClassificationCategory>,

    #[serde(rename = "Category3", skip_serializing_if = "Option::is_none")]
    pub category3: Option<ClassificationCategory>,

    /// Whether human review is recommended.
    #[serde(rename = "ReviewRecommended", skip_serializing_if = "Option::is_none")]
    pub review_recommended: Option<bool>,
}

/// A term matched against the default or a custom term list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedTerm {
    #[serde(rename = "Index", skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,

    #[serde(rename = "OriginalIndex", skip_serializing_if = "Option::is_none")]
    pub original_index: Option<i32>,

    #[serde(rename = "ListId", skip_serializing_if = "Option::is_none")]
    pub list_id: Option<i64>,

    #[serde(rename = "Term", skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

/// Result of a text screening call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screen {
    #[serde(rename = "OriginalText", skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    #[serde(rename = "NormalizedText", skip_serializing_if = "Option::is_none")]
    pub normalized_text: Option<String>,

    #[serde(rename = "AutoCorrectedText", skip_serializing_if = "Option::is_none")]
    pub auto_corrected_text: Option<String>,

    #[serde(rename = "Misrepresentation", skip_serializing_if = "Option::is_none")]
    pub misrepresentation: Option<Vec<String>>,

    #[serde(rename = "Classification", skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,

    #[serde(rename = "PII", skip_serializing_if = "Option::is_none")]
    pub pii: Option<Pii>,

    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(rename = "Terms", skip_serializing_if = "Option::is_none")]
    pub terms: Option<Vec<DetectedTerm>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// Screen a block of text for profanity terms, PII, and classification.
///
/// # Errors
///
/// Returns [`ModeratorError::Builder`] if the text is empty or longer than
/// [`MAX_SCREEN_TEXT_LEN`] characters, before any remote call is made.
///
/// # Tracing
///
/// Emits a span named `moderator::text::screen` with field `language`.
#[tracing::instrument(
    name = "moderator::text::screen",
    skip(client, text, options),
    fields(language = %options.language)
)]
pub async fn screen(
    client: &ModeratorClient,
    text: &str,
    options: &ScreenOptions,
) -> ModeratorResult<Screen> {
    let char_count = text.chars().count();
    if char_count == 0 || char_count > MAX_SCREEN_TEXT_LEN {
        return Err(ModeratorError::Builder(format!(
            "text must be 1 to {MAX_SCREEN_TEXT_LEN} characters, got {char_count}"
        )));
    }

    tracing::debug!(chars = char_count, "screening text");

    let path = format!(
        "{MODERATE_BASE}/ProcessText/Screen?{}",
        options.query_string()
    );
    let response = client.post_text(&path, text).await?;
    let screen = response.json::<Screen>().await?;

    tracing::debug!("text screening complete");
    Ok(screen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_moderator_core::test_support::mock_client;
    use wiremock::matchers::{body_string, header, method, path as match_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn default_options_query_string() {
        let options = ScreenOptions::default();
        assert_eq!(
            options.query_string(),
            "language=eng&autocorrect=false&PII=false&classify=false"
        );
    }

    #[test]
    fn builder_sets_all_flags() {
        let options = ScreenOptions::builder()
            .language("por")
            .autocorrect(true)
            .pii(true)
            .classify(true)
            .list_id("233")
            .build()
            .expect("valid options");

        let qs = options.query_string();
        assert!(qs.contains("language=por"), "qs: {qs}");
        assert!(qs.contains("autocorrect=true"), "qs: {qs}");
        assert!(qs.contains("PII=true"), "qs: {qs}");
        assert!(qs.contains("classify=true"), "qs: {qs}");
        assert!(qs.contains("listId=233"), "qs: {qs}");
    }

    #[test]
    fn builder_rejects_empty_language() {
        let result = ScreenOptions::builder().language("").build();
        let err = result.expect_err("should reject empty language");
        assert!(err.to_string().contains("language"), "error: {err}");
    }

    #[test]
    fn screen_response_deserializes_pii_and_terms() {
        let json = serde_json::json!({
            "OriginalText": "Is this a grabage email abcdef@abcd.com, phone: 6657789887",
            "NormalizedText": "Is this a grabage email abcdef@abcd.com, phone: 6657789887",
            "AutoCorrectedText": "Is this a garbage email abcdef@abcd.com, phone: 6657789887",
            "Misrepresentation": null,
            "Classification": {
                "Category1": {"Score": 0.00040},
                "Category2": {"Score": 0.22345},
                "Category3": {"Score": 0.98799},
                "ReviewRecommended": true
            },
            "PII": {
                "Email": [{"Detected": "abcdef@abcd.com", "SubType": "Regular", "Text": "abcdef@abcd.com", "Index": 24}],
                "IPA": [],
                "Phone": [{"CountryCode": "US", "Text": "6657789887", "Index": 48}],
                "Address": [],
                "SSN": []
            },
            "Language": "eng",
            "Terms": [{"Index": 10, "OriginalIndex": 10, "ListId": 0, "Term": "grabage"}],
            "Status": {"Code": 3000, "Description": "OK", "Exception": null},
            "TrackingId": "WE_screen1"
        });

        let screen: Screen = serde_json::from_value(json).expect("should deserialize");

        let pii = screen.pii.expect("should have pii");
        assert_eq!(
            pii.email.unwrap()[0].text.as_deref(),
            Some("abcdef@abcd.com")
        );
        assert_eq!(pii.phone.unwrap()[0].country_code.as_deref(), Some("US"));

        let classification = screen.classification.expect("should have classification");
        assert_eq!(classification.review_recommended, Some(true));
        assert!(classification.category3.unwrap().score.unwrap() > 0.9);

        assert_eq!(screen.terms.unwrap()[0].term.as_deref(), Some("grabage"));
        assert!(screen.auto_corrected_text.unwrap().contains("garbage"));
    }

    #[tokio::test]
    async fn screen_posts_text_body_with_query_flags() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessText/Screen"))
            .and(query_param("language", "eng"))
            .and(query_param("autocorrect", "true"))
            .and(query_param("PII", "true"))
            .and(query_param("classify", "true"))
            .and(header("content-type", "text/plain"))
            .and(body_string("Crap is the profanity here"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "OriginalText": "Crap is the profanity here",
                "Language": "eng",
                "Terms": [{"Index": 0, "OriginalIndex": 0, "ListId": 0, "Term": "crap"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = ScreenOptions::builder()
            .autocorrect(true)
            .pii(true)
            .classify(true)
            .build()
            .expect("valid options");

        let screen = screen(&client, "Crap is the profanity here", &options)
            .await
            .expect("should succeed");

        assert_eq!(screen.terms.unwrap()[0].term.as_deref(), Some("crap"));
    }

    #[tokio::test]
    async fn screen_passes_custom_list_id() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessText/Screen"))
            .and(query_param("listId", "122"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Language": "eng"
            })))
            .mount(&server)
            .await;

        let options = ScreenOptions::builder()
            .list_id("122")
            .build()
            .expect("valid options");

        let result = screen(&client, "hello wave", &options).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn screen_rejects_empty_text_locally() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        // No mock mounted: the request must never reach the server.
        let options = ScreenOptions::default();
        let err = screen(&client, "", &options).await.expect_err("should fail");

        assert!(matches!(
            err,
            content_moderator_core::ModeratorError::Builder(_)
        ));
    }

    #[tokio::test]
    async fn screen_rejects_oversized_text_locally() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        let text = "a".repeat(MAX_SCREEN_TEXT_LEN + 1);
        let options = ScreenOptions::default();
        let err = screen(&client, &text, &options)
            .await
            .expect_err("should fail");

        assert!(err.to_string().contains("1024"), "error: {err}");
    }
}
