//! Image moderation endpoints.
//!
//! Covers the `ProcessImage` operations: `Evaluate` (adult/racy scoring),
//! `OCR` (text extraction), `FindFaces` (face detection), and `Match`
//! (exact match against a custom image list). Images are submitted by URL
//! reference or as raw bytes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use content_moderator_core::client::ModeratorClient;
//! use content_moderator_core::auth::ModeratorCredential;
//! use content_moderator_moderation::image;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModeratorClient::builder()
//!     .region("westus")
//!     .credential(ModeratorCredential::new("your-subscription-key"))
//!     .build()?;
//!
//! let evaluation = image::evaluate_url(&client, "https://example.com/sample.png", true).await?;
//! println!("adult score: {:?}", evaluation.adult_classification_score);
//!
//! let ocr = image::ocr_url(&client, "https://example.com/sample.png", &Default::default()).await?;
//! println!("extracted text: {:?}", ocr.text);
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use content_moderator_core::client::ModeratorClient;
use content_moderator_core::error::ModeratorResult;
use content_moderator_core::models::{KeyValuePair, Status, UrlInput};
use serde::{Deserialize, Serialize};

use crate::models::MODERATE_BASE;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Options for the OCR endpoint.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    /// Language of the text to detect (three-letter code, e.g. `"eng"`).
    pub language: String,
    /// Use the enhanced detection path (slower, better recall).
    pub enhanced: bool,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            enhanced: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Result of an `Evaluate` call: adult and racy classification of an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Probability the image contains adult content (0.0 to 1.0).
    #[serde(rename = "AdultClassificationScore", skip_serializing_if = "Option::is_none")]
    pub adult_classification_score: Option<f64>,

    /// Whether the image is classified as adult content.
    #[serde(rename = "IsImageAdultClassified", skip_serializing_if = "Option::is_none")]
    pub is_image_adult_classified: Option<bool>,

    /// Probability the image is racy (0.0 to 1.0).
    #[serde(rename = "RacyClassificationScore", skip_serializing_if = "Option::is_none")]
    pub racy_classification_score: Option<f64>,

    /// Whether the image is classified as racy.
    #[serde(rename = "IsImageRacyClassified", skip_serializing_if = "Option::is_none")]
    pub is_image_racy_classified: Option<bool>,

    #[serde(rename = "Result", skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,

    #[serde(rename = "AdvancedInfo", skip_serializing_if = "Option::is_none")]
    pub advanced_info: Option<Vec<KeyValuePair>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,

    // The service spells this field differently per endpoint; Evaluate uses "CacheID".
    #[serde(rename = "CacheID", skip_serializing_if = "Option::is_none")]
    pub cache_id: Option<String>,
}

/// A candidate reading of extracted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrCandidate {
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "Confidence", skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Result of an `OCR` call: text found in an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    #[serde(rename = "Language", skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// The full detected text.
    #[serde(rename = "Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Alternate readings with confidence scores.
    #[serde(rename = "Candidates", skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<OcrCandidate>>,

    #[serde(rename = "Metadata", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<KeyValuePair>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,

    #[serde(rename = "CacheId", skip_serializing_if = "Option::is_none")]
    pub cache_id: Option<String>,
}

/// A face rectangle in pixel coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Face {
    #[serde(rename = "Bottom", skip_serializing_if = "Option::is_none")]
    pub bottom: Option<i32>,

    #[serde(rename = "Left", skip_serializing_if = "Option::is_none")]
    pub left: Option<i32>,

    #[serde(rename = "Right", skip_serializing_if = "Option::is_none")]
    pub right: Option<i32>,

    #[serde(rename = "Top", skip_serializing_if = "Option::is_none")]
    pub top: Option<i32>,
}

/// Result of a `FindFaces` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoundFaces {
    /// Whether at least one face was found.
    #[serde(rename = "Result", skip_serializing_if = "Option::is_none")]
    pub result: Option<bool>,

    /// Number of faces found.
    #[serde(rename = "Count", skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,

    #[serde(rename = "Faces", skip_serializing_if = "Option::is_none")]
    pub faces: Option<Vec<Face>>,

    #[serde(rename = "AdvancedInfo", skip_serializing_if = "Option::is_none")]
    pub advanced_info: Option<Vec<KeyValuePair>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,

    #[serde(rename = "CacheId", skip_serializing_if = "Option::is_none")]
    pub cache_id: Option<String>,
}

/// A single match against a custom image list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageMatch {
    #[serde(rename = "Score", skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(rename = "MatchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<i64>,

    #[serde(rename = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,

    #[serde(rename = "Label", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Result of a `Match` call against a custom image list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "IsMatch", skip_serializing_if = "Option::is_none")]
    pub is_match: Option<bool>,

    #[serde(rename = "Matches", skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<ImageMatch>>,

    #[serde(rename = "Status", skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    #[serde(rename = "TrackingId", skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,

    #[serde(rename = "CacheID", skip_serializing_if = "Option::is_none")]
    pub cache_id: Option<String>,
}

// ---------------------------------------------------------------------------
// API functions
// ---------------------------------------------------------------------------

/// Evaluate an image URL for adult and racy content.
///
/// `cache_image` asks the service to keep the downloaded image cached so
/// follow-up calls (OCR, face detection) can reuse it.
///
/// # Tracing
///
/// Emits a span named `moderator::image::evaluate`.
#[tracing::instrument(name = "moderator::image::evaluate", skip(client, image_url))]
pub async fn evaluate_url(
    client: &ModeratorClient,
    image_url: &str,
    cache_image: bool,
) -> ModeratorResult<Evaluation> {
    tracing::debug!("evaluating image");

    let path = format!("{MODERATE_BASE}/ProcessImage/Evaluate?CacheImage={cache_image}");
    let body = UrlInput::url(image_url.trim());
    let response = client.post(&path, &body).await?;
    let evaluation = response.json::<Evaluation>().await?;

    tracing::debug!("image evaluation complete");
    Ok(evaluation)
}

/// Evaluate raw image bytes for adult and racy content.
///
/// `content_type` must name the image format, e.g. `"image/jpeg"` or
/// `"image/png"`.
///
/// # Tracing
///
/// Emits a span named `moderator::image::evaluate_content`.
#[tracing::instrument(name = "moderator::image::evaluate_content", skip(client, image))]
pub async fn evaluate_content(
    client: &ModeratorClient,
    image: Bytes,
    content_type: &str,
    cache_image: bool,
) -> ModeratorResult<Evaluation> {
    tracing::debug!(len = image.len(), "evaluating image content");

    let path = format!("{MODERATE_BASE}/ProcessImage/Evaluate?CacheImage={cache_image}");
    let response = client.post_bytes(&path, content_type, image).await?;
    let evaluation = response.json::<Evaluation>().await?;

    Ok(evaluation)
}

/// Extract text from an image URL.
///
/// # Tracing
///
/// Emits a span named `moderator::image::ocr` with field `language`.
#[tracing::instrument(
    name = "moderator::image::ocr",
    skip(client, image_url, options),
    fields(language = %options.language)
)]
pub async fn ocr_url(
    client: &ModeratorClient,
    image_url: &str,
    options: &OcrOptions,
) -> ModeratorResult<OcrResult> {
    tracing::debug!("detecting text");

    let path = format!(
        "{MODERATE_BASE}/ProcessImage/OCR?language={}&enhanced={}",
        options.language, options.enhanced
    );
    let body = UrlInput::url(image_url.trim());
    let response = client.post(&path, &body).await?;
    let ocr = response.json::<OcrResult>().await?;

    tracing::debug!("text detection complete");
    Ok(ocr)
}

/// Detect faces in an image URL.
///
/// # Tracing
///
/// Emits a span named `moderator::image::find_faces`.
#[tracing::instrument(name = "moderator::image::find_faces", skip(client, image_url))]
pub async fn find_faces_url(
    client: &ModeratorClient,
    image_url: &str,
) -> ModeratorResult<FoundFaces> {
    tracing::debug!("detecting faces");

    let path = format!("{MODERATE_BASE}/ProcessImage/FindFaces");
    let body = UrlInput::url(image_url.trim());
    let response = client.post(&path, &body).await?;
    let faces = response.json::<FoundFaces>().await?;

    tracing::debug!(count = ?faces.count, "face detection complete");
    Ok(faces)
}

/// Match an image URL against a custom image list.
///
/// With `list_id` set, only that list is searched; otherwise all of the
/// subscription's image lists are.
///
/// # Tracing
///
/// Emits a span named `moderator::image::match` with field `list_id`.
#[tracing::instrument(
    name = "moderator::image::match",
    skip(client, image_url),
    fields(list_id = ?list_id)
)]
pub async fn match_url(
    client: &ModeratorClient,
    image_url: &str,
    list_id: Option<&str>,
) -> ModeratorResult<MatchResponse> {
    tracing::debug!("matching image against list");

    let path = match list_id {
        Some(id) => format!("{MODERATE_BASE}/ProcessImage/Match?listId={id}"),
        None => format!("{MODERATE_BASE}/ProcessImage/Match"),
    };
    let body = UrlInput::url(image_url.trim());
    let response = client.post(&path, &body).await?;
    let result = response.json::<MatchResponse>().await?;

    tracing::debug!(is_match = ?result.is_match, "match complete");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_moderator_core::test_support::mock_client;
    use wiremock::matchers::{body_json, header, method, path as match_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn evaluation_body() -> serde_json::Value {
        serde_json::json!({
            "AdultClassificationScore": 0.0124,
            "IsImageAdultClassified": false,
            "RacyClassificationScore": 0.8921,
            "IsImageRacyClassified": true,
            "Result": true,
            "AdvancedInfo": [{"Key": "ImageDownloadTimeInMs", "Value": "112"}],
            "Status": {"Code": 3000, "Description": "OK", "Exception": null},
            "TrackingId": "WE_abc123",
            "CacheID": "cache-1"
        })
    }

    #[test]
    fn evaluation_deserializes_from_service_payload() {
        let evaluation: Evaluation =
            serde_json::from_value(evaluation_body()).expect("should deserialize");

        assert_eq!(evaluation.is_image_racy_classified, Some(true));
        assert_eq!(evaluation.is_image_adult_classified, Some(false));
        assert!(evaluation.racy_classification_score.unwrap() > 0.8);
        assert_eq!(evaluation.cache_id.as_deref(), Some("cache-1"));
        assert_eq!(
            evaluation.status.as_ref().and_then(|s| s.code),
            Some(3000)
        );
    }

    #[test]
    fn evaluation_serializes_back_with_wire_names() {
        let evaluation: Evaluation =
            serde_json::from_value(evaluation_body()).expect("should deserialize");
        let json = serde_json::to_value(&evaluation).expect("should serialize");

        assert_eq!(json["RacyClassificationScore"], 0.8921);
        assert_eq!(json["CacheID"], "cache-1");
        assert!(json.get("cache_id").is_none());
    }

    #[test]
    fn ocr_result_deserializes_candidates() {
        let json = serde_json::json!({
            "Language": "eng",
            "Text": "IF WE DID ALL THE THINGS WE ARE CAPABLE OF DOING",
            "Candidates": [{"Text": "IF WE DID", "Confidence": 0.921}],
            "Metadata": [],
            "Status": {"Code": 3000, "Description": "OK"},
            "TrackingId": "WE_ocr1"
        });

        let ocr: OcrResult = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(ocr.language.as_deref(), Some("eng"));
        assert!(ocr.text.unwrap().starts_with("IF WE DID"));
        assert_eq!(ocr.candidates.unwrap().len(), 1);
    }

    #[test]
    fn found_faces_deserializes_rectangles() {
        let json = serde_json::json!({
            "Result": true,
            "Count": 2,
            "Faces": [
                {"Bottom": 598, "Left": 44, "Right": 268, "Top": 374},
                {"Bottom": 620, "Left": 308, "Right": 532, "Top": 396}
            ],
            "Status": {"Code": 3000, "Description": "OK"},
            "TrackingId": "WE_faces1"
        });

        let faces: FoundFaces = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(faces.count, Some(2));
        let first = &faces.faces.unwrap()[0];
        assert_eq!(first.left, Some(44));
        assert_eq!(first.bottom, Some(598));
    }

    #[test]
    fn match_response_deserializes_matches() {
        let json = serde_json::json!({
            "IsMatch": true,
            "Matches": [{
                "Score": 1.0,
                "MatchId": 1744,
                "Source": "1234",
                "Tags": [],
                "Label": "Swimsuit"
            }],
            "Status": {"Code": 3000, "Description": "OK"},
            "TrackingId": "WE_match1",
            "CacheID": "cache-m"
        });

        let result: MatchResponse = serde_json::from_value(json).expect("should deserialize");
        assert_eq!(result.is_match, Some(true));
        assert_eq!(result.matches.unwrap()[0].label.as_deref(), Some("Swimsuit"));
    }

    #[tokio::test]
    async fn evaluate_url_posts_url_envelope() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/Evaluate"))
            .and(query_param("CacheImage", "true"))
            .and(header("Ocp-Apim-Subscription-Key", "test-subscription-key"))
            .and(body_json(serde_json::json!({
                "DataRepresentation": "URL",
                "Value": "https://example.com/sample.png"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(evaluation_body()))
            .expect(1)
            .mount(&server)
            .await;

        let evaluation = evaluate_url(&client, " https://example.com/sample.png ", true)
            .await
            .expect("should succeed");

        assert_eq!(evaluation.is_image_racy_classified, Some(true));
    }

    #[tokio::test]
    async fn ocr_url_passes_language_and_enhanced() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/OCR"))
            .and(query_param("language", "spa"))
            .and(query_param("enhanced", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Language": "spa",
                "Text": "HOLA"
            })))
            .mount(&server)
            .await;

        let options = OcrOptions {
            language: "spa".to_string(),
            enhanced: true,
        };
        let ocr = ocr_url(&client, "https://example.com/sample.png", &options)
            .await
            .expect("should succeed");

        assert_eq!(ocr.text.as_deref(), Some("HOLA"));
    }

    #[tokio::test]
    async fn find_faces_url_success() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/FindFaces"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Result": false,
                "Count": 0,
                "Faces": []
            })))
            .mount(&server)
            .await;

        let faces = find_faces_url(&client, "https://example.com/sample.png")
            .await
            .expect("should succeed");

        assert_eq!(faces.count, Some(0));
        assert_eq!(faces.result, Some(false));
    }

    #[tokio::test]
    async fn match_url_targets_specific_list() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/Match"))
            .and(query_param("listId", "1234"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "IsMatch": false,
                "Matches": []
            })))
            .mount(&server)
            .await;

        let result = match_url(&client, "https://example.com/sample.png", Some("1234"))
            .await
            .expect("should succeed");

        assert_eq!(result.is_match, Some(false));
    }

    #[tokio::test]
    async fn evaluate_content_posts_raw_bytes() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/Evaluate"))
            .and(header("content-type", "image/png"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "IsImageAdultClassified": false,
                "IsImageRacyClassified": false
            })))
            .mount(&server)
            .await;

        let image = Bytes::from_static(b"\x89PNG\r\n\x1a\n");
        let evaluation = evaluate_content(&client, image, "image/png", false)
            .await
            .expect("should succeed");

        assert_eq!(evaluation.is_image_adult_classified, Some(false));
    }

    #[tokio::test]
    async fn evaluate_url_surfaces_api_error() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/Evaluate"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "Error": {"Code": "InvalidImageUrl", "Message": "Image could not be downloaded"}
            })))
            .mount(&server)
            .await;

        let err = evaluate_url(&client, "https://example.com/missing.png", false)
            .await
            .expect_err("should fail");

        let msg = err.to_string();
        assert!(msg.contains("InvalidImageUrl"), "unexpected error: {msg}");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn evaluate_emits_span() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(match_path("/contentmoderator/moderate/v1.0/ProcessImage/Evaluate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let _ = evaluate_url(&client, "https://example.com/sample.png", false).await;

        assert!(logs_contain("moderator::image::evaluate"));
    }
}
