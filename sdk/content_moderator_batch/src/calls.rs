//! The call abstraction and the built-in moderation calls.
//!
//! A [`BatchSubmitter`](crate::submitter::BatchSubmitter) runs every
//! configured [`EvaluationCall`] against each input. The built-in calls
//! wrap the `content_moderator_moderation` endpoints; implement the trait
//! directly to add custom calls to a batch.

use async_trait::async_trait;
use content_moderator_core::client::ModeratorClient;
use content_moderator_core::error::ModeratorResult;
use content_moderator_moderation::image::{self, OcrOptions};
use content_moderator_moderation::text::{self, ScreenOptions};

/// One named moderation call applied to every input in a batch.
///
/// `invoke` returns the response as raw JSON so heterogeneous calls can
/// share one record; the typed response structs remain available through
/// the endpoint functions directly.
#[async_trait]
pub trait EvaluationCall: Send + Sync {
    /// The key this call's result is stored under in each record.
    fn name(&self) -> &str;

    async fn invoke(
        &self,
        client: &ModeratorClient,
        input: &str,
    ) -> ModeratorResult<serde_json::Value>;
}

/// Evaluates an image URL for adult and racy content.
#[derive(Debug, Default)]
pub struct ImageEvaluation {
    cache_image: bool,
}

impl ImageEvaluation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the service to cache the image for later calls.
    pub fn cache_image(mut self, value: bool) -> Self {
        self.cache_image = value;
        self
    }
}

#[async_trait]
impl EvaluationCall for ImageEvaluation {
    fn name(&self) -> &str {
        "ImageModeration"
    }

    async fn invoke(
        &self,
        client: &ModeratorClient,
        input: &str,
    ) -> ModeratorResult<serde_json::Value> {
        let evaluation = image::evaluate_url(client, input, self.cache_image).await?;
        Ok(serde_json::to_value(evaluation)?)
    }
}

/// Extracts text from an image URL via OCR.
#[derive(Debug, Default)]
pub struct ImageTextDetection {
    options: OcrOptions,
}

impl ImageTextDetection {
    pub fn new(options: OcrOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl EvaluationCall for ImageTextDetection {
    fn name(&self) -> &str {
        "TextDetection"
    }

    async fn invoke(
        &self,
        client: &ModeratorClient,
        input: &str,
    ) -> ModeratorResult<serde_json::Value> {
        let ocr = image::ocr_url(client, input, &self.options).await?;
        Ok(serde_json::to_value(ocr)?)
    }
}

/// Detects faces in an image URL.
#[derive(Debug, Default)]
pub struct ImageFaceDetection;

impl ImageFaceDetection {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvaluationCall for ImageFaceDetection {
    fn name(&self) -> &str {
        "FaceDetection"
    }

    async fn invoke(
        &self,
        client: &ModeratorClient,
        input: &str,
    ) -> ModeratorResult<serde_json::Value> {
        let faces = image::find_faces_url(client, input).await?;
        Ok(serde_json::to_value(faces)?)
    }
}

/// Screens a text input for profanity, PII, and classification.
///
/// Unlike the image calls, the input is the text itself rather than a URL.
#[derive(Debug, Default)]
pub struct TextScreening {
    options: ScreenOptions,
}

impl TextScreening {
    pub fn new(options: ScreenOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl EvaluationCall for TextScreening {
    fn name(&self) -> &str {
        "TextScreening"
    }

    async fn invoke(
        &self,
        client: &ModeratorClient,
        input: &str,
    ) -> ModeratorResult<serde_json::Value> {
        let screen = text::screen(client, input, &self.options).await?;
        Ok(serde_json::to_value(screen)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use content_moderator_core::test_support::mock_client;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn built_in_call_names() {
        assert_eq!(ImageEvaluation::new().name(), "ImageModeration");
        assert_eq!(
            ImageTextDetection::new(OcrOptions::default()).name(),
            "TextDetection"
        );
        assert_eq!(ImageFaceDetection::new().name(), "FaceDetection");
        assert_eq!(
            TextScreening::new(ScreenOptions::default()).name(),
            "TextScreening"
        );
    }

    #[tokio::test]
    async fn image_evaluation_returns_raw_json() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(path("/contentmoderator/moderate/v1.0/ProcessImage/Evaluate"))
            .and(body_json(serde_json::json!({
                "DataRepresentation": "URL",
                "Value": "https://example.com/sample.jpg"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AdultClassificationScore": 0.004,
                "IsImageAdultClassified": false,
                "Result": false
            })))
            .mount(&server)
            .await;

        let value = ImageEvaluation::new()
            .invoke(&client, "https://example.com/sample.jpg")
            .await
            .expect("should succeed");

        assert_eq!(value["IsImageAdultClassified"], false);
    }

    #[tokio::test]
    async fn text_screening_posts_the_input_as_body() {
        let server = MockServer::start().await;
        let client = mock_client(&server);

        Mock::given(method("POST"))
            .and(path("/contentmoderator/moderate/v1.0/ProcessText/Screen"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "OriginalText": "Is this a grabage email",
                "Language": "eng"
            })))
            .mount(&server)
            .await;

        let value = TextScreening::new(ScreenOptions::default())
            .invoke(&client, "Is this a grabage email")
            .await
            .expect("should succeed");

        assert_eq!(value["Language"], "eng");
    }
}
