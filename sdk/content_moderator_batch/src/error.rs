//! Error types for the batch pipeline.

use content_moderator_core::ModeratorError;

/// Errors raised while running a batch.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Reading the input file or writing the output file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the result set failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A moderation call failed for one input.
    #[error("call '{name}' failed for input '{input}': {source}")]
    Call {
        /// Name of the failing call.
        name: String,
        /// The input the call was evaluating.
        input: String,
        #[source]
        source: ModeratorError,
    },

    /// The submitter or limiter was configured incorrectly.
    #[error("builder error: {0}")]
    Builder(String),
}

/// Result alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_error_names_call_and_input() {
        let error = BatchError::Call {
            name: "ImageModeration".to_string(),
            input: "https://example.com/sample.jpg".to_string(),
            source: ModeratorError::Builder("bad request".to_string()),
        };

        let message = error.to_string();
        assert!(message.contains("ImageModeration"));
        assert!(message.contains("https://example.com/sample.jpg"));
    }
}
