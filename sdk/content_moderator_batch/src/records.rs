//! The per-input record and the batch result set.

use serde::{Deserialize, Serialize};

/// The evaluation results for one input.
///
/// `results` maps each call's name to the raw JSON response body it
/// produced for this input, in the order the calls were configured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// The input line this record was produced from.
    pub input: String,

    /// Named results, one entry per completed call.
    pub results: serde_json::Map<String, serde_json::Value>,

    /// Set when a call failed and the batch was configured to continue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RecordError>,
}

impl EvaluationRecord {
    pub(crate) fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            results: serde_json::Map::new(),
            error: None,
        }
    }

    /// Whether every configured call completed for this input.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// The failing call and its error message, recorded on the input's record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordError {
    /// Name of the call that failed.
    pub call: String,

    /// The error's display message.
    pub message: String,
}

/// All records produced by one batch run, in input order.
///
/// Serializes as a plain JSON array of records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    pub records: Vec<EvaluationRecord>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of inputs for which every call completed.
    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    /// Number of inputs with a recorded failure.
    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }
}
