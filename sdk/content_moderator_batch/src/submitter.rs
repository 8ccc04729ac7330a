//! The batch submitter: runs configured calls over a list of inputs.

use content_moderator_core::client::ModeratorClient;
use std::path::Path;
use std::time::Duration;

use crate::calls::EvaluationCall;
use crate::error::{BatchError, BatchResult};
use crate::limiter::{FixedDelay, RateLimiter};
use crate::records::{EvaluationRecord, RecordError, ResultSet};

/// What to do when a call fails for one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the whole batch and return the error. No partial output is
    /// produced. This is the default.
    #[default]
    Abort,

    /// Record the failure on the input's record, skip its remaining
    /// calls, and move on to the next input.
    Continue,
}

/// Runs a fixed set of moderation calls against each input in a batch,
/// pacing every request through a rate limiter.
///
/// Inputs can be supplied in memory via [`run`](Self::run) or read from a
/// file of one input per line via [`run_file`](Self::run_file).
pub struct BatchSubmitter {
    client: ModeratorClient,
    limiter: Box<dyn RateLimiter>,
    calls: Vec<Box<dyn EvaluationCall>>,
    failure_policy: FailurePolicy,
}

impl BatchSubmitter {
    /// Creates a builder around a configured client.
    pub fn builder(client: ModeratorClient) -> BatchSubmitterBuilder {
        BatchSubmitterBuilder {
            client,
            limiter: None,
            calls: Vec::new(),
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Runs every configured call against each input, in order.
    ///
    /// Returns one record per input, in input order, with one named result
    /// per completed call. Under [`FailurePolicy::Abort`] the first
    /// failing call ends the batch with an error.
    ///
    /// # Tracing
    ///
    /// Emits a span named `moderator::batch::run`.
    #[tracing::instrument(name = "moderator::batch::run", skip(self, inputs))]
    pub async fn run<I, S>(&self, inputs: I) -> BatchResult<ResultSet>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = ResultSet::default();

        for input in inputs {
            let input = input.into();
            let mut record = EvaluationRecord::new(input.clone());

            for call in &self.calls {
                self.limiter.acquire().await;

                tracing::debug!(call = call.name(), "invoking call");
                match call.invoke(&self.client, &input).await {
                    Ok(value) => {
                        record.results.insert(call.name().to_string(), value);
                    }
                    Err(source) => match self.failure_policy {
                        FailurePolicy::Abort => {
                            tracing::error!(
                                call = call.name(),
                                error = %source,
                                "call failed, aborting batch"
                            );
                            return Err(BatchError::Call {
                                name: call.name().to_string(),
                                input,
                                source,
                            });
                        }
                        FailurePolicy::Continue => {
                            tracing::warn!(
                                call = call.name(),
                                error = %source,
                                "call failed, skipping remaining calls for this input"
                            );
                            record.error = Some(RecordError {
                                call: call.name().to_string(),
                                message: source.to_string(),
                            });
                            break;
                        }
                    },
                }
            }

            set.records.push(record);
        }

        tracing::info!(
            total = set.len(),
            succeeded = set.succeeded(),
            failed = set.failed(),
            "batch finished"
        );
        Ok(set)
    }

    /// Reads inputs from a file (one per line, blank lines skipped), runs
    /// the batch, and writes the result set to the output path as pretty
    /// JSON.
    ///
    /// The output file is written only after the whole batch has
    /// completed; an aborted batch leaves no partial output behind.
    #[tracing::instrument(name = "moderator::batch::run_file", skip(self, input_path, output_path))]
    pub async fn run_file(
        &self,
        input_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> BatchResult<ResultSet> {
        let contents = tokio::fs::read_to_string(input_path.as_ref()).await?;
        let inputs: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        tracing::info!(
            input = %input_path.as_ref().display(),
            count = inputs.len(),
            "read batch inputs"
        );

        let set = self.run(inputs).await?;

        let json = serde_json::to_string_pretty(&set)?;
        tokio::fs::write(output_path.as_ref(), json).await?;
        tracing::info!(output = %output_path.as_ref().display(), "wrote batch results");

        Ok(set)
    }
}

/// Builder for [`BatchSubmitter`].
pub struct BatchSubmitterBuilder {
    client: ModeratorClient,
    limiter: Option<Box<dyn RateLimiter>>,
    calls: Vec<Box<dyn EvaluationCall>>,
    failure_policy: FailurePolicy,
}

impl BatchSubmitterBuilder {
    /// Sets the rate limiter. Defaults to a one second [`FixedDelay`],
    /// matching the free-tier quota of one request per second.
    pub fn limiter(mut self, limiter: impl RateLimiter + 'static) -> Self {
        self.limiter = Some(Box::new(limiter));
        self
    }

    /// Adds a call to run against each input. Calls run in the order they
    /// are added.
    pub fn call(mut self, call: impl EvaluationCall + 'static) -> Self {
        self.calls.push(Box::new(call));
        self
    }

    /// Sets the failure policy. Defaults to [`FailurePolicy::Abort`].
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Builds the submitter. Fails if no calls were added.
    pub fn build(self) -> BatchResult<BatchSubmitter> {
        if self.calls.is_empty() {
            return Err(BatchError::Builder(
                "at least one call is required".to_string(),
            ));
        }

        let limiter = self
            .limiter
            .unwrap_or_else(|| Box::new(FixedDelay::new(Duration::from_secs(1))));

        Ok(BatchSubmitter {
            client: self.client,
            limiter,
            calls: self.calls,
            failure_policy: self.failure_policy,
        })
    }
}
