//! Execution reports.

use crate::StepContext;
use derive_getters::Getters;
use giotto_error::{GiottoResult, PipelineError, PipelineErrorKind};
use serde::{Deserialize, Serialize};

/// Outcome of one executed step.
///
/// Steps that never ran (because an earlier step failed) have no report
/// entry at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct StepReport {
    /// Name of the step
    step_name: String,
    /// Whether the step's action succeeded
    success: bool,
    /// Wall-clock duration of the step's action in milliseconds
    duration_ms: u64,
    /// Message from the step's error, if it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StepReport {
    pub(crate) fn succeeded(step_name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            step_name: step_name.into(),
            success: true,
            duration_ms,
            error: None,
        }
    }

    pub(crate) fn failed(
        step_name: impl Into<String>,
        duration_ms: u64,
        error: impl Into<String>,
    ) -> Self {
        Self {
            step_name: step_name.into(),
            success: false,
            duration_ms,
            error: Some(error.into()),
        }
    }
}

/// Full record of one pipeline execution.
///
/// `success` is true iff every declared step executed and succeeded.
/// `final_context` is the cumulative merge of the initial context and every
/// executed step's returned fields; on failure it reflects the last
/// successful step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct PipelineReport {
    /// Name of the pipeline
    pipeline_name: String,
    /// Whether every step succeeded
    success: bool,
    /// Per-step outcomes in execution order
    results: Vec<StepReport>,
    /// Context after the last executed step
    final_context: StepContext,
}

impl PipelineReport {
    pub(crate) fn new(
        pipeline_name: String,
        success: bool,
        results: Vec<StepReport>,
        final_context: StepContext,
    ) -> Self {
        Self {
            pipeline_name,
            success,
            results,
            final_context,
        }
    }

    /// Converts the report into the final context or a step-failure error.
    ///
    /// Convenience for workflows that only care about the happy path and
    /// want `?` propagation; the full report remains the richer interface.
    pub fn into_result(self) -> GiottoResult<StepContext> {
        if self.success {
            return Ok(self.final_context);
        }
        let (step, message) = self
            .results
            .iter()
            .rev()
            .find(|report| !report.success)
            .map(|report| {
                (
                    report.step_name.clone(),
                    report
                        .error
                        .clone()
                        .unwrap_or_else(|| "step failed".to_string()),
                )
            })
            .unwrap_or_else(|| {
                (
                    "<unknown>".to_string(),
                    "pipeline failed without a failing step report".to_string(),
                )
            });
        Err(PipelineError::new(PipelineErrorKind::StepFailed { step, message }).into())
    }

    /// Consumes the report, returning the final context regardless of
    /// success.
    pub fn into_context(self) -> StepContext {
        self.final_context
    }
}
