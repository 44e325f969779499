//! Pipeline error types.

/// Specific error conditions for pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// A step action failed, aborting the remaining sequence
    #[display("Step '{}' failed: {}", step, message)]
    StepFailed {
        /// Name of the failing step
        step: String,
        /// Message from the underlying cause
        message: String,
    },
    /// A context value could not be serialized or deserialized
    #[display("Context value error: {}", _0)]
    ContextValue(String),
}

/// Pipeline error with source location tracking.
///
/// # Examples
///
/// ```
/// use giotto_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::StepFailed {
///     step: "generate".to_string(),
///     message: "model unavailable".to_string(),
/// });
/// assert!(format!("{}", err).contains("generate"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
