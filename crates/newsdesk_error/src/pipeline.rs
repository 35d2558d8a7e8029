//! Pipeline error types for content lifecycle transitions.

/// Pipeline error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Requested transition is not legal from the current status
    #[display("Invalid transition: cannot {} from status '{}'", action, status)]
    InvalidTransition {
        /// Status the item was in when the transition was requested
        status: String,
        /// Action that was requested
        action: String,
    },
    /// Content item does not exist
    #[display("Content {} not found", _0)]
    ContentNotFound(i32),
    /// Platform is not targeted by the item
    #[display("Content {} does not target platform '{}'", content_id, platform)]
    PlatformNotTargeted {
        /// Content item in question
        content_id: i32,
        /// Platform that was requested
        platform: String,
    },
    /// Unrecognized status or platform string from storage
    #[display("Unrecognized {} value '{}'", field, value)]
    UnrecognizedValue {
        /// Field that failed to parse
        field: &'static str,
        /// The offending value
        value: String,
    },
}

/// Pipeline error with source location tracking.
///
/// # Examples
///
/// ```
/// use newsdesk_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::InvalidTransition {
///     status: "rejected".to_string(),
///     action: "approve".to_string(),
/// });
/// assert!(format!("{}", err).contains("Invalid transition"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
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

    /// Shorthand for an [`PipelineErrorKind::InvalidTransition`] error.
    #[track_caller]
    pub fn invalid_transition(status: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::InvalidTransition {
            status: status.into(),
            action: action.into(),
        })
    }

    /// Shorthand for a [`PipelineErrorKind::ContentNotFound`] error.
    #[track_caller]
    pub fn not_found(content_id: i32) -> Self {
        Self::new(PipelineErrorKind::ContentNotFound(content_id))
    }

    /// True when the error reports an illegal transition.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::InvalidTransition { .. })
    }
}
