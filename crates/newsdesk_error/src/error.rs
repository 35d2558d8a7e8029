//! Top-level error wrapper types.

#[cfg(feature = "database")]
use crate::DatabaseError;
use crate::{
    ConfigError, ImageFetchError, NotifyError, PipelineError, PostingError, TranslationError,
};

/// Discriminated union over all Newsdesk error families.
///
/// # Examples
///
/// ```
/// use newsdesk_error::{NewsdeskError, PipelineError};
///
/// let pipe_err = PipelineError::not_found(42);
/// let err: NewsdeskError = pipe_err.into();
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum NewsdeskErrorKind {
    /// Content lifecycle error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// External translator failure
    #[from(TranslationError)]
    Translation(TranslationError),
    /// External image source failure
    #[from(ImageFetchError)]
    ImageFetch(ImageFetchError),
    /// External poster failure
    #[from(PostingError)]
    Posting(PostingError),
    /// Notifier failure
    #[from(NotifyError)]
    Notify(NotifyError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Newsdesk error with kind discrimination.
///
/// # Examples
///
/// ```
/// use newsdesk_error::{NewsdeskResult, ConfigError};
///
/// fn might_fail() -> NewsdeskResult<()> {
///     Err(ConfigError::parse("missing field `platforms`"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Newsdesk Error: {}", _0)]
pub struct NewsdeskError(Box<NewsdeskErrorKind>);

impl NewsdeskError {
    /// Create a new error from a kind.
    pub fn new(kind: NewsdeskErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &NewsdeskErrorKind {
        &self.0
    }

    /// True when the underlying error is an illegal lifecycle transition.
    ///
    /// Callers surfacing errors to moderators use this to distinguish a
    /// user-correctable request from an infrastructure failure.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self.kind(), NewsdeskErrorKind::Pipeline(e) if e.is_invalid_transition())
    }
}

// Generic From implementation for any type that converts to NewsdeskErrorKind
impl<T> From<T> for NewsdeskError
where
    T: Into<NewsdeskErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Newsdesk operations.
pub type NewsdeskResult<T> = std::result::Result<T, NewsdeskError>;
