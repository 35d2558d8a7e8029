//! Configuration error types.

/// Configuration error conditions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Config file could not be read
    #[display("Failed to read config file: {}", _0)]
    Read(String),
    /// Config file was not valid TOML
    #[display("Failed to parse config: {}", _0)]
    Parse(String),
    /// Cron expression did not parse
    #[display(
        "Invalid cron expression '{}' for '{}': {}",
        expression,
        platform,
        message
    )]
    InvalidSchedule {
        /// Platform the schedule was written for
        platform: String,
        /// The offending cron expression
        expression: String,
        /// Parser diagnostic
        message: String,
    },
    /// Two posting schedules name the same platform
    #[display("Duplicate posting schedule for '{}'", _0)]
    DuplicatePlatform(String),
}

/// Configuration error with source location tracking.
///
/// # Examples
///
/// ```
/// use newsdesk_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::duplicate_platform("facebook");
/// assert!(matches!(err.kind, ConfigErrorKind::DuplicatePlatform(_)));
/// assert!(format!("{}", err).contains("Duplicate posting schedule"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a [`ConfigErrorKind::Read`] error.
    #[track_caller]
    pub fn read(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Read(message.into()))
    }

    /// Shorthand for a [`ConfigErrorKind::Parse`] error.
    #[track_caller]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::Parse(message.into()))
    }

    /// Shorthand for a [`ConfigErrorKind::InvalidSchedule`] error.
    #[track_caller]
    pub fn invalid_schedule(
        platform: impl Into<String>,
        expression: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ConfigErrorKind::InvalidSchedule {
            platform: platform.into(),
            expression: expression.into(),
            message: message.into(),
        })
    }

    /// Shorthand for a [`ConfigErrorKind::DuplicatePlatform`] error.
    #[track_caller]
    pub fn duplicate_platform(platform: impl Into<String>) -> Self {
        Self::new(ConfigErrorKind::DuplicatePlatform(platform.into()))
    }
}
