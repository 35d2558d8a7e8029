//! Error types for the Newsdesk content pipeline.
//!
//! This crate provides the foundation error types used throughout the
//! Newsdesk workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use newsdesk_error::{NewsdeskResult, TranslationError};
//!
//! fn translate() -> NewsdeskResult<String> {
//!     Err(TranslationError::new("API quota exhausted"))?
//! }
//!
//! match translate() {
//!     Ok(text) => println!("Got: {}", text),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborator;
mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod pipeline;

pub use collaborator::{ImageFetchError, NotifyError, PostingError, TranslationError};
pub use config::{ConfigError, ConfigErrorKind};
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{NewsdeskError, NewsdeskErrorKind, NewsdeskResult};
pub use pipeline::{PipelineError, PipelineErrorKind};
