//! Trait definitions for the Newsdesk coordinator's seams.
//!
//! The coordinator talks to two kinds of collaborators:
//! - the persistent store, through [`ContentRepository`] — the single source
//!   of truth and the correctness boundary for multi-worker coordination;
//! - external services (translator, image source, platform posters,
//!   notifier), each behind its own small trait.
//!
//! [`MemoryContentRepository`] implements the repository over a mutex-held
//! map for tests and local development.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod claim;
mod memory;
mod traits;

pub use claim::ClaimOutcome;
pub use memory::MemoryContentRepository;
pub use traits::{ContentRepository, ImageSource, Notification, Notifier, Poster, Translator};
