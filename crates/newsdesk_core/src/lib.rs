//! Core domain types for the Newsdesk content pipeline.
//!
//! This crate defines the content lifecycle state machine and the data
//! carried through it. Everything here is pure: no I/O, no clock reads, no
//! storage. Repositories and schedulers live in the sibling crates.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audit;
mod edit;
mod item;
mod platform;
mod status;

pub use audit::{AuditAction, AuditEntry};
pub use edit::{ContentEdit, EditRecord};
pub use item::{ContentItem, ImageReference, NewContent, Translation};
pub use platform::{Platform, PostId};
pub use status::{ContentAction, ContentStatus};
