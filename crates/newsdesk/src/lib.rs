//! Newsdesk - content lifecycle coordinator.
//!
//! Newsdesk moves scraped articles through a moderated publishing pipeline:
//! draft → pending_approval → approved → posting → posted, with rejection as
//! the other terminal state. Workers coordinate exclusively through the
//! repository, so claims stay exclusive and completions idempotent across
//! any number of processes.
//!
//! # Architecture
//!
//! The workspace is organized as focused crates:
//!
//! - `newsdesk_core` - the content item, status machine, and audit types
//! - `newsdesk_error` - error types
//! - `newsdesk_interface` - repository and collaborator traits, plus the
//!   in-memory repository for tests
//! - `newsdesk_database` - PostgreSQL persistence over diesel
//! - `newsdesk_bot` - the coordinator runtime: scan, posting, maintenance,
//!   review
//!
//! This crate (`newsdesk`) re-exports everything and ships the CLI binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collaborators;

pub use newsdesk_bot::{
    CoordinatorConfig, CoordinatorServer, MaintenanceConfig, PipelineScan, PlatformSchedule,
    PostingPass, ReviewService, ScanConfig,
};
pub use newsdesk_core::{
    AuditAction, AuditEntry, ContentAction, ContentEdit, ContentItem, ContentStatus, EditRecord,
    ImageReference, NewContent, Platform, PostId, Translation,
};
pub use newsdesk_database::{PgContentRepository, connection_pool, run_migrations};
pub use newsdesk_error::{NewsdeskError, NewsdeskErrorKind, NewsdeskResult};
pub use newsdesk_interface::{
    ClaimOutcome, ContentRepository, ImageSource, MemoryContentRepository, Notification, Notifier,
    Poster, Translator,
};
