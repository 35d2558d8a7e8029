//! PostgreSQL persistence for the Newsdesk content pipeline.
//!
//! Implements [`newsdesk_interface::ContentRepository`] over diesel with an
//! r2d2 connection pool. The posting claim is an exclusive row lock
//! (`FOR UPDATE SKIP LOCKED`) plus a status compare, the per-platform post
//! id is guarded by a unique index, and the catch-up claim is a single
//! conditional update. Blocking diesel calls run on the tokio blocking pool.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod models;
mod queries;
mod repository;
pub mod schema;

pub use connection::{connection_pool, database_url, run_migrations, PgPool};
pub use models::{ContentRow, NewContentRow, PlatformPostRow};
pub use repository::PgContentRepository;

/// Result type for database-level operations.
pub type DatabaseResult<T> = std::result::Result<T, newsdesk_error::DatabaseError>;
