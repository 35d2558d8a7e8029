//! Append-only audit records for lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a moderator or automated actor did to an item.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Moderator approved the item
    Approved,
    /// Moderator rejected the item
    Rejected,
    /// Moderator edited item fields
    Edited,
    /// External post succeeded
    Posted,
    /// External post failed; item returned to approved
    PostFailed,
    /// Stale posting claim reverted by the maintenance pass
    Reclaimed,
}

/// One audit log entry.
///
/// Entries are written alongside every transition, never mutated or
/// deleted, and never consulted for control flow. A failed audit write is
/// logged and dropped rather than rolling back the transition it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Log entry id, assigned by storage
    pub id: i64,
    /// Item the action applied to
    pub content_id: i32,
    /// What happened
    pub action: AuditAction,
    /// Who did it: a moderator name, or "scheduler" for automated passes
    pub actor: String,
    /// Free-form context: rejection reason, error message, edit summary
    pub details: Option<String>,
    /// When the action happened
    pub created_at: DateTime<Utc>,
}
