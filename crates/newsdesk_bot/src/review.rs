//! Moderator-facing operations over the repository.

use newsdesk_core::{AuditEntry, ContentEdit, ContentItem, ContentStatus, Platform};
use newsdesk_error::NewsdeskResult;
use newsdesk_interface::{ContentRepository, Notification, Notifier};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Approval, rejection, edits, and the read views moderators use.
///
/// Thin layer over the repository: the state machine enforces legality, the
/// repository writes the audit trail, and this service adds the moderator
/// notifications (fire-and-forget, failures logged).
pub struct ReviewService {
    repository: Arc<dyn ContentRepository>,
    notifier: Arc<dyn Notifier>,
}

impl ReviewService {
    /// Wire the service to its repository and notifier.
    pub fn new(repository: Arc<dyn ContentRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Items awaiting moderation, newest first.
    pub async fn pending(&self) -> NewsdeskResult<Vec<ContentItem>> {
        self.repository.get_pending().await
    }

    /// One item by id.
    pub async fn show(&self, id: i32) -> NewsdeskResult<ContentItem> {
        self.repository.get(id).await
    }

    /// Recent items, optionally filtered by status.
    pub async fn history(
        &self,
        status: Option<ContentStatus>,
        limit: i64,
    ) -> NewsdeskResult<Vec<ContentItem>> {
        self.repository.list_recent(status, limit).await
    }

    /// Item counts per status.
    pub async fn stats(&self) -> NewsdeskResult<BTreeMap<String, i64>> {
        self.repository.status_counts().await
    }

    /// The audit trail for one item, oldest first.
    pub async fn trail(&self, id: i32) -> NewsdeskResult<Vec<AuditEntry>> {
        self.repository.audit_trail(id).await
    }

    /// Approve an item; an empty platform list keeps the item's own.
    pub async fn approve(
        &self,
        id: i32,
        moderator: &str,
        platforms: Vec<Platform>,
    ) -> NewsdeskResult<ContentItem> {
        let item = self.repository.approve(id, moderator, platforms).await?;
        let notification = Notification::Approved {
            content_id: item.id,
            moderator: moderator.to_string(),
        };
        if let Err(error) = self.notifier.notify(notification).await {
            warn!(content_id = item.id, %error, "approval notification failed");
        }
        Ok(item)
    }

    /// Reject an item with a reason.
    pub async fn reject(
        &self,
        id: i32,
        moderator: &str,
        reason: &str,
    ) -> NewsdeskResult<ContentItem> {
        self.repository.reject(id, moderator, reason).await
    }

    /// Apply a moderator edit; the change set lands in the item's history.
    pub async fn edit(
        &self,
        id: i32,
        edit: ContentEdit,
        moderator: &str,
    ) -> NewsdeskResult<ContentItem> {
        self.repository.edit(id, edit, moderator).await
    }
}
