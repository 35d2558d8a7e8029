//! Row types bridging the diesel schema and the domain model.

use crate::schema::{approval_log, content_queue, platform_posts, scan_state};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use newsdesk_core::{
    AuditAction, AuditEntry, ContentItem, ContentStatus, EditRecord, ImageReference, NewContent,
    Platform, PostId,
};
use newsdesk_error::{DatabaseError, DatabaseErrorKind};
use std::collections::BTreeMap;
use std::str::FromStr;

/// One row of `content_queue`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = content_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContentRow {
    /// Item id
    pub id: i32,
    /// Lifecycle status as its string encoding
    pub status: String,
    /// Source name
    pub source: Option<String>,
    /// Source URL
    pub source_url: Option<String>,
    /// Original headline
    pub source_title: Option<String>,
    /// Original body
    pub original_text: Option<String>,
    /// Publication headline
    pub translated_title: Option<String>,
    /// Publication body
    pub translated_text: Option<String>,
    /// Image URL
    pub image_url: Option<String>,
    /// Image generation prompt
    pub image_prompt: Option<String>,
    /// Image attribution
    pub image_credit: Option<String>,
    /// Original language code
    pub language: String,
    /// Whether the translation step applies
    pub needs_translation: bool,
    /// Target platforms as lowercase strings
    pub platforms: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Review time
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer name
    pub reviewed_by: Option<String>,
    /// Publication time
    pub posted_at: Option<DateTime<Utc>>,
    /// Rejection reason
    pub rejection_reason: Option<String>,
    /// Edit history as JSON
    pub edit_history: Option<serde_json::Value>,
    /// When the current posting claim was taken
    pub claimed_at: Option<DateTime<Utc>>,
}

impl ContentRow {
    /// Reassemble the domain item from this row and its platform posts.
    pub fn into_item(self, posts: Vec<PlatformPostRow>) -> Result<ContentItem, DatabaseError> {
        let status = ContentStatus::from_str(&self.status)
            .map_err(|e| DatabaseError::new(DatabaseErrorKind::Serialization(e.to_string())))?;
        let platforms = self
            .platforms
            .iter()
            .map(|p| {
                Platform::from_str(p).map_err(|_| {
                    DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                        "unknown platform in row {}: {}",
                        self.id, p
                    )))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let image = self.image_url.map(|url| ImageReference {
            url,
            prompt: self.image_prompt,
            credit: self.image_credit,
        });
        let edit_history = match self.edit_history {
            Some(value) => serde_json::from_value::<Vec<EditRecord>>(value)?,
            None => Vec::new(),
        };
        let external_posts: BTreeMap<Platform, PostId> = posts
            .into_iter()
            .map(|post| {
                Platform::from_str(&post.platform)
                    .map(|platform| (platform, PostId::new(post.post_id)))
                    .map_err(|_| {
                        DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                            "unknown platform in post row {}: {}",
                            post.id, post.platform
                        )))
                    })
            })
            .collect::<Result<_, _>>()?;
        Ok(ContentItem {
            id: self.id,
            status,
            source: self.source,
            source_url: self.source_url,
            source_title: self.source_title,
            original_text: self.original_text,
            translated_title: self.translated_title,
            translated_text: self.translated_text,
            image,
            language: self.language,
            needs_translation: self.needs_translation,
            platforms,
            external_posts,
            created_at: self.created_at,
            reviewed_at: self.reviewed_at,
            reviewed_by: self.reviewed_by,
            posted_at: self.posted_at,
            rejection_reason: self.rejection_reason,
            edit_history,
            claimed_at: self.claimed_at,
        })
    }
}

/// Insertable row for a fresh draft.
#[derive(Debug, Insertable)]
#[diesel(table_name = content_queue)]
pub struct NewContentRow {
    /// Lifecycle status, always `draft` at insert
    pub status: String,
    /// Source name
    pub source: Option<String>,
    /// Source URL
    pub source_url: Option<String>,
    /// Original headline
    pub source_title: Option<String>,
    /// Original body
    pub original_text: Option<String>,
    /// Original language code
    pub language: String,
    /// Whether the translation step applies
    pub needs_translation: bool,
    /// Target platforms as lowercase strings
    pub platforms: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl NewContentRow {
    /// Build the insertable draft row.
    pub fn from_new(new: NewContent, now: DateTime<Utc>) -> Self {
        Self {
            status: ContentStatus::Draft.to_string(),
            source: new.source,
            source_url: new.source_url,
            source_title: new.source_title,
            original_text: new.original_text,
            language: new.language,
            needs_translation: new.needs_translation,
            platforms: new.platforms.iter().map(Platform::to_string).collect(),
            created_at: now,
        }
    }
}

/// Changeset writing an in-memory item back to its row.
///
/// Covers every field the lifecycle operations mutate; immutable fields
/// (id, source, created_at) are left out.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = content_queue)]
#[diesel(treat_none_as_null = true)]
pub struct ContentChanges {
    /// Lifecycle status as its string encoding
    pub status: String,
    /// Publication headline
    pub translated_title: Option<String>,
    /// Publication body
    pub translated_text: Option<String>,
    /// Image URL
    pub image_url: Option<String>,
    /// Image generation prompt
    pub image_prompt: Option<String>,
    /// Image attribution
    pub image_credit: Option<String>,
    /// Target platforms as lowercase strings
    pub platforms: Vec<String>,
    /// Review time
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer name
    pub reviewed_by: Option<String>,
    /// Publication time
    pub posted_at: Option<DateTime<Utc>>,
    /// Rejection reason
    pub rejection_reason: Option<String>,
    /// Edit history as JSON
    pub edit_history: Option<serde_json::Value>,
    /// When the current posting claim was taken
    pub claimed_at: Option<DateTime<Utc>>,
}

impl ContentChanges {
    /// Capture the mutable fields of `item`.
    pub fn from_item(item: &ContentItem) -> Result<Self, DatabaseError> {
        let edit_history = if item.edit_history.is_empty() {
            None
        } else {
            Some(serde_json::to_value(&item.edit_history)?)
        };
        Ok(Self {
            status: item.status.to_string(),
            translated_title: item.translated_title.clone(),
            translated_text: item.translated_text.clone(),
            image_url: item.image.as_ref().map(|i| i.url.clone()),
            image_prompt: item.image.as_ref().and_then(|i| i.prompt.clone()),
            image_credit: item.image.as_ref().and_then(|i| i.credit.clone()),
            platforms: item.platforms.iter().map(Platform::to_string).collect(),
            reviewed_at: item.reviewed_at,
            reviewed_by: item.reviewed_by.clone(),
            posted_at: item.posted_at,
            rejection_reason: item.rejection_reason.clone(),
            edit_history,
            claimed_at: item.claimed_at,
        })
    }
}

/// One row of `platform_posts`.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = platform_posts)]
#[diesel(belongs_to(ContentRow, foreign_key = content_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlatformPostRow {
    /// Row id
    pub id: i32,
    /// Item the post belongs to
    pub content_id: i32,
    /// Platform as its lowercase string
    pub platform: String,
    /// Platform-assigned post id
    pub post_id: String,
    /// When the post was recorded
    pub posted_at: DateTime<Utc>,
}

/// Insertable platform post record.
#[derive(Debug, Insertable)]
#[diesel(table_name = platform_posts)]
pub struct NewPlatformPostRow {
    /// Item the post belongs to
    pub content_id: i32,
    /// Platform as its lowercase string
    pub platform: String,
    /// Platform-assigned post id
    pub post_id: String,
    /// When the post was recorded
    pub posted_at: DateTime<Utc>,
}

/// One row of `approval_log`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = approval_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ApprovalLogRow {
    /// Log entry id
    pub id: i64,
    /// Item the action applied to
    pub content_id: i32,
    /// Action as its snake_case string
    pub action: String,
    /// Who did it
    pub actor: String,
    /// Free-form context
    pub details: Option<String>,
    /// When the action happened
    pub created_at: DateTime<Utc>,
}

impl ApprovalLogRow {
    /// Convert to the domain audit entry.
    pub fn into_entry(self) -> Result<AuditEntry, DatabaseError> {
        let action = AuditAction::from_str(&self.action).map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::Serialization(format!(
                "unknown audit action in row {}: {}",
                self.id, self.action
            )))
        })?;
        Ok(AuditEntry {
            id: self.id,
            content_id: self.content_id,
            action,
            actor: self.actor,
            details: self.details,
            created_at: self.created_at,
        })
    }
}

/// Insertable audit entry.
#[derive(Debug, Insertable)]
#[diesel(table_name = approval_log)]
pub struct NewApprovalLogRow {
    /// Item the action applied to
    pub content_id: i32,
    /// Action as its snake_case string
    pub action: String,
    /// Who did it
    pub actor: String,
    /// Free-form context
    pub details: Option<String>,
    /// When the action happened
    pub created_at: DateTime<Utc>,
}

/// One row of `scan_state`, keyed by platform.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = scan_state)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ScanStateRow {
    /// Platform as its lowercase string
    pub platform: String,
    /// Last successful posting scan
    pub last_scan_success_at: Option<DateTime<Utc>>,
    /// When a catch-up claim was last granted
    pub catchup_claimed_at: Option<DateTime<Utc>>,
}
