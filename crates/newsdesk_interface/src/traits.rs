//! Repository and collaborator trait definitions.

use crate::ClaimOutcome;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use newsdesk_core::{
    AuditEntry, ContentEdit, ContentItem, ContentStatus, ImageReference, NewContent, Platform,
    PostId, Translation,
};
use newsdesk_error::{
    ImageFetchError, NewsdeskResult, NotifyError, PostingError, TranslationError,
};
use std::collections::BTreeMap;

/// Persistent store for content items, audit entries, and scan state.
///
/// The store is the only shared mutable resource between worker processes;
/// every coordination property (exclusive claims, idempotent completion,
/// the catch-up guard) is expressed as a condition on it, never as an
/// in-memory lock. Implementations append audit entries alongside each
/// transition best-effort: an audit write failure is logged and never rolls
/// back the transition it describes.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a new item in `draft` and return it with its assigned id.
    async fn create(&self, new: NewContent) -> NewsdeskResult<ContentItem>;

    /// Fetch one item by id.
    async fn get(&self, id: i32) -> NewsdeskResult<ContentItem>;

    /// Items awaiting moderation, newest first.
    async fn get_pending(&self) -> NewsdeskResult<Vec<ContentItem>>;

    /// Recent items, optionally filtered by status, newest first.
    async fn list_recent(
        &self,
        status: Option<ContentStatus>,
        limit: i64,
    ) -> NewsdeskResult<Vec<ContentItem>>;

    /// Item counts keyed by status string.
    async fn status_counts(&self) -> NewsdeskResult<BTreeMap<String, i64>>;

    /// Drafts still waiting on the translator, oldest first.
    async fn drafts_needing_translation(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>>;

    /// Drafts without an image, oldest first.
    async fn items_missing_image(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>>;

    /// Drafts that pass the review-readiness gate, oldest first.
    async fn promotable_drafts(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>>;

    /// Record translator output on a draft.
    async fn store_translation(
        &self,
        id: i32,
        translation: Translation,
    ) -> NewsdeskResult<ContentItem>;

    /// Attach an image to a draft or pending item.
    async fn store_image(&self, id: i32, image: ImageReference) -> NewsdeskResult<ContentItem>;

    /// Draft → pending_approval, gated on readiness.
    async fn promote(&self, id: i32) -> NewsdeskResult<ContentItem>;

    /// Moderator approval; an empty platform list keeps the item's own.
    async fn approve(
        &self,
        id: i32,
        moderator: &str,
        platforms: Vec<Platform>,
    ) -> NewsdeskResult<ContentItem>;

    /// Moderator rejection with a reason.
    async fn reject(&self, id: i32, moderator: &str, reason: &str) -> NewsdeskResult<ContentItem>;

    /// Apply a moderator edit and append to the item's history.
    async fn edit(&self, id: i32, edit: ContentEdit, actor: &str) -> NewsdeskResult<ContentItem>;

    /// Oldest approved item still owing a post to `platform`, if any.
    async fn next_for_platform(&self, platform: Platform) -> NewsdeskResult<Option<ContentItem>>;

    /// Atomically take the exclusive posting claim for one platform.
    ///
    /// Non-blocking: when another worker holds the row, or the item is no
    /// longer eligible, the call returns [`ClaimOutcome::AlreadyClaimed`]
    /// immediately. On success the caller owns the item until it calls
    /// [`complete_posting`](Self::complete_posting) or
    /// [`fail_posting`](Self::fail_posting).
    async fn claim_for_posting(
        &self,
        id: i32,
        platform: Platform,
    ) -> NewsdeskResult<ClaimOutcome>;

    /// Record a successful external post. Idempotent: an id already
    /// recorded for the platform is kept and the call succeeds.
    async fn complete_posting(
        &self,
        id: i32,
        platform: Platform,
        post_id: PostId,
    ) -> NewsdeskResult<ContentItem>;

    /// Release a failed claim back to `approved` and audit the error.
    async fn fail_posting(
        &self,
        id: i32,
        platform: Platform,
        error: &str,
    ) -> NewsdeskResult<ContentItem>;

    /// Revert posting claims older than `cutoff` (crashed workers).
    /// Returns the ids that were reclaimed.
    async fn reclaim_stale(&self, cutoff: DateTime<Utc>) -> NewsdeskResult<Vec<i32>>;

    /// Delete rejected items older than `cutoff`. Returns how many.
    async fn delete_rejected_before(&self, cutoff: DateTime<Utc>) -> NewsdeskResult<usize>;

    /// Audit entries for one item, oldest first.
    async fn audit_trail(&self, content_id: i32) -> NewsdeskResult<Vec<AuditEntry>>;

    /// When the last successful posting scan ran for `platform`.
    async fn last_scan_success(&self, platform: Platform)
    -> NewsdeskResult<Option<DateTime<Utc>>>;

    /// Record a successful posting scan for `platform`.
    async fn record_scan_success(
        &self,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> NewsdeskResult<()>;

    /// Claim the right to run a catch-up scan for `platform`.
    ///
    /// Succeeds for at most one caller when several evaluate the same
    /// overdue window concurrently: the claim is a single conditional
    /// update on the persisted scan state, checked against `threshold`.
    async fn try_claim_catchup(
        &self,
        platform: Platform,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> NewsdeskResult<bool>;
}

/// External translation service.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate an item's title and body into the publication language.
    async fn translate(&self, item: &ContentItem) -> Result<Translation, TranslationError>;
}

/// External image sourcing or generation service.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Find or generate an image for the item.
    async fn fetch_image(&self, item: &ContentItem) -> Result<ImageReference, ImageFetchError>;
}

/// Publisher for one platform.
///
/// Must be called at most once per successful completion; the coordinator,
/// not the poster, enforces that through the claim and the recorded post id.
#[async_trait]
pub trait Poster: Send + Sync {
    /// Which platform this poster publishes to.
    fn platform(&self) -> Platform;

    /// Publish the item and return the platform-assigned post id.
    async fn post(&self, item: &ContentItem) -> Result<PostId, PostingError>;
}

/// Event pushed to moderators, fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// An item reached `pending_approval` and wants review.
    ApprovalRequested {
        /// The item to review
        content_id: i32,
        /// Publication headline, when available
        title: Option<String>,
    },
    /// A moderator approved an item.
    Approved {
        /// The approved item
        content_id: i32,
        /// Who approved it
        moderator: String,
    },
    /// An item was published to a platform.
    Posted {
        /// The published item
        content_id: i32,
        /// Where it was published
        platform: Platform,
        /// The platform-assigned id
        post_id: PostId,
    },
    /// Publishing failed; the item is back in `approved`.
    PostFailed {
        /// The item that failed
        content_id: i32,
        /// Where publishing failed
        platform: Platform,
        /// What the poster reported
        error: String,
    },
}

/// Push channel to moderators (the original deployment used Telegram).
///
/// Failures are logged by callers and never propagate into the pipeline.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}
