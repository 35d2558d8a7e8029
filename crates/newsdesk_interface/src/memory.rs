//! In-memory implementation of [`ContentRepository`] for tests and local
//! development.
//!
//! A single mutex guards the whole store, so every operation is atomic with
//! respect to every other; that gives the same claim and catch-up semantics
//! the Postgres implementation gets from row locking and conditional
//! updates. All data is lost when the repository is dropped.

use crate::{ClaimOutcome, ContentRepository};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use newsdesk_core::{
    AuditAction, AuditEntry, ContentEdit, ContentItem, ContentStatus, ImageReference, NewContent,
    Platform, PostId, Translation,
};
use newsdesk_error::{NewsdeskResult, PipelineError};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default, Clone)]
struct ScanState {
    last_success: Option<DateTime<Utc>>,
    catchup_claimed: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    items: HashMap<i32, ContentItem>,
    next_id: i32,
    audit: Vec<AuditEntry>,
    next_audit_id: i64,
    scans: HashMap<Platform, ScanState>,
}

impl MemoryState {
    fn item_mut(&mut self, id: i32) -> Result<&mut ContentItem, PipelineError> {
        self.items.get_mut(&id).ok_or(PipelineError::not_found(id))
    }

    fn push_audit(
        &mut self,
        content_id: i32,
        action: AuditAction,
        actor: &str,
        details: Option<String>,
    ) {
        self.next_audit_id += 1;
        self.audit.push(AuditEntry {
            id: self.next_audit_id,
            content_id,
            action,
            actor: actor.to_string(),
            details,
            created_at: Utc::now(),
        });
    }

    fn sorted_oldest_first(
        &self,
        limit: i64,
        mut predicate: impl FnMut(&ContentItem) -> bool,
    ) -> Vec<ContentItem> {
        let mut items: Vec<ContentItem> = self
            .items
            .values()
            .filter(|item| predicate(item))
            .cloned()
            .collect();
        items.sort_by_key(|item| (item.created_at, item.id));
        items.truncate(limit as usize);
        items
    }
}

/// HashMap-backed content repository behind a single async mutex.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryContentRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items (for tests).
    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    /// True when no items are stored (for tests).
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.items.is_empty()
    }
}

#[async_trait]
impl ContentRepository for MemoryContentRepository {
    async fn create(&self, new: NewContent) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let item = ContentItem::from_new(state.next_id, new, Utc::now());
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get(&self, id: i32) -> NewsdeskResult<ContentItem> {
        let state = self.state.lock().await;
        state
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| PipelineError::not_found(id).into())
    }

    async fn get_pending(&self) -> NewsdeskResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        let mut items: Vec<ContentItem> = state
            .items
            .values()
            .filter(|item| item.status == ContentStatus::PendingApproval)
            .cloned()
            .collect();
        items.sort_by_key(|item| std::cmp::Reverse((item.created_at, item.id)));
        Ok(items)
    }

    async fn list_recent(
        &self,
        status: Option<ContentStatus>,
        limit: i64,
    ) -> NewsdeskResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        let mut items: Vec<ContentItem> = state
            .items
            .values()
            .filter(|item| status.is_none_or(|s| item.status == s))
            .cloned()
            .collect();
        items.sort_by_key(|item| std::cmp::Reverse((item.created_at, item.id)));
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn status_counts(&self) -> NewsdeskResult<BTreeMap<String, i64>> {
        let state = self.state.lock().await;
        let mut counts = BTreeMap::new();
        for item in state.items.values() {
            *counts.entry(item.status.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn drafts_needing_translation(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state.sorted_oldest_first(limit, |item| {
            item.status == ContentStatus::Draft
                && item.needs_translation
                && item.translated_text.is_none()
        }))
    }

    async fn items_missing_image(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state.sorted_oldest_first(limit, |item| {
            item.status == ContentStatus::Draft && item.image.is_none()
        }))
    }

    async fn promotable_drafts(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state.sorted_oldest_first(limit, |item| {
            item.status == ContentStatus::Draft && item.ready_for_review()
        }))
    }

    async fn store_translation(
        &self,
        id: i32,
        translation: Translation,
    ) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.store_translation(translation)?;
        Ok(item.clone())
    }

    async fn store_image(&self, id: i32, image: ImageReference) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.store_image(image)?;
        Ok(item.clone())
    }

    async fn promote(&self, id: i32) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.promote()?;
        Ok(item.clone())
    }

    async fn approve(
        &self,
        id: i32,
        moderator: &str,
        platforms: Vec<Platform>,
    ) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.approve(moderator, platforms, Utc::now())?;
        let item = item.clone();
        let details = serde_json::json!({ "platforms": item.platforms }).to_string();
        state.push_audit(id, AuditAction::Approved, moderator, Some(details));
        Ok(item)
    }

    async fn reject(&self, id: i32, moderator: &str, reason: &str) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.reject(moderator, reason, Utc::now())?;
        let item = item.clone();
        state.push_audit(
            id,
            AuditAction::Rejected,
            moderator,
            Some(reason.to_string()),
        );
        Ok(item)
    }

    async fn edit(&self, id: i32, edit: ContentEdit, actor: &str) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        let record = item.apply_edit(edit, Utc::now())?;
        let item = item.clone();
        state.push_audit(
            id,
            AuditAction::Edited,
            actor,
            Some(record.changes.to_string()),
        );
        Ok(item)
    }

    async fn next_for_platform(&self, platform: Platform) -> NewsdeskResult<Option<ContentItem>> {
        let state = self.state.lock().await;
        Ok(state
            .sorted_oldest_first(1, |item| item.claimable_for(platform))
            .into_iter()
            .next())
    }

    async fn claim_for_posting(&self, id: i32, platform: Platform) -> NewsdeskResult<ClaimOutcome> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        if !item.claimable_for(platform) {
            return Ok(ClaimOutcome::AlreadyClaimed);
        }
        item.begin_posting(platform, Utc::now())?;
        Ok(ClaimOutcome::Claimed(Box::new(item.clone())))
    }

    async fn complete_posting(
        &self,
        id: i32,
        platform: Platform,
        post_id: PostId,
    ) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        // Idempotent replay: the post already landed and the claim already
        // resolved, so there is nothing left to record.
        if item.external_posts.contains_key(&platform)
            && item.status != ContentStatus::Posting(platform)
        {
            return Ok(item.clone());
        }
        item.complete_posting(platform, post_id.clone(), Utc::now())?;
        let item = item.clone();
        let details = serde_json::json!({
            "platform": platform,
            "post_id": post_id,
        })
        .to_string();
        state.push_audit(id, AuditAction::Posted, "scheduler", Some(details));
        Ok(item)
    }

    async fn fail_posting(
        &self,
        id: i32,
        platform: Platform,
        error: &str,
    ) -> NewsdeskResult<ContentItem> {
        let mut state = self.state.lock().await;
        let item = state.item_mut(id)?;
        item.fail_posting(platform)?;
        let item = item.clone();
        let details = serde_json::json!({
            "platform": platform,
            "error": error,
        })
        .to_string();
        state.push_audit(id, AuditAction::PostFailed, "scheduler", Some(details));
        Ok(item)
    }

    async fn reclaim_stale(&self, cutoff: DateTime<Utc>) -> NewsdeskResult<Vec<i32>> {
        let mut state = self.state.lock().await;
        let stale: Vec<i32> = state
            .items
            .values()
            .filter(|item| {
                matches!(item.status, ContentStatus::Posting(_))
                    && item.claimed_at.is_some_and(|at| at < cutoff)
            })
            .map(|item| item.id)
            .collect();
        for id in &stale {
            let item = state.item_mut(*id)?;
            let platform = item.reclaim()?;
            let details = serde_json::json!({ "platform": platform }).to_string();
            state.push_audit(*id, AuditAction::Reclaimed, "scheduler", Some(details));
        }
        Ok(stale)
    }

    async fn delete_rejected_before(&self, cutoff: DateTime<Utc>) -> NewsdeskResult<usize> {
        let mut state = self.state.lock().await;
        let before = state.items.len();
        state.items.retain(|_, item| {
            item.status != ContentStatus::Rejected || item.created_at >= cutoff
        });
        Ok(before - state.items.len())
    }

    async fn audit_trail(&self, content_id: i32) -> NewsdeskResult<Vec<AuditEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .audit
            .iter()
            .filter(|entry| entry.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn last_scan_success(
        &self,
        platform: Platform,
    ) -> NewsdeskResult<Option<DateTime<Utc>>> {
        let state = self.state.lock().await;
        Ok(state.scans.get(&platform).and_then(|scan| scan.last_success))
    }

    async fn record_scan_success(
        &self,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> NewsdeskResult<()> {
        let mut state = self.state.lock().await;
        state.scans.entry(platform).or_default().last_success = Some(at);
        Ok(())
    }

    async fn try_claim_catchup(
        &self,
        platform: Platform,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> NewsdeskResult<bool> {
        let mut state = self.state.lock().await;
        let scan = state.scans.entry(platform).or_default();
        let cutoff = now - threshold;
        let overdue = scan.last_success.is_none_or(|at| at < cutoff);
        let unclaimed = scan.catchup_claimed.is_none_or(|at| at < cutoff);
        if overdue && unclaimed {
            scan.catchup_claimed = Some(now);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
