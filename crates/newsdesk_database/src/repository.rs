//! Async [`ContentRepository`] over the connection pool.

use crate::{PgPool, queries};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use diesel::pg::PgConnection;
use newsdesk_core::{
    AuditEntry, ContentEdit, ContentItem, ContentStatus, ImageReference, NewContent, Platform,
    PostId, Translation,
};
use newsdesk_error::{DatabaseError, DatabaseErrorKind, NewsdeskResult};
use newsdesk_interface::{ClaimOutcome, ContentRepository};
use std::collections::BTreeMap;

/// PostgreSQL-backed content repository.
///
/// Diesel is synchronous, so every call checks a connection out of the r2d2
/// pool and runs on the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    /// Wrap a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<T, F>(&self, f: F) -> NewsdeskResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> NewsdeskResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(e.to_string())))?
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn create(&self, new: NewContent) -> NewsdeskResult<ContentItem> {
        self.run(move |conn| queries::create(conn, new)).await
    }

    async fn get(&self, id: i32) -> NewsdeskResult<ContentItem> {
        self.run(move |conn| queries::get(conn, id)).await
    }

    async fn get_pending(&self) -> NewsdeskResult<Vec<ContentItem>> {
        self.run(queries::get_pending).await
    }

    async fn list_recent(
        &self,
        status: Option<ContentStatus>,
        limit: i64,
    ) -> NewsdeskResult<Vec<ContentItem>> {
        self.run(move |conn| queries::list_recent(conn, status, limit))
            .await
    }

    async fn status_counts(&self) -> NewsdeskResult<BTreeMap<String, i64>> {
        self.run(queries::status_counts).await
    }

    async fn drafts_needing_translation(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
        self.run(move |conn| queries::drafts_needing_translation(conn, limit))
            .await
    }

    async fn items_missing_image(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
        self.run(move |conn| queries::items_missing_image(conn, limit))
            .await
    }

    async fn promotable_drafts(&self, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
        self.run(move |conn| queries::promotable_drafts(conn, limit))
            .await
    }

    async fn store_translation(
        &self,
        id: i32,
        translation: Translation,
    ) -> NewsdeskResult<ContentItem> {
        self.run(move |conn| queries::store_translation(conn, id, translation))
            .await
    }

    async fn store_image(&self, id: i32, image: ImageReference) -> NewsdeskResult<ContentItem> {
        self.run(move |conn| queries::store_image(conn, id, image))
            .await
    }

    async fn promote(&self, id: i32) -> NewsdeskResult<ContentItem> {
        self.run(move |conn| queries::promote(conn, id)).await
    }

    async fn approve(
        &self,
        id: i32,
        moderator: &str,
        platforms: Vec<Platform>,
    ) -> NewsdeskResult<ContentItem> {
        let moderator = moderator.to_string();
        self.run(move |conn| queries::approve(conn, id, &moderator, platforms))
            .await
    }

    async fn reject(&self, id: i32, moderator: &str, reason: &str) -> NewsdeskResult<ContentItem> {
        let moderator = moderator.to_string();
        let reason = reason.to_string();
        self.run(move |conn| queries::reject(conn, id, &moderator, &reason))
            .await
    }

    async fn edit(&self, id: i32, edit: ContentEdit, actor: &str) -> NewsdeskResult<ContentItem> {
        let actor = actor.to_string();
        self.run(move |conn| queries::edit(conn, id, edit, &actor))
            .await
    }

    async fn next_for_platform(&self, platform: Platform) -> NewsdeskResult<Option<ContentItem>> {
        self.run(move |conn| queries::next_for_platform(conn, platform))
            .await
    }

    async fn claim_for_posting(&self, id: i32, platform: Platform) -> NewsdeskResult<ClaimOutcome> {
        self.run(move |conn| queries::claim_for_posting(conn, id, platform))
            .await
    }

    async fn complete_posting(
        &self,
        id: i32,
        platform: Platform,
        post_id: PostId,
    ) -> NewsdeskResult<ContentItem> {
        self.run(move |conn| queries::complete_posting(conn, id, platform, post_id))
            .await
    }

    async fn fail_posting(
        &self,
        id: i32,
        platform: Platform,
        error: &str,
    ) -> NewsdeskResult<ContentItem> {
        let error = error.to_string();
        self.run(move |conn| queries::fail_posting(conn, id, platform, &error))
            .await
    }

    async fn reclaim_stale(&self, cutoff: DateTime<Utc>) -> NewsdeskResult<Vec<i32>> {
        self.run(move |conn| queries::reclaim_stale(conn, cutoff))
            .await
    }

    async fn delete_rejected_before(&self, cutoff: DateTime<Utc>) -> NewsdeskResult<usize> {
        self.run(move |conn| queries::delete_rejected_before(conn, cutoff))
            .await
    }

    async fn audit_trail(&self, content_id: i32) -> NewsdeskResult<Vec<AuditEntry>> {
        self.run(move |conn| queries::audit_trail(conn, content_id))
            .await
    }

    async fn last_scan_success(
        &self,
        platform: Platform,
    ) -> NewsdeskResult<Option<DateTime<Utc>>> {
        self.run(move |conn| queries::last_scan_success(conn, platform))
            .await
    }

    async fn record_scan_success(
        &self,
        platform: Platform,
        at: DateTime<Utc>,
    ) -> NewsdeskResult<()> {
        self.run(move |conn| queries::record_scan_success(conn, platform, at))
            .await
    }

    async fn try_claim_catchup(
        &self,
        platform: Platform,
        now: DateTime<Utc>,
        threshold: Duration,
    ) -> NewsdeskResult<bool> {
        self.run(move |conn| queries::try_claim_catchup(conn, platform, now, threshold))
            .await
    }
}
