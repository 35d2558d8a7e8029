//! Synchronous diesel queries behind [`crate::PgContentRepository`].
//!
//! Lifecycle writes lock the target row (`FOR UPDATE`), rebuild the domain
//! item, apply the transition through its methods, and write the result
//! back, so the legality table lives in one place. The posting claim adds
//! `SKIP LOCKED` so contending workers return instead of queueing. Audit
//! entries are appended after the transaction commits; a failed append is
//! logged and dropped.

use crate::models::{
    ApprovalLogRow, ContentChanges, ContentRow, NewApprovalLogRow, NewContentRow,
    NewPlatformPostRow, PlatformPostRow, ScanStateRow,
};
use crate::schema::{approval_log, content_queue, platform_posts, scan_state};
use chrono::{DateTime, Duration, Utc};
use diesel::dsl::count_star;
use diesel::prelude::*;
use newsdesk_core::{
    AuditAction, AuditEntry, ContentEdit, ContentItem, ContentStatus, ImageReference, NewContent,
    Platform, PostId, Translation,
};
use newsdesk_error::{NewsdeskError, NewsdeskResult, PipelineError};
use newsdesk_interface::ClaimOutcome;
use tracing::warn;

fn draft() -> String {
    ContentStatus::Draft.to_string()
}

fn posts_for(conn: &mut PgConnection, id: i32) -> NewsdeskResult<Vec<PlatformPostRow>> {
    let posts = platform_posts::table
        .filter(platform_posts::content_id.eq(id))
        .select(PlatformPostRow::as_select())
        .load(conn)?;
    Ok(posts)
}

fn load_item(conn: &mut PgConnection, id: i32) -> NewsdeskResult<ContentItem> {
    let row: Option<ContentRow> = content_queue::table
        .find(id)
        .select(ContentRow::as_select())
        .first(conn)
        .optional()?;
    let row = row.ok_or(PipelineError::not_found(id))?;
    let posts = posts_for(conn, id)?;
    Ok(row.into_item(posts)?)
}

/// Lock one row for the duration of the surrounding transaction.
fn lock_item(conn: &mut PgConnection, id: i32) -> NewsdeskResult<ContentItem> {
    let row: Option<ContentRow> = content_queue::table
        .find(id)
        .select(ContentRow::as_select())
        .for_update()
        .first(conn)
        .optional()?;
    let row = row.ok_or(PipelineError::not_found(id))?;
    let posts = posts_for(conn, id)?;
    Ok(row.into_item(posts)?)
}

fn persist(conn: &mut PgConnection, item: &ContentItem) -> NewsdeskResult<()> {
    let changes = ContentChanges::from_item(item)?;
    diesel::update(content_queue::table.find(item.id))
        .set(changes)
        .execute(conn)?;
    Ok(())
}

fn rows_to_items(
    conn: &mut PgConnection,
    rows: Vec<ContentRow>,
) -> NewsdeskResult<Vec<ContentItem>> {
    let posts: Vec<PlatformPostRow> = PlatformPostRow::belonging_to(&rows)
        .select(PlatformPostRow::as_select())
        .load(conn)?;
    let grouped = posts.grouped_by(&rows);
    rows.into_iter()
        .zip(grouped)
        .map(|(row, posts)| row.into_item(posts).map_err(NewsdeskError::from))
        .collect()
}

fn append_audit(
    conn: &mut PgConnection,
    content_id: i32,
    action: AuditAction,
    actor: &str,
    details: Option<String>,
) {
    let entry = NewApprovalLogRow {
        content_id,
        action: action.to_string(),
        actor: actor.to_string(),
        details,
        created_at: Utc::now(),
    };
    let result = diesel::insert_into(approval_log::table)
        .values(&entry)
        .execute(conn);
    if let Err(error) = result {
        warn!(content_id, %action, %error, "audit append failed, entry dropped");
    }
}

pub fn create(conn: &mut PgConnection, new: NewContent) -> NewsdeskResult<ContentItem> {
    let row: ContentRow = diesel::insert_into(content_queue::table)
        .values(NewContentRow::from_new(new, Utc::now()))
        .returning(ContentRow::as_returning())
        .get_result(conn)?;
    Ok(row.into_item(Vec::new())?)
}

pub fn get(conn: &mut PgConnection, id: i32) -> NewsdeskResult<ContentItem> {
    load_item(conn, id)
}

pub fn get_pending(conn: &mut PgConnection) -> NewsdeskResult<Vec<ContentItem>> {
    let rows: Vec<ContentRow> = content_queue::table
        .filter(content_queue::status.eq(ContentStatus::PendingApproval.to_string()))
        .order((content_queue::created_at.desc(), content_queue::id.desc()))
        .select(ContentRow::as_select())
        .load(conn)?;
    rows_to_items(conn, rows)
}

pub fn list_recent(
    conn: &mut PgConnection,
    status: Option<ContentStatus>,
    limit: i64,
) -> NewsdeskResult<Vec<ContentItem>> {
    let mut query = content_queue::table.into_boxed();
    if let Some(status) = status {
        query = query.filter(content_queue::status.eq(status.to_string()));
    }
    let rows: Vec<ContentRow> = query
        .order((content_queue::created_at.desc(), content_queue::id.desc()))
        .limit(limit)
        .select(ContentRow::as_select())
        .load(conn)?;
    rows_to_items(conn, rows)
}

pub fn status_counts(
    conn: &mut PgConnection,
) -> NewsdeskResult<std::collections::BTreeMap<String, i64>> {
    let counts: Vec<(String, i64)> = content_queue::table
        .group_by(content_queue::status)
        .select((content_queue::status, count_star()))
        .load(conn)?;
    Ok(counts.into_iter().collect())
}

pub fn drafts_needing_translation(
    conn: &mut PgConnection,
    limit: i64,
) -> NewsdeskResult<Vec<ContentItem>> {
    let rows: Vec<ContentRow> = content_queue::table
        .filter(content_queue::status.eq(draft()))
        .filter(content_queue::needs_translation.eq(true))
        .filter(content_queue::translated_text.is_null())
        .order((content_queue::created_at.asc(), content_queue::id.asc()))
        .limit(limit)
        .select(ContentRow::as_select())
        .load(conn)?;
    rows_to_items(conn, rows)
}

pub fn items_missing_image(
    conn: &mut PgConnection,
    limit: i64,
) -> NewsdeskResult<Vec<ContentItem>> {
    let rows: Vec<ContentRow> = content_queue::table
        .filter(content_queue::status.eq(draft()))
        .filter(content_queue::image_url.is_null())
        .order((content_queue::created_at.asc(), content_queue::id.asc()))
        .limit(limit)
        .select(ContentRow::as_select())
        .load(conn)?;
    rows_to_items(conn, rows)
}

pub fn promotable_drafts(conn: &mut PgConnection, limit: i64) -> NewsdeskResult<Vec<ContentItem>> {
    let rows: Vec<ContentRow> = content_queue::table
        .filter(content_queue::status.eq(draft()))
        .filter(content_queue::image_url.is_not_null())
        .filter(
            content_queue::needs_translation
                .eq(false)
                .or(content_queue::translated_text.is_not_null()),
        )
        .order((content_queue::created_at.asc(), content_queue::id.asc()))
        .limit(limit)
        .select(ContentRow::as_select())
        .load(conn)?;
    rows_to_items(conn, rows)
}

pub fn store_translation(
    conn: &mut PgConnection,
    id: i32,
    translation: Translation,
) -> NewsdeskResult<ContentItem> {
    conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        item.store_translation(translation)?;
        persist(conn, &item)?;
        Ok(item)
    })
}

pub fn store_image(
    conn: &mut PgConnection,
    id: i32,
    image: ImageReference,
) -> NewsdeskResult<ContentItem> {
    conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        item.store_image(image)?;
        persist(conn, &item)?;
        Ok(item)
    })
}

pub fn promote(conn: &mut PgConnection, id: i32) -> NewsdeskResult<ContentItem> {
    conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        item.promote()?;
        persist(conn, &item)?;
        Ok(item)
    })
}

pub fn approve(
    conn: &mut PgConnection,
    id: i32,
    moderator: &str,
    platforms: Vec<Platform>,
) -> NewsdeskResult<ContentItem> {
    let item = conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        item.approve(moderator, platforms, Utc::now())?;
        persist(conn, &item)?;
        Ok::<_, NewsdeskError>(item)
    })?;
    let details = serde_json::json!({ "platforms": item.platforms }).to_string();
    append_audit(conn, id, AuditAction::Approved, moderator, Some(details));
    Ok(item)
}

pub fn reject(
    conn: &mut PgConnection,
    id: i32,
    moderator: &str,
    reason: &str,
) -> NewsdeskResult<ContentItem> {
    let item = conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        item.reject(moderator, reason, Utc::now())?;
        persist(conn, &item)?;
        Ok::<_, NewsdeskError>(item)
    })?;
    append_audit(
        conn,
        id,
        AuditAction::Rejected,
        moderator,
        Some(reason.to_string()),
    );
    Ok(item)
}

pub fn edit(
    conn: &mut PgConnection,
    id: i32,
    edit: ContentEdit,
    actor: &str,
) -> NewsdeskResult<ContentItem> {
    let (item, record) = conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        let record = item.apply_edit(edit, Utc::now())?;
        persist(conn, &item)?;
        Ok::<_, NewsdeskError>((item, record))
    })?;
    append_audit(
        conn,
        id,
        AuditAction::Edited,
        actor,
        Some(record.changes.to_string()),
    );
    Ok(item)
}

pub fn next_for_platform(
    conn: &mut PgConnection,
    platform: Platform,
) -> NewsdeskResult<Option<ContentItem>> {
    let already_posted = platform_posts::table
        .filter(platform_posts::platform.eq(platform.to_string()))
        .select(platform_posts::content_id);
    let row: Option<ContentRow> = content_queue::table
        .filter(content_queue::status.eq(ContentStatus::Approved.to_string()))
        .filter(content_queue::platforms.contains(vec![platform.to_string()]))
        .filter(content_queue::id.ne_all(already_posted))
        .order((content_queue::created_at.asc(), content_queue::id.asc()))
        .select(ContentRow::as_select())
        .first(conn)
        .optional()?;
    match row {
        Some(row) => {
            let posts = posts_for(conn, row.id)?;
            Ok(Some(row.into_item(posts)?))
        }
        None => Ok(None),
    }
}

/// Take the exclusive posting claim, without waiting on a contending worker.
///
/// `SKIP LOCKED` makes the contended case indistinguishable from a missing
/// row, so a plain existence check separates "someone else holds it" from
/// "no such item".
pub fn claim_for_posting(
    conn: &mut PgConnection,
    id: i32,
    platform: Platform,
) -> NewsdeskResult<ClaimOutcome> {
    conn.transaction(|conn| {
        let row: Option<ContentRow> = content_queue::table
            .find(id)
            .select(ContentRow::as_select())
            .for_update()
            .skip_locked()
            .first(conn)
            .optional()?;
        let row = match row {
            Some(row) => row,
            None => {
                let exists: Option<i32> = content_queue::table
                    .find(id)
                    .select(content_queue::id)
                    .first(conn)
                    .optional()?;
                return match exists {
                    Some(_) => Ok(ClaimOutcome::AlreadyClaimed),
                    None => Err(PipelineError::not_found(id).into()),
                };
            }
        };
        let posts = posts_for(conn, id)?;
        let mut item = row.into_item(posts)?;
        if !item.claimable_for(platform) {
            return Ok(ClaimOutcome::AlreadyClaimed);
        }
        item.begin_posting(platform, Utc::now())?;
        persist(conn, &item)?;
        Ok(ClaimOutcome::Claimed(Box::new(item)))
    })
}

pub fn complete_posting(
    conn: &mut PgConnection,
    id: i32,
    platform: Platform,
    post_id: PostId,
) -> NewsdeskResult<ContentItem> {
    let (item, newly_recorded) = conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        // Idempotent replay: the post already landed and the claim already
        // resolved, so there is nothing left to record.
        if item.external_posts.contains_key(&platform)
            && item.status != ContentStatus::Posting(platform)
        {
            return Ok::<_, NewsdeskError>((item, false));
        }
        let now = Utc::now();
        let newly_recorded = item.complete_posting(platform, post_id.clone(), now)?;
        // The unique index backstops the in-memory check under replays.
        diesel::insert_into(platform_posts::table)
            .values(NewPlatformPostRow {
                content_id: id,
                platform: platform.to_string(),
                post_id: post_id.0.clone(),
                posted_at: now,
            })
            .on_conflict((platform_posts::content_id, platform_posts::platform))
            .do_nothing()
            .execute(conn)?;
        persist(conn, &item)?;
        Ok((item, newly_recorded))
    })?;
    if newly_recorded {
        let details = serde_json::json!({
            "platform": platform,
            "post_id": item.external_posts.get(&platform),
        })
        .to_string();
        append_audit(conn, id, AuditAction::Posted, "scheduler", Some(details));
    }
    Ok(item)
}

pub fn fail_posting(
    conn: &mut PgConnection,
    id: i32,
    platform: Platform,
    error: &str,
) -> NewsdeskResult<ContentItem> {
    let item = conn.transaction(|conn| {
        let mut item = lock_item(conn, id)?;
        item.fail_posting(platform)?;
        persist(conn, &item)?;
        Ok::<_, NewsdeskError>(item)
    })?;
    let details = serde_json::json!({
        "platform": platform,
        "error": error,
    })
    .to_string();
    append_audit(conn, id, AuditAction::PostFailed, "scheduler", Some(details));
    Ok(item)
}

pub fn reclaim_stale(conn: &mut PgConnection, cutoff: DateTime<Utc>) -> NewsdeskResult<Vec<i32>> {
    let reclaimed = conn.transaction(|conn| {
        let rows: Vec<ContentRow> = content_queue::table
            .filter(content_queue::status.like("posting_%"))
            .filter(content_queue::claimed_at.lt(cutoff))
            .for_update()
            .skip_locked()
            .select(ContentRow::as_select())
            .load(conn)?;
        let mut reclaimed = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            let posts = posts_for(conn, id)?;
            let mut item = row.into_item(posts)?;
            let platform = item.reclaim()?;
            persist(conn, &item)?;
            reclaimed.push((id, platform));
        }
        Ok::<_, NewsdeskError>(reclaimed)
    })?;
    for (id, platform) in &reclaimed {
        let details = serde_json::json!({ "platform": platform }).to_string();
        append_audit(conn, *id, AuditAction::Reclaimed, "scheduler", Some(details));
    }
    Ok(reclaimed.into_iter().map(|(id, _)| id).collect())
}

pub fn delete_rejected_before(
    conn: &mut PgConnection,
    cutoff: DateTime<Utc>,
) -> NewsdeskResult<usize> {
    let deleted = diesel::delete(
        content_queue::table
            .filter(content_queue::status.eq(ContentStatus::Rejected.to_string()))
            .filter(content_queue::created_at.lt(cutoff)),
    )
    .execute(conn)?;
    Ok(deleted)
}

pub fn audit_trail(conn: &mut PgConnection, content_id: i32) -> NewsdeskResult<Vec<AuditEntry>> {
    let rows: Vec<ApprovalLogRow> = approval_log::table
        .filter(approval_log::content_id.eq(content_id))
        .order((approval_log::created_at.asc(), approval_log::id.asc()))
        .select(ApprovalLogRow::as_select())
        .load(conn)?;
    rows.into_iter()
        .map(|row| row.into_entry().map_err(NewsdeskError::from))
        .collect()
}

fn ensure_scan_row(conn: &mut PgConnection, platform: Platform) -> NewsdeskResult<()> {
    diesel::insert_into(scan_state::table)
        .values(ScanStateRow {
            platform: platform.to_string(),
            last_scan_success_at: None,
            catchup_claimed_at: None,
        })
        .on_conflict(scan_state::platform)
        .do_nothing()
        .execute(conn)?;
    Ok(())
}

pub fn last_scan_success(
    conn: &mut PgConnection,
    platform: Platform,
) -> NewsdeskResult<Option<DateTime<Utc>>> {
    let row: Option<ScanStateRow> = scan_state::table
        .find(platform.to_string())
        .select(ScanStateRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row.and_then(|row| row.last_scan_success_at))
}

pub fn record_scan_success(
    conn: &mut PgConnection,
    platform: Platform,
    at: DateTime<Utc>,
) -> NewsdeskResult<()> {
    diesel::insert_into(scan_state::table)
        .values(ScanStateRow {
            platform: platform.to_string(),
            last_scan_success_at: Some(at),
            catchup_claimed_at: None,
        })
        .on_conflict(scan_state::platform)
        .do_update()
        .set(scan_state::last_scan_success_at.eq(Some(at)))
        .execute(conn)?;
    Ok(())
}

/// One conditional update arbitrates concurrent catch-up attempts: only the
/// caller whose update matches the overdue-and-unclaimed row wins.
pub fn try_claim_catchup(
    conn: &mut PgConnection,
    platform: Platform,
    now: DateTime<Utc>,
    threshold: Duration,
) -> NewsdeskResult<bool> {
    ensure_scan_row(conn, platform)?;
    let cutoff = now - threshold;
    let updated = diesel::update(
        scan_state::table
            .filter(scan_state::platform.eq(platform.to_string()))
            .filter(
                scan_state::last_scan_success_at
                    .is_null()
                    .or(scan_state::last_scan_success_at.lt(cutoff)),
            )
            .filter(
                scan_state::catchup_claimed_at
                    .is_null()
                    .or(scan_state::catchup_claimed_at.lt(cutoff)),
            ),
    )
    .set(scan_state::catchup_claimed_at.eq(now))
    .execute(conn)?;
    Ok(updated == 1)
}
