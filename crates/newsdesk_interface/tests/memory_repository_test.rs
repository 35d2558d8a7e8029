//! Repository contract tests against the in-memory implementation.

use chrono::{Duration, Utc};
use newsdesk_core::{
    AuditAction, ContentStatus, ImageReference, NewContent, Platform, PostId, Translation,
};
use newsdesk_interface::{ClaimOutcome, ContentRepository, MemoryContentRepository};
use std::sync::Arc;

fn new_content(needs_translation: bool) -> NewContent {
    NewContent::builder()
        .source("Delo.ua")
        .source_title("Ринок рестораторів зростає")
        .original_text("Текст статті.")
        .language(if needs_translation { "en" } else { "uk" })
        .needs_translation(needs_translation)
        .platforms(vec![Platform::Facebook])
        .build()
}

fn image() -> ImageReference {
    ImageReference::builder()
        .url("https://images.example/cover.jpg")
        .build()
}

/// Drive an item to `approved` targeting the given platforms.
async fn approved_item(
    repo: &MemoryContentRepository,
    platforms: Vec<Platform>,
) -> newsdesk_core::ContentItem {
    let item = repo.create(new_content(false)).await.unwrap();
    repo.store_image(item.id, image()).await.unwrap();
    repo.promote(item.id).await.unwrap();
    repo.approve(item.id, "olena", platforms).await.unwrap()
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let repo = Arc::new(MemoryContentRepository::new());
    let item = approved_item(&repo, vec![Platform::Facebook]).await;

    let a = {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.claim_for_posting(item.id, Platform::Facebook).await })
    };
    let b = {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.claim_for_posting(item.id, Platform::Facebook).await })
    };

    let outcomes = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
    let winners = outcomes.iter().filter(|o| o.is_claimed()).count();
    assert_eq!(winners, 1);
    assert!(
        outcomes
            .iter()
            .any(|o| *o == ClaimOutcome::AlreadyClaimed)
    );
}

#[tokio::test]
async fn external_post_id_is_recorded_at_most_once() {
    let repo = MemoryContentRepository::new();
    let item = approved_item(&repo, vec![Platform::Facebook]).await;

    let claimed = repo
        .claim_for_posting(item.id, Platform::Facebook)
        .await
        .unwrap();
    assert!(claimed.is_claimed());

    let first = repo
        .complete_posting(item.id, Platform::Facebook, PostId::new("fb_1"))
        .await
        .unwrap();
    assert_eq!(first.status, ContentStatus::Posted);

    // A crashed-worker replay must succeed without touching the stored id.
    let replay = repo
        .complete_posting(item.id, Platform::Facebook, PostId::new("fb_2"))
        .await
        .unwrap();
    assert_eq!(
        replay.external_posts.get(&Platform::Facebook),
        Some(&PostId::new("fb_1"))
    );
}

#[tokio::test]
async fn failed_posting_returns_item_to_claimable() {
    let repo = MemoryContentRepository::new();
    let item = approved_item(&repo, vec![Platform::Facebook]).await;

    assert!(
        repo.claim_for_posting(item.id, Platform::Facebook)
            .await
            .unwrap()
            .is_claimed()
    );
    let failed = repo
        .fail_posting(item.id, Platform::Facebook, "token expired")
        .await
        .unwrap();
    assert_eq!(failed.status, ContentStatus::Approved);

    assert!(
        repo.claim_for_posting(item.id, Platform::Facebook)
            .await
            .unwrap()
            .is_claimed()
    );

    let trail = repo.audit_trail(item.id).await.unwrap();
    let failure = trail
        .iter()
        .find(|entry| entry.action == AuditAction::PostFailed)
        .unwrap();
    assert!(failure.details.as_deref().unwrap().contains("token expired"));
}

#[tokio::test]
async fn rejection_audits_and_blocks_later_approval() {
    let repo = MemoryContentRepository::new();
    let item = repo.create(new_content(false)).await.unwrap();
    repo.store_image(item.id, image()).await.unwrap();
    repo.promote(item.id).await.unwrap();

    let rejected = repo
        .reject(item.id, "olena", "low quality")
        .await
        .unwrap();
    assert_eq!(rejected.status, ContentStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("low quality"));

    let trail = repo.audit_trail(item.id).await.unwrap();
    assert!(trail.iter().any(|entry| {
        entry.action == AuditAction::Rejected && entry.details.as_deref() == Some("low quality")
    }));

    let err = repo.approve(item.id, "olena", vec![]).await.unwrap_err();
    assert!(err.is_invalid_transition());
}

#[tokio::test]
async fn crashed_worker_claim_is_reclaimed_then_completed_by_another() {
    let repo = MemoryContentRepository::new();
    let item = approved_item(&repo, vec![Platform::Facebook]).await;

    // Worker A claims and crashes without resolving.
    assert!(
        repo.claim_for_posting(item.id, Platform::Facebook)
            .await
            .unwrap()
            .is_claimed()
    );
    assert_eq!(
        repo.claim_for_posting(item.id, Platform::Facebook)
            .await
            .unwrap(),
        ClaimOutcome::AlreadyClaimed
    );

    // The maintenance pass reclaims anything claimed before the cutoff.
    let reclaimed = repo.reclaim_stale(Utc::now() + Duration::seconds(1)).await.unwrap();
    assert_eq!(reclaimed, vec![item.id]);
    assert_eq!(
        repo.get(item.id).await.unwrap().status,
        ContentStatus::Approved
    );

    // Worker B claims and completes.
    assert!(
        repo.claim_for_posting(item.id, Platform::Facebook)
            .await
            .unwrap()
            .is_claimed()
    );
    let done = repo
        .complete_posting(item.id, Platform::Facebook, PostId::new("post123"))
        .await
        .unwrap();
    assert_eq!(done.status, ContentStatus::Posted);
    assert_eq!(
        done.external_posts.get(&Platform::Facebook),
        Some(&PostId::new("post123"))
    );
}

#[tokio::test]
async fn catchup_claim_admits_one_of_two_concurrent_evaluators() {
    let repo = Arc::new(MemoryContentRepository::new());
    let now = Utc::now();
    repo.record_scan_success(Platform::Linkedin, now - Duration::hours(49))
        .await
        .unwrap();

    let threshold = Duration::hours(48);
    let a = {
        let repo = Arc::clone(&repo);
        tokio::spawn(
            async move { repo.try_claim_catchup(Platform::Linkedin, now, threshold).await },
        )
    };
    let b = {
        let repo = Arc::clone(&repo);
        tokio::spawn(
            async move { repo.try_claim_catchup(Platform::Linkedin, now, threshold).await },
        )
    };

    let granted = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
    assert_eq!(granted.iter().filter(|g| **g).count(), 1);
}

#[tokio::test]
async fn catchup_is_per_platform() {
    let repo = MemoryContentRepository::new();
    let now = Utc::now();
    // Facebook scanned recently; LinkedIn overdue.
    repo.record_scan_success(Platform::Facebook, now - Duration::hours(1))
        .await
        .unwrap();
    repo.record_scan_success(Platform::Linkedin, now - Duration::hours(50))
        .await
        .unwrap();

    assert!(
        !repo
            .try_claim_catchup(Platform::Facebook, now, Duration::hours(24))
            .await
            .unwrap()
    );
    assert!(
        repo.try_claim_catchup(Platform::Linkedin, now, Duration::hours(48))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn fifo_selection_and_cleanup() {
    let repo = MemoryContentRepository::new();
    let first = approved_item(&repo, vec![Platform::Facebook]).await;
    let second = approved_item(&repo, vec![Platform::Facebook]).await;
    assert!(first.id < second.id);

    let next = repo
        .next_for_platform(Platform::Facebook)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.id, first.id);

    // Translation candidates exclude same-language items.
    let uk_item = repo.create(new_content(false)).await.unwrap();
    let en_item = repo.create(new_content(true)).await.unwrap();
    let candidates = repo.drafts_needing_translation(10).await.unwrap();
    let ids: Vec<i32> = candidates.iter().map(|c| c.id).collect();
    assert!(ids.contains(&en_item.id));
    assert!(!ids.contains(&uk_item.id));

    // Cleanup removes only old rejected items.
    repo.store_image(uk_item.id, image()).await.unwrap();
    repo.promote(uk_item.id).await.unwrap();
    repo.reject(uk_item.id, "olena", "duplicate").await.unwrap();
    let removed = repo
        .delete_rejected_before(Utc::now() + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(repo.len().await, 3);
}
