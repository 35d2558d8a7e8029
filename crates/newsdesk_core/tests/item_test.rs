//! Tests for item-level lifecycle operations and their preconditions.

use chrono::Utc;
use newsdesk_core::{
    ContentEdit, ContentItem, ContentStatus, ImageReference, NewContent, Platform, PostId,
    Translation,
};

fn draft(needs_translation: bool) -> ContentItem {
    let new = NewContent::builder()
        .source("The Spirits Business")
        .source_title("Distillery opens")
        .original_text("A new distillery opened today.")
        .needs_translation(needs_translation)
        .platforms(vec![Platform::Facebook])
        .build();
    ContentItem::from_new(1, new, Utc::now())
}

fn image() -> ImageReference {
    ImageReference::builder()
        .url("https://images.example/distillery.jpg")
        .credit("Photographer")
        .build()
}

#[test]
fn promotion_gated_on_image() {
    let mut item = draft(false);
    assert!(!item.ready_for_review());
    assert!(item.promote().is_err());
    assert_eq!(item.status, ContentStatus::Draft);

    item.store_image(image()).unwrap();
    assert!(item.ready_for_review());
    item.promote().unwrap();
    assert_eq!(item.status, ContentStatus::PendingApproval);
}

#[test]
fn promotion_gated_on_translation_when_needed() {
    let mut item = draft(true);
    item.store_image(image()).unwrap();
    assert!(!item.ready_for_review());
    assert!(item.promote().is_err());

    item.store_translation(Translation {
        title: "Відкрилася винокурня".to_string(),
        text: "Сьогодні відкрилася нова винокурня.".to_string(),
    })
    .unwrap();
    item.promote().unwrap();
    assert_eq!(item.status, ContentStatus::PendingApproval);
}

#[test]
fn skipped_translation_publishes_original_text() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();
    assert_eq!(item.translated_title.as_deref(), Some("Distillery opens"));
    assert_eq!(
        item.publication_text(),
        Some("A new distillery opened today.")
    );
}

#[test]
fn approval_fixes_platforms_and_reviewer() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();
    item.approve("olena", vec![Platform::Facebook, Platform::Linkedin], Utc::now())
        .unwrap();
    assert_eq!(item.status, ContentStatus::Approved);
    assert_eq!(item.reviewed_by.as_deref(), Some("olena"));
    assert!(item.reviewed_at.is_some());
    assert_eq!(item.platforms.len(), 2);
}

#[test]
fn multi_platform_completion_returns_to_approved_until_done() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();
    item.approve("olena", vec![Platform::Facebook, Platform::Linkedin], Utc::now())
        .unwrap();

    item.begin_posting(Platform::Facebook, Utc::now()).unwrap();
    let recorded = item
        .complete_posting(Platform::Facebook, PostId::new("fb_1"), Utc::now())
        .unwrap();
    assert!(recorded);
    // One platform still outstanding: back to approved, not posted.
    assert_eq!(item.status, ContentStatus::Approved);
    assert!(item.posted_at.is_none());
    assert!(!item.claimable_for(Platform::Facebook));
    assert!(item.claimable_for(Platform::Linkedin));

    item.begin_posting(Platform::Linkedin, Utc::now()).unwrap();
    item.complete_posting(Platform::Linkedin, PostId::new("li_1"), Utc::now())
        .unwrap();
    assert_eq!(item.status, ContentStatus::Posted);
    assert!(item.posted_at.is_some());
}

#[test]
fn completion_is_idempotent_per_platform() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();
    item.approve("olena", vec![], Utc::now()).unwrap();

    item.begin_posting(Platform::Facebook, Utc::now()).unwrap();
    assert!(
        item.complete_posting(Platform::Facebook, PostId::new("fb_first"), Utc::now())
            .unwrap()
    );

    // A second claim-and-complete cycle must not overwrite the id.
    assert!(!item.claimable_for(Platform::Facebook));
    assert_eq!(
        item.external_posts.get(&Platform::Facebook),
        Some(&PostId::new("fb_first"))
    );
}

#[test]
fn failed_posting_is_retry_eligible() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();
    item.approve("olena", vec![], Utc::now()).unwrap();

    item.begin_posting(Platform::Facebook, Utc::now()).unwrap();
    assert!(item.claimed_at.is_some());
    item.fail_posting(Platform::Facebook).unwrap();
    assert_eq!(item.status, ContentStatus::Approved);
    assert!(item.claimed_at.is_none());
    assert!(item.claimable_for(Platform::Facebook));
}

#[test]
fn reclaim_reverts_only_posting_items() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();
    item.approve("olena", vec![], Utc::now()).unwrap();
    assert!(item.reclaim().is_err());

    item.begin_posting(Platform::Facebook, Utc::now()).unwrap();
    assert_eq!(item.reclaim().unwrap(), Platform::Facebook);
    assert_eq!(item.status, ContentStatus::Approved);
}

#[test]
fn edits_accumulate_history_and_refuse_terminal_items() {
    let mut item = draft(false);
    item.store_image(image()).unwrap();
    item.promote().unwrap();

    let edit = ContentEdit::builder()
        .translated_text("Edited body")
        .platforms(vec![Platform::Linkedin])
        .build();
    let record = item.apply_edit(edit, Utc::now()).unwrap();
    assert!(record.changes.get("translated_text").is_some());
    assert!(record.changes.get("platforms").is_some());
    assert_eq!(item.edit_history.len(), 1);
    assert_eq!(item.platforms, vec![Platform::Linkedin]);

    item.reject("olena", "low quality", Utc::now()).unwrap();
    let refused = item.apply_edit(ContentEdit::default(), Utc::now());
    assert!(refused.unwrap_err().is_invalid_transition());
}
