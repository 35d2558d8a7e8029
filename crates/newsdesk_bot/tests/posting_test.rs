//! Posting pass behavior: cron slots, claims, failure recovery, catch-up.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use newsdesk_bot::{
    MaintenanceConfig, PipelineScan, PlatformSchedule, PostingPass, run_maintenance, schedule_due,
};
use newsdesk_core::{ContentItem, NewContent, Platform, PostId};
use newsdesk_error::{NotifyError, PostingError};
use newsdesk_interface::{
    ContentRepository, MemoryContentRepository, Notification, Notifier, Poster,
};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

struct MockPoster {
    platform: Platform,
    fail: AtomicBool,
    counter: AtomicUsize,
    posted: Mutex<Vec<i32>>,
}

impl MockPoster {
    fn new(platform: Platform) -> Self {
        Self {
            platform,
            fail: AtomicBool::new(false),
            counter: AtomicUsize::new(0),
            posted: Mutex::new(Vec::new()),
        }
    }

    fn failing(platform: Platform) -> Self {
        let poster = Self::new(platform);
        poster.fail.store(true, Ordering::SeqCst);
        poster
    }

    fn recover(&self) {
        self.fail.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl Poster for MockPoster {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn post(&self, item: &ContentItem) -> Result<PostId, PostingError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PostingError::new("mock platform outage"));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        self.posted.lock().await.push(item.id);
        Ok(PostId::new(format!("{}_{}", self.platform, n)))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events.lock().await.push(notification);
        Ok(())
    }
}

fn facebook_daily() -> PlatformSchedule {
    PlatformSchedule {
        platform: Platform::Facebook,
        post_schedule: "0 0 18 * * *".to_string(),
        catchup_threshold_hours: 24,
    }
}

async fn approved_item(
    repository: &MemoryContentRepository,
    platforms: Vec<Platform>,
) -> ContentItem {
    let item = repository
        .create(
            NewContent::builder()
                .source_title("Headline")
                .original_text("Body")
                .needs_translation(false)
                .platforms(platforms)
                .build(),
        )
        .await
        .unwrap();
    repository
        .store_image(
            item.id,
            newsdesk_core::ImageReference::builder()
                .url("https://img.example/a.jpg")
                .build(),
        )
        .await
        .unwrap();
    repository.promote(item.id).await.unwrap();
    repository.approve(item.id, "alice", Vec::new()).await.unwrap()
}

#[test]
fn due_when_a_slot_passed_since_the_last_success() {
    let schedule = cron::Schedule::from_str("0 0 18 * * *").unwrap();
    let last = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let before_slot = Utc.with_ymd_and_hms(2025, 6, 1, 17, 59, 0).unwrap();
    let after_slot = Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap();

    assert!(!schedule_due(&schedule, Some(last), before_slot));
    assert!(schedule_due(&schedule, Some(last), after_slot));
    assert!(!schedule_due(&schedule, None, after_slot));
}

#[tokio::test]
async fn due_slot_publishes_the_oldest_approved_item() {
    let repository = Arc::new(MemoryContentRepository::new());
    let poster = Arc::new(MockPoster::new(Platform::Facebook));
    let notifier = Arc::new(RecordingNotifier::default());
    let pass = PostingPass::new(
        Arc::clone(&repository) as Arc<dyn ContentRepository>,
        vec![Arc::clone(&poster) as Arc<dyn Poster>],
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        vec![facebook_daily()],
    );

    let first = approved_item(&repository, vec![Platform::Facebook]).await;
    let second = approved_item(&repository, vec![Platform::Facebook]).await;

    let last = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    repository
        .record_scan_success(Platform::Facebook, last)
        .await
        .unwrap();
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap();

    pass.run_due_platforms(now).await;

    // FIFO: the older item goes out first, one item per slot.
    assert_eq!(*poster.posted.lock().await, vec![first.id]);
    let posted = repository.get(first.id).await.unwrap();
    assert!(posted.external_posts.contains_key(&Platform::Facebook));
    let waiting = repository.get(second.id).await.unwrap();
    assert!(waiting.external_posts.is_empty());

    // The slot is consumed; the same now is no longer due.
    pass.run_due_platforms(now).await;
    assert_eq!(poster.posted.lock().await.len(), 1);

    let events = notifier.events.lock().await;
    assert!(events.iter().any(|event| matches!(
        event,
        Notification::Posted { content_id, platform: Platform::Facebook, .. }
        if *content_id == first.id
    )));
}

#[tokio::test]
async fn first_tick_records_a_baseline_without_posting() {
    let repository = Arc::new(MemoryContentRepository::new());
    let poster = Arc::new(MockPoster::new(Platform::Facebook));
    let pass = PostingPass::new(
        Arc::clone(&repository) as Arc<dyn ContentRepository>,
        vec![Arc::clone(&poster) as Arc<dyn Poster>],
        Arc::new(RecordingNotifier::default()),
        vec![facebook_daily()],
    );

    approved_item(&repository, vec![Platform::Facebook]).await;

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 19, 0, 0).unwrap();
    pass.run_due_platforms(now).await;

    assert!(poster.posted.lock().await.is_empty());
    assert_eq!(
        repository.last_scan_success(Platform::Facebook).await.unwrap(),
        Some(now)
    );
}

#[tokio::test]
async fn failed_post_returns_the_item_and_the_next_pass_retries() {
    let repository = Arc::new(MemoryContentRepository::new());
    let poster = Arc::new(MockPoster::failing(Platform::Facebook));
    let notifier = Arc::new(RecordingNotifier::default());
    let pass = PostingPass::new(
        Arc::clone(&repository) as Arc<dyn ContentRepository>,
        vec![Arc::clone(&poster) as Arc<dyn Poster>],
        Arc::clone(&notifier) as Arc<dyn Notifier>,
        vec![facebook_daily()],
    );

    let item = approved_item(&repository, vec![Platform::Facebook]).await;

    pass.post_next(Platform::Facebook).await;
    let after_failure = repository.get(item.id).await.unwrap();
    assert_eq!(after_failure.status, newsdesk_core::ContentStatus::Approved);
    assert!(after_failure.external_posts.is_empty());
    assert!(notifier.events.lock().await.iter().any(|event| matches!(
        event,
        Notification::PostFailed { content_id, .. } if *content_id == item.id
    )));

    poster.recover();
    pass.post_next(Platform::Facebook).await;
    let after_retry = repository.get(item.id).await.unwrap();
    assert_eq!(after_retry.status, newsdesk_core::ContentStatus::Posted);
}

#[tokio::test]
async fn catch_up_runs_at_most_once_per_overdue_window() {
    let repository = Arc::new(MemoryContentRepository::new());
    let poster = Arc::new(MockPoster::new(Platform::Facebook));
    let pass = PostingPass::new(
        Arc::clone(&repository) as Arc<dyn ContentRepository>,
        vec![Arc::clone(&poster) as Arc<dyn Poster>],
        Arc::new(RecordingNotifier::default()),
        vec![facebook_daily()],
    );

    approved_item(&repository, vec![Platform::Facebook]).await;
    approved_item(&repository, vec![Platform::Facebook]).await;

    let now = Utc.with_ymd_and_hms(2025, 6, 3, 8, 0, 0).unwrap();
    repository
        .record_scan_success(Platform::Facebook, now - Duration::hours(30))
        .await
        .unwrap();

    pass.catch_up(now).await;
    pass.catch_up(now).await;

    // The second evaluation of the same window is refused by the guard.
    assert_eq!(poster.posted.lock().await.len(), 1);
}

#[tokio::test]
async fn maintenance_reclaims_stale_claims_and_purges_rejected() {
    let repository = Arc::new(MemoryContentRepository::new());

    let stuck = approved_item(&repository, vec![Platform::Facebook]).await;
    match repository
        .claim_for_posting(stuck.id, Platform::Facebook)
        .await
        .unwrap()
    {
        newsdesk_interface::ClaimOutcome::Claimed(_) => {}
        other => panic!("expected a claim, got {:?}", other),
    }

    let rejected = repository
        .create(
            NewContent::builder()
                .original_text("Old and unwanted")
                .needs_translation(false)
                .build(),
        )
        .await
        .unwrap();
    repository
        .store_image(
            rejected.id,
            newsdesk_core::ImageReference::builder()
                .url("https://img.example/r.jpg")
                .build(),
        )
        .await
        .unwrap();
    repository.promote(rejected.id).await.unwrap();
    repository
        .reject(rejected.id, "alice", "not newsworthy")
        .await
        .unwrap();

    // Zero-age thresholds make both the claim and the rejection expire now.
    let config = MaintenanceConfig {
        stale_claim_minutes: 0,
        rejected_retention_days: 0,
    };
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    run_maintenance(repository.as_ref(), &config).await;

    let reclaimed = repository.get(stuck.id).await.unwrap();
    assert_eq!(reclaimed.status, newsdesk_core::ContentStatus::Approved);
    assert!(repository.get(rejected.id).await.is_err());
}

// PipelineScan and PostingPass share the repository in production; make
// sure the types compose the way the server wires them.
#[tokio::test]
async fn passes_share_one_repository() {
    let repository: Arc<dyn ContentRepository> = Arc::new(MemoryContentRepository::new());
    let _scan = PipelineScan::new(
        Arc::clone(&repository),
        Arc::new(NoopTranslator),
        Arc::new(NoopImages),
        Arc::new(RecordingNotifier::default()),
        10,
    );
    let _pass = PostingPass::new(
        repository,
        vec![Arc::new(MockPoster::new(Platform::Linkedin))],
        Arc::new(RecordingNotifier::default()),
        Vec::new(),
    );
}

struct NoopTranslator;

#[async_trait]
impl newsdesk_interface::Translator for NoopTranslator {
    async fn translate(
        &self,
        _item: &ContentItem,
    ) -> Result<newsdesk_core::Translation, newsdesk_error::TranslationError> {
        Err(newsdesk_error::TranslationError::new("unconfigured"))
    }
}

struct NoopImages;

#[async_trait]
impl newsdesk_interface::ImageSource for NoopImages {
    async fn fetch_image(
        &self,
        _item: &ContentItem,
    ) -> Result<newsdesk_core::ImageReference, newsdesk_error::ImageFetchError> {
        Err(newsdesk_error::ImageFetchError::new("unconfigured"))
    }
}
