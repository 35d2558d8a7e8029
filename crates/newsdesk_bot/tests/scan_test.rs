//! Pipeline scan behavior against the in-memory repository.

use async_trait::async_trait;
use newsdesk_bot::PipelineScan;
use newsdesk_core::{
    ContentItem, ContentStatus, ImageReference, NewContent, Platform, Translation,
};
use newsdesk_error::{ImageFetchError, NotifyError, TranslationError};
use newsdesk_interface::{
    ContentRepository, ImageSource, MemoryContentRepository, Notification, Notifier, Translator,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Translator that fails its first `fail_times` calls, then succeeds.
struct MockTranslator {
    calls: AtomicUsize,
    fail_times: usize,
}

impl MockTranslator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_times: 0,
        }
    }

    fn failing_once() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_times: 1,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for MockTranslator {
    async fn translate(&self, item: &ContentItem) -> Result<Translation, TranslationError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_times {
            return Err(TranslationError::new("mock translator outage"));
        }
        Ok(Translation {
            title: format!("Translated title {}", item.id),
            text: format!("Translated body {}", item.id),
        })
    }
}

struct MockImageSource {
    fail: bool,
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch_image(&self, item: &ContentItem) -> Result<ImageReference, ImageFetchError> {
        if self.fail {
            return Err(ImageFetchError::new("mock image outage"));
        }
        Ok(ImageReference::builder()
            .url(format!("https://img.example/{}.jpg", item.id))
            .build())
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

fn scan(
    repository: Arc<MemoryContentRepository>,
    translator: Arc<MockTranslator>,
    images: Arc<MockImageSource>,
    notifier: Arc<RecordingNotifier>,
) -> PipelineScan {
    PipelineScan::new(repository, translator, images, notifier, 10)
}

#[tokio::test]
async fn sweep_carries_a_draft_to_pending_approval() {
    let repository = Arc::new(MemoryContentRepository::new());
    let translator = Arc::new(MockTranslator::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let scan = scan(
        Arc::clone(&repository),
        Arc::clone(&translator),
        Arc::new(MockImageSource { fail: false }),
        Arc::clone(&notifier),
    );

    let item = repository
        .create(
            NewContent::builder()
                .source_title("Original headline")
                .original_text("Original body")
                .platforms(vec![Platform::Facebook])
                .build(),
        )
        .await
        .unwrap();

    scan.run().await;

    let item = repository.get(item.id).await.unwrap();
    assert_eq!(item.status, ContentStatus::PendingApproval);
    assert_eq!(translator.calls(), 1);
    assert!(item.image.is_some());
    assert_eq!(
        item.translated_text.as_deref(),
        Some(format!("Translated body {}", item.id).as_str())
    );

    let events = notifier.events.lock().await;
    assert!(matches!(
        events.as_slice(),
        [Notification::ApprovalRequested { content_id, .. }] if *content_id == item.id
    ));
}

#[tokio::test]
async fn same_language_items_skip_the_translator() {
    let repository = Arc::new(MemoryContentRepository::new());
    let translator = Arc::new(MockTranslator::new());
    let scan = scan(
        Arc::clone(&repository),
        Arc::clone(&translator),
        Arc::new(MockImageSource { fail: false }),
        Arc::new(RecordingNotifier::default()),
    );

    let item = repository
        .create(
            NewContent::builder()
                .source_title("Already in target language")
                .original_text("Publishable as-is")
                .needs_translation(false)
                .platforms(vec![Platform::Linkedin])
                .build(),
        )
        .await
        .unwrap();

    scan.run().await;

    let item = repository.get(item.id).await.unwrap();
    assert_eq!(translator.calls(), 0);
    assert_eq!(item.status, ContentStatus::PendingApproval);
    assert_eq!(item.publication_text(), Some("Publishable as-is"));
}

#[tokio::test]
async fn translator_outage_is_retried_on_the_next_sweep() {
    let repository = Arc::new(MemoryContentRepository::new());
    let translator = Arc::new(MockTranslator::failing_once());
    let scan = scan(
        Arc::clone(&repository),
        Arc::clone(&translator),
        Arc::new(MockImageSource { fail: false }),
        Arc::new(RecordingNotifier::default()),
    );

    let item = repository
        .create(
            NewContent::builder()
                .original_text("Body")
                .platforms(vec![Platform::Facebook])
                .build(),
        )
        .await
        .unwrap();

    scan.run().await;
    let after_first = repository.get(item.id).await.unwrap();
    assert_eq!(after_first.status, ContentStatus::Draft);
    assert!(after_first.translated_text.is_none());

    scan.run().await;
    let after_second = repository.get(item.id).await.unwrap();
    assert_eq!(after_second.status, ContentStatus::PendingApproval);
    assert_eq!(translator.calls(), 2);
}

#[tokio::test]
async fn missing_image_blocks_promotion() {
    let repository = Arc::new(MemoryContentRepository::new());
    let scan = scan(
        Arc::clone(&repository),
        Arc::new(MockTranslator::new()),
        Arc::new(MockImageSource { fail: true }),
        Arc::new(RecordingNotifier::default()),
    );

    let item = repository
        .create(
            NewContent::builder()
                .original_text("Body")
                .platforms(vec![Platform::Facebook])
                .build(),
        )
        .await
        .unwrap();

    scan.run().await;

    let item = repository.get(item.id).await.unwrap();
    assert_eq!(item.status, ContentStatus::Draft);
    assert!(item.translated_text.is_some());
    assert!(item.image.is_none());
}
