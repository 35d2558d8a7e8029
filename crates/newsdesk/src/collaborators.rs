//! Default collaborators for deployments without platform credentials.
//!
//! Every external seam gets a stub that warns and fails cleanly, so the
//! coordinator runs end-to-end with nothing configured: drafts sit in
//! `draft`, approved items stay `approved`, and nothing is lost. Real
//! integrations replace these one trait at a time.

use async_trait::async_trait;
use newsdesk_core::{ContentItem, ImageReference, Platform, PostId, Translation};
use newsdesk_error::{ImageFetchError, NotifyError, PostingError, TranslationError};
use newsdesk_interface::{ImageSource, Notification, Notifier, Poster, Translator};
use tracing::{info, warn};

/// Translator stub: always fails, leaving drafts for a configured one.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredTranslator;

#[async_trait]
impl Translator for UnconfiguredTranslator {
    async fn translate(&self, item: &ContentItem) -> Result<Translation, TranslationError> {
        warn!(content_id = item.id, "no translator configured");
        Err(TranslationError::new("no translator configured"))
    }
}

/// Image source stub: always fails, leaving drafts unpromoted.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredImageSource;

#[async_trait]
impl ImageSource for UnconfiguredImageSource {
    async fn fetch_image(&self, item: &ContentItem) -> Result<ImageReference, ImageFetchError> {
        warn!(content_id = item.id, "no image source configured");
        Err(ImageFetchError::new("no image source configured"))
    }
}

/// Poster stub for one platform: fails every post, so approved items stay
/// approved and publish once credentials arrive.
#[derive(Debug, Clone, Copy)]
pub struct UnconfiguredPoster {
    platform: Platform,
}

impl UnconfiguredPoster {
    /// Stub poster for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Poster for UnconfiguredPoster {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn post(&self, item: &ContentItem) -> Result<PostId, PostingError> {
        warn!(
            content_id = item.id,
            platform = %self.platform,
            "no credentials configured, post skipped"
        );
        Err(PostingError::new(format!(
            "no credentials configured for {}",
            self.platform
        )))
    }
}

/// Notifier that writes notifications to the log instead of a chat channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::ApprovalRequested { content_id, title } => {
                info!(content_id, ?title, "review requested");
            }
            Notification::Approved {
                content_id,
                moderator,
            } => {
                info!(content_id, moderator, "approved");
            }
            Notification::Posted {
                content_id,
                platform,
                post_id,
            } => {
                info!(content_id, %platform, %post_id, "published");
            }
            Notification::PostFailed {
                content_id,
                platform,
                error,
            } => {
                warn!(content_id, %platform, error, "publishing failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_poster_fails_cleanly() {
        let poster = UnconfiguredPoster::new(Platform::Facebook);
        assert_eq!(poster.platform(), Platform::Facebook);
        let item = ContentItem::from_new(
            1,
            newsdesk_core::NewContent::builder().build(),
            chrono::Utc::now(),
        );
        assert!(poster.post(&item).await.is_err());
    }

    #[tokio::test]
    async fn log_notifier_always_succeeds() {
        let result = LogNotifier
            .notify(Notification::ApprovalRequested {
                content_id: 1,
                title: Some("Headline".to_string()),
            })
            .await;
        assert!(result.is_ok());
    }
}
