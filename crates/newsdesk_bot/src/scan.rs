//! The pipeline scan: translation, image, and promotion passes.

use newsdesk_interface::{ContentRepository, ImageSource, Notification, Notifier, Translator};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// One sweep over the drafts, moving each as far forward as it can go.
///
/// Every pass isolates per-item failures: a collaborator error is logged
/// and the item is left unchanged for the next sweep to retry.
pub struct PipelineScan {
    repository: Arc<dyn ContentRepository>,
    translator: Arc<dyn Translator>,
    images: Arc<dyn ImageSource>,
    notifier: Arc<dyn Notifier>,
    batch_size: i64,
}

impl PipelineScan {
    /// Wire the scan to its repository and collaborators.
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        translator: Arc<dyn Translator>,
        images: Arc<dyn ImageSource>,
        notifier: Arc<dyn Notifier>,
        batch_size: i64,
    ) -> Self {
        Self {
            repository,
            translator,
            images,
            notifier,
            batch_size,
        }
    }

    /// Run all three passes in pipeline order.
    #[instrument(skip(self))]
    pub async fn run(&self) {
        self.translation_pass().await;
        self.image_pass().await;
        self.promotion_pass().await;
    }

    /// Translate drafts still waiting on the translator.
    ///
    /// Items whose language needs no translation never show up here; they
    /// go straight to the image pass and publish their original text.
    pub async fn translation_pass(&self) {
        let drafts = match self.repository.drafts_needing_translation(self.batch_size).await {
            Ok(drafts) => drafts,
            Err(error) => {
                warn!(%error, "translation pass could not list drafts");
                return;
            }
        };
        for item in drafts {
            let translation = match self.translator.translate(&item).await {
                Ok(translation) => translation,
                Err(error) => {
                    warn!(content_id = item.id, %error, "translation failed, will retry");
                    continue;
                }
            };
            match self.repository.store_translation(item.id, translation).await {
                Ok(_) => debug!(content_id = item.id, "translation stored"),
                Err(error) => warn!(content_id = item.id, %error, "storing translation failed"),
            }
        }
    }

    /// Attach images to drafts that have none.
    pub async fn image_pass(&self) {
        let drafts = match self.repository.items_missing_image(self.batch_size).await {
            Ok(drafts) => drafts,
            Err(error) => {
                warn!(%error, "image pass could not list drafts");
                return;
            }
        };
        for item in drafts {
            let image = match self.images.fetch_image(&item).await {
                Ok(image) => image,
                Err(error) => {
                    warn!(content_id = item.id, %error, "image fetch failed, will retry");
                    continue;
                }
            };
            match self.repository.store_image(item.id, image).await {
                Ok(_) => debug!(content_id = item.id, "image stored"),
                Err(error) => warn!(content_id = item.id, %error, "storing image failed"),
            }
        }
    }

    /// Promote drafts that pass the review-readiness gate and ask for review.
    pub async fn promotion_pass(&self) {
        let drafts = match self.repository.promotable_drafts(self.batch_size).await {
            Ok(drafts) => drafts,
            Err(error) => {
                warn!(%error, "promotion pass could not list drafts");
                return;
            }
        };
        for item in drafts {
            let promoted = match self.repository.promote(item.id).await {
                Ok(promoted) => promoted,
                Err(error) => {
                    warn!(content_id = item.id, %error, "promotion failed");
                    continue;
                }
            };
            info!(content_id = promoted.id, "awaiting approval");
            let notification = Notification::ApprovalRequested {
                content_id: promoted.id,
                title: promoted
                    .translated_title
                    .clone()
                    .or_else(|| promoted.source_title.clone()),
            };
            if let Err(error) = self.notifier.notify(notification).await {
                warn!(content_id = promoted.id, %error, "approval notification failed");
            }
        }
    }
}
