//! The content item and its lifecycle operations.

use crate::{ContentAction, ContentEdit, ContentStatus, EditRecord, Platform, PostId};
use chrono::{DateTime, Utc};
use newsdesk_error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use typed_builder::TypedBuilder;

/// Reference to a sourced or generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ImageReference {
    /// Where the image lives
    #[builder(setter(into))]
    pub url: String,
    /// Generation prompt, when the image was generated rather than sourced
    #[builder(default, setter(strip_option, into))]
    pub prompt: Option<String>,
    /// Attribution line required by the image source
    #[builder(default, setter(strip_option, into))]
    pub credit: Option<String>,
}

/// A translated title/body pair returned by the translator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    /// Translated headline
    pub title: String,
    /// Translated body
    pub text: String,
}

/// Input for creating a new content item in `draft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct NewContent {
    /// Human-readable source name
    #[builder(default, setter(strip_option, into))]
    pub source: Option<String>,
    /// URL the article was scraped from
    #[builder(default, setter(strip_option, into))]
    pub source_url: Option<String>,
    /// Original headline
    #[builder(default, setter(strip_option, into))]
    pub source_title: Option<String>,
    /// Original article body
    #[builder(default, setter(strip_option, into))]
    pub original_text: Option<String>,
    /// ISO language code of the original text
    #[builder(default = "en".to_string(), setter(into))]
    pub language: String,
    /// Whether the translation step applies to this item
    #[builder(default = true)]
    pub needs_translation: bool,
    /// Initial target platforms; may be replaced at approval time
    #[builder(default)]
    pub platforms: Vec<Platform>,
}

/// One article moving through the pipeline.
///
/// Fields populate progressively as the item advances and stay put once
/// set; the only sanctioned later mutation is an explicit moderator edit,
/// which is recorded in `edit_history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique id, assigned at creation, immutable
    pub id: i32,
    /// Current lifecycle status
    pub status: ContentStatus,
    /// Human-readable source name
    pub source: Option<String>,
    /// URL the article was scraped from
    pub source_url: Option<String>,
    /// Original headline
    pub source_title: Option<String>,
    /// Original article body
    pub original_text: Option<String>,
    /// Publication headline
    pub translated_title: Option<String>,
    /// Publication body
    pub translated_text: Option<String>,
    /// Image attached during the pipeline
    pub image: Option<ImageReference>,
    /// ISO language code of the original text
    pub language: String,
    /// Whether the translation step applies to this item
    pub needs_translation: bool,
    /// Target platforms, fixed at approval time
    pub platforms: Vec<Platform>,
    /// External post ids, set at most once per platform
    pub external_posts: BTreeMap<Platform, PostId>,
    /// When the item was created
    pub created_at: DateTime<Utc>,
    /// When a moderator reviewed the item
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Which moderator reviewed the item
    pub reviewed_by: Option<String>,
    /// When the last target platform was published
    pub posted_at: Option<DateTime<Utc>>,
    /// Why the item was rejected, set only on rejection
    pub rejection_reason: Option<String>,
    /// Applied moderator edits, append-only
    pub edit_history: Vec<EditRecord>,
    /// When the current posting claim was taken, for staleness recovery
    pub claimed_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    /// Create a fresh item in `draft`.
    pub fn from_new(id: i32, new: NewContent, now: DateTime<Utc>) -> Self {
        Self {
            id,
            status: ContentStatus::Draft,
            source: new.source,
            source_url: new.source_url,
            source_title: new.source_title,
            original_text: new.original_text,
            translated_title: None,
            translated_text: None,
            image: None,
            language: new.language,
            needs_translation: new.needs_translation,
            platforms: new.platforms,
            external_posts: BTreeMap::new(),
            created_at: now,
            reviewed_at: None,
            reviewed_by: None,
            posted_at: None,
            rejection_reason: None,
            edit_history: Vec::new(),
            claimed_at: None,
        }
    }

    /// True when the draft has everything a moderator needs to see:
    /// an image, and a translation unless the item skips that step.
    pub fn ready_for_review(&self) -> bool {
        self.image.is_some() && (!self.needs_translation || self.translated_text.is_some())
    }

    /// Record translator output. Fails outside `draft`.
    pub fn store_translation(&mut self, translation: Translation) -> Result<(), PipelineError> {
        if self.status != ContentStatus::Draft {
            return Err(PipelineError::invalid_transition(
                self.status.to_string(),
                "store_translation",
            ));
        }
        self.translated_title = Some(translation.title);
        self.translated_text = Some(translation.text);
        Ok(())
    }

    /// Attach an image. Legal in `draft` and `pending_approval`; an image
    /// already present stays put (progressive fields are write-once).
    pub fn store_image(&mut self, image: ImageReference) -> Result<(), PipelineError> {
        if !matches!(
            self.status,
            ContentStatus::Draft | ContentStatus::PendingApproval
        ) {
            return Err(PipelineError::invalid_transition(
                self.status.to_string(),
                "store_image",
            ));
        }
        if self.image.is_none() {
            self.image = Some(image);
        }
        Ok(())
    }

    /// Draft → pending_approval, gated on [`Self::ready_for_review`].
    ///
    /// Items that skip translation publish their original text, so the
    /// publication fields are backfilled from the originals here.
    pub fn promote(&mut self) -> Result<(), PipelineError> {
        let next = self.status.transition(&ContentAction::Promote)?;
        if !self.ready_for_review() {
            return Err(PipelineError::invalid_transition(
                self.status.to_string(),
                ContentAction::Promote.to_string(),
            ));
        }
        if !self.needs_translation {
            if self.translated_title.is_none() {
                self.translated_title = self.source_title.clone();
            }
            if self.translated_text.is_none() {
                self.translated_text = self.original_text.clone();
            }
        }
        self.status = next;
        Ok(())
    }

    /// Moderator approval: fixes the platform set and records the reviewer.
    ///
    /// An empty `platforms` keeps the set the item was created with.
    pub fn approve(
        &mut self,
        moderator: &str,
        platforms: Vec<Platform>,
        now: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        let next = self.status.transition(&ContentAction::Approve)?;
        if !platforms.is_empty() {
            self.platforms = platforms;
        }
        if self.platforms.is_empty() {
            return Err(PipelineError::invalid_transition(
                self.status.to_string(),
                ContentAction::Approve.to_string(),
            ));
        }
        self.reviewed_at = Some(now);
        self.reviewed_by = Some(moderator.to_string());
        self.status = next;
        Ok(())
    }

    /// Moderator rejection with a required reason.
    pub fn reject(
        &mut self,
        moderator: &str,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        let next = self.status.transition(&ContentAction::Reject)?;
        self.reviewed_at = Some(now);
        self.reviewed_by = Some(moderator.to_string());
        self.rejection_reason = Some(reason.to_string());
        self.status = next;
        Ok(())
    }

    /// True when a posting worker may claim this item for `platform`:
    /// approved, targeted, and not yet published there.
    pub fn claimable_for(&self, platform: Platform) -> bool {
        self.status == ContentStatus::Approved
            && self.platforms.contains(&platform)
            && !self.external_posts.contains_key(&platform)
    }

    /// Take the posting claim. Callers check [`Self::claimable_for`] first;
    /// an ineligible claim is an `InvalidTransition`.
    pub fn begin_posting(
        &mut self,
        platform: Platform,
        now: DateTime<Utc>,
    ) -> Result<(), PipelineError> {
        let next = self.status.transition(&ContentAction::Claim(platform))?;
        if !self.platforms.contains(&platform) {
            return Err(PipelineError::new(
                newsdesk_error::PipelineErrorKind::PlatformNotTargeted {
                    content_id: self.id,
                    platform: platform.to_string(),
                },
            ));
        }
        self.claimed_at = Some(now);
        self.status = next;
        Ok(())
    }

    /// Record a successful external post and resolve the claim.
    ///
    /// Idempotent per platform: an id already recorded is left untouched.
    /// The item becomes `posted` once every target platform has an id;
    /// otherwise it returns to `approved` so the remaining platforms can be
    /// claimed on their own schedules. Returns whether the id was newly
    /// recorded.
    pub fn complete_posting(
        &mut self,
        platform: Platform,
        post_id: PostId,
        now: DateTime<Utc>,
    ) -> Result<bool, PipelineError> {
        self.status
            .transition(&ContentAction::CompletePosting(platform))?;
        let newly_recorded = if self.external_posts.contains_key(&platform) {
            false
        } else {
            self.external_posts.insert(platform, post_id);
            true
        };
        self.claimed_at = None;
        let all_done = self
            .platforms
            .iter()
            .all(|p| self.external_posts.contains_key(p));
        if all_done {
            self.status = ContentStatus::Posted;
            self.posted_at = Some(now);
        } else {
            self.status = ContentStatus::Approved;
        }
        Ok(newly_recorded)
    }

    /// Release a failed claim: posting_P → approved, retry-eligible.
    pub fn fail_posting(&mut self, platform: Platform) -> Result<(), PipelineError> {
        let next = self
            .status
            .transition(&ContentAction::FailPosting(platform))?;
        self.claimed_at = None;
        self.status = next;
        Ok(())
    }

    /// Revert a stale claim taken by a worker that never resolved it.
    pub fn reclaim(&mut self) -> Result<Platform, PipelineError> {
        match self.status {
            ContentStatus::Posting(platform) => {
                self.fail_posting(platform)?;
                Ok(platform)
            }
            other => Err(PipelineError::invalid_transition(
                other.to_string(),
                "reclaim",
            )),
        }
    }

    /// Apply a moderator edit and append it to the edit history.
    ///
    /// Terminal items refuse edits. Returns the history record, whose
    /// change map doubles as the audit detail.
    pub fn apply_edit(
        &mut self,
        edit: ContentEdit,
        now: DateTime<Utc>,
    ) -> Result<EditRecord, PipelineError> {
        if self.status.is_terminal() {
            return Err(PipelineError::invalid_transition(
                self.status.to_string(),
                "edit",
            ));
        }
        let mut changes = serde_json::Map::new();
        if let Some(title) = edit.translated_title {
            changes.insert(
                "translated_title".to_string(),
                json!({"old": self.translated_title, "new": title}),
            );
            self.translated_title = Some(title);
        }
        if let Some(text) = edit.translated_text {
            changes.insert(
                "translated_text".to_string(),
                json!({"old": self.translated_text, "new": text}),
            );
            self.translated_text = Some(text);
        }
        if let Some(platforms) = edit.platforms {
            changes.insert(
                "platforms".to_string(),
                json!({"old": self.platforms, "new": platforms}),
            );
            self.platforms = platforms;
        }
        if let Some(image) = edit.image {
            changes.insert(
                "image".to_string(),
                json!({"old": self.image, "new": image}),
            );
            self.image = Some(image);
        }
        let record = EditRecord {
            timestamp: now,
            changes: serde_json::Value::Object(changes),
        };
        self.edit_history.push(record.clone());
        Ok(record)
    }

    /// Text that will be (or was) published for this item.
    pub fn publication_text(&self) -> Option<&str> {
        self.translated_text
            .as_deref()
            .or(self.original_text.as_deref())
    }
}
