//! Moderator edits and their history records.

use crate::{ImageReference, Platform};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// A set of field changes requested by a moderator.
///
/// Only the populated fields are applied; everything else is left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct ContentEdit {
    /// Replacement publication title
    #[builder(default, setter(strip_option, into))]
    pub translated_title: Option<String>,
    /// Replacement publication text
    #[builder(default, setter(strip_option, into))]
    pub translated_text: Option<String>,
    /// Replacement target platform set
    #[builder(default, setter(strip_option))]
    pub platforms: Option<Vec<Platform>>,
    /// Replacement image
    #[builder(default, setter(strip_option))]
    pub image: Option<ImageReference>,
}

impl ContentEdit {
    /// True when the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        self.translated_title.is_none()
            && self.translated_text.is_none()
            && self.platforms.is_none()
            && self.image.is_none()
    }
}

/// One applied edit, kept on the item as append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditRecord {
    /// When the edit was applied
    pub timestamp: DateTime<Utc>,
    /// Old/new value pairs per changed field
    pub changes: serde_json::Value,
}
