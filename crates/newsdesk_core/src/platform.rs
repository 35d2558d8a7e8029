//! Publishing platforms and their post identifiers.

use serde::{Deserialize, Serialize};

/// A social platform the pipeline can publish to.
///
/// The set is closed: storage encodes platforms as lowercase strings and the
/// scheduler keys its per-platform state on this enum.
///
/// # Examples
///
/// ```
/// use newsdesk_core::Platform;
/// use std::str::FromStr;
///
/// assert_eq!(Platform::Facebook.to_string(), "facebook");
/// assert_eq!(Platform::from_str("linkedin").unwrap(), Platform::Linkedin);
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Facebook page posts
    Facebook,
    /// LinkedIn organization posts
    Linkedin,
}

/// Identifier assigned by a platform to a successfully published post.
///
/// Presence of a `PostId` for a platform is the idempotency guard against
/// publishing the same item twice.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("{}", _0)]
pub struct PostId(pub String);

impl PostId {
    /// Wrap a platform-assigned identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}
