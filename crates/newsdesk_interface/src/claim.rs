//! Outcome of a posting claim attempt.

use newsdesk_core::ContentItem;

/// Result of [`claim_for_posting`](crate::ContentRepository::claim_for_posting).
///
/// `AlreadyClaimed` is an expected signal, not an error: another worker owns
/// the item (or it stopped being eligible between selection and claim), and
/// the caller simply skips it this cycle. The call never blocks waiting for
/// the other worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// This worker now owns the item until it completes or fails the post.
    Claimed(Box<ContentItem>),
    /// Another worker holds the item; skip it this cycle.
    AlreadyClaimed,
}

impl ClaimOutcome {
    /// True when the claim succeeded.
    pub fn is_claimed(&self) -> bool {
        matches!(self, Self::Claimed(_))
    }
}
