//! Content lifecycle statuses and the transition table between them.

use crate::Platform;
use newsdesk_error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a content item.
///
/// Statuses only move forward; the single sanctioned regression is
/// `Posting(p)` back to `Approved` when an external post fails or a stale
/// claim is reclaimed. `Posted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ContentStatus {
    /// Freshly ingested; translation and image still pending
    Draft,
    /// Ready for a moderator: image present, translation complete or skipped
    PendingApproval,
    /// Moderator approved; eligible for claiming at post time
    Approved,
    /// Exclusively claimed by a posting worker for one platform
    Posting(Platform),
    /// Every target platform carries an external post id
    Posted,
    /// Moderator rejected; `rejection_reason` is set
    Rejected,
}

impl ContentStatus {
    /// True for statuses that admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Posted | Self::Rejected)
    }

    /// Compute the status that results from applying `action`.
    ///
    /// This is the full legality table; anything not listed here is an
    /// [`InvalidTransition`](newsdesk_error::PipelineErrorKind::InvalidTransition)
    /// naming the current status and the requested action. Preconditions
    /// that depend on item data (the image gate for promotion, platform
    /// targeting for claims) are checked by [`crate::ContentItem`].
    pub fn transition(&self, action: &ContentAction) -> Result<ContentStatus, PipelineError> {
        use ContentAction as A;
        use ContentStatus as S;
        match (self, action) {
            (S::Draft, A::Promote) => Ok(S::PendingApproval),
            (S::PendingApproval, A::Approve) => Ok(S::Approved),
            (S::PendingApproval, A::Reject) => Ok(S::Rejected),
            (S::Approved, A::Claim(p)) => Ok(S::Posting(*p)),
            (S::Posting(held), A::CompletePosting(p)) if held == p => Ok(S::Posted),
            (S::Posting(held), A::FailPosting(p)) if held == p => Ok(S::Approved),
            (from, action) => Err(PipelineError::invalid_transition(
                from.to_string(),
                action.to_string(),
            )),
        }
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::PendingApproval => write!(f, "pending_approval"),
            Self::Approved => write!(f, "approved"),
            Self::Posting(platform) => write!(f, "posting_{}", platform),
            Self::Posted => write!(f, "posted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ContentStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "posted" => Ok(Self::Posted),
            "rejected" => Ok(Self::Rejected),
            other => match other.strip_prefix("posting_") {
                Some(platform) => platform
                    .parse::<Platform>()
                    .map(Self::Posting)
                    .map_err(|_| unrecognized(other)),
                None => Err(unrecognized(other)),
            },
        }
    }
}

#[track_caller]
fn unrecognized(value: &str) -> PipelineError {
    PipelineError::new(newsdesk_error::PipelineErrorKind::UnrecognizedValue {
        field: "status",
        value: value.to_string(),
    })
}

impl TryFrom<String> for ContentStatus {
    type Error = PipelineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ContentStatus> for String {
    fn from(status: ContentStatus) -> Self {
        status.to_string()
    }
}

/// An action requested against a content item.
///
/// Actions originate from moderators (approve, reject) or from the
/// scheduler and posting workers (promote, claim, complete, fail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentAction {
    /// Draft is complete enough to review
    Promote,
    /// Moderator accepts the item for publishing
    Approve,
    /// Moderator declines the item
    Reject,
    /// Posting worker takes exclusive ownership for one platform
    Claim(Platform),
    /// External post succeeded for the claimed platform
    CompletePosting(Platform),
    /// External post failed for the claimed platform
    FailPosting(Platform),
}

impl fmt::Display for ContentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Promote => write!(f, "promote"),
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
            Self::Claim(p) => write!(f, "claim:{}", p),
            Self::CompletePosting(p) => write!(f, "complete_posting:{}", p),
            Self::FailPosting(p) => write!(f, "fail_posting:{}", p),
        }
    }
}
