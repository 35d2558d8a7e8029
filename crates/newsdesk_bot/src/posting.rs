//! The posting pass: per-platform cron slots, claims, and catch-up.

use crate::config::PlatformSchedule;
use chrono::{DateTime, Utc};
use newsdesk_core::Platform;
use newsdesk_interface::{ClaimOutcome, ContentRepository, Notification, Notifier, Poster};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Whether a cron schedule has a slot between the last successful pass and
/// now. A platform with no recorded pass is not due; the first tick records
/// the baseline and the catch-up guard covers genuinely overdue deployments.
pub fn schedule_due(
    schedule: &cron::Schedule,
    last_success: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match last_success {
        Some(last) => schedule.after(&last).next().is_some_and(|slot| slot <= now),
        None => false,
    }
}

/// Publishes approved items to their platforms on each platform's schedule.
///
/// The pass never holds state between ticks; which platform is due, which
/// item is next, and who owns a claim all come from the repository, so any
/// number of concurrent coordinator processes stay safe.
pub struct PostingPass {
    repository: Arc<dyn ContentRepository>,
    posters: HashMap<Platform, Arc<dyn Poster>>,
    notifier: Arc<dyn Notifier>,
    schedules: Vec<PlatformSchedule>,
}

impl PostingPass {
    /// Wire the pass to its repository, posters, and schedules.
    pub fn new(
        repository: Arc<dyn ContentRepository>,
        posters: Vec<Arc<dyn Poster>>,
        notifier: Arc<dyn Notifier>,
        schedules: Vec<PlatformSchedule>,
    ) -> Self {
        let posters = posters
            .into_iter()
            .map(|poster| (poster.platform(), poster))
            .collect();
        Self {
            repository,
            posters,
            notifier,
            schedules,
        }
    }

    /// Check each configured platform and publish where a slot has passed.
    #[instrument(skip(self))]
    pub async fn run_due_platforms(&self, now: DateTime<Utc>) {
        for entry in &self.schedules {
            let schedule = match entry.schedule() {
                Ok(schedule) => schedule,
                Err(error) => {
                    warn!(platform = %entry.platform, %error, "unusable posting schedule");
                    continue;
                }
            };
            let last = match self.repository.last_scan_success(entry.platform).await {
                Ok(last) => last,
                Err(error) => {
                    warn!(platform = %entry.platform, %error, "could not read scan state");
                    continue;
                }
            };
            if last.is_none() {
                // First tick for this platform: set the baseline.
                if let Err(error) = self.repository.record_scan_success(entry.platform, now).await {
                    warn!(platform = %entry.platform, %error, "could not record scan baseline");
                }
                continue;
            }
            if !schedule_due(&schedule, last, now) {
                continue;
            }
            self.post_next(entry.platform).await;
            if let Err(error) = self.repository.record_scan_success(entry.platform, now).await {
                warn!(platform = %entry.platform, %error, "could not record scan success");
            }
        }
    }

    /// Run an out-of-cycle pass for any platform whose last success is
    /// overdue. The repository's conditional update arbitrates, so two
    /// coordinators evaluating the same window run the pass once.
    #[instrument(skip(self))]
    pub async fn catch_up(&self, now: DateTime<Utc>) {
        for entry in &self.schedules {
            let granted = match self
                .repository
                .try_claim_catchup(entry.platform, now, entry.catchup_threshold())
                .await
            {
                Ok(granted) => granted,
                Err(error) => {
                    warn!(platform = %entry.platform, %error, "catch-up claim failed");
                    continue;
                }
            };
            if !granted {
                continue;
            }
            info!(platform = %entry.platform, "posting pass overdue, running catch-up");
            self.post_next(entry.platform).await;
            if let Err(error) = self.repository.record_scan_success(entry.platform, now).await {
                warn!(platform = %entry.platform, %error, "could not record scan success");
            }
        }
    }

    /// Publish the oldest eligible item for one platform, if any.
    ///
    /// Claim, then post, then resolve. The external call happens only while
    /// holding the claim, and only after confirming no post id is recorded
    /// for this platform yet.
    pub async fn post_next(&self, platform: Platform) {
        let poster = match self.posters.get(&platform) {
            Some(poster) => Arc::clone(poster),
            None => {
                warn!(%platform, "no poster configured, skipping");
                return;
            }
        };
        let candidate = match self.repository.next_for_platform(platform).await {
            Ok(Some(item)) => item,
            Ok(None) => {
                debug!(%platform, "nothing approved to post");
                return;
            }
            Err(error) => {
                warn!(%platform, %error, "could not select next item");
                return;
            }
        };
        let item = match self.repository.claim_for_posting(candidate.id, platform).await {
            Ok(ClaimOutcome::Claimed(item)) => *item,
            Ok(ClaimOutcome::AlreadyClaimed) => {
                debug!(content_id = candidate.id, %platform, "claim lost, another worker has it");
                return;
            }
            Err(error) => {
                warn!(content_id = candidate.id, %platform, %error, "claim failed");
                return;
            }
        };
        if item.external_posts.contains_key(&platform) {
            // Already published there; resolve the claim without posting.
            warn!(content_id = item.id, %platform, "post id already recorded, releasing claim");
            if let Err(error) = self
                .repository
                .fail_posting(item.id, platform, "claim taken for an already-published platform")
                .await
            {
                warn!(content_id = item.id, %platform, %error, "could not release claim");
            }
            return;
        }
        match poster.post(&item).await {
            Ok(post_id) => {
                info!(content_id = item.id, %platform, %post_id, "published");
                match self
                    .repository
                    .complete_posting(item.id, platform, post_id.clone())
                    .await
                {
                    Ok(_) => {
                        let notification = Notification::Posted {
                            content_id: item.id,
                            platform,
                            post_id,
                        };
                        if let Err(error) = self.notifier.notify(notification).await {
                            warn!(content_id = item.id, %error, "post notification failed");
                        }
                    }
                    Err(error) => {
                        warn!(content_id = item.id, %platform, %error, "completion failed");
                    }
                }
            }
            Err(error) => {
                warn!(content_id = item.id, %platform, %error, "posting failed");
                if let Err(release_error) = self
                    .repository
                    .fail_posting(item.id, platform, &error.to_string())
                    .await
                {
                    warn!(
                        content_id = item.id,
                        %platform,
                        %release_error,
                        "could not release failed claim"
                    );
                }
                let notification = Notification::PostFailed {
                    content_id: item.id,
                    platform,
                    error: error.to_string(),
                };
                if let Err(error) = self.notifier.notify(notification).await {
                    warn!(content_id = item.id, %error, "failure notification failed");
                }
            }
        }
    }
}
