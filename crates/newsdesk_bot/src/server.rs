//! The coordinator server: tickers, worker loops, and the maintenance pass.

use crate::config::CoordinatorConfig;
use crate::posting::PostingPass;
use crate::scan::PipelineScan;
use chrono::Utc;
use newsdesk_error::NewsdeskResult;
use newsdesk_interface::ContentRepository;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, error, info, instrument, warn};

/// Message asking the scan worker for one sweep.
#[derive(Debug, Clone, Copy)]
pub enum ScanMessage {
    /// Run the translation, image, and promotion passes
    Sweep,
}

/// Message asking the posting worker to evaluate its schedules.
#[derive(Debug, Clone, Copy)]
pub enum PostingMessage {
    /// Publish on any platform whose slot has passed, then check catch-up
    CheckDue,
}

/// Message asking the maintenance worker for one sweep.
#[derive(Debug, Clone, Copy)]
pub enum MaintenanceMessage {
    /// Reclaim stale posting claims and purge old rejected items
    Sweep,
}

/// How often the posting worker re-evaluates its cron schedules.
const POSTING_TICK: std::time::Duration = std::time::Duration::from_secs(60);

/// How often the maintenance worker sweeps.
const MAINTENANCE_TICK: std::time::Duration = std::time::Duration::from_secs(3600);

/// Orchestrates the scan, posting, and maintenance workers.
///
/// Each worker sits behind a channel of capacity one and each ticker sends
/// with `try_send`: a tick that fires while the previous pass is still
/// running is dropped, so passes never overlap and never queue up.
pub struct CoordinatorServer {
    config: CoordinatorConfig,
    scan: Arc<PipelineScan>,
    posting: Arc<PostingPass>,
    repository: Arc<dyn ContentRepository>,
}

impl CoordinatorServer {
    /// Assemble the server from its passes.
    pub fn new(
        config: CoordinatorConfig,
        scan: PipelineScan,
        posting: PostingPass,
        repository: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            config,
            scan: Arc::new(scan),
            posting: Arc::new(posting),
            repository,
        }
    }

    /// Start the workers and tickers and run until the scan worker stops.
    #[instrument(skip(self))]
    pub async fn start(self) -> NewsdeskResult<()> {
        info!("Starting coordinator server");

        // Missed slots from downtime are handled before the first tick.
        self.posting.catch_up(Utc::now()).await;

        let (scan_tx, mut scan_rx) = mpsc::channel::<ScanMessage>(1);
        let (post_tx, mut post_rx) = mpsc::channel::<PostingMessage>(1);
        let (maint_tx, mut maint_rx) = mpsc::channel::<MaintenanceMessage>(1);

        let scan = Arc::clone(&self.scan);
        let scan_handle = tokio::spawn(async move {
            while scan_rx.recv().await.is_some() {
                scan.run().await;
            }
        });

        let posting = Arc::clone(&self.posting);
        tokio::spawn(async move {
            while post_rx.recv().await.is_some() {
                let now = Utc::now();
                posting.run_due_platforms(now).await;
                posting.catch_up(now).await;
            }
        });

        let repository = Arc::clone(&self.repository);
        let maintenance = self.config.maintenance.clone();
        tokio::spawn(async move {
            while maint_rx.recv().await.is_some() {
                run_maintenance(repository.as_ref(), &maintenance).await;
            }
        });

        Self::spawn_ticker(self.config.scan.interval(), scan_tx, ScanMessage::Sweep);
        Self::spawn_ticker(POSTING_TICK, post_tx, PostingMessage::CheckDue);
        Self::spawn_ticker(MAINTENANCE_TICK, maint_tx, MaintenanceMessage::Sweep);

        if let Err(error) = scan_handle.await {
            error!(%error, "scan worker terminated abnormally");
        }

        info!("Coordinator server stopped");
        Ok(())
    }

    fn spawn_ticker<M: std::fmt::Debug + Send + Copy + 'static>(
        period: std::time::Duration,
        tx: mpsc::Sender<M>,
        message: M,
    ) {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            loop {
                ticker.tick().await;
                match tx.try_send(message) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        debug!(?message, "previous pass still running, tick skipped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        error!(?message, "worker channel closed");
                        break;
                    }
                }
            }
        });
    }
}


/// Reclaim stale posting claims and purge old rejected items.
pub async fn run_maintenance(
    repository: &dyn ContentRepository,
    config: &crate::config::MaintenanceConfig,
) {
    let now = Utc::now();
    match repository.reclaim_stale(now - config.stale_claim_age()).await {
        Ok(reclaimed) if !reclaimed.is_empty() => {
            warn!(?reclaimed, "reverted stale posting claims");
        }
        Ok(_) => {}
        Err(error) => warn!(%error, "stale claim sweep failed"),
    }
    match repository
        .delete_rejected_before(now - config.retention())
        .await
    {
        Ok(0) => {}
        Ok(deleted) => info!(deleted, "purged old rejected items"),
        Err(error) => warn!(%error, "rejected item cleanup failed"),
    }
}
