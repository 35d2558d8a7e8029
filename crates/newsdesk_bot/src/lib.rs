//! Coordinator runtime for the Newsdesk content pipeline.
//!
//! Ties the repository and collaborator seams together into the running
//! service: the pipeline scan moves drafts toward review, the posting pass
//! publishes approved items on each platform's cron schedule, the
//! maintenance pass recovers from crashed workers, and the review service
//! carries moderator decisions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod posting;
mod review;
mod scan;
mod server;

pub use config::{CoordinatorConfig, MaintenanceConfig, PlatformSchedule, ScanConfig};
pub use posting::{PostingPass, schedule_due};
pub use review::ReviewService;
pub use scan::PipelineScan;
pub use server::{
    CoordinatorServer, MaintenanceMessage, PostingMessage, ScanMessage, run_maintenance,
};
