//! Coordinator configuration loaded from TOML.

use chrono::Duration;
use cron::Schedule;
use newsdesk_core::Platform;
use newsdesk_error::{ConfigError, NewsdeskResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Configuration for the coordinator server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Pipeline scan configuration
    #[serde(default)]
    pub scan: ScanConfig,
    /// Maintenance pass configuration
    #[serde(default)]
    pub maintenance: MaintenanceConfig,
    /// Per-platform posting schedules
    #[serde(default = "default_platforms")]
    pub platforms: Vec<PlatformSchedule>,
}

impl CoordinatorConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> NewsdeskResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| newsdesk_error::NewsdeskError::from(ConfigError::read(e.to_string())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| newsdesk_error::NewsdeskError::from(ConfigError::parse(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Check cron expressions and platform uniqueness.
    pub fn validate(&self) -> NewsdeskResult<()> {
        let mut seen = Vec::new();
        for schedule in &self.platforms {
            schedule.schedule()?;
            if seen.contains(&schedule.platform) {
                return Err(ConfigError::duplicate_platform(schedule.platform.to_string()).into());
            }
            seen.push(schedule.platform);
        }
        Ok(())
    }

    /// The schedule for one platform, if configured.
    pub fn platform_schedule(&self, platform: Platform) -> Option<&PlatformSchedule> {
        self.platforms.iter().find(|s| s.platform == platform)
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            maintenance: MaintenanceConfig::default(),
            platforms: default_platforms(),
        }
    }
}

/// Cadence and batch size for the pipeline scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// How often the pipeline scan ticks (minutes)
    #[serde(default = "default_scan_interval")]
    pub scan_interval_minutes: u64,
    /// Items processed per pass
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_interval_minutes: default_scan_interval(),
            batch_size: default_batch_size(),
        }
    }
}

impl ScanConfig {
    /// Scan tick interval as a std duration.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.scan_interval_minutes * 60)
    }
}

/// Staleness and retention settings for the maintenance pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Posting claims older than this are reverted (minutes)
    #[serde(default = "default_stale_claim")]
    pub stale_claim_minutes: i64,
    /// Rejected items older than this are deleted (days)
    #[serde(default = "default_retention")]
    pub rejected_retention_days: i64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            stale_claim_minutes: default_stale_claim(),
            rejected_retention_days: default_retention(),
        }
    }
}

impl MaintenanceConfig {
    /// Claims older than now minus this are stale.
    pub fn stale_claim_age(&self) -> Duration {
        Duration::minutes(self.stale_claim_minutes)
    }

    /// Rejected items older than now minus this are deleted.
    pub fn retention(&self) -> Duration {
        Duration::days(self.rejected_retention_days)
    }
}

/// When one platform posts, and how far behind counts as overdue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSchedule {
    /// The platform this schedule drives
    pub platform: Platform,
    /// Cron expression (sec min hour day month weekday) for posting slots
    pub post_schedule: String,
    /// A successful pass older than this triggers catch-up (hours)
    #[serde(default = "default_catchup_hours")]
    pub catchup_threshold_hours: i64,
}

impl PlatformSchedule {
    /// Parse the cron expression.
    pub fn schedule(&self) -> NewsdeskResult<Schedule> {
        Schedule::from_str(&self.post_schedule).map_err(|e| {
            ConfigError::invalid_schedule(
                self.platform.to_string(),
                self.post_schedule.clone(),
                e.to_string(),
            )
            .into()
        })
    }

    /// Overdue threshold as a chrono duration.
    pub fn catchup_threshold(&self) -> Duration {
        Duration::hours(self.catchup_threshold_hours)
    }
}

fn default_scan_interval() -> u64 {
    15
}

fn default_batch_size() -> i64 {
    10
}

fn default_stale_claim() -> i64 {
    60
}

fn default_retention() -> i64 {
    30
}

fn default_catchup_hours() -> i64 {
    24
}

fn default_platforms() -> Vec<PlatformSchedule> {
    vec![
        PlatformSchedule {
            platform: Platform::Facebook,
            // Daily at 18:00
            post_schedule: "0 0 18 * * *".to_string(),
            catchup_threshold_hours: 24,
        },
        PlatformSchedule {
            platform: Platform::Linkedin,
            // Monday, Wednesday, Friday at 09:00
            post_schedule: "0 0 9 * * Mon,Wed,Fri".to_string(),
            catchup_threshold_hours: 48,
        },
    ]
}
