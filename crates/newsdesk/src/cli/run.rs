//! Coordinator server launch.

use newsdesk::collaborators::{
    LogNotifier, UnconfiguredImageSource, UnconfiguredPoster, UnconfiguredTranslator,
};
use newsdesk_bot::{CoordinatorConfig, CoordinatorServer, PipelineScan, PostingPass};
use newsdesk_database::{PgContentRepository, connection_pool, run_migrations};
use newsdesk_error::NewsdeskResult;
use newsdesk_interface::{ContentRepository, Poster};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Load configuration, apply migrations, wire the passes, and run forever.
pub async fn run_coordinator(config_path: &Path) -> NewsdeskResult<()> {
    let config = if config_path.exists() {
        CoordinatorConfig::from_file(config_path)?
    } else {
        info!(path = %config_path.display(), "no config file, using defaults");
        CoordinatorConfig::default()
    };

    let pool = connection_pool()?;
    {
        let mut conn = pool.get().map_err(|e| {
            newsdesk_error::DatabaseError::new(newsdesk_error::DatabaseErrorKind::Connection(
                e.to_string(),
            ))
        })?;
        run_migrations(&mut conn)?;
    }

    let repository: Arc<dyn ContentRepository> = Arc::new(PgContentRepository::new(pool));
    let notifier = Arc::new(LogNotifier);

    let scan = PipelineScan::new(
        Arc::clone(&repository),
        Arc::new(UnconfiguredTranslator),
        Arc::new(UnconfiguredImageSource),
        Arc::clone(&notifier) as Arc<dyn newsdesk_interface::Notifier>,
        config.scan.batch_size,
    );

    let posters: Vec<Arc<dyn Poster>> = config
        .platforms
        .iter()
        .map(|schedule| Arc::new(UnconfiguredPoster::new(schedule.platform)) as Arc<dyn Poster>)
        .collect();
    let posting = PostingPass::new(
        Arc::clone(&repository),
        posters,
        Arc::clone(&notifier) as Arc<dyn newsdesk_interface::Notifier>,
        config.platforms.clone(),
    );

    CoordinatorServer::new(config, scan, posting, repository)
        .start()
        .await
}

/// Apply pending migrations and exit.
pub async fn migrate() -> NewsdeskResult<()> {
    let pool = connection_pool()?;
    let mut conn = pool.get().map_err(|e| {
        newsdesk_error::DatabaseError::new(newsdesk_error::DatabaseErrorKind::Connection(
            e.to_string(),
        ))
    })?;
    run_migrations(&mut conn)?;
    info!("migrations applied");
    Ok(())
}
