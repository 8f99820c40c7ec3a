use anyhow::Context;
use tracing::{error, info, warn};

use retail_seed as seed;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = seed::config::load_config().context("failed to load configuration")?;
    seed::config::init_tracing(cfg.log_level(), cfg.log_json);
    info!(data_dir = %cfg.data_dir.display(), "Configuration loaded");

    info!("Connecting to database...");
    let pool = seed::db::establish_connection_from_app_config(&cfg).await?;

    let outcome: seed::SeedResult<seed::SeedReport> = async {
        seed::db::check_connection(&pool).await?;
        seed::run(&pool, &cfg).await
    }
    .await;

    if let Err(e) = seed::db::close_pool(pool).await {
        warn!("Failed to close database pool cleanly: {}", e);
    }

    let report = outcome.map_err(|e| {
        error!(category = e.category(), "Seeding failed: {}", e);
        e
    })?;

    info!(
        rows = report.total_rows(),
        elapsed = ?report.elapsed,
        "Done! {} rows loaded across {} tables",
        report.total_rows(),
        report.loaded.len()
    );
    Ok(())
}
