use std::time::{Duration, Instant};
use tracing::info;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::SeedResult;
use crate::loader;
use crate::schema::{self, tables::seeded_tables};

/// Row counts for one completed run.
#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    /// `(table, inserted rows)` in load order
    pub loaded: Vec<(&'static str, u64)>,
    pub elapsed: Duration,
}

impl SeedReport {
    pub fn rows_for(&self, table: &str) -> Option<u64> {
        self.loaded
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, rows)| *rows)
    }

    pub fn total_rows(&self) -> u64 {
        self.loaded.iter().map(|(_, rows)| rows).sum()
    }
}

/// Ensures the schema, then loads inventory, sales and financial exports in
/// that order. Stops at the first failure; loads that already finished stay
/// committed.
pub async fn run(db: &DbPool, config: &AppConfig) -> SeedResult<SeedReport> {
    let start = Instant::now();

    schema::ensure_schema(db).await?;
    info!("Tables created");

    info!(data_dir = %config.data_dir.display(), "Loading CSVs");
    let mut report = SeedReport::default();
    for table in seeded_tables() {
        let Some(file_name) = table.source_file else {
            continue;
        };
        let path = config.data_file(file_name);
        let rows =
            loader::load_with_batch_size(&path, table, db, config.insert_batch_size).await?;
        info!(table = table.name, rows, "{} -> {} rows", table.name, rows);
        report.loaded.push((table.name, rows));
    }

    report.elapsed = start.elapsed();
    Ok(report)
}
