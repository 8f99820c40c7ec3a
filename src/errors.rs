use std::path::PathBuf;

use sea_orm::error::DbErr;
use thiserror::Error;

use crate::config::AppConfigError;

/// Result alias used across the seeding pipeline.
pub type SeedResult<T> = Result<T, SeedError>;

/// Every way a seeding run can fail. All variants are fatal for the run;
/// row-level coercions never surface here.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Configuration error: {0}")]
    Config(#[from] AppConfigError),

    #[error("Database connection failed: {0}")]
    Connection(#[source] DbErr),

    #[error("Schema creation failed: {0}")]
    Schema(#[source] DbErr),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Column '{column}' in {path} does not exist in table '{table}'")]
    UnknownColumn {
        table: &'static str,
        column: String,
        path: PathBuf,
    },

    #[error("Column '{column}' appears more than once in {path}")]
    DuplicateColumn { column: String, path: PathBuf },

    #[error("Required column '{column}' for table '{table}' is missing from {path}")]
    MissingColumn {
        table: &'static str,
        column: &'static str,
        path: PathBuf,
    },

    #[error("Invalid value '{value}' for {table}.{column} on line {line}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        line: u64,
        value: String,
    },

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl SeedError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SeedError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        SeedError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Short category label used in log output.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::Connection(_) => "connectivity",
            Self::Schema(_) => "schema",
            Self::Io { .. } | Self::Csv { .. } => "file",
            Self::UnknownColumn { .. }
            | Self::DuplicateColumn { .. }
            | Self::MissingColumn { .. } => "header",
            Self::InvalidValue { .. } => "data",
            Self::Database(_) => "insertion",
        }
    }
}
