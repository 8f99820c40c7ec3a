//! Retail seed library
//!
//! Creates the retail analytics schema and bulk-loads the inventory, sales
//! and financial CSV exports into it.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod errors;
pub mod loader;
pub mod normalize;
pub mod schema;
pub mod seed;

pub use errors::{SeedError, SeedResult};
pub use loader::load;
pub use schema::ensure_schema;
pub use seed::{run, SeedReport};

pub mod prelude {
    pub use crate::config::{AppConfig, AppConfigError};
    pub use crate::db::*;
    pub use crate::errors::*;
    pub use crate::loader::{load, load_with_batch_size, parse_file, ParsedFile};
    pub use crate::schema::{ensure_schema, TableDef};
    pub use crate::seed::{run, SeedReport};
}
