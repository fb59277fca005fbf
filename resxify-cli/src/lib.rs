//! CLI library for testing purposes

pub mod config;
pub mod migrate;
pub mod validation;

pub use config::{MigrationConfig, ResourceTarget};
pub use migrate::{
    MigrationSummary, collect_source_files, run_migrate_command, run_sync_command,
};
