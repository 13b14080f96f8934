pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::plan::MigrationPlan;
pub use crate::core::{engine::MigrationEngine, engine::Step, mover::Mover};
pub use crate::utils::error::{MigrateError, Result};
