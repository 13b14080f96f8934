pub mod plan;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

#[cfg(feature = "cli")]
mod cli {
    use crate::core::engine::Step;
    use crate::utils::error::{MigrateError, Result};
    use crate::utils::validation::Validate;
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "content-migrate")]
    #[command(about = "Migrate a documentation content tree into a Hugo layout")]
    pub struct CliConfig {
        /// Trial run, no updates
        #[arg(long = "try")]
        pub trial: bool,

        /// Project root the plan's paths are relative to
        #[arg(long, default_value = ".")]
        pub root: PathBuf,

        /// TOML migration plan (built-in plan when omitted)
        #[arg(short, long)]
        pub config: Option<PathBuf>,

        /// Steps to run; all of them when omitted
        #[arg(long = "step", value_enum, value_delimiter = ',')]
        pub steps: Vec<Step>,

        /// Print the from/to table when done
        #[arg(long)]
        pub report: bool,

        /// Also write the from/to table as CSV
        #[arg(long)]
        pub report_file: Option<PathBuf>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log as JSON lines")]
        pub log_json: bool,

        #[arg(long, help = "Log time and memory per step")]
        pub monitor: bool,
    }

    impl CliConfig {
        /// Absolute, canonical project root.
        pub fn project_root(&self) -> Result<PathBuf> {
            self.root
                .canonicalize()
                .map_err(|e| MigrateError::io_at(&self.root, e))
        }

        pub fn show_report(&self) -> bool {
            self.trial || self.report
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            if !self.root.is_dir() {
                return Err(MigrateError::InvalidConfigValueError {
                    field: "root".to_string(),
                    value: self.root.display().to_string(),
                    reason: "Not a directory".to_string(),
                });
            }
            if let Some(config) = &self.config {
                if !config.is_file() {
                    return Err(MigrateError::InvalidConfigValueError {
                        field: "config".to_string(),
                        value: config.display().to_string(),
                        reason: "Plan file not found".to_string(),
                    });
                }
            }
            if let Some(report_file) = &self.report_file {
                if report_file.as_os_str().is_empty() || report_file.is_dir() {
                    return Err(MigrateError::InvalidConfigValueError {
                        field: "report_file".to_string(),
                        value: report_file.display().to_string(),
                        reason: "Must be a file path".to_string(),
                    });
                }
            }
            Ok(())
        }
    }

}
