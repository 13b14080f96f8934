use anyhow::Context;
use clap::Parser;
use content_migrate::core::report::{print_table, write_csv};
use content_migrate::utils::{logger, validation::Validate};
use content_migrate::{CliConfig, MigrateError, MigrationEngine, MigrationPlan, Mover};

fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting content-migrate");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if let Err(e) = run(&config) {
        match e.downcast_ref::<MigrateError>() {
            Some(migrate_error) => {
                tracing::error!("❌ Migration failed: {:#}", e);
                tracing::error!("💡 Recovery suggestion: {}", migrate_error.recovery_suggestion());
                eprintln!("❌ {}", migrate_error.user_friendly_message());
                eprintln!("💡 {}", migrate_error.recovery_suggestion());
                std::process::exit(migrate_error.exit_code());
            }
            None => {
                tracing::error!("❌ Migration failed: {:#}", e);
                eprintln!("❌ {:#}", e);
                std::process::exit(1);
            }
        }
    }
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    let plan = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading migration plan from: {}", path.display());
            MigrationPlan::from_file(path)
                .with_context(|| format!("failed to load plan {}", path.display()))?
        }
        None => MigrationPlan::builtin().context("built-in plan is invalid")?,
    };
    plan.validate()?;
    tracing::info!("✅ Plan '{}' loaded and validated", plan.migration.name);

    let root = config.project_root()?;
    let mover = Mover::new(root, config.trial)?;
    let changes =
        MigrationEngine::new_with_monitoring(plan, mover, config.monitor).run(&config.steps)?;

    if config.show_report() {
        print_table(&changes, &mut std::io::stdout().lock())?;
    }
    if let Some(path) = &config.report_file {
        write_csv(&changes, path)?;
    }

    tracing::info!("Done.");
    Ok(())
}
