use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tm_cli::commands::{delete, describe, rename, size, start, stop, summary};
use tm_cli::{Cli, Commands, Config};
use tm_log::Executor;

/// Resolve the log path from config, letting the CLI flag win.
fn resolve_log_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.log_file {
        return Ok(path.clone());
    }
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config.log_path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let log_path = resolve_log_path(&cli)?;
    let mut executor = Executor::load(&log_path)
        .with_context(|| format!("failed to open log {}", log_path.display()))?;

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    match command {
        Commands::Start { name } => start::run(&mut writer, &mut executor, name)?,
        Commands::Stop { name } => stop::run(&mut writer, &mut executor, name)?,
        Commands::Describe { name, text } => {
            describe::run(&mut writer, &mut executor, name, text)?;
        }
        Commands::Size { name, size } => size::run(&mut writer, &mut executor, name, size)?,
        Commands::Rename { old, new } => rename::run(&mut writer, &mut executor, old, new)?,
        Commands::Delete { name } => delete::run(&mut writer, &mut executor, name)?,
        Commands::Summary { filter } => summary::run(&mut writer, &executor, filter.as_deref())?,
    }

    Ok(())
}
