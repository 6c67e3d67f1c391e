mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, OutputFormat};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tool_updater::{
    load_settings, CancellationToken, UpdateHandle, UpdateOptions, UpdateResult, Updater,
    UpdaterSettings,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => UpdaterSettings::from_env(),
    };
    let updater = Updater::new(&settings);

    let cancel = CancellationToken::new();
    let mut options = UpdateOptions::new().with_cancellation(cancel.clone());
    if let Some(source) = &cli.source {
        options = options.with_source(source.clone());
    }

    // Start the update as early as possible and only await it once our own work is done
    let update = match &cli.command {
        Commands::Version => {
            println!("tool-updater v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Commands::Detect => {
            let context = updater.detect_current()?;
            print_output(&context, context.to_string(), cli.format)?;
            return Ok(());
        }
        Commands::Current => updater.update_current(options)?,
        Commands::Global { package, tool_path } => {
            updater.update_global(package, tool_path.as_deref(), options)?
        }
        Commands::Local { package } => updater.update_local(package, options)?,
    };

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling update");
                cancel.cancel();
            }
        });
    }

    do_work(&cli).await;

    let result = wait_for_update(update, cli.quiet).await;
    let plain = match &result.current_version {
        Some(version) => format!("Update successful: {} (was v{})", result.is_successful, version),
        None => format!("Update successful: {}", result.is_successful),
    };
    print_output(&result, plain, cli.format)?;

    if !result.is_successful {
        std::process::exit(1);
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Stands in for whatever the host tool is actually for.
async fn do_work(cli: &Cli) {
    if !cli.quiet {
        eprintln!("tool-updater v{}", env!("CARGO_PKG_VERSION"));
    }
    tokio::time::sleep(Duration::from_millis(cli.work_ms)).await;
}

async fn wait_for_update(update: UpdateHandle, quiet: bool) -> UpdateResult {
    if update.is_finished() || quiet {
        return update.await;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Waiting for updater to complete...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = update.await;
    pb.finish_and_clear();
    result
}

fn print_output<T: serde::Serialize>(value: &T, plain: String, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let out = serde_json::to_string_pretty(value).context("Could not serialize output as JSON")?;
            println!("{}", out);
        }
        OutputFormat::Yaml => {
            let out = serde_yaml::to_string(value).context("Could not serialize output as YAML")?;
            print!("{}", out);
        }
        OutputFormat::Plain => println!("{}", plain),
    }
    Ok(())
}
