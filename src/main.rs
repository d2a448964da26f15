//! acrotip - acronym detection and definition lookups
//!
//! Command line front end over the page runtime and the background lookup
//! service.

mod app;
mod cli;
mod commands;

use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use acrotip_config::{ConfigLoader, ConfigValidator, LoggingConfig};

use crate::app::App;
use crate::cli::{Cli, Commands};

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("acrotip")
                .filename_suffix("log")
                .max_log_files(14)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            // The guard flushes on drop and must outlive every log call.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    if let Some(error) = validation.into_error() {
        return Err(error.into());
    }

    let app = App::start(config).await?;
    match cli.command {
        Commands::Scan {
            file,
            define,
            format,
        } => commands::scan(&app, &file, define, &format).await,
        Commands::Lookup { term, context } => commands::lookup(&app, &term, context).await,
        Commands::Dismiss { term } => commands::dismiss(&app, &term).await,
        Commands::Enable { term } => commands::enable(&app, &term).await,
        Commands::Dismissed => commands::dismissed(&app).await,
        Commands::Site { action } => commands::site(&app, action).await,
        Commands::Key { action } => commands::key(&app, action).await,
        Commands::Delay { ms } => commands::delay(&app, ms).await,
        Commands::Cache { action } => commands::cache(&app, action).await,
        Commands::Recent => commands::recent(&app).await,
    }
}
