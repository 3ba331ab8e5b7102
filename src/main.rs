//! Subhunt - Subtitle Locator and Downloader
//!
//! This is the main entry point for the Subhunt application, which finds
//! and downloads the best-matching subtitles for video files by parsing
//! release names and ranking candidates from subtitle services.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subhunt::cli::{split_list, Args, Commands};
use subhunt::config::Config;
use subhunt::guess;
use subhunt::service::ServiceRegistry;
use subhunt::workflow::{DownloadRequest, Workflow};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if std::path::Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Download {
            path,
            languages,
            services,
            set,
            lang_names,
        } => {
            info!("Searching subtitles for: {}", path.display());

            let request = DownloadRequest {
                path,
                languages: split_list(languages.as_deref(), &config.general.languages),
                services: split_list(services.as_deref(), &config.general.services),
                overrides: set,
                lang_names,
            };

            let registry = ServiceRegistry::with_default_services();
            let workflow = Workflow::new(config);
            workflow.download(registry, request).await?;
        }
        Commands::Guess { name } => {
            let info = guess::parse(&name);
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Commands::Services => {
            let registry = ServiceRegistry::with_default_services();
            println!("Available services:");
            for name in registry.names() {
                println!("  {}", name);
            }
        }
    }

    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let subhunt_dir = std::env::current_dir()?.join(".subhunt");
    let log_dir = subhunt_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subhunt.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    // Determine log level
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Create console layer
    let console_layer = fmt::layer().with_target(false);

    // Create file layer
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    // Setup layered subscriber
    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    // Initialize the subscriber
    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
