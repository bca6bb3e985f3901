//! PinDrop - PIN-namespaced HTTP file sharing server
//!
//! Serves list, upload and download endpoints over a storage directory
//! partitioned by PIN.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pindrop::api::HttpServer;
use pindrop::config::{LoggingConfig, PinDropConfig};
use pindrop::error::Result;

/// PinDrop - PIN-namespaced HTTP file sharing server
#[derive(Parser)]
#[command(name = "pindrop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (optional, defaults are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the file server
    Start {
        /// Storage root (overrides config and STORAGE_PATH)
        #[arg(short, long)]
        storage: Option<PathBuf>,

        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "pindrop.toml")]
        output: PathBuf,
    },

    /// Validate configuration
    Validate,

    /// Show resolved configuration
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        return run_init(output);
    }

    let config = match PinDropConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            return Err(e);
        }
    };

    // Initialize logging
    init_logging(&config.logging, cli.log_level.as_deref());

    match cli.command {
        Commands::Start { storage, bind } => run_start(config, storage, bind).await,
        Commands::Validate => run_validate(&config),
        Commands::Info => run_info(&config),
        Commands::Init { .. } => Ok(()),
    }
}

/// Initialize logging
fn init_logging(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&logging.level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.format == "compact" {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Start the file server
async fn run_start(
    mut config: PinDropConfig,
    storage: Option<PathBuf>,
    bind: Option<String>,
) -> Result<()> {
    tracing::info!("Starting PinDrop server...");

    if let Some(storage) = storage {
        config.storage.path = storage;
    }
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    config.validate()?;

    let server = match HttpServer::new(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to initialize HTTP server: {}", e);
            return Err(e);
        }
    };

    if let Err(e) = server.start().await {
        tracing::error!("Server error: {}", e);
        return Err(e);
    }

    tracing::info!("PinDrop stopped");
    Ok(())
}

/// Initialize configuration file
fn run_init(output: &Path) -> Result<()> {
    let config_content = r#"# PinDrop Configuration
# Generated configuration file

[server]
bind_address = "0.0.0.0:8080"
max_upload_mb = 1024

[storage]
# Overridden by the STORAGE_PATH environment variable when set
path = "./storage"
# Require PINs to be 6-8 digits
strict_pins = false

[cors]
allowed_origin = "http://localhost:5173"

[logging]
level = "info"
format = "pretty"
"#;

    std::fs::write(output, config_content)?;
    println!("Configuration file created: {}", output.display());
    println!("Then start with: pindrop --config {} start", output.display());

    Ok(())
}

/// Validate configuration
fn run_validate(config: &PinDropConfig) -> Result<()> {
    config.validate()?;
    println!("✓ Configuration is valid");
    println!("  Bind Address: {}", config.server.bind_address);
    println!("  Storage Path: {}", config.storage_path().display());
    Ok(())
}

/// Show resolved configuration
fn run_info(config: &PinDropConfig) -> Result<()> {
    println!("PinDrop Configuration");
    println!("=====================");
    println!();
    println!("Bind Address:     {}", config.server.bind_address);
    println!("Max Upload:       {} MB", config.server.max_upload_mb);
    println!("Storage Path:     {}", config.storage_path().display());
    println!("Strict PINs:      {}", config.storage.strict_pins);
    println!("CORS Origin:      {}", config.cors.allowed_origin);
    println!("Log Level:        {}", config.logging.level);

    Ok(())
}
