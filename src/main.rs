use clap::{Parser, Subcommand};
use ollm_bridge::config::Config;
use ollm_bridge::error::Result;
use ollm_bridge::Bridge;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ollm-bridge")]
#[command(about = "Link Ollama models into an LM Studio models directory", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ollama manifest root (manifestDir)
    #[arg(long, global = true)]
    manifest_dir: Option<PathBuf>,

    /// Ollama blob directory (blobDir)
    #[arg(long, global = true)]
    blob_dir: Option<PathBuf>,

    /// Public models root (publicModelsDir)
    #[arg(long, global = true)]
    public_models_dir: Option<PathBuf>,

    /// Bridge output directory (bridgeDir)
    #[arg(long, global = true)]
    bridge_dir: Option<PathBuf>,

    /// Remove bridge entries not produced by this run
    #[arg(long, global = true)]
    prune: bool,

    /// Copy blobs when neither symlinks nor hard links are possible
    #[arg(long, global = true)]
    allow_copy: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Link every model in the manifest store (default)
    Sync,
    /// Print the effective configuration
    ShowConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the status lines
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;

    match cli.command {
        None | Some(Commands::Sync) => {
            let report = Bridge::new(&config).run()?;
            tracing::info!(
                "Scanned {} manifests: {} linked, {} skipped, {} failed",
                report.manifests_found,
                report.linked.len(),
                report.skipped,
                report.failed
            );
        }
        Some(Commands::ShowConfig) => print!("{}", config.to_toml()?),
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // CLI overrides
    if let Some(dir) = &cli.manifest_dir {
        config.manifest_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.blob_dir {
        config.blob_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.public_models_dir {
        config.public_models_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.bridge_dir {
        config.bridge_dir = Some(dir.clone());
    }
    config.prune |= cli.prune;
    config.allow_copy_fallback |= cli.allow_copy;

    Ok(config)
}
