use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "bigiron-virt")]
#[command(version, about = "Declarative VM provisioning on libvirt/KVM", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create machines from a YAML manifest
    Create {
        /// Path to the manifest file
        manifest: PathBuf,
    },

    /// List machines and their states
    List,

    /// Destroy a machine and its instance storage
    Destroy {
        /// Machine name
        name: String,
    },

    /// List base images in the local repository
    Images,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Create { manifest } => commands::create(&manifest),
        Commands::List => commands::list(),
        Commands::Destroy { name } => commands::destroy(&name),
        Commands::Images => commands::images(),
    }
}
