//! # restyle CLI
//!
//! Command-line interface for extracting CSS from YAML style modules.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "restyle")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a context configuration file
    #[arg(long, env = "RESTYLE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount every instance of a style module and print the resulting CSS
    Extract {
        /// Style module (YAML)
        module: PathBuf,

        /// Emit JSON with the CSS and per-instance class maps
        #[arg(long)]
        json: bool,

        /// Generate short class names
        #[arg(long)]
        minify: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so extracted CSS stays clean on stdout
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Extract {
            module,
            json,
            minify,
        } => {
            let opts = commands::ExtractOptions { json, minify };
            commands::extract(cli.config.as_deref(), &module, opts)
        }
    }
}
