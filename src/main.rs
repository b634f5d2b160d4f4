pub mod types;
pub mod config;
pub mod data;
pub mod error;
pub mod palette;
pub mod parser;
pub mod quantile;
pub mod processing;
pub mod render;
pub mod pipeline;
pub mod server;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a KML file from ZIP/population rows
    Export {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Rows of `ZIP population`; reads stdin when omitted
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Shade every area with this palette color (0-4) instead of by quintile
        #[arg(long, value_name = "INDEX")]
        color: Option<usize>,
        /// Defaults to `output.kml_path` from the config
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Serve the input form
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export { config, input, color, output } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            let dataset = data::load_dataset(&app_config.input)?;

            let raw = read_rows(input.as_deref())?;
            let palette = palette::ColorPalette::quintiles();
            let kml = pipeline::export_kml(&dataset, &palette, &raw, color)?;

            let path = output.unwrap_or(app_config.output.kml_path);
            write_output(&path, &kml)?;
            tracing::info!("Wrote {:?}", path);
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(&config)?;
            // loaded once, shared read-only by every request
            let dataset = data::load_dataset(&app_config.input)?;
            server::start_server(app_config, dataset).await?;
        }
    }

    Ok(())
}

fn read_rows(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input rows: {:?}", path)),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw).context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

fn write_output(path: &Path, kml: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    fs::write(path, kml).with_context(|| format!("Failed to write KML: {:?}", path))
}
