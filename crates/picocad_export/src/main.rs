use anyhow::{Context, Result};
use clap::Parser;
use picocad_export::source::open_scene;
use picocad_export::{export_scene, ExportConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const OUTPUT_EXTENSION: &str = "txt";

/// Export a 3D scene to a picoCAD project file.
#[derive(Debug, Parser)]
#[command(name = "picocad-export", version, about, long_about = None)]
struct Cli {
    /// Scene to export (.gltf, .glb or .ron)
    input: PathBuf,

    /// Destination file, defaults to the input path with a .txt extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file, defaults to picocad_export.ron if present
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Set up tracing
    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(if cfg!(debug_assertions) { "trace" } else { "info" }))?;
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    let cli = Cli::parse();
    let config = ExportConfig::load(cli.config.as_deref())?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension(OUTPUT_EXTENSION));

    info!("Exporting '{}' to '{}'", cli.input.display(), output.display());
    let scene = open_scene(&cli.input, &config)?;
    export_scene(&scene, &output, &config)
        .with_context(|| format!("Failed to export '{}'", cli.input.display()))?;
    Ok(())
}
