//! citra: run the image service transforms on local files.

use anyhow::Context;
use clap::{Parser, Subcommand};
use citra_image::{
    blur_edges, decode, encode, grayscale, resize, select_format, DEFAULT_JPEG_QUALITY,
    DEFAULT_PERCENTAGE,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "citra")]
#[command(about = "Grayscale, edge blur and resize images")]
#[command(version)]
struct Cli {
    /// JPEG quality for JPEG output
    #[arg(long, global = true, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// Print a JSON summary instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert to single-channel grayscale
    Grayscale {
        /// Path to image file
        input: PathBuf,
        /// Output path (default: output_grayscale<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Blur everything outside a centred circle
    BlurEdges {
        /// Path to image file
        input: PathBuf,
        /// Output path (default: output_blur_edges<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Scale by a percentage
    Resize {
        /// Path to image file
        input: PathBuf,
        /// Percentage of the original size
        #[arg(short, long, default_value_t = DEFAULT_PERCENTAGE, allow_hyphen_values = true)]
        percentage: i64,
        /// Output path (default: output_resized<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn input(&self) -> &Path {
        match self {
            Commands::Grayscale { input, .. }
            | Commands::BlurEdges { input, .. }
            | Commands::Resize { input, .. } => input,
        }
    }

    fn output(&self) -> Option<&Path> {
        match self {
            Commands::Grayscale { output, .. }
            | Commands::BlurEdges { output, .. }
            | Commands::Resize { output, .. } => output.as_deref(),
        }
    }

    fn stem(&self) -> &'static str {
        match self {
            Commands::Grayscale { .. } => "output_grayscale",
            Commands::BlurEdges { .. } => "output_blur_edges",
            Commands::Resize { .. } => "output_resized",
        }
    }
}

/// `<dir of input>/<stem><ext of input>`
fn default_output(input: &Path, stem: &str) -> PathBuf {
    let name = input.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let file = format!("{stem}{}", citra_image::file_extension(&name));
    input.with_file_name(file)
}

fn run(cli: &Cli) -> anyhow::Result<serde_json::Value> {
    let input = cli.command.input();
    let data = std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let name = input.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let selection = select_format(&name);

    let grid = decode(&data).with_context(|| format!("Failed to decode {}", input.display()))?;
    let (width, height) = (grid.width(), grid.height());

    let output = match &cli.command {
        Commands::Grayscale { .. } => grayscale(&grid),
        Commands::BlurEdges { .. } => blur_edges(&grid),
        Commands::Resize { percentage, .. } => resize(&grid, *percentage)?,
    };
    let (out_width, out_height) = (output.width(), output.height());

    let bytes = encode(output, selection.format, cli.quality)?;
    let out_path = cli
        .command
        .output()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input, cli.command.stem()));
    std::fs::write(&out_path, &bytes)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    Ok(serde_json::json!({
        "input": input.to_string_lossy(),
        "output": out_path.to_string_lossy(),
        "format": selection.format,
        "mime_type": selection.mime_type,
        "input_dimensions": [width, height],
        "output_dimensions": [out_width, out_height],
        "size_bytes": bytes.len(),
    }))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let summary = run(&cli)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Output: {}", summary["output"].as_str().unwrap_or_default());
        println!("MIME: {}", summary["mime_type"].as_str().unwrap_or_default());
        println!(
            "Dimensions: {}x{} -> {}x{}",
            summary["input_dimensions"][0],
            summary["input_dimensions"][1],
            summary["output_dimensions"][0],
            summary["output_dimensions"][1]
        );
    }

    Ok(())
}
