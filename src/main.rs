use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use anyhow::Context;
use clap::Parser;

mod adjust;
mod batch;
mod colorspace;
mod config;
mod detect;
mod error;
mod helpers;
mod process;

use config::{BatchConfig, MaskMode, SkinToneConfig};

/// Detects skin-colored pixels and boosts their saturation and brightness,
/// writing `processed_<name>` copies of every image in a folder.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Folder with the images to process, asked for interactively if omitted
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,
    /// Folder the processed images are written to, created if missing
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
    /// JSON file with thresholds and offsets
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,
    /// Adjust every pixel (global) or only detected skin (skin)
    #[arg(short = 'm', long, value_enum)]
    mask_mode: Option<MaskMode>,
    /// Worker threads, 0 uses all cores
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,
    /// Write a JSON summary of the run
    #[arg(short = 'r', long)]
    report: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Args = Args::parse();

    let interactive = args.input.is_none() || args.output.is_none();
    if interactive {
        println!("Welcome to the Batch Image Processor!");
    }
    let input_dir = match args.input {
        Some(path) => path,
        None => prompt_path("Enter the full path to the folder with images to process: ")?,
    };
    let output_dir = match args.output {
        Some(path) => path,
        None => prompt_path("Enter the full path to the folder where processed images should be saved: ")?,
    };

    let mut tone = match &args.config {
        Some(path) => helpers::load_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SkinToneConfig::new(),
    };
    if let Some(mask_mode) = args.mask_mode {
        tone.mask_mode = mask_mode;
    }
    log::debug!("{tone:?}");

    let config = BatchConfig { tone, jobs: args.jobs, ..BatchConfig::new(input_dir, output_dir) };
    let report = batch::run(&config)?;

    if let Some(path) = args.report {
        helpers::save_json(&path, &report)
            .with_context(|| format!("writing report {}", path.display()))?;
        log::info!("report written to {}", path.display());
    }
    Ok(())
}

fn prompt_path(prompt: &str) -> anyhow::Result<PathBuf> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    anyhow::ensure!(!line.is_empty(), "no path given");
    Ok(PathBuf::from(line))
}
