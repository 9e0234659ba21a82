use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use image_resizer_rust::{
    compress, default_output_name, CompressOptions, CompressionRequest, ImageEncoder,
    OutputFormat, ResizeTarget, SourceImage, Termination, KIB,
};

/// Resize and re-encode an image to a target file size
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image
    input: PathBuf,

    /// Output file (default: ImageResizer_<name>.<ext> next to the input)
    output: Option<PathBuf>,

    /// Target size in KB (1 KB = 1024 bytes)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    target_kb: u64,

    /// Output format (default: from the output extension, else jpeg)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output width in pixels (ignored for pdf)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (ignored for pdf)
    #[arg(long)]
    height: Option<u32>,

    /// Do not derive the missing side from the aspect ratio
    #[arg(long)]
    unlock_aspect: bool,

    /// Encode attempts for the quality search
    #[arg(long, default_value_t = 20)]
    max_attempts: u32,

    /// Quality interval width at which the search stops
    #[arg(long, default_value_t = 0.01)]
    tolerance: f32,
}

fn output_path(input: &Path, output: Option<&Path>, format: OutputFormat) -> PathBuf {
    if let Some(path) = output {
        return path.to_path_buf();
    }
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    input.with_file_name(default_output_name(stem, format))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let format = args
        .format
        .or_else(|| args.output.as_deref().and_then(OutputFormat::from_path))
        .unwrap_or(OutputFormat::Jpeg);
    let output = output_path(&args.input, args.output.as_deref(), format);

    println!("Loading image: {:?}", args.input);
    let start = Instant::now();
    let source = SourceImage::open(&args.input)
        .with_context(|| format!("Failed to load {:?}", args.input))?;
    let original_size = std::fs::metadata(&args.input)?.len();
    if let Some(natural) = source.natural_size() {
        println!(
            "Loaded {}x{} in {:.2?}",
            natural.width,
            natural.height,
            start.elapsed()
        );
    }

    let target = ResizeTarget {
        width: args.width,
        height: args.height,
        lock_aspect: !args.unlock_aspect,
    };
    let size = target.resolve(source.natural_size());

    let mut options = CompressOptions::default();
    options.quality.max_attempts = args.max_attempts;
    options.quality.tolerance = args.tolerance;

    let request =
        CompressionRequest::new(source, format, args.target_kb * KIB).with_output_size(size);
    let start = Instant::now();
    let result = compress(&ImageEncoder, &request, &options)
        .with_context(|| format!("Failed to compress to {}", format))?;
    println!("Compressed in {:.2?}", start.elapsed());

    std::fs::write(&output, &result.bytes)
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "Output: {:?} ({}x{})",
        output, result.size.width, result.size.height
    );
    match result.scale {
        Some(scale) => println!(
            "Scale {:.3}, JPEG quality {:.3}, {} attempts",
            scale, result.quality, result.attempts
        ),
        None => println!("Quality {:.3}, {} attempts", result.quality, result.attempts),
    }
    println!("Original size: {:.2} KB", original_size as f64 / KIB as f64);
    println!("New size:      {:.2} KB", result.size_bytes() as f64 / KIB as f64);
    println!("Target:        {} KB", args.target_kb);

    if result.termination == Termination::Exhausted || result.exceeds_target {
        eprintln!(
            "Warning: target not reached exactly, result is off by {} bytes",
            result.delta
        );
    }

    Ok(())
}
