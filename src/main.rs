//! Zorya CLI - DDS texture inspection and PNG conversion.
//!
//! This is the main entry point for the Zorya command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use walkdir::WalkDir;

use zorya_dds::{decode, DdsFormat, DdsHeader, DecodedImage, PIXEL_DATA_OFFSET};

/// Upper bound on either image dimension before decoding.
///
/// A malformed header can declare absurd dimensions; decoding those would
/// allocate width * height * 4 bytes from attacker-controlled input.
const MAX_DIMENSION: u32 = 16384;

/// Zorya - DDS texture inspection and conversion tool
#[derive(Parser)]
#[command(name = "zorya")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header information for a DDS file
    Info {
        /// Path to the DDS file
        input: PathBuf,
    },

    /// Convert a DDS file to PNG
    Convert {
        /// Input DDS file
        input: PathBuf,

        /// Output PNG file (defaults to the input path with a .png extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert every DDS file under a directory to PNG
    BatchConvert {
        /// Input directory
        #[arg(short, long, env = "INPUT_FOLDER")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Only convert files whose path contains this substring
        #[arg(short, long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }
        Commands::Convert { input, output } => {
            cmd_convert(&input, output.as_deref())?;
        }
        Commands::BatchConvert { input, output, filter } => {
            cmd_batch_convert(&input, &output, filter.as_deref())?;
        }
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<()> {
    let data = fs::read(input).context("Failed to read input file")?;
    let header = DdsHeader::parse(&data)?;

    let format = header.format();
    let width = header.width;
    let height = header.height;
    let mipmap_count = header.mipmap_count;
    let depth = header.depth;

    println!("File:       {}", input.display());
    println!("File size:  {} bytes", data.len());
    println!("Dimensions: {}x{}", width, height);
    println!("Mipmaps:    {}", mipmap_count);
    println!("Format:     {} ({})", format, format.description());
    if format == DdsFormat::Unknown {
        let four_cc = header.pixel_format.four_cc;
        println!("FourCC:     {}", four_cc);
    }
    if header.is_cubemap() {
        println!("Layout:     cubemap");
    }
    if header.is_volume() {
        println!("Layout:     volume texture, depth {}", depth);
    }

    if let Some(expected) = format.data_size(width, height) {
        let available = data.len().saturating_sub(PIXEL_DATA_OFFSET);
        println!("Payload:    {} bytes present, {} expected for level 0", available, expected);
    }
    println!("Decodable:  {}", if format.is_supported() { "yes" } else { "no" });

    Ok(())
}

fn cmd_convert(input: &Path, output: Option<&Path>) -> Result<()> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("png"),
    };

    let start = Instant::now();
    let image = load_and_decode(input)?;
    write_png(image, &output)?;

    println!("Wrote {} in {:?}", output.display(), start.elapsed());

    Ok(())
}

fn cmd_batch_convert(input: &Path, output: &Path, filter: Option<&str>) -> Result<()> {
    let files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("dds"))
                .unwrap_or(false)
        })
        .filter(|path| {
            filter
                .map(|pattern| path.to_string_lossy().contains(pattern))
                .unwrap_or(true)
        })
        .collect();

    if files.is_empty() {
        println!("No DDS files found under {}", input.display());
        return Ok(());
    }

    println!("Converting {} files...", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    fs::create_dir_all(output)?;

    let start = Instant::now();
    let failures = AtomicUsize::new(0);

    files.par_iter().for_each(|path| {
        if let Err(err) = convert_one(path, input, output) {
            failures.fetch_add(1, Ordering::Relaxed);
            pb.println(format!("{}: {:#}", path.display(), err));
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");

    let failed = failures.load(Ordering::Relaxed);
    println!(
        "Converted {} files in {:?} ({} failed)",
        files.len() - failed,
        start.elapsed(),
        failed
    );

    Ok(())
}

fn convert_one(path: &Path, input_root: &Path, output_root: &Path) -> Result<()> {
    let relative = path.strip_prefix(input_root).unwrap_or(path);
    let output_path = output_root.join(relative).with_extension("png");

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let image = load_and_decode(path)?;
    write_png(image, &output_path)
}

/// Read a DDS file and decode it to RGBA, with dimension bounding and a
/// payload-size warning the decoder itself does not enforce.
fn load_and_decode(path: &Path) -> Result<DecodedImage> {
    let data = fs::read(path).context("Failed to read input file")?;
    let header = DdsHeader::parse(&data)?;

    let width = header.width;
    let height = header.height;
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        bail!(
            "image dimensions {}x{} exceed the {} pixel limit",
            width,
            height,
            MAX_DIMENSION
        );
    }

    let format = header.format();
    if format.is_compressed() {
        if let Some(expected) = format.data_size(width, height) {
            let available = data.len().saturating_sub(PIXEL_DATA_OFFSET);
            if available < expected {
                // The decoder skips missing blocks; surface it anyway.
                eprintln!(
                    "warning: {} has {} of {} expected payload bytes, missing blocks stay transparent",
                    path.display(),
                    available,
                    expected
                );
            }
        }
    }

    Ok(decode(&data, format, width, height, PIXEL_DATA_OFFSET)?)
}

fn write_png(image: DecodedImage, path: &Path) -> Result<()> {
    if image.pixels.is_empty() {
        bail!("decoded image is empty ({}x{})", image.width, image.height);
    }

    let raster = image::RgbaImage::from_raw(image.width, image.height, image.pixels)
        .context("Decoded pixel buffer does not match its dimensions")?;
    raster
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
