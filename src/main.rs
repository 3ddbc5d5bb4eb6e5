use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use doccrop::capture::ImageReference;
use doccrop::config::{load_crop_config, load_crop_config_from};
use doccrop::geometry::{CropRect, DisplayBox, DisplaySize};
use doccrop::storage::DirectoryOutput;
use doccrop::{logging, CropSession};

#[derive(Debug, Parser)]
#[command(
    name = "doccrop",
    version,
    about = "Crop a captured document photo at native resolution",
    after_help = "Examples:\n  doccrop -i scan.png\n  doccrop -i scan.png --display 400x300 --rect 50,50,200,150 -o out/"
)]
struct Args {
    /// Captured image to crop.
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the JPEG output is written to.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Size the image is displayed at, as WIDTHxHEIGHT (defaults to its natural size).
    #[arg(long, value_parser = parse_display_size)]
    display: Option<DisplaySize>,

    /// Crop rectangle in display coordinates, as X,Y,WIDTH,HEIGHT (defaults to the crop-mode rectangle).
    #[arg(long, value_parser = parse_rect)]
    rect: Option<CropRect>,

    /// Config file to use instead of $XDG_CONFIG_HOME/doccrop/config.json.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_numbers<const N: usize>(value: &str, separator: char) -> Result<[f64; N], String> {
    let parts = value
        .split(separator)
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| err.to_string())?;
    <[f64; N]>::try_from(parts).map_err(|parts| {
        format!("expected {N} values separated by '{separator}', got {}", parts.len())
    })
}

fn parse_display_size(value: &str) -> Result<DisplaySize, String> {
    let [width, height] = parse_numbers::<2>(value, 'x')?;
    let size = DisplaySize::new(width, height);
    if !size.is_laid_out() {
        return Err(format!("display size must be positive, got {value}"));
    }
    Ok(size)
}

fn parse_rect(value: &str) -> Result<CropRect, String> {
    let [x, y, width, height] = parse_numbers::<4>(value, ',')?;
    Ok(CropRect::new(x, y, width, height))
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init();

    let config = match args.config.as_deref() {
        Some(path) => load_crop_config_from(path),
        None => load_crop_config(),
    };
    let image = ImageReference::open(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let Some(natural) = image.natural_size().filter(|size| !size.is_empty()) else {
        bail!("{} decoded to an empty image", args.input.display());
    };
    let display = args.display.unwrap_or(DisplaySize::new(
        f64::from(natural.width),
        f64::from(natural.height),
    ));

    let mut session = CropSession::new(config);
    session.load_image(image)?;
    session.layout_ready(DisplayBox::new(0.0, 0.0, display.width, display.height))?;
    session
        .enable_crop_mode()?
        .context("crop rectangle was not initialized")?;
    if let Some(rect) = args.rect {
        session.set_crop_rectangle(rect);
    }
    tracing::info!(rect = ?session.crop_rectangle(), "cropping");

    let mut consumer = DirectoryOutput::new(args.output_dir);
    let output = session.save(&mut consumer)?;
    let path = consumer
        .saved_paths()
        .last()
        .context("output consumer recorded no file")?;
    println!("{} ({}x{})", path.display(), output.width, output.height);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_size_reads_width_and_height() {
        assert_eq!(
            parse_display_size("400x300").expect("size should parse"),
            DisplaySize::new(400.0, 300.0)
        );
        assert!(parse_display_size("400").is_err());
        assert!(parse_display_size("0x300").is_err());
    }

    #[test]
    fn parse_rect_reads_four_values() {
        assert_eq!(
            parse_rect("50, 50, 200.5, 150").expect("rect should parse"),
            CropRect::new(50.0, 50.0, 200.5, 150.0)
        );
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
    }
}
