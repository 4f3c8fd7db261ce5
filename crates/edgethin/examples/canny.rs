//! Example: Canny edge detection on a PNG.
//!
//! Loads an 8-bit image, runs the Canny pipeline, and writes the edge pixels
//! (plus the thresholds actually applied) to a JSON file next to the input.
//! Timing is printed to stdout.
//!
//! Run from the workspace root:
//!   cargo run -p edgethin --example canny -- --help
//!   cargo run -p edgethin --example canny -- --input data/shapes.png

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use edgethin::{CannyConfig, GradientKernel, Image, ThresholdMode, canny_stages};
use image::ImageReader;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "Detect Canny edges in a grayscale image")]
struct Args {
    /// Path to the input PNG
    #[arg(long, default_value = "data/shapes.png")]
    input: String,

    /// Gaussian smoothing sigma
    #[arg(long, default_value_t = 1.4)]
    sigma: f32,

    /// Upper threshold (fraction of the magnitude distribution unless --absolute)
    #[arg(long, default_value_t = 0.9)]
    upper: f32,

    /// Lower threshold
    #[arg(long, default_value_t = 0.1)]
    lower: f32,

    /// Use thresholds as absolute gradient magnitudes
    #[arg(long, default_value_t = false)]
    absolute: bool,

    /// Gradient operator name
    #[arg(long, default_value = "sobel")]
    gradient: GradientKernel,

    /// Output JSON path (default: <input stem>_edges.json next to input)
    #[arg(long)]
    out: Option<String>,
}

#[derive(Serialize)]
struct EdgeResult {
    width: usize,
    height: usize,
    upper: f32,
    lower: f32,
    elapsed_ms: f64,
    /// `[x, y]` of every edge pixel in raster order.
    edges: Vec<[usize; 2]>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let img_path = &args.input;
    let out_path = args.out.unwrap_or_else(|| {
        let p = std::path::Path::new(img_path);
        let stem = p.file_stem().unwrap_or_default().to_string_lossy();
        let dir = p.parent().unwrap_or(std::path::Path::new("."));
        dir.join(format!("{stem}_edges.json"))
            .to_string_lossy()
            .into_owned()
    });

    let gray = ImageReader::open(img_path)
        .with_context(|| format!("opening {img_path}"))?
        .decode()
        .with_context(|| format!("decoding {img_path}"))?
        .into_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    let img = Image::from_vec(width, height, gray.into_raw()).context("building Image")?;

    let cfg = CannyConfig {
        sigma: args.sigma,
        upper: args.upper,
        lower: args.lower,
        thresholds: if args.absolute {
            ThresholdMode::Absolute
        } else {
            ThresholdMode::Percentile
        },
        gradient: args.gradient,
        ..CannyConfig::default()
    };
    println!(
        "loaded {img_path}: {width}x{height}, sigma={:.2}, gradient={}",
        cfg.sigma,
        cfg.gradient.name()
    );

    let t0 = Instant::now();
    let stages = canny_stages(&img.as_view(), &cfg).context("running canny")?;
    let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

    let edges: Vec<[usize; 2]> = stages
        .edges
        .data()
        .iter()
        .enumerate()
        .filter(|&(_, &e)| e)
        .map(|(i, _)| [i % width, i / width])
        .collect();
    println!(
        "{} edge pixels, thresholds upper={:.4} lower={:.4} ({elapsed_ms:.2} ms)",
        edges.len(),
        stages.upper,
        stages.lower
    );

    let result = EdgeResult {
        width,
        height,
        upper: stages.upper,
        lower: stages.lower,
        elapsed_ms,
        edges,
    };
    let out_file =
        std::fs::File::create(&out_path).with_context(|| format!("creating {out_path}"))?;
    serde_json::to_writer_pretty(out_file, &result)
        .with_context(|| format!("writing JSON to {out_path}"))?;

    println!("results written to {out_path}");
    Ok(())
}
