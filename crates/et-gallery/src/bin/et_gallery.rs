use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use et_core::{BorderMode, Image, Point, to_intensity};
use et_edge::{
    AxisOrder, CannyConfig, GradientKernel, NmsConfig, ThresholdMode, canny_stages, gradients,
    hysteresis_threshold, magnitude, magnitude_phase, non_max_suppress, orientation,
};
use image::{GrayImage, Rgb, RgbImage};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "et_gallery")]
#[command(about = "Run edge thinning stages on PNG fixtures")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(name = "gradients")]
    Gradients(GradientArgs),
    #[command(name = "nms")]
    Nms(NmsArgs),
    #[command(name = "hysteresis")]
    Hysteresis(HysteresisArgs),
    #[command(name = "canny")]
    Canny(CannyArgs),
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, default_value = "docs/fig/raw")]
    out: PathBuf,
    /// replicate | reflect | symmetric | circular | constant
    #[arg(long, default_value = "replicate")]
    border: BorderMode<f32>,
    /// sobel | prewitt | ando3 | ando4 | ando4_sep | ando5 | ando5_sep
    #[arg(long, default_value = "sobel")]
    gradient: GradientKernel,
}

#[derive(Args, Debug, Clone)]
struct GradientArgs {
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
struct NmsArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 1.35)]
    radius: f32,
    /// Angular step of the offset table, in degrees.
    #[arg(long, default_value_t = 1.0)]
    theta_deg: f32,
    #[arg(long, default_value_t = false)]
    subpixel: bool,
    /// Treat the image x axis as spatial rows.
    #[arg(long, default_value_t = false)]
    transposed: bool,
}

#[derive(Args, Debug, Clone)]
struct HysteresisArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Absolute threshold on the gradient magnitude.
    #[arg(long, default_value_t = 0.2)]
    upper: f32,
    #[arg(long, default_value_t = 0.05)]
    lower: f32,
}

#[derive(Args, Debug, Clone)]
struct CannyArgs {
    #[command(flatten)]
    common: CommonArgs,
    #[arg(long, default_value_t = 1.4)]
    sigma: f32,
    #[arg(long, default_value_t = 0.9)]
    upper: f32,
    #[arg(long, default_value_t = 0.1)]
    lower: f32,
    /// Interpret thresholds as absolute magnitudes instead of percentiles.
    #[arg(long, default_value_t = false)]
    absolute: bool,
}

#[derive(Debug, Clone, Serialize)]
struct MetaGradients {
    border: &'static str,
    gradient: &'static str,
    max_magnitude: f32,
}

#[derive(Debug, Clone, Serialize)]
struct LocationDto {
    x: usize,
    y: usize,
    row: f32,
    col: f32,
    value: f32,
}

#[derive(Debug, Clone, Serialize)]
struct MetaNms {
    border: &'static str,
    gradient: &'static str,
    radius: f32,
    theta_deg: f32,
    subpixel: bool,
    axis_order: &'static str,
    kept: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaHysteresis {
    border: &'static str,
    gradient: &'static str,
    upper: f32,
    lower: f32,
    edges: usize,
    weak: usize,
}

#[derive(Debug, Clone, Serialize)]
struct MetaCanny {
    border: &'static str,
    gradient: &'static str,
    sigma: f32,
    thresholds: &'static str,
    requested_upper: f32,
    requested_lower: f32,
    applied_upper: f32,
    applied_lower: f32,
    edges: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Gradients(args) => run_gradients(args),
        Command::Nms(args) => run_nms(args),
        Command::Hysteresis(args) => run_hysteresis(args),
        Command::Canny(args) => run_canny(args),
    }
}

fn run_gradients(args: GradientArgs) -> Result<()> {
    let (case_dir, img) = prepare_case(&args.common, "gradients")?;
    let g = gradients(&img.as_view(), args.common.gradient, &args.common.border);
    let mag = magnitude(&g.gx.as_view(), &g.gy.as_view())?;
    let orient = orientation(&g.gx.as_view(), &g.gy.as_view())?;

    save_f32_vis(case_dir.join("gx.png"), &g.gx)?;
    save_f32_vis(case_dir.join("gy.png"), &g.gy)?;
    save_f32_vis(case_dir.join("magnitude.png"), &mag)?;
    save_f32_vis(case_dir.join("orientation.png"), &orient)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaGradients {
            border: args.common.border.name(),
            gradient: args.common.gradient.name(),
            max_magnitude: mag.data().iter().copied().fold(0.0, f32::max),
        },
    )
}

fn run_nms(args: NmsArgs) -> Result<()> {
    let (case_dir, img) = prepare_case(&args.common, "nms")?;
    let g = gradients(&img.as_view(), args.common.gradient, &args.common.border);
    let (mag, phase) = magnitude_phase(&g.gx.as_view(), &g.gy.as_view())?;

    let cfg = NmsConfig {
        radius: args.radius,
        theta: args.theta_deg.to_radians(),
        border: args.common.border.clone(),
        subpixel: args.subpixel,
        axis_order: if args.transposed {
            AxisOrder::Transposed
        } else {
            AxisOrder::RowMajor
        },
    };
    let out = non_max_suppress(&mag.as_view(), &phase.as_view(), &cfg)
        .context("running non-maximal suppression")?;
    let kept = out.thinned.data().iter().filter(|&&v| v != 0.0).count();
    info!(kept, "suppression done");

    save_f32_vis(case_dir.join("magnitude.png"), &mag)?;
    save_f32_vis(case_dir.join("thinned.png"), &out.thinned)?;

    if let Some(locations) = &out.locations {
        let dtos = location_dtos(&out.thinned, locations);
        save_rgb(
            case_dir.join("overlay.png"),
            &render_overlay(&img, &dtos, args.transposed),
        )?;
        write_json(case_dir.join("locations.json"), &dtos)?;
    }

    write_json(
        case_dir.join("meta.json"),
        &MetaNms {
            border: cfg.border.name(),
            gradient: args.common.gradient.name(),
            radius: cfg.radius,
            theta_deg: args.theta_deg,
            subpixel: cfg.subpixel,
            axis_order: if args.transposed {
                "transposed"
            } else {
                "row_major"
            },
            kept,
        },
    )
}

fn run_hysteresis(args: HysteresisArgs) -> Result<()> {
    let (case_dir, img) = prepare_case(&args.common, "hysteresis")?;
    if args.lower > args.upper {
        bail!(
            "lower threshold {} exceeds upper threshold {}.",
            args.lower,
            args.upper
        );
    }

    let g = gradients(&img.as_view(), args.common.gradient, &args.common.border);
    let (mag, phase) = magnitude_phase(&g.gx.as_view(), &g.gy.as_view())?;
    let thinned = non_max_suppress(&mag.as_view(), &phase.as_view(), &NmsConfig::default())
        .context("running non-maximal suppression")?
        .thinned;
    let classified = hysteresis_threshold(&thinned.as_view(), args.upper, args.lower);

    save_f32_vis(case_dir.join("thinned.png"), &thinned)?;
    save_f32_vis(case_dir.join("classified.png"), &classified)?;

    write_json(
        case_dir.join("meta.json"),
        &MetaHysteresis {
            border: args.common.border.name(),
            gradient: args.common.gradient.name(),
            upper: args.upper,
            lower: args.lower,
            edges: count_where(&classified, |v| v == et_edge::hysteresis::EDGE),
            weak: count_where(&classified, |v| v == et_edge::hysteresis::WEAK),
        },
    )
}

fn run_canny(args: CannyArgs) -> Result<()> {
    let (case_dir, img) = prepare_case(&args.common, "canny")?;

    let cfg = CannyConfig {
        sigma: args.sigma,
        upper: args.upper,
        lower: args.lower,
        thresholds: if args.absolute {
            ThresholdMode::Absolute
        } else {
            ThresholdMode::Percentile
        },
        gradient: args.common.gradient,
        border: args.common.border.clone(),
        ..CannyConfig::default()
    };
    let stages = canny_stages(&img.as_view(), &cfg).context("running canny")?;
    let edges = stages.edges.data().iter().filter(|&&e| e).count();
    info!(edges, upper = stages.upper, lower = stages.lower, "canny done");

    save_f32_vis(case_dir.join("smoothed.png"), &stages.smoothed)?;
    save_f32_vis(case_dir.join("magnitude.png"), &stages.magnitude)?;
    save_f32_vis(case_dir.join("phase.png"), &stages.phase)?;
    save_f32_vis(case_dir.join("thinned.png"), &stages.thinned)?;
    save_luma_raw(
        case_dir.join("edges.png"),
        stages.edges.width(),
        stages.edges.height(),
        stages.edges.data().iter().map(|&e| if e { 255 } else { 0 }).collect(),
    )?;

    write_json(
        case_dir.join("meta.json"),
        &MetaCanny {
            border: cfg.border.name(),
            gradient: cfg.gradient.name(),
            sigma: cfg.sigma,
            thresholds: match cfg.thresholds {
                ThresholdMode::Percentile => "percentile",
                ThresholdMode::Absolute => "absolute",
            },
            requested_upper: cfg.upper,
            requested_lower: cfg.lower,
            applied_upper: stages.upper,
            applied_lower: stages.lower,
            edges,
        },
    )
}

fn prepare_case(common: &CommonArgs, case_name: &str) -> Result<(PathBuf, Image<f32>)> {
    ensure_file_exists(&common.input, "input")?;

    let case_dir = common.out.join(case_name);
    fs::create_dir_all(&case_dir)
        .with_context(|| format!("creating output directory {}", case_dir.display()))?;

    fs::copy(&common.input, case_dir.join("input.png")).with_context(|| {
        format!(
            "copying input {} -> {}",
            common.input.display(),
            case_dir.join("input.png").display()
        )
    })?;

    let img = load_input_u8(&common.input)?;
    info!(
        case = case_name,
        width = img.width(),
        height = img.height(),
        "loaded input"
    );
    Ok((case_dir, to_intensity(&img.as_view())))
}

fn load_input_u8(path: &Path) -> Result<Image<u8>> {
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing et-core image from {}", path.display()))
}

fn location_dtos(thinned: &Image<f32>, locations: &Image<Point>) -> Vec<LocationDto> {
    let (w, h) = thinned.dims();
    let mut out = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let value = thinned.data()[y * w + x];
            if value == 0.0 {
                continue;
            }
            let p = locations.data()[y * w + x];
            out.push(LocationDto {
                x,
                y,
                row: p.row,
                col: p.col,
                value,
            });
        }
    }
    out
}

fn count_where(img: &Image<f32>, f: impl Fn(f32) -> bool) -> usize {
    img.data().iter().filter(|&&v| f(v)).count()
}

fn save_f32_vis(path: PathBuf, img: &Image<f32>) -> Result<()> {
    save_luma_raw(path, img.width(), img.height(), f32_to_u8_vis(img.data()))
}

fn save_luma_raw(path: PathBuf, width: usize, height: usize, data: Vec<u8>) -> Result<()> {
    let gray = GrayImage::from_raw(width as u32, height as u32, data)
        .context("constructing GrayImage from raw bytes")?;
    gray.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn save_rgb(path: PathBuf, img: &RgbImage) -> Result<()> {
    img.save(&path)
        .with_context(|| format!("saving image {}", path.display()))
}

fn f32_to_u8_vis(data: &[f32]) -> Vec<u8> {
    if data.is_empty() {
        return Vec::new();
    }

    let (min_v, max_v) = data
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if (max_v - min_v).abs() < 1e-12 {
        return vec![0u8; data.len()];
    }

    let scale = 255.0 / (max_v - min_v);
    data.iter()
        .map(|&v| ((v - min_v) * scale).round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Grayscale input with each refined location marked in red.
fn render_overlay(input: &Image<f32>, locations: &[LocationDto], transposed: bool) -> RgbImage {
    let mut rgb = RgbImage::from_fn(input.width() as u32, input.height() as u32, |x, y| {
        let v = input
            .get(x as usize, y as usize)
            .map_or(0, |&v| (v * 255.0).round().clamp(0.0, 255.0) as u8);
        Rgb([v, v, v])
    });

    for loc in locations {
        // Transposed images hold spatial rows along x.
        let (x, y) = if transposed {
            (loc.row, loc.col)
        } else {
            (loc.col, loc.row)
        };
        put_dot(&mut rgb, x, y, Rgb([255, 64, 64]));
    }

    rgb
}

fn put_dot(img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>) {
    let (xi, yi) = (x.round() as i64, y.round() as i64);
    if xi < 0 || yi < 0 {
        return;
    }
    let (ux, uy) = (xi as u32, yi as u32);
    if ux < img.width() && uy < img.height() {
        img.put_pixel(ux, uy, color);
    }
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
