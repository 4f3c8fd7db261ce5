//! Canny edge detection.
//!
//! Pipeline: normalize to intensity, Gaussian blur, gradients, magnitude and
//! phase, non-maximal suppression, hysteresis, binarize.

use et_core::{BorderMode, Error, Image, ImageView, Pixel, percentile, to_intensity};
use tracing::{debug, instrument, trace};

use crate::gradient::{GradientKernel, gradients};
use crate::hysteresis::{binarize, hysteresis_threshold};
use crate::nms::{NmsConfig, non_max_suppress};
use crate::polar::magnitude_phase;
use crate::smooth::gaussian_blur;

/// How `upper` and `lower` in [`CannyConfig`] are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// Fractions in `[0, 1]` of the suppressed magnitude distribution,
    /// zeros included.
    #[default]
    Percentile,
    /// Magnitude values used as-is.
    Absolute,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CannyConfig {
    pub sigma: f32,
    pub upper: f32,
    pub lower: f32,
    pub thresholds: ThresholdMode,
    pub gradient: GradientKernel,
    /// Border handling for blur and gradients.
    pub border: BorderMode<f32>,
    /// Suppression settings. `subpixel` is ignored.
    pub nms: NmsConfig,
}

impl Default for CannyConfig {
    fn default() -> Self {
        Self {
            sigma: 1.4,
            upper: 0.9,
            lower: 0.1,
            thresholds: ThresholdMode::Percentile,
            gradient: GradientKernel::Sobel,
            border: BorderMode::Clamp,
            nms: NmsConfig::default(),
        }
    }
}

/// Every intermediate grid of one [`canny_stages`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct CannyStages {
    pub smoothed: Image<f32>,
    pub gx: Image<f32>,
    pub gy: Image<f32>,
    pub magnitude: Image<f32>,
    pub phase: Image<f32>,
    pub thinned: Image<f32>,
    /// Absolute thresholds actually applied.
    pub upper: f32,
    pub lower: f32,
    pub classified: Image<f32>,
    pub edges: Image<bool>,
}

pub fn canny<T: Pixel>(img: &ImageView<'_, T>, cfg: &CannyConfig) -> Result<Image<bool>, Error> {
    canny_stages(img, cfg).map(|stages| stages.edges)
}

#[instrument(level = "debug", skip_all, fields(w = img.width(), h = img.height()))]
pub fn canny_stages<T: Pixel>(
    img: &ImageView<'_, T>,
    cfg: &CannyConfig,
) -> Result<CannyStages, Error> {
    if cfg.thresholds == ThresholdMode::Percentile {
        for p in [cfg.upper, cfg.lower] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::InvalidPercentile(p * 100.0));
            }
        }
    }

    let intensity = to_intensity(img);
    let smoothed = gaussian_blur(&intensity.as_view(), cfg.sigma, &cfg.border)?;
    trace!(sigma = cfg.sigma, "smoothed");

    let g = gradients(&smoothed.as_view(), cfg.gradient, &cfg.border);
    let (magnitude, phase) = magnitude_phase(&g.gx.as_view(), &g.gy.as_view())?;
    trace!(kernel = cfg.gradient.name(), "gradients");

    let nms = NmsConfig {
        subpixel: false,
        ..cfg.nms.clone()
    };
    let thinned = non_max_suppress(&magnitude.as_view(), &phase.as_view(), &nms)?.thinned;

    let (upper, lower) = match cfg.thresholds {
        ThresholdMode::Absolute => (cfg.upper, cfg.lower),
        ThresholdMode::Percentile if thinned.is_empty() => (0.0, 0.0),
        ThresholdMode::Percentile => (
            percentile(thinned.data(), cfg.upper * 100.0)?,
            percentile(thinned.data(), cfg.lower * 100.0)?,
        ),
    };

    let classified = hysteresis_threshold(&thinned.as_view(), upper, lower);
    let edges = binarize(&classified);
    debug!(
        upper,
        lower,
        edges = edges.data().iter().filter(|&&e| e).count(),
        "canny done"
    );

    Ok(CannyStages {
        smoothed,
        gx: g.gx,
        gy: g.gy,
        magnitude,
        phase,
        thinned,
        upper,
        lower,
        classified,
        edges,
    })
}
