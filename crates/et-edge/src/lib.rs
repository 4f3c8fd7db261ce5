//! Edge thinning and Canny edge detection on 2D grids.
//!
//! Coordinates follow the pixel-center convention: sample `(x, y)` sits at
//! column `x`, row `y`, with rows growing downward. Gradient angles are
//! measured counter-clockwise from the column axis, so a gradient pointing
//! up has angle `π/2`.
//!
//! The core is [`non_max_suppress`]: each pixel is compared with two
//! bilinearly interpolated neighbours along its gradient direction, looked up
//! through an [`AngleOffsetTable`] of precomputed offsets. [`canny`] chains
//! smoothing, gradients, suppression and [`hysteresis_threshold`].

pub mod canny;
pub mod conv1d;
pub mod gradient;
pub mod hysteresis;
pub mod kernels1d;
pub mod nms;
pub mod offsets;
pub mod polar;
pub mod sampler;
pub mod smooth;

pub use canny::{CannyConfig, CannyStages, ThresholdMode, canny, canny_stages};
pub use gradient::{GradientKernel, Gradients, gradients};
pub use hysteresis::{binarize, hysteresis_threshold, hysteresis_threshold_into};
pub use kernels1d::GaussianKernel1D;
pub use nms::{AxisOrder, NmsConfig, NmsOutput, non_max_suppress, non_max_suppress_into};
pub use offsets::{AngleOffsetTable, CoordOffset};
pub use polar::{magnitude, magnitude_phase, orientation, phase};
pub use sampler::{BilinearSample, BorderLookup, sample_bilinear};
pub use smooth::gaussian_blur;
