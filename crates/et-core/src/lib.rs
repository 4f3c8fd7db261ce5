//! Foundational primitives for edge thinning.
//!
//! ## Image Views and Stride
//! Images are stored x-fastest. `stride` is the distance, in elements,
//! between adjacent row starts and may be greater than `width`, which allows
//! borrowed views over padded buffers and subviews.
//!
//! ## Border Modes
//! Out-of-range coordinates are resolved with [`BorderMode`]: replicate
//! (clamp), constant fill, reflect-101, symmetric and circular.
//! [`BorderIndex`] precomputes the remapping for one axis so hot loops only
//! do a table lookup.
//!
//! ## Coordinates
//! Images are indexed `(x, y)` with `x` the column. Subpixel results use
//! [`Point`] in `(row, col)` order.

mod border;
mod error;
mod geom;
mod image;
mod pixel;
mod stats;

pub use border::{BorderIndex, BorderMode, map_index};
pub use error::Error;
pub use geom::Point;
pub use image::{Image, ImageView, ImageViewMut, rgb_to_gray, to_f32, to_intensity};
pub use pixel::Pixel;
pub use stats::percentile;
