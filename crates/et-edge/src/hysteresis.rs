//! Two-threshold classification with 8-connected region growing.
//!
//! Output levels:
//! - [`BACKGROUND`] for values `<= lower`,
//! - [`WEAK`] for values in `(lower, upper]` not connected to a strong pixel,
//! - [`EDGE`] for strong pixels and every weak pixel connected to one.
//!
//! [`STRONG`] is only a transient level: the raster scan seeds each strong
//! pixel, so none remain in the output.

use et_core::{Error, Image, ImageView, ImageViewMut};

pub const BACKGROUND: f32 = 0.0;
pub const WEAK: f32 = 0.5;
pub const STRONG: f32 = 1.0;
pub const EDGE: f32 = 0.9;

pub fn hysteresis_threshold(img: &ImageView<'_, f32>, upper: f32, lower: f32) -> Image<f32> {
    let mut out = Image::new_fill(img.width(), img.height(), BACKGROUND);
    let mut view = out.as_view_mut();
    classify(img, upper, lower, &mut view);
    grow(&mut view, &mut Vec::new());
    out
}

/// In-place form writing into `out` and reusing a caller-owned work stack.
///
/// Only the `width x height` region of `out` is written; stride padding is
/// left untouched.
pub fn hysteresis_threshold_into(
    img: &ImageView<'_, f32>,
    upper: f32,
    lower: f32,
    out: &mut ImageViewMut<'_, f32>,
    stack: &mut Vec<usize>,
) -> Result<(), Error> {
    if img.dims() != out.dims() {
        return Err(Error::DimensionMismatch {
            what: "output",
            expected: img.dims(),
            actual: out.dims(),
        });
    }
    classify(img, upper, lower, out);
    grow(out, stack);
    Ok(())
}

/// Values `>= EDGE` become `true`.
pub fn binarize(classified: &Image<f32>) -> Image<bool> {
    classified.map(|&v| v >= EDGE)
}

fn classify(img: &ImageView<'_, f32>, upper: f32, lower: f32, out: &mut ImageViewMut<'_, f32>) {
    for y in 0..img.height() {
        for (d, &v) in out.row_mut(y).iter_mut().zip(img.row(y)) {
            *d = if v > lower {
                if v > upper { STRONG } else { WEAK }
            } else {
                BACKGROUND
            };
        }
    }
}

/// Stack entries are offsets into the strided buffer: `y * stride + x`.
fn grow(levels: &mut ImageViewMut<'_, f32>, stack: &mut Vec<usize>) {
    let (w, h) = levels.dims();
    let (data, stride) = levels.as_strided_mut();
    stack.clear();

    for seed in (0..h).flat_map(|y| (0..w).map(move |x| y * stride + x)) {
        if data[seed] != STRONG {
            continue;
        }
        data[seed] = EDGE;
        stack.push(seed);

        while let Some(idx) = stack.pop() {
            let x = idx % stride;
            let y = idx / stride;

            let y0 = y.saturating_sub(1);
            let y1 = (y + 1).min(h - 1);
            let x0 = x.saturating_sub(1);
            let x1 = (x + 1).min(w - 1);

            for ny in y0..=y1 {
                for nx in x0..=x1 {
                    let nidx = ny * stride + nx;
                    let v = data[nidx];
                    if v == STRONG || v == WEAK {
                        data[nidx] = EDGE;
                        stack.push(nidx);
                    }
                }
            }
        }
    }
}
