//! Per-pixel polar form of a gradient field.
//!
//! Components whose magnitudes are both at most `sqrt(f32::EPSILON)` are
//! treated as a flat region and given angle `0`. Angles lie in `(-π, π]`.

use std::f32::consts::PI;

use et_core::{Error, Image, ImageView};

fn flat(gx: f32, gy: f32) -> bool {
    let eps = f32::EPSILON.sqrt();
    gx.abs() <= eps && gy.abs() <= eps
}

/// `atan2` folded into `(-π, π]`: a signed zero or an underflowing `y`
/// can otherwise land exactly on `-π`.
fn angle(y: f32, x: f32) -> f32 {
    let a = y.atan2(x);
    if a <= -PI { PI } else { a }
}

fn zip_map(
    gx: &ImageView<'_, f32>,
    gy: &ImageView<'_, f32>,
    f: impl Fn(f32, f32) -> f32,
) -> Result<Image<f32>, Error> {
    if gx.dims() != gy.dims() {
        return Err(Error::DimensionMismatch {
            what: "gy",
            expected: gx.dims(),
            actual: gy.dims(),
        });
    }
    let (w, h) = gx.dims();
    let mut out = Image::new_fill(w, h, 0.0f32);
    for y in 0..h {
        let dst = &mut out.data_mut()[y * w..(y + 1) * w];
        for ((d, &a), &b) in dst.iter_mut().zip(gx.row(y)).zip(gy.row(y)) {
            *d = f(a, b);
        }
    }
    Ok(out)
}

/// `hypot(gx, gy)`.
pub fn magnitude(gx: &ImageView<'_, f32>, gy: &ImageView<'_, f32>) -> Result<Image<f32>, Error> {
    zip_map(gx, gy, f32::hypot)
}

/// `atan2(-gy, gx)`: the gradient angle counter-clockwise from the column
/// axis, with rows growing downward.
pub fn phase(gx: &ImageView<'_, f32>, gy: &ImageView<'_, f32>) -> Result<Image<f32>, Error> {
    zip_map(gx, gy, |a, b| if flat(a, b) { 0.0 } else { angle(-b, a) })
}

/// `atan2(gx, gy)`: the angle of the edge tangent. Note this is not the
/// negation of [`phase`].
pub fn orientation(gx: &ImageView<'_, f32>, gy: &ImageView<'_, f32>) -> Result<Image<f32>, Error> {
    zip_map(gx, gy, |a, b| if flat(a, b) { 0.0 } else { angle(a, b) })
}

/// [`magnitude`] and [`phase`] in one pass.
pub fn magnitude_phase(
    gx: &ImageView<'_, f32>,
    gy: &ImageView<'_, f32>,
) -> Result<(Image<f32>, Image<f32>), Error> {
    Ok((magnitude(gx, gy)?, phase(gx, gy)?))
}
