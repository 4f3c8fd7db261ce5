//! Non-maximal suppression along a per-pixel gradient direction.
//!
//! Each non-zero pixel is compared against two bilinearly interpolated
//! neighbours at distance `radius`, one on each side along its direction. It
//! survives only if it is strictly greater than both and at least as large as
//! the nearer adjacent pixel on each side. Surviving pixels can optionally be
//! localized to subpixel precision by fitting a parabola through the three
//! samples.
//!
//! Pixels are decided independently, so row order does not affect the
//! result. With the `parallel` feature rows are processed with rayon.

use std::f32::consts::PI;

use et_core::{BorderMode, Error, Image, ImageView, ImageViewMut, Pixel, Point};
use tracing::{debug, instrument};

use crate::offsets::AngleOffsetTable;
use crate::sampler::{BorderLookup, sample_bilinear};

/// Which image axis holds spatial rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisOrder {
    /// `x` is the column axis, `y` the row axis (rows grow downward).
    #[default]
    RowMajor,
    /// `x` holds spatial rows, e.g. a view over a column-major buffer.
    Transposed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NmsConfig {
    /// Sampling distance along the direction, in pixels. Must be `>= 1`.
    pub radius: f32,
    /// Angular step of the direction table, in radians.
    pub theta: f32,
    pub border: BorderMode<f32>,
    /// Allocate and fill a subpixel location grid in [`non_max_suppress`].
    pub subpixel: bool,
    pub axis_order: AxisOrder,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            radius: 1.35,
            theta: PI / 180.0,
            border: BorderMode::Clamp,
            subpixel: false,
            axis_order: AxisOrder::RowMajor,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NmsOutput<T> {
    pub thinned: Image<T>,
    /// Refined `(row, col)` of each surviving pixel; `Point::ZERO` elsewhere.
    pub locations: Option<Image<Point>>,
}

/// Allocating form of [`non_max_suppress_into`].
pub fn non_max_suppress<T: Pixel>(
    img: &ImageView<'_, T>,
    angles: &ImageView<'_, f32>,
    cfg: &NmsConfig,
) -> Result<NmsOutput<T>, Error> {
    let (w, h) = img.dims();
    let mut thinned = Image::new_fill(w, h, T::ZERO);
    let mut locations = cfg.subpixel.then(|| Image::new_fill(w, h, Point::ZERO));

    non_max_suppress_into(
        img,
        angles,
        cfg,
        &mut thinned.as_view_mut(),
        locations.as_mut().map(|l| l.as_view_mut()).as_mut(),
    )?;

    Ok(NmsOutput { thinned, locations })
}

/// Thins `img` into `out`, refining positions into `locations` when given.
///
/// `angles` holds the direction per pixel in `(-π, π]`, measured
/// counter-clockwise from the column axis with rows growing downward (the
/// convention of [`crate::phase`]). Subpixel refinement runs whenever a
/// location buffer is passed, regardless of `cfg.subpixel`.
///
/// All arguments are validated before `out` or `locations` are touched.
/// Returns the number of surviving pixels.
#[instrument(level = "debug", skip_all, fields(w = img.width(), h = img.height()))]
pub fn non_max_suppress_into<T: Pixel>(
    img: &ImageView<'_, T>,
    angles: &ImageView<'_, f32>,
    cfg: &NmsConfig,
    out: &mut ImageViewMut<'_, T>,
    mut locations: Option<&mut ImageViewMut<'_, Point>>,
) -> Result<usize, Error> {
    if !(cfg.radius >= 1.0) {
        return Err(Error::InvalidRadius(cfg.radius));
    }
    check_dims("angles", img.dims(), angles.dims())?;
    check_dims("output", img.dims(), out.dims())?;
    if let Some(loc) = locations.as_deref() {
        check_dims("location", img.dims(), loc.dims())?;
    }

    let transposed = cfg.axis_order == AxisOrder::Transposed;
    let table = AngleOffsetTable::build(cfg.theta, cfg.radius, transposed)?;

    out.fill(T::ZERO);
    if let Some(loc) = locations.as_deref_mut() {
        loc.fill(Point::ZERO);
    }

    let (w, h) = img.dims();
    if w == 0 || h == 0 {
        return Ok(0);
    }

    // Offsets past the image edge resolve without the tables, so the pad
    // never needs to exceed the image.
    let pad = (cfg.radius.ceil() as usize)
        .saturating_add(1)
        .min(w.max(h) + 1);
    let suppressor = Suppressor {
        img: *img,
        angles: *angles,
        table,
        border: BorderLookup::new(w, h, pad, &cfg.border),
        transposed,
    };

    let kept = suppressor.run(out, locations);
    debug!(
        bins = suppressor.table.count(),
        kept, "non-maximal suppression done"
    );
    Ok(kept)
}

fn check_dims(
    what: &'static str,
    expected: (usize, usize),
    actual: (usize, usize),
) -> Result<(), Error> {
    if expected != actual {
        return Err(Error::DimensionMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

struct Suppressor<'a, T> {
    img: ImageView<'a, T>,
    angles: ImageView<'a, f32>,
    table: AngleOffsetTable,
    border: BorderLookup,
    transposed: bool,
}

impl<T: Pixel> Suppressor<'_, T> {
    #[cfg(not(feature = "parallel"))]
    fn run(
        &self,
        out: &mut ImageViewMut<'_, T>,
        locations: Option<&mut ImageViewMut<'_, Point>>,
    ) -> usize {
        self.run_sequential(out, locations)
    }

    #[cfg(any(test, not(feature = "parallel")))]
    fn run_sequential(
        &self,
        out: &mut ImageViewMut<'_, T>,
        mut locations: Option<&mut ImageViewMut<'_, Point>>,
    ) -> usize {
        let mut kept = 0;
        for y in 0..self.img.height() {
            let loc_row = locations.as_deref_mut().map(|l| l.row_mut(y));
            kept += self.row(y, out.row_mut(y), loc_row);
        }
        kept
    }

    #[cfg(feature = "parallel")]
    fn run(
        &self,
        out: &mut ImageViewMut<'_, T>,
        locations: Option<&mut ImageViewMut<'_, Point>>,
    ) -> usize {
        use rayon::prelude::*;

        let (w, h) = self.img.dims();
        let (out_data, out_stride) = out.as_strided_mut();
        let out_rows = out_data.par_chunks_mut(out_stride).take(h);

        match locations {
            Some(loc) => {
                let (loc_data, loc_stride) = loc.as_strided_mut();
                out_rows
                    .zip(loc_data.par_chunks_mut(loc_stride))
                    .enumerate()
                    .map(|(y, (o, l))| self.row(y, &mut o[..w], Some(&mut l[..w])))
                    .sum()
            }
            None => out_rows
                .enumerate()
                .map(|(y, o)| self.row(y, &mut o[..w], None))
                .sum(),
        }
    }

    fn row(&self, y: usize, out: &mut [T], mut locations: Option<&mut [Point]>) -> usize {
        let src = self.img.row(y);
        let angles = self.angles.row(y);
        let mut kept = 0;

        for (x, (&px, &angle)) in src.iter().zip(angles).enumerate() {
            if px.is_zero() {
                continue;
            }
            let c = px.to_f64();

            let (xo, yo) = self.table.lookup(angle);
            let fwd = sample_bilinear(&self.img, x, y, xo, yo, &self.border);
            if !(c > fwd.value && c >= fwd.min_adjacent) {
                continue;
            }
            let bwd = sample_bilinear(&self.img, x, y, xo.negate(), yo.negate(), &self.border);
            if !(c > bwd.value && c >= bwd.min_adjacent) {
                continue;
            }

            kept += 1;
            let Some(loc) = locations.as_deref_mut() else {
                out[x] = px;
                continue;
            };

            let fit = Parabola::through(bwd.value, c, fwd.value);
            let r = fit.vertex();
            let (xf, yf) = (x as f32, y as f32);
            let r32 = r as f32;
            loc[x] = if self.transposed {
                Point::new(xo.scale(r32) + xf, yo.scale(r32) + yf)
            } else {
                Point::new(yo.scale(r32) + yf, xo.scale(r32) + xf)
            };
            out[x] = if T::IS_FLOAT {
                T::from_f64(fit.eval(r))
            } else {
                px
            };
        }

        kept
    }
}

/// `a t² + b t + c` through `(-1, v_neg)`, `(0, c)`, `(1, v_pos)`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Parabola {
    a: f64,
    b: f64,
    c: f64,
}

impl Parabola {
    fn through(v_neg: f64, c: f64, v_pos: f64) -> Self {
        let a = (v_pos + v_neg) / 2.0 - c;
        let b = a + c - v_neg;
        Self { a, b, c }
    }

    /// Offset of the extremum, `0` for a degenerate (flat) fit.
    fn vertex(self) -> f64 {
        if self.a == 0.0 {
            return 0.0;
        }
        -self.b / (2.0 * self.a)
    }

    fn eval(self, t: f64) -> f64 {
        self.a * t * t + self.b * t + self.c
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use et_core::{BorderMode, Error, Image, ImageViewMut, Point};

    use super::{
        AxisOrder, NmsConfig, Parabola, Suppressor, non_max_suppress, non_max_suppress_into,
    };
    use crate::offsets::AngleOffsetTable;
    use crate::sampler::BorderLookup;

    fn vertical_profile(width: usize, profile: &[f32]) -> Image<f32> {
        Image::from_fn(width, profile.len(), |_, y| profile[y])
    }

    #[test]
    fn parabola_vertex_and_value() {
        let p = Parabola::through(1.0, 3.0, 2.0);
        let r = p.vertex();
        assert!((r - 1.0 / 6.0).abs() < 1e-6);
        assert!(p.eval(r) > 3.0);

        let flat = Parabola::through(3.0, 3.0, 3.0);
        assert_eq!(flat.vertex(), 0.0);
        assert_eq!(flat.eval(0.0), 3.0);
    }

    #[test]
    fn keeps_ridge_row_along_vertical_direction() {
        let img = vertical_profile(5, &[0.0, 1.0, 3.0, 1.0, 0.0]);
        let angles = Image::new_fill(5, 5, FRAC_PI_2);

        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &NmsConfig::default())
            .expect("valid nms");
        for y in 0..5 {
            for x in 0..5 {
                let v = *out.thinned.get(x, y).expect("in bounds");
                if y == 2 {
                    assert_eq!(v, 3.0);
                } else {
                    assert_eq!(v, 0.0, "({x}, {y})");
                }
            }
        }
        assert!(out.locations.is_none());
    }

    #[test]
    fn equal_plateau_pixels_are_not_both_kept() {
        // Two equal maxima straddling the true edge: strict `>` rejects both.
        let img = vertical_profile(3, &[0.0, 2.0, 2.0, 0.0]);
        let angles = Image::new_fill(3, 4, FRAC_PI_2);
        let cfg = NmsConfig {
            radius: 1.0,
            ..NmsConfig::default()
        };
        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &cfg).expect("valid nms");
        assert!(out.thinned.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn subpixel_shifts_toward_larger_neighbour() {
        let img = vertical_profile(3, &[0.0, 1.0, 3.0, 2.0, 0.0]);
        let angles = Image::new_fill(3, 5, FRAC_PI_2);
        let cfg = NmsConfig {
            radius: 1.0,
            subpixel: true,
            ..NmsConfig::default()
        };

        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &cfg).expect("valid nms");
        let loc = out.locations.expect("locations requested");
        let p = *loc.get(1, 2).expect("in bounds");
        // Direction π/2 points up (toward row 1), so the larger neighbour
        // below sits on the negative side of the fit.
        assert!((p.col - 1.0).abs() < 1e-5);
        assert!((p.row - (2.0 + 1.0 / 6.0)).abs() < 1e-4, "row = {}", p.row);
        assert!(*out.thinned.get(1, 2).expect("in bounds") > 3.0);
        assert_eq!(*loc.get(1, 1).expect("in bounds"), Point::ZERO);
    }

    #[test]
    fn integral_pixels_keep_unrefined_value() {
        let img = Image::from_fn(3, 5, |_, y| [0u8, 10, 30, 20, 0][y]);
        let angles = Image::new_fill(3, 5, FRAC_PI_2);
        let cfg = NmsConfig {
            radius: 1.0,
            subpixel: true,
            ..NmsConfig::default()
        };
        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &cfg).expect("valid nms");
        assert_eq!(*out.thinned.get(1, 2).expect("in bounds"), 30);
    }

    #[test]
    fn transposed_order_swaps_axes() {
        // Same ridge stored with x as the row axis.
        let img = Image::from_fn(5, 3, |x, _| [0.0f32, 1.0, 3.0, 1.0, 0.0][x]);
        let angles = Image::new_fill(5, 3, FRAC_PI_2);
        let cfg = NmsConfig {
            subpixel: true,
            axis_order: AxisOrder::Transposed,
            ..NmsConfig::default()
        };
        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &cfg).expect("valid nms");
        assert_eq!(*out.thinned.get(2, 1).expect("in bounds"), 3.0);
        assert_eq!(*out.thinned.get(1, 1).expect("in bounds"), 0.0);
        let p = *out
            .locations
            .expect("locations requested")
            .get(2, 1)
            .expect("in bounds");
        assert!((p.row - 2.0).abs() < 1e-5);
        assert!((p.col - 1.0).abs() < 1e-5);
    }

    #[test]
    fn validates_before_writing() {
        let img = Image::new_fill(4, 4, 1.0f32);
        let angles = Image::new_fill(4, 4, 0.0f32);
        let mut out = Image::new_fill(4, 4, 7.0f32);

        let small = NmsConfig {
            radius: 0.5,
            ..NmsConfig::default()
        };
        assert_eq!(
            non_max_suppress_into(
                &img.as_view(),
                &angles.as_view(),
                &small,
                &mut out.as_view_mut(),
                None
            ),
            Err(Error::InvalidRadius(0.5))
        );
        assert!(out.data().iter().all(|&v| v == 7.0));

        let mut loc = Image::new_fill(3, 4, Point::ZERO);
        let err = non_max_suppress_into(
            &img.as_view(),
            &angles.as_view(),
            &NmsConfig::default(),
            &mut out.as_view_mut(),
            Some(&mut loc.as_view_mut()),
        );
        assert!(matches!(err, Err(Error::DimensionMismatch { what: "location", .. })));

        let bad_theta = NmsConfig {
            theta: 0.0,
            ..NmsConfig::default()
        };
        assert!(
            non_max_suppress(&img.as_view(), &angles.as_view(), &bad_theta).is_err()
        );
        assert!(out.data().iter().all(|&v| v == 7.0));
    }

    #[test]
    fn f64_maxima_are_compared_at_full_precision() {
        let profile = [0.0f64, 1.0, 1.0 + 1e-9, 1.0, 0.0];
        let img = Image::from_fn(3, 5, |_, y| profile[y]);
        let angles = Image::new_fill(3, 5, FRAC_PI_2);
        let cfg = NmsConfig {
            radius: 1.0,
            ..NmsConfig::default()
        };

        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &cfg).expect("valid nms");
        assert_eq!(*out.thinned.get(1, 2).expect("in bounds"), 1.0 + 1e-9);
        assert_eq!(*out.thinned.get(1, 1).expect("in bounds"), 0.0);

        let refined = non_max_suppress(
            &img.as_view(),
            &angles.as_view(),
            &NmsConfig {
                subpixel: true,
                ..cfg
            },
        )
        .expect("valid nms");
        assert!(*refined.thinned.get(1, 2).expect("in bounds") >= 1.0 + 1e-9);
    }

    #[test]
    fn radius_far_beyond_the_image_is_handled() {
        let img = vertical_profile(3, &[0.0, 1.0, 3.0, 1.0, 0.0]);
        let angles = Image::new_fill(3, 5, FRAC_PI_2);
        let cfg = NmsConfig {
            radius: 1.0e9,
            ..NmsConfig::default()
        };
        let out = non_max_suppress(&img.as_view(), &angles.as_view(), &cfg).expect("valid nms");
        // Both samples clamp to the zero rows at the image edges.
        for y in 0..5 {
            let expected = [0.0, 1.0, 3.0, 1.0, 0.0][y];
            assert_eq!(*out.thinned.get(1, y).expect("in bounds"), expected, "row {y}");
        }
    }

    #[test]
    fn row_dispatch_matches_sequential_scan() {
        let mut state = 12_345u32;
        let mut next = move || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32
        };
        let (w, h) = (23, 17);
        let img = Image::from_fn(w, h, |_, _| next());
        let angles = Image::from_fn(w, h, |_, _| (next() - 0.5) * 6.2);
        let cfg = NmsConfig::default();

        // Strided output: rows of 23 inside a buffer of stride 29.
        let stride = 29;
        let mut out_buf = vec![-1.0f32; stride * h];
        let mut loc_buf = vec![Point::new(-1.0, -1.0); stride * h];
        let mut out = ImageViewMut::from_slice_mut(w, h, stride, &mut out_buf).expect("valid view");
        let mut loc = ImageViewMut::from_slice_mut(w, h, stride, &mut loc_buf).expect("valid view");
        let kept = non_max_suppress_into(
            &img.as_view(),
            &angles.as_view(),
            &cfg,
            &mut out,
            Some(&mut loc),
        )
        .expect("valid nms");

        let suppressor = Suppressor {
            img: img.as_view(),
            angles: angles.as_view(),
            table: AngleOffsetTable::build(cfg.theta, cfg.radius, false).expect("valid table"),
            border: BorderLookup::new(w, h, 3, &BorderMode::Clamp),
            transposed: false,
        };
        let mut seq = Image::new_fill(w, h, 0.0f32);
        let mut seq_loc = Image::new_fill(w, h, Point::ZERO);
        let seq_kept = suppressor.run_sequential(
            &mut seq.as_view_mut(),
            Some(&mut seq_loc.as_view_mut()),
        );

        assert_eq!(kept, seq_kept);
        assert!(kept > 0);
        for y in 0..h {
            assert_eq!(out.row(y), &seq.data()[y * w..(y + 1) * w], "row {y}");
            assert_eq!(loc.row(y), &seq_loc.data()[y * w..(y + 1) * w], "row {y}");
        }
        // Padding columns are never written.
        for y in 0..h {
            assert!(out_buf[y * stride + w..(y + 1) * stride].iter().all(|&v| v == -1.0));
        }
    }
}
