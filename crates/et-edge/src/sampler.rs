use et_core::{BorderIndex, BorderMode, ImageView, Pixel};

use crate::offsets::CoordOffset;

/// Per-axis border remapping shared by every lookup of one suppression pass.
#[derive(Debug, Clone)]
pub struct BorderLookup {
    x: BorderIndex,
    y: BorderIndex,
    fill: f64,
}

impl BorderLookup {
    /// Offsets within `pad` of the image resolve through lookup tables;
    /// larger ones are remapped on the fly.
    pub fn new(width: usize, height: usize, pad: usize, border: &BorderMode<f32>) -> Self {
        Self {
            x: BorderIndex::new(width, pad, border),
            y: BorderIndex::new(height, pad, border),
            fill: f64::from(border.fill().copied().unwrap_or(0.0)),
        }
    }

    #[inline]
    fn fetch<T: Pixel>(&self, img: &ImageView<'_, T>, x: Option<usize>, y: Option<usize>) -> f64 {
        match (x, y) {
            (Some(x), Some(y)) => img.get(x, y).map_or(self.fill, |px| px.to_f64()),
            _ => self.fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilinearSample {
    pub value: f64,
    /// Nearest comparison neighbour, used to break ties between two equal
    /// pixels straddling the true edge.
    pub min_adjacent: f64,
}

/// Interpolates `img` at `(x, y) + (xo, yo)`.
///
/// The 2x2 neighbourhood spans `int_part` and `int_part + sign` on each axis.
/// When the offset stays inside the centre pixel's cell, `min_adjacent` is the
/// smaller of the two off-diagonal corners; otherwise it is the floor corner.
#[inline]
pub fn sample_bilinear<T: Pixel>(
    img: &ImageView<'_, T>,
    x: usize,
    y: usize,
    xo: CoordOffset,
    yo: CoordOffset,
    border: &BorderLookup,
) -> BilinearSample {
    let (xi, yi) = (x as isize, y as isize);
    let (fx, fy) = (xi.saturating_add(xo.int_part), yi.saturating_add(yo.int_part));
    let floor_x = border.x.get(fx);
    let ceil_x = border.x.get(fx.saturating_add(xo.sign as isize));
    let floor_y = border.y.get(fy);
    let ceil_y = border.y.get(fy.saturating_add(yo.sign as isize));

    let tl = border.fetch(img, floor_x, floor_y);
    let tr = border.fetch(img, ceil_x, floor_y);
    let bl = border.fetch(img, floor_x, ceil_y);
    let br = border.fetch(img, ceil_x, ceil_y);

    let (wx, wy) = (f64::from(xo.frac), f64::from(yo.frac));
    let upper = tl + wx * (tr - tl);
    let lower = bl + wx * (br - bl);
    let value = upper + wy * (lower - upper);

    let min_adjacent = if floor_x == Some(x) && floor_y == Some(y) {
        tr.min(bl)
    } else {
        tl
    };

    BilinearSample {
        value,
        min_adjacent,
    }
}

#[cfg(test)]
mod tests {
    use et_core::{BorderMode, Image};

    use super::{BorderLookup, sample_bilinear};
    use crate::offsets::CoordOffset;

    fn grid() -> Image<f32> {
        Image::from_vec(
            3,
            3,
            vec![
                0.0, 1.0, 2.0, // row 0
                10.0, 11.0, 12.0, // row 1
                20.0, 21.0, 22.0, // row 2
            ],
        )
        .expect("valid image")
    }

    #[test]
    fn interpolates_inside_centre_cell() {
        let img = grid();
        let border = BorderLookup::new(3, 3, 2, &BorderMode::Clamp);
        let s = sample_bilinear(
            &img.as_view(),
            1,
            1,
            CoordOffset::new(0.5),
            CoordOffset::new(0.5),
            &border,
        );
        assert!((s.value - 16.5).abs() < 1e-5);
        // Floor corner is the centre itself: compare against min(tr, bl).
        assert_eq!(s.min_adjacent, 12.0);
    }

    #[test]
    fn whole_pixel_offsets_use_floor_corner() {
        let img = grid();
        let border = BorderLookup::new(3, 3, 2, &BorderMode::Clamp);
        let s = sample_bilinear(
            &img.as_view(),
            1,
            1,
            CoordOffset::new(-1.0),
            CoordOffset::new(0.0),
            &border,
        );
        assert_eq!(s.value, 10.0);
        assert_eq!(s.min_adjacent, 10.0);

        let s = sample_bilinear(
            &img.as_view(),
            1,
            1,
            CoordOffset::new(1.3),
            CoordOffset::new(-1.3),
            &border,
        );
        // Neighbourhood (x 2..3, y 0..-1) clamps to the top-right pixel.
        assert!((s.value - 2.0).abs() < 1e-5);
        assert_eq!(s.min_adjacent, 2.0);
    }

    #[test]
    fn constant_border_fills_outside_corners() {
        let img = grid();
        let border = BorderLookup::new(3, 3, 2, &BorderMode::Constant(100.0));
        let s = sample_bilinear(
            &img.as_view(),
            2,
            1,
            CoordOffset::new(0.5),
            CoordOffset::new(0.0),
            &border,
        );
        assert!((s.value - 56.0).abs() < 1e-5);
    }

    #[test]
    fn negated_offset_samples_opposite_side() {
        let img = grid();
        let border = BorderLookup::new(3, 3, 2, &BorderMode::Clamp);
        let xo = CoordOffset::new(0.25);
        let yo = CoordOffset::new(-0.75);
        let fwd = sample_bilinear(&img.as_view(), 1, 1, xo, yo, &border);
        let bwd = sample_bilinear(&img.as_view(), 1, 1, xo.negate(), yo.negate(), &border);
        // Linear ramp: samples are symmetric around the centre value.
        assert!((fwd.value + bwd.value - 22.0).abs() < 1e-4);
    }

    #[test]
    fn offsets_beyond_the_pad_still_follow_the_border() {
        let img = grid();
        let border = BorderLookup::new(3, 3, 2, &BorderMode::Clamp);
        let s = sample_bilinear(
            &img.as_view(),
            1,
            1,
            CoordOffset::new(1.0e6),
            CoordOffset::new(-1.0e6),
            &border,
        );
        assert_eq!(s.value, 2.0);

        let fill = BorderLookup::new(3, 3, 2, &BorderMode::Constant(7.0));
        let s = sample_bilinear(
            &img.as_view(),
            1,
            1,
            CoordOffset::new(-1.0e6),
            CoordOffset::new(0.0),
            &fill,
        );
        assert_eq!(s.value, 7.0);
    }
}
