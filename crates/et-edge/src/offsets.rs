//! Discretized direction table for sampling neighbours along a gradient.
//!
//! Offsets are split into integer and fractional parts up front so bilinear
//! interpolation can pick its 2x2 neighbourhood with integer arithmetic only.

use std::f64::consts::TAU;

use et_core::Error;

/// One-axis offset split as `int_part + sign * frac`.
///
/// `frac` is in `[0, 1)`. `sign` is the direction of the fractional part and
/// is `0` when the offset is a whole number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordOffset {
    pub sign: i8,
    pub int_part: isize,
    pub frac: f32,
}

impl CoordOffset {
    pub const ZERO: Self = Self {
        sign: 0,
        int_part: 0,
        frac: 0.0,
    };

    pub fn new(v: f64) -> Self {
        let fract = v.fract();
        let sign = if fract > 0.0 {
            1
        } else if fract < 0.0 {
            -1
        } else {
            0
        };
        Self {
            sign,
            int_part: v.trunc() as isize,
            frac: fract.abs() as f32,
        }
    }

    /// The real-valued offset this represents.
    #[inline]
    pub fn value(self) -> f32 {
        self.int_part as f32 + f32::from(self.sign) * self.frac
    }

    /// Same magnitude, opposite direction. `frac` keeps its (unsigned) value.
    #[inline]
    pub fn negate(self) -> Self {
        Self {
            sign: -self.sign,
            int_part: -self.int_part,
            frac: self.frac,
        }
    }

    #[inline]
    pub fn scale(self, k: f32) -> f32 {
        k * self.value()
    }

    #[inline]
    pub fn add_to(self, base: f32) -> f32 {
        base + self.value()
    }
}

/// Offset vectors at `radius` for `count + 1` evenly spaced angles in `[0, 2π]`.
///
/// The closing entry at `2π` duplicates the one at `0` so angles that round up
/// to a full turn still land on a valid bin.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleOffsetTable {
    theta: f32,
    inv_theta: f32,
    offsets: Vec<(CoordOffset, CoordOffset)>,
}

impl AngleOffsetTable {
    /// Builds the table for a requested angular step `theta` (radians).
    ///
    /// The actual step is `2π / round(2π / theta)`. With `transposed == false`
    /// the x axis is the column axis and rows grow downward, so a direction `a`
    /// maps to `(r cos a, -r sin a)`. With `transposed == true` the x axis holds
    /// rows and the mapping is `(-r sin a, r cos a)`.
    pub fn build(theta: f32, radius: f32, transposed: bool) -> Result<Self, Error> {
        if !(theta.is_finite() && theta > 0.0) {
            return Err(Error::InvalidTheta(theta));
        }
        if !radius.is_finite() {
            return Err(Error::InvalidRadius(radius));
        }

        let count = (TAU / f64::from(theta)).round();
        if count < 1.0 {
            return Err(Error::InvalidTheta(theta));
        }
        let count = count as usize;
        let step = TAU / count as f64;
        let r = f64::from(radius);

        let offsets = (0..=count)
            .map(|k| {
                let (s, c) = (k as f64 * step).sin_cos();
                if transposed {
                    (CoordOffset::new(-r * s), CoordOffset::new(r * c))
                } else {
                    (CoordOffset::new(r * c), CoordOffset::new(-r * s))
                }
            })
            .collect();

        Ok(Self {
            theta: step as f32,
            inv_theta: (count as f64 / TAU) as f32,
            offsets,
        })
    }

    /// Actual angular step after rounding the bin count.
    pub fn theta(&self) -> f32 {
        self.theta
    }

    /// Number of distinct bins (excluding the closing duplicate).
    pub fn count(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn offsets(&self) -> &[(CoordOffset, CoordOffset)] {
        &self.offsets
    }

    /// Nearest bin for an angle in `(-π, π]`.
    #[inline]
    pub fn bin(&self, angle: f32) -> usize {
        let a = if angle < 0.0 {
            angle + std::f32::consts::TAU
        } else {
            angle
        };
        // Negative or NaN saturate to bin 0; overshoot clamps to the closing bin.
        ((a * self.inv_theta).round() as usize).min(self.count())
    }

    #[inline]
    pub fn lookup(&self, angle: f32) -> (CoordOffset, CoordOffset) {
        self.offsets[self.bin(angle)]
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_2, PI};

    use super::{AngleOffsetTable, CoordOffset};
    use et_core::Error;

    #[test]
    fn coord_offset_splits_and_negates() {
        let o = CoordOffset::new(1.35);
        assert_eq!(o.int_part, 1);
        assert_eq!(o.sign, 1);
        assert!((o.frac - 0.35).abs() < 1e-6);
        assert!((o.value() - 1.35).abs() < 1e-6);

        let n = CoordOffset::new(-0.4);
        assert_eq!((n.sign, n.int_part), (-1, 0));
        assert!((n.value() + 0.4).abs() < 1e-6);

        let neg = o.negate();
        assert_eq!((neg.sign, neg.int_part), (-1, -1));
        assert_eq!(neg.frac, o.frac);
        assert!((neg.value() + 1.35).abs() < 1e-6);

        let whole = CoordOffset::new(-2.0);
        assert_eq!((whole.sign, whole.int_part, whole.frac), (0, -2, 0.0));
        assert!((o.scale(2.0) - 2.7).abs() < 1e-6);
        assert!((o.add_to(10.0) - 11.35).abs() < 1e-5);
    }

    #[test]
    fn table_has_closing_duplicate_and_actual_step() {
        let t = AngleOffsetTable::build(PI / 180.0, 1.0, false).expect("valid table");
        assert_eq!(t.count(), 360);
        assert_eq!(t.offsets().len(), 361);
        assert!((t.theta() - PI / 180.0).abs() < 1e-6);

        let (x0, y0) = t.offsets()[0];
        let (xn, yn) = t.offsets()[360];
        assert!((x0.value() - xn.value()).abs() < 1e-6);
        assert!((y0.value() - yn.value()).abs() < 1e-6);

        // One radian does not divide the circle; the step is re-derived from 6 bins.
        let coarse = AngleOffsetTable::build(1.0, 1.0, false).expect("valid table");
        assert_eq!(coarse.count(), 6);
        assert!((coarse.theta() - std::f32::consts::TAU / 6.0).abs() < 1e-6);
    }

    #[test]
    fn row_axis_points_down_for_positive_angles() {
        let t = AngleOffsetTable::build(PI / 2.0, 1.0, false).expect("valid table");
        let (x, y) = t.lookup(FRAC_PI_2);
        assert!(x.value().abs() < 1e-6);
        assert!((y.value() + 1.0).abs() < 1e-6);

        let (x, y) = t.lookup(0.0);
        assert!((x.value() - 1.0).abs() < 1e-6);
        assert!(y.value().abs() < 1e-6);

        let tt = AngleOffsetTable::build(PI / 2.0, 1.0, true).expect("valid table");
        let (x, y) = tt.lookup(FRAC_PI_2);
        assert!((x.value() + 1.0).abs() < 1e-6);
        assert!(y.value().abs() < 1e-6);
    }

    #[test]
    fn bins_round_to_nearest_and_wrap_negative_angles() {
        let t = AngleOffsetTable::build(PI / 4.0, 1.0, false).expect("valid table");
        assert_eq!(t.bin(0.0), 0);
        assert_eq!(t.bin(0.3), 0);
        assert_eq!(t.bin(0.5), 1);
        assert_eq!(t.bin(PI), 4);
        assert_eq!(t.bin(-FRAC_PI_2), 6);
        assert_eq!(t.bin(-0.1), 8);
    }

    #[test]
    fn rejects_degenerate_steps() {
        assert_eq!(
            AngleOffsetTable::build(0.0, 1.0, false),
            Err(Error::InvalidTheta(0.0))
        );
        assert!(AngleOffsetTable::build(-1.0, 1.0, false).is_err());
        assert!(AngleOffsetTable::build(100.0, 1.0, false).is_err());
    }
}
