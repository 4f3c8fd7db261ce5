/// Scalar sample types the edge algorithms operate on.
///
/// `to_f64` is the raw numeric value used for comparisons and interpolation;
/// every supported type converts to it exactly. `to_intensity` normalizes
/// integer types to `[0, 1]`.
pub trait Pixel: Copy + PartialEq + Send + Sync + 'static {
    const ZERO: Self;
    /// Whether a refined (interpolated) value can be stored back.
    const IS_FLOAT: bool;

    fn to_f32(self) -> f32;
    fn to_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
    fn to_intensity(self) -> f32;

    #[inline]
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! impl_int_pixel {
    ($t:ty) => {
        impl Pixel for $t {
            const ZERO: Self = 0;
            const IS_FLOAT: bool = false;

            #[inline]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline]
            fn to_f64(self) -> f64 {
                f64::from(self)
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                // `as` saturates and maps NaN to zero.
                v.round() as $t
            }

            #[inline]
            fn to_intensity(self) -> f32 {
                self as f32 / <$t>::MAX as f32
            }
        }
    };
}

impl_int_pixel!(u8);
impl_int_pixel!(u16);

impl Pixel for f32 {
    const ZERO: Self = 0.0;
    const IS_FLOAT: bool = true;

    #[inline]
    fn to_f32(self) -> f32 {
        self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_intensity(self) -> f32 {
        self
    }
}

impl Pixel for f64 {
    const ZERO: Self = 0.0;
    const IS_FLOAT: bool = true;

    #[inline]
    fn to_f32(self) -> f32 {
        self as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_intensity(self) -> f32 {
        self as f32
    }
}
