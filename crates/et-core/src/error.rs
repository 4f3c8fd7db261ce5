use core::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    SizeMismatch {
        expected: usize,
        actual: usize,
    },
    /// Two grids that must share a shape do not. Dimensions are `(width, height)`.
    DimensionMismatch {
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    OutOfBounds,
    InvalidStride,
    InvalidRadius(f32),
    InvalidTheta(f32),
    InvalidSigma(f32),
    InvalidPercentile(f32),
    EmptyInput,
    UnknownBorderMode(String),
    UnknownGradientKernel(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "size mismatch: expected {expected}, got {actual}")
            }
            Self::DimensionMismatch {
                what,
                expected,
                actual,
            } => write!(
                f,
                "{what} dimensions {}x{} do not match image dimensions {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::InvalidStride => write!(f, "invalid stride"),
            Self::InvalidRadius(r) => write!(f, "radius must be >= 1.0, got {r}"),
            Self::InvalidTheta(t) => write!(f, "theta must be finite and > 0, got {t}"),
            Self::InvalidSigma(s) => write!(f, "sigma must be finite and > 0, got {s}"),
            Self::InvalidPercentile(p) => write!(f, "percentile must be in [0, 100], got {p}"),
            Self::EmptyInput => write!(f, "empty input"),
            Self::UnknownBorderMode(name) => write!(f, "unknown border mode '{name}'"),
            Self::UnknownGradientKernel(name) => write!(f, "unknown gradient kernel '{name}'"),
        }
    }
}

impl std::error::Error for Error {}
