//! Finite-difference gradient operators.
//!
//! Every operator is a correlation kernel normalized so a unit ramp produces a
//! unit derivative. `gx` differentiates along `x` (columns), `gy` along `y`
//! (rows, downward). The `*_sep` variants are rank-1 factorizations
//! (smoothing ⊗ derivative) of the corresponding full Ando kernels.

use core::str::FromStr;

use et_core::{BorderIndex, BorderMode, Error, Image, ImageView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientKernel {
    #[default]
    Sobel,
    Prewitt,
    Ando3,
    Ando4,
    Ando4Sep,
    Ando5,
    Ando5Sep,
}

impl GradientKernel {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sobel => "sobel",
            Self::Prewitt => "prewitt",
            Self::Ando3 => "ando3",
            Self::Ando4 => "ando4",
            Self::Ando4Sep => "ando4_sep",
            Self::Ando5 => "ando5",
            Self::Ando5Sep => "ando5_sep",
        }
    }

    /// The `x` derivative kernel. The `y` kernel is its transpose.
    fn x_kernel(self) -> Kernel2D {
        match self {
            Self::Sobel => Kernel2D::outer(&[1.0, 2.0, 1.0], &[-1.0, 0.0, 1.0], 1, 1.0 / 8.0),
            Self::Prewitt => Kernel2D::outer(&[1.0, 1.0, 1.0], &[-1.0, 0.0, 1.0], 1, 1.0 / 6.0),
            Self::Ando3 => Kernel2D::outer(
                &[0.112737, 0.274526, 0.112737],
                &[-1.0, 0.0, 1.0],
                1,
                1.0,
            ),
            Self::Ando4 => Kernel2D {
                size: 4,
                anchor: 1,
                weights: vec![
                    -0.022116, -0.025526, 0.025526, 0.022116, //
                    -0.098381, -0.112984, 0.112984, 0.098381, //
                    -0.098381, -0.112984, 0.112984, 0.098381, //
                    -0.022116, -0.025526, 0.025526, 0.022116,
                ],
            },
            Self::Ando4Sep => Kernel2D::outer(
                &[0.0919, 0.4081, 0.4081, 0.0919],
                &[-0.24093, -0.27718, 0.27718, 0.24093],
                1,
                1.0,
            ),
            Self::Ando5 => Kernel2D {
                size: 5,
                anchor: 2,
                weights: vec![
                    -0.003776, -0.010199, 0.0, 0.010199, 0.003776, //
                    -0.026786, -0.070844, 0.0, 0.070844, 0.026786, //
                    -0.046548, -0.122572, 0.0, 0.122572, 0.046548, //
                    -0.026786, -0.070844, 0.0, 0.070844, 0.026786, //
                    -0.003776, -0.010199, 0.0, 0.010199, 0.003776,
                ],
            },
            Self::Ando5Sep => Kernel2D::outer(
                &[0.0357, 0.2489, 0.4308, 0.2489, 0.0357],
                &[-0.10646, -0.28710, 0.0, 0.28710, 0.10646],
                2,
                1.0,
            ),
        }
    }
}

impl FromStr for GradientKernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sobel" => Ok(Self::Sobel),
            "prewitt" => Ok(Self::Prewitt),
            "ando3" => Ok(Self::Ando3),
            "ando4" => Ok(Self::Ando4),
            "ando4_sep" => Ok(Self::Ando4Sep),
            "ando5" => Ok(Self::Ando5),
            "ando5_sep" => Ok(Self::Ando5Sep),
            _ => Err(Error::UnknownGradientKernel(s.to_string())),
        }
    }
}

/// Square correlation kernel, row-major, anchored at `(anchor, anchor)`.
#[derive(Debug, Clone, PartialEq)]
struct Kernel2D {
    size: usize,
    anchor: usize,
    weights: Vec<f32>,
}

impl Kernel2D {
    /// `scale * smooth[row] * deriv[col]`.
    fn outer(smooth: &[f32], deriv: &[f32], anchor: usize, scale: f32) -> Self {
        debug_assert_eq!(smooth.len(), deriv.len());
        let weights = smooth
            .iter()
            .flat_map(|&s| deriv.iter().map(move |&d| scale * s * d))
            .collect();
        Self {
            size: smooth.len(),
            anchor,
            weights,
        }
    }

    fn transpose(&self) -> Self {
        let n = self.size;
        let weights = (0..n * n)
            .map(|i| self.weights[(i % n) * n + i / n])
            .collect();
        Self {
            size: n,
            anchor: self.anchor,
            weights,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub gx: Image<f32>,
    pub gy: Image<f32>,
}

pub fn gradients(
    img: &ImageView<'_, f32>,
    kernel: GradientKernel,
    border: &BorderMode<f32>,
) -> Gradients {
    let kx = kernel.x_kernel();
    let ky = kx.transpose();
    Gradients {
        gx: correlate(img, &kx, border),
        gy: correlate(img, &ky, border),
    }
}

fn correlate(img: &ImageView<'_, f32>, k: &Kernel2D, border: &BorderMode<f32>) -> Image<f32> {
    let (w, h) = img.dims();
    let fill = border.fill().copied().unwrap_or(0.0);
    let bx = BorderIndex::new(w, k.size, border);
    let by = BorderIndex::new(h, k.size, border);
    let anchor = k.anchor as isize;

    Image::from_fn(w, h, |x, y| {
        let mut acc = 0.0f32;
        for (i, krow) in k.weights.chunks_exact(k.size).enumerate() {
            let yy = by.get(y as isize + i as isize - anchor);
            for (j, &kv) in krow.iter().enumerate() {
                if kv == 0.0 {
                    continue;
                }
                let xx = bx.get(x as isize + j as isize - anchor);
                let v = match (xx, yy) {
                    (Some(xx), Some(yy)) => img.get(xx, yy).copied().unwrap_or(fill),
                    _ => fill,
                };
                acc += kv * v;
            }
        }
        acc
    })
}
