use et_core::{BorderMode, Error, Image, ImageView};

use crate::conv1d::convolve_f32;
use crate::kernels1d::GaussianKernel1D;

/// Separable Gaussian blur with standard deviation `sigma` on both axes.
pub fn gaussian_blur(
    img: &ImageView<'_, f32>,
    sigma: f32,
    border: &BorderMode<f32>,
) -> Result<Image<f32>, Error> {
    let kernel = GaussianKernel1D::new(sigma)?;
    let (w, h) = img.dims();
    let mut out = Image::new_fill(w, h, 0.0f32);
    if w == 0 || h == 0 {
        return Ok(out);
    }

    {
        let dst = out.data_mut();
        for y in 0..h {
            convolve_f32(
                img.row(y),
                &kernel.g,
                kernel.radius,
                border,
                &mut dst[y * w..(y + 1) * w],
            );
        }
    }

    let mut column = vec![0.0f32; h];
    let mut blurred = vec![0.0f32; h];
    let dst = out.data_mut();
    for x in 0..w {
        for (y, c) in column.iter_mut().enumerate() {
            *c = dst[y * w + x];
        }
        convolve_f32(&column, &kernel.g, kernel.radius, border, &mut blurred);
        for (y, &b) in blurred.iter().enumerate() {
            dst[y * w + x] = b;
        }
    }

    Ok(out)
}
