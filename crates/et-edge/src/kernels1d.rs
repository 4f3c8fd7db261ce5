use et_core::Error;

/// Sampled, normalized 1D Gaussian.
///
/// Conventions:
/// - `radius = ceil(3*sigma)`, minimum 1.
/// - `g` is normalized such that `sum(g) ~= 1`.
#[derive(Debug, Clone)]
pub struct GaussianKernel1D {
    pub sigma: f32,
    pub radius: usize,
    pub g: Vec<f32>,
}

impl GaussianKernel1D {
    pub fn new(sigma: f32) -> Result<Self, Error> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(Error::InvalidSigma(sigma));
        }

        let radius = ((3.0 * sigma).ceil() as usize).max(1);
        let sigma2 = sigma * sigma;

        let mut g: Vec<f32> = (0..2 * radius + 1)
            .map(|i| {
                let xf = (i as isize - radius as isize) as f32;
                (-(xf * xf) / (2.0 * sigma2)).exp()
            })
            .collect();

        let sum_g: f32 = g.iter().sum();
        for gi in &mut g {
            *gi /= sum_g;
        }

        Ok(Self { sigma, radius, g })
    }
}
