use crate::Error;

/// Percentile of `values` with linear interpolation between order statistics.
///
/// `p` is in `[0, 100]`. The sample at rank `h = (n - 1) * p / 100` is
/// interpolated from its two neighbours.
pub fn percentile(values: &[f32], p: f32) -> Result<f32, Error> {
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::InvalidPercentile(p));
    }
    if values.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f32::total_cmp);

    let h = (sorted.len() - 1) as f64 * f64::from(p) / 100.0;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let t = (h - lo as f64) as f32;
    Ok(sorted[lo] + t * (sorted[hi] - sorted[lo]))
}
