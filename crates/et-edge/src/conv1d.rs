use et_core::{BorderMode, map_index};

/// 1D convolution of `signal` with an odd-length `kernel` centred at `radius`.
pub fn convolve_f32(
    signal: &[f32],
    kernel: &[f32],
    radius: usize,
    border: &BorderMode<f32>,
    out: &mut [f32],
) {
    assert_eq!(out.len(), signal.len(), "out must match signal length");
    assert_eq!(
        kernel.len(),
        2 * radius + 1,
        "kernel len must be 2*radius+1"
    );

    let n = signal.len();
    if n == 0 {
        return;
    }

    // Interior samples never touch the border.
    let interior = radius..n.saturating_sub(radius);
    for i in interior.clone() {
        out[i] = signal[i - radius..=i + radius]
            .iter()
            .zip(kernel.iter().rev())
            .map(|(s, k)| s * k)
            .sum();
    }

    let border_idx = (0..interior.start.min(n)).chain(interior.end.max(interior.start)..n);
    for i in border_idx {
        let mut acc = 0.0f32;
        for (k, &kv) in kernel.iter().enumerate() {
            let idx = i as isize + radius as isize - k as isize;
            let v = match map_index(idx, n, border) {
                Some(j) => signal[j],
                None => border.fill().copied().unwrap_or(0.0),
            };
            acc += v * kv;
        }
        out[i] = acc;
    }
}
