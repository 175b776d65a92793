//! Conversion of sampled spectra, XYZ triples and blackbody emitters to
//! linear RGB. All spectra collapse to RGB at parse time; the renderer
//! never sees raw sample data.

use once_cell::sync::Lazy;

use crate::Float;

use super::cie::{CIE_LAMBDA_START, CIE_X, CIE_Y, CIE_Y_INTEGRAL, CIE_Z, N_CIE_SAMPLES};

use crate::math::lerp;

/// Spectra are integrated over 60 bands spanning 400-700nm.
pub const SAMPLED_LAMBDA_START: Float = 400.0;
pub const SAMPLED_LAMBDA_END: Float = 700.0;
pub const N_SPECTRAL_SAMPLES: usize = 60;

struct MatchingCurves {
    x: [Float; N_SPECTRAL_SAMPLES],
    y: [Float; N_SPECTRAL_SAMPLES],
    z: [Float; N_SPECTRAL_SAMPLES],
}

/// The CIE curves resampled down to the 60 integration bands. Initialized
/// once per process on first use and read-only afterwards.
static CURVES: Lazy<MatchingCurves> = Lazy::new(|| {
    let lambda: Vec<Float> = (0..N_CIE_SAMPLES)
        .map(|i| CIE_LAMBDA_START + i as Float)
        .collect();

    let mut curves = MatchingCurves {
        x: [0.0; N_SPECTRAL_SAMPLES],
        y: [0.0; N_SPECTRAL_SAMPLES],
        z: [0.0; N_SPECTRAL_SAMPLES],
    };

    for i in 0..N_SPECTRAL_SAMPLES {
        let (wl0, wl1) = band_bounds(i);
        curves.x[i] = average_over_curve(&lambda, &CIE_X, wl0, wl1);
        curves.y[i] = average_over_curve(&lambda, &CIE_Y, wl0, wl1);
        curves.z[i] = average_over_curve(&lambda, &CIE_Z, wl0, wl1);
    }

    curves
});

/// Eagerly builds the resampled tables. Conversion routines initialize
/// them on demand; calling this up front keeps the one-time cost out of
/// the middle of a parse.
pub fn force_init() {
    Lazy::force(&CURVES);
}

fn band_bounds(i: usize) -> (Float, Float) {
    let n = N_SPECTRAL_SAMPLES as Float;
    let wl0 = lerp(i as Float / n, SAMPLED_LAMBDA_START, SAMPLED_LAMBDA_END);
    let wl1 = lerp((i + 1) as Float / n, SAMPLED_LAMBDA_START, SAMPLED_LAMBDA_END);
    (wl0, wl1)
}

/// Average value of the piecewise-linear curve `(x, y)` over `[x0, x1]`,
/// clamping to the end values outside the sampled range. `x` must be
/// sorted.
fn average_over_curve(x: &[Float], y: &[Float], mut x0: Float, mut x1: Float) -> Float {
    debug_assert!(x0 <= x1);
    let n = x.len();

    if x1 <= x[0] {
        return y[0];
    }
    if x0 >= x[n - 1] {
        return y[n - 1];
    }
    if n == 1 {
        return y[0];
    }

    let mut sum = 0.0;
    let x_range = x1 - x0;

    if x1 > x[n - 1] {
        sum += y[n - 1] * (x1 - x[n - 1]);
        x1 = x[n - 1];
    }

    // Find the first sample at or after x0 and account for the partial
    // segment leading up to it.
    let mut i = 0;
    if x0 <= x[0] {
        sum += y[0] * (x[0] - x0);
        x0 = x[0];
    } else {
        while x[i] < x0 {
            i += 1;
        }
        let t0 = (x0 - x[i - 1]) / (x[i] - x[i - 1]);
        let y0 = y[i - 1] + (y[i] - y[i - 1]) * t0;
        sum += (y0 + y[i]) * 0.5 * (x[i] - x0);
    }
    let _ = x0;

    while x[i] < x1 {
        sum += (y[i] + y[i + 1]) * 0.5 * (x[i + 1] - x[i]);
        i += 1;
    }

    // The loop overshoots when x1 falls inside the last segment; trim the
    // excess back off.
    if x1 < x[i] {
        let t1 = (x1 - x[i - 1]) / (x[i] - x[i - 1]);
        let y1 = y[i - 1] + (y[i] - y[i - 1]) * t1;
        sum -= (y[i] + y1) * 0.5 * (x[i] - x1);
    }

    sum / x_range
}

pub fn xyz_to_rgb(xyz: [Float; 3]) -> [Float; 3] {
    [
        3.240479 * xyz[0] - 1.537150 * xyz[1] - 0.498535 * xyz[2],
        -0.969256 * xyz[0] + 1.875991 * xyz[1] + 0.041556 * xyz[2],
        0.055648 * xyz[0] - 0.204043 * xyz[1] + 1.057311 * xyz[2],
    ]
}

/// Converts `(wavelength, value)` pairs to XYZ by integrating the
/// piecewise-linear spectrum against each resampled matching curve. Sorts
/// the pairs in place first if they arrived out of wavelength order.
pub fn spectrum_to_xyz(samples: &mut [Float]) -> [Float; 3] {
    debug_assert!(samples.len() % 2 == 0);
    let num_entries = samples.len() / 2;

    let sorted = (1..num_entries).all(|i| samples[2 * i] >= samples[2 * (i - 1)]);
    if !sorted {
        // Sort pairs by wavelength without disturbing the pairing.
        let mut entries: Vec<(Float, Float)> = samples
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        for (i, (wl, v)) in entries.into_iter().enumerate() {
            samples[2 * i] = wl;
            samples[2 * i + 1] = v;
        }
    }

    let wavelength: Vec<Float> = samples.iter().step_by(2).copied().collect();
    let value: Vec<Float> = samples.iter().skip(1).step_by(2).copied().collect();

    let curves = &*CURVES;
    let mut xyz = [0.0; 3];
    for i in 0..N_SPECTRAL_SAMPLES {
        let (wl0, wl1) = band_bounds(i);
        let val = average_over_curve(&wavelength, &value, wl0, wl1);
        xyz[0] += curves.x[i] * val;
        xyz[1] += curves.y[i] * val;
        xyz[2] += curves.z[i] * val;
    }

    let scale = (SAMPLED_LAMBDA_END - SAMPLED_LAMBDA_START)
        / (CIE_Y_INTEGRAL * N_SPECTRAL_SAMPLES as Float);
    [xyz[0] * scale, xyz[1] * scale, xyz[2] * scale]
}

pub fn spectrum_to_rgb(samples: &mut [Float]) -> [Float; 3] {
    xyz_to_rgb(spectrum_to_xyz(samples))
}

/// Planck's law integrated against the matching curves. `blackbody` is a
/// `(temperature-kelvin, scale)` pair.
pub fn blackbody_to_xyz(blackbody: [Float; 2]) -> [Float; 3] {
    const C: Float = 299792458.0;
    const H: Float = 6.62606957e-34;
    const KB: Float = 1.3806488e-23;

    let t = blackbody[0];

    let curves = &*CURVES;
    let mut xyz = [0.0f32; 3];
    for i in 0..N_SPECTRAL_SAMPLES {
        // The sample wavelengths deliberately match the points at which the
        // X, Y and Z curves were resampled.
        let wl = lerp(
            i as Float / N_SPECTRAL_SAMPLES as Float,
            SAMPLED_LAMBDA_START,
            SAMPLED_LAMBDA_END,
        );
        let l = wl * 1e-9;
        let lambda5 = (l * l) * (l * l) * l;
        let le = (2.0 * H * C * C) / (lambda5 * (((H * C) / (l * KB * t)).exp() - 1.0));

        xyz[0] += curves.x[i] * le;
        xyz[1] += curves.y[i] * le;
        xyz[2] += curves.z[i] * le;
    }

    let scale = blackbody[1] * (SAMPLED_LAMBDA_END - SAMPLED_LAMBDA_START)
        / (CIE_Y_INTEGRAL * N_SPECTRAL_SAMPLES as Float);
    [xyz[0] * scale, xyz[1] * scale, xyz[2] * scale]
}

pub fn blackbody_to_rgb(blackbody: [Float; 2]) -> [Float; 3] {
    xyz_to_rgb(blackbody_to_xyz(blackbody))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn xyz_grey_point() {
        let rgb = xyz_to_rgb([0.5, 0.5, 0.5]);
        assert_abs_diff_eq!(rgb[0], 0.602397, epsilon = 1e-5);
        assert_abs_diff_eq!(rgb[1], 0.474146, epsilon = 1e-5);
        assert_abs_diff_eq!(rgb[2], 0.454458, epsilon = 1e-5);
    }

    #[test]
    fn unsorted_samples_match_sorted() {
        let mut sorted = [400.0, 0.2, 500.0, 0.9, 600.0, 0.4, 700.0, 0.1];
        let mut shuffled = [600.0, 0.4, 400.0, 0.2, 700.0, 0.1, 500.0, 0.9];
        let a = spectrum_to_rgb(&mut sorted);
        let b = spectrum_to_rgb(&mut shuffled);
        for c in 0..3 {
            assert_abs_diff_eq!(a[c], b[c], epsilon = 1e-6);
        }
    }

    #[test]
    fn constant_spectrum_is_finite_grey() {
        let mut samples = [400.0, 1.0, 700.0, 1.0];
        let rgb = spectrum_to_rgb(&mut samples);
        for c in rgb {
            assert!(c.is_finite());
        }
        // A flat spectrum should land near the whitepoint axis, with all
        // three channels in the same ballpark.
        assert!(rgb[0] > 0.5 && rgb[1] > 0.5 && rgb[2] > 0.5);
    }

    #[test]
    fn blackbody_is_finite_and_warm() {
        let rgb = blackbody_to_rgb([2500.0, 1.0]);
        for c in rgb {
            assert!(c.is_finite());
        }
        // A 2500K emitter is distinctly red-heavy.
        assert!(rgb[0] > rgb[2]);
    }

    #[test]
    fn average_over_curve_clamps_at_boundaries() {
        let x = [10.0, 20.0];
        let y = [1.0, 3.0];
        assert_abs_diff_eq!(average_over_curve(&x, &y, 0.0, 5.0), 1.0);
        assert_abs_diff_eq!(average_over_curve(&x, &y, 25.0, 30.0), 3.0);
        assert_abs_diff_eq!(average_over_curve(&x, &y, 10.0, 20.0), 2.0, epsilon = 1e-6);
    }
}
