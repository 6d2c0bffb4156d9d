//! Amplitude spectrum of a uniformly sampled series

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Sample spacing used when a series is too short to infer one
pub const FALLBACK_DT: f64 = 0.001;

/// Spacing of the first two samples of `t`, or [`FALLBACK_DT`]
pub fn sample_spacing(t: &[f64]) -> f64 {
    match t {
        [t0, t1, ..] => t1 - t0,
        _ => FALLBACK_DT,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    pub freq: Vec<f64>, // k / (n dt), Hz
    pub amplitude: Vec<f64>, // |X_k|
}

impl Spectrum {
    /// Frequency of the largest non-DC component
    pub fn peak_frequency(&self) -> Option<f64> {
        self.amplitude
            .iter()
            .enumerate()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, _)| self.freq[k])
    }
}

/// Mean-removed real FFT, bins `k = 0..=n/2`
pub fn amplitude_spectrum(series: &[f64], dt: f64) -> Spectrum {
    let n = series.len();
    if n == 0 {
        return Spectrum::default();
    }

    let mean = series.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = series.iter().map(|&x| Complex::new(x - mean, 0.0)).collect();

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let bins = n / 2 + 1;
    let span = n as f64 * dt;
    Spectrum {
        freq: (0..bins).map(|k| k as f64 / span).collect(),
        amplitude: buffer[..bins].iter().map(|c| c.norm()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn pure_sine_peaks_at_its_frequency() {
        let dt = 0.01;
        let n = 1000;
        let f = 2.0;
        let series: Vec<f64> = (0..n).map(|i| 3.0 + (2.0 * PI * f * i as f64 * dt).sin()).collect();
        let spectrum = amplitude_spectrum(&series, dt);
        assert_eq!(spectrum.freq.len(), n / 2 + 1);
        assert!((spectrum.peak_frequency().unwrap() - f).abs() < 1e-9);
        // mean removed
        assert!(spectrum.amplitude[0] < 1e-9);
    }

    #[test]
    fn spacing_falls_back_for_short_series() {
        assert_eq!(sample_spacing(&[0.0]), FALLBACK_DT);
        assert!((sample_spacing(&[0.5, 0.75, 1.0]) - 0.25).abs() < 1e-12);
        assert!(amplitude_spectrum(&[], 0.1).freq.is_empty());
    }
}
