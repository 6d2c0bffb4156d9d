//! Velocity distributions of a gas trajectory
//!
//! Units follow the simulator: m = k = 1, two dimensions, so the effective
//! temperature is ⟨v²⟩ / 2.

use std::f64::consts::PI;

use crate::analysis::energy::mean_std;
use crate::trajectory::layout::GasFrames;

/// Velocity components and speeds of every particle in every frame
#[derive(Debug, Clone, Default)]
pub struct VelocitySample {
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub speeds: Vec<f64>,
}

impl VelocitySample {
    pub fn from_frames(frames: &GasFrames<'_>) -> Self {
        let mut sample = Self::default();
        for k in 0..frames.n_frames() {
            for (vx, vy) in frames.frame_velocities(k).into_iter().flatten() {
                sample.vx.push(vx);
                sample.vy.push(vy);
                sample.speeds.push(vx.hypot(vy));
            }
        }
        sample
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedStats {
    pub mean: f64,
    pub std: f64,
    pub max: f64,
    pub temperature: f64, // ⟨v²⟩ / 2
}

impl SpeedStats {
    pub fn from_speeds(speeds: &[f64]) -> Self {
        let (mean, std) = mean_std(speeds);
        let max = speeds.iter().copied().fold(0.0, f64::max);
        Self { mean, std, max, temperature: effective_temperature(speeds) }
    }
}

pub fn effective_temperature(speeds: &[f64]) -> f64 {
    if speeds.is_empty() {
        return 0.0;
    }
    speeds.iter().map(|v| v * v).sum::<f64>() / speeds.len() as f64 / 2.0
}

/// 2-D Maxwell–Boltzmann speed density (v / T) exp(-v² / 2T)
pub fn maxwell_boltzmann_2d(v: f64, temperature: f64) -> f64 {
    (v / temperature) * (-v * v / (2.0 * temperature)).exp()
}

/// Zero-mean normal density with standard deviation `sigma`
pub fn gaussian(v: f64, sigma: f64) -> f64 {
    (-v * v / (2.0 * sigma * sigma)).exp() / ((2.0 * PI).sqrt() * sigma)
}

/// Equal-width histogram normalised to unit area
#[derive(Debug, Clone)]
pub struct Histogram {
    pub edges: Vec<f64>, // bins + 1 edges
    pub density: Vec<f64>, // one value per bin
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [a, b, ..] => b - a,
            _ => 0.0,
        }
    }

    pub fn max_density(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }
}

/// Bins span `[min, max]` of the finite data, the last bin is closed on the right.
/// NaN and infinite values are left out. A constant sample gets a unit-wide
/// range around its value
pub fn histogram_density(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let values: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Histogram { edges: vec![0.0; bins + 1], density: vec![0.0; bins] };
    }

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for &v in &values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let norm = values.len() as f64 * width;
    Histogram {
        edges: (0..=bins).map(|i| lo + width * i as f64).collect(),
        density: counts.into_iter().map(|c| c as f64 / norm).collect(),
    }
}
