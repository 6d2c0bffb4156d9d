//! Phase-space helpers for pendulum runs
//!
//! Poincaré sections and the coupling-strength tag carried in sweep file names.

use std::f64::consts::TAU;
use std::path::Path;

/// Fraction of a forcing period accepted around phase zero
pub const POINCARE_WINDOW: f64 = 0.005;

pub const KAPPA_PREFIX: &str = "results_kappa";
pub const KAPPA_SUFFIX: &str = ".csv";

/// Samples taken when (t ω_f) mod 2π falls in `[0, 2π · POINCARE_WINDOW)`
pub fn poincare_mask(t: &[f64], omega_f: f64) -> Vec<bool> {
    t.iter()
        .map(|&ti| (ti * omega_f).rem_euclid(TAU) < TAU * POINCARE_WINDOW)
        .collect()
}

/// (x, v) pairs at the forcing phase
pub fn poincare_section(t: &[f64], x: &[f64], v: &[f64], omega_f: f64) -> Vec<(f64, f64)> {
    poincare_mask(t, omega_f)
        .into_iter()
        .zip(x.iter().zip(v))
        .filter_map(|(keep, (&xi, &vi))| keep.then_some((xi, vi)))
        .collect()
}

/// `0.2` -> `"0p200"`
pub fn kappa_file_tag(kappa: f64) -> String {
    format!("{:.3}", kappa).replace('.', "p")
}

/// `0.2` -> `"results_kappa0p200.csv"`
pub fn kappa_file_name(kappa: f64) -> String {
    format!("{}{}{}", KAPPA_PREFIX, kappa_file_tag(kappa), KAPPA_SUFFIX)
}

/// Inverse of [`kappa_file_name`], looking only at the file name
pub fn kappa_from_filename(path: &Path) -> Option<f64> {
    let name = path.file_name()?.to_str()?;
    let tag = name.strip_prefix(KAPPA_PREFIX)?.strip_suffix(KAPPA_SUFFIX)?;
    tag.replace('p', ".").parse().ok()
}

/// Legend label for a sweep file: `k=<value>`, or the file stem when the
/// name does not carry a coupling value
pub fn kappa_label(path: &Path) -> String {
    match kappa_from_filename(path) {
        Some(k) => format!("k={}", k),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}
