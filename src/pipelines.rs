//! Load, compute, plot, save
//!
//! One function per command. Single-input commands return the loading
//! error. Multi-input commands log it, skip that input and carry on with
//! the rest.

use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::analysis::energy::{normalized_series, relative_error_series, total_kinetic_energy, ConservationStats};
use crate::analysis::phase::{kappa_label, KAPPA_PREFIX, KAPPA_SUFFIX};
use crate::analysis::spectrum::{amplitude_spectrum, sample_spacing};
use crate::analysis::velocity::{SpeedStats, VelocitySample};
use crate::error::{Error, Result};
use crate::trajectory::layout::GasFrames;
use crate::trajectory::schema::{PendulumSeries, ResonanceSeries};
use crate::trajectory::table::TrajectoryTable;
use crate::visualization::plots::{self, slug, MethodRun};

/// A data file and the name it goes by in titles and file names
#[derive(Debug, Clone)]
pub struct Input {
    pub path: PathBuf,
    pub label: String,
}

impl Input {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self { path: path.into(), label: label.into() }
    }

    /// Label taken from the file stem
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, label }
    }
}

/// The three runs the velocity and trajectory commands look at by default
pub fn default_gas_runs() -> Vec<Input> {
    vec![
        Input::new("results/dilute_gas.dat", "Dilute gas"),
        Input::new("results/dense_gas.dat", "Dense gas"),
        Input::new("results/velocities.dat", "200 particles"),
    ]
}

pub const DEFAULT_ENERGY_INPUT: &str = "results/velocities.dat";
pub const DEFAULT_EULER_INPUT: &str = "results/euler.dat";
pub const DEFAULT_VERLET_INPUT: &str = "results/verlet.dat";
pub const DEFAULT_PENDULUM_INPUT: &str = "results/energy_transfer.csv";
pub const DEFAULT_RESONANCE_INPUT: &str = "results/resonance_sweep.csv";

/// Gas particle mass used when reading trajectories
pub const DEFAULT_MASS: f64 = 1.0;

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Loader result, logged and dropped on failure
fn load_or_skip<T>(path: &Path, loaded: Result<T>) -> Option<T> {
    match loaded {
        Ok(value) => Some(value),
        Err(e) => {
            error!("skipping {}: {}", path.display(), e);
            None
        }
    }
}

// =========================================================================================
// Gas
// =========================================================================================

/// Energy-conservation figure for one trajectory
pub fn gas_energy(input: &Input, mass: f64, out_dir: &Path) -> Result<ConservationStats> {
    let table = TrajectoryTable::load_dat(&input.path)?;
    let t = table.time();
    let energy = total_kinetic_energy(&table, mass);
    let stats = ConservationStats::from_series(&energy)?;

    info!("{}: {} particles, {} frames", input.label, GasFrames::new(&table).n_particles(), table.n_rows());
    info!("initial energy: {:.6}", stats.e0);
    info!("final energy: {:.6}", stats.e_final);
    info!("relative error: {:.4}%", stats.relative_error_pct);
    info!("mean {:.6}, std {:.6}, fluctuation {:.4}%", stats.mean, stats.std, stats.fluctuation_pct);

    ensure_dir(out_dir)?;
    let rel = relative_error_series(&energy)?;
    let title = format!("{} - relative error {:.4}%", input.label, stats.relative_error_pct);
    let path = out_dir.join(format!("energy_{}.png", slug(&input.label)));
    plots::plot_energy(&path, &title, &t, &energy, &rel)?;
    Ok(stats)
}

/// Normalised energy and relative error of several runs, e.g. Euler against Verlet.
/// Returns how many runs made it into the figure
pub fn compare_methods(inputs: &[Input], mass: f64, out_dir: &Path) -> Result<usize> {
    let mut runs = Vec::new();
    for input in inputs {
        info!("processing {}", input.path.display());
        let Some(table) = load_or_skip(&input.path, TrajectoryTable::load_dat(&input.path)) else {
            continue;
        };
        let energy = total_kinetic_energy(&table, mass);
        let series = normalized_series(&energy).and_then(|n| Ok((n, relative_error_series(&energy)?)));
        let Some((normalized, rel_err_pct)) = load_or_skip(&input.path, series) else {
            continue;
        };
        runs.push(MethodRun { label: input.label.clone(), t: table.time(), normalized, rel_err_pct });
    }

    if runs.is_empty() {
        warn!("no runs to compare");
        return Ok(0);
    }

    ensure_dir(out_dir)?;
    plots::plot_method_comparison(&out_dir.join("method_comparison.png"), &runs)?;
    Ok(runs.len())
}

/// Per-run velocity distributions plus a comparison of all runs that loaded.
/// Returns the labels that were processed
pub fn gas_velocities(inputs: &[Input], out_dir: &Path) -> Result<Vec<String>> {
    let mut speeds = Vec::new();

    for input in inputs {
        let Some(table) = load_or_skip(&input.path, TrajectoryTable::load_dat(&input.path)) else {
            continue;
        };
        let frames = GasFrames::new(&table);
        let sample = VelocitySample::from_frames(&frames);
        if sample.is_empty() {
            error!("skipping {}: no particle columns", input.path.display());
            continue;
        }
        let stats = SpeedStats::from_speeds(&sample.speeds);

        info!("=== {} ===", input.label);
        info!("particles: {}, frames: {}", frames.n_particles(), frames.n_frames());
        info!("mean speed: {:.4}", stats.mean);
        info!("std: {:.4}", stats.std);
        info!("max speed: {:.4}", stats.max);
        info!("effective temperature: {:.4}", stats.temperature);

        ensure_dir(out_dir)?;
        let path = out_dir.join(format!("dist_velocities_{}.png", slug(&input.label)));
        if let Err(e) = plots::plot_velocity_distribution(&path, &input.label, &sample, &stats) {
            error!("{}", e);
            continue;
        }
        speeds.push((input.label.clone(), sample.speeds));
    }

    if !speeds.is_empty() {
        plots::plot_distribution_comparison(&out_dir.join("velocity_comparison.png"), &speeds)?;
    }
    Ok(speeds.into_iter().map(|(label, _)| label).collect())
}

/// Paths of the first `show` particles of each run
pub fn gas_trajectories(inputs: &[Input], show: usize, width: f64, height: f64, out_dir: &Path) -> Result<Vec<String>> {
    let mut done = Vec::new();
    for input in inputs {
        let Some(table) = load_or_skip(&input.path, TrajectoryTable::load_dat(&input.path)) else {
            continue;
        };
        let frames = GasFrames::new(&table);
        ensure_dir(out_dir)?;
        let path = out_dir.join(format!("trajectories_{}.png", slug(&input.label)));
        match plots::plot_trajectories(&path, &frames, show, width, height) {
            Ok(()) => done.push(input.label.clone()),
            Err(e) => error!("{}", e),
        }
    }
    Ok(done)
}

/// Positions of every particle in one frame; out-of-range frames fall back to the last
pub fn gas_snapshot(input: &Input, frame: usize, width: f64, height: f64, radius: f64, out_dir: &Path) -> Result<usize> {
    let table = TrajectoryTable::load_dat(&input.path)?;
    let frames = GasFrames::new(&table);
    let last = frames.n_frames().saturating_sub(1);
    let k = if frame > last {
        warn!("frame {} out of range, using last frame {}", frame, last);
        last
    } else {
        frame
    };

    ensure_dir(out_dir)?;
    let path = out_dir.join(format!("snapshot_{}.png", slug(&input.label)));
    plots::plot_snapshot(&path, &frames, k, width, height, radius)?;
    Ok(k)
}

// =========================================================================================
// Pendulum
// =========================================================================================

/// Time series, energies, phase portraits, Poincaré section and spectrum of one run
pub fn pendulum_plots(path: &Path, omega_f: f64, out_dir: &Path) -> Result<Vec<String>> {
    let table = TrajectoryTable::load_csv(path)?;
    let series = PendulumSeries::from_table(&table)?;
    info!("{}: {} samples", path.display(), series.len());

    let spectrum = amplitude_spectrum(&series.theta1, sample_spacing(&series.t));
    if let Some(f) = spectrum.peak_frequency() {
        info!("dominant frequency of theta1: {:.4} Hz", f);
    }

    ensure_dir(out_dir)?;
    let written = plots::plot_pendulum_run(out_dir, &series, omega_f, &spectrum)?;
    info!("saved {} pendulum plots in {}", written.len(), out_dir.display());
    Ok(written)
}

pub fn pendulum_resonance(path: &Path, out_dir: &Path) -> Result<()> {
    let table = TrajectoryTable::load_csv(path)?;
    let series = ResonanceSeries::from_table(&table)?;

    let peak = series
        .omega_f
        .iter()
        .zip(&series.max_amp)
        .max_by(|a, b| a.1.total_cmp(b.1));
    if let Some((w, a)) = peak {
        info!("largest response {:.4} at omega_f = {:.4}", a, w);
    }

    ensure_dir(out_dir)?;
    plots::plot_resonance(out_dir, &series)
}

/// Sweep files `results_kappa*.csv` in `dir`, sorted by name
pub fn kappa_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(KAPPA_PREFIX) && n.ends_with(KAPPA_SUFFIX))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// θ1, θ2 and total energy of every sweep file in `dir` on shared axes
pub fn pendulum_compare(dir: &Path, out_dir: &Path) -> Result<Vec<String>> {
    let files = kappa_files(dir)?;
    if files.is_empty() {
        return Err(Error::NoInputs(dir.to_path_buf()));
    }

    let mut runs = Vec::new();
    for path in &files {
        let loaded = TrajectoryTable::load_csv(path).and_then(|t| PendulumSeries::from_table(&t));
        if let Some(series) = load_or_skip(path, loaded) {
            runs.push((kappa_label(path), series));
        }
    }

    if runs.is_empty() {
        return Err(Error::NoInputs(dir.to_path_buf()));
    }

    ensure_dir(out_dir)?;
    plots::plot_kappa_comparison(out_dir, &runs)?;
    info!("compared {} coupling values", runs.len());
    Ok(runs.into_iter().map(|(label, _)| label).collect())
}
