//! Two coupled nonlinear pendulums
//!
//! Runs are sampled every `sample_every` steps (the initial and the last state
//! are always kept) and written as CSV with the header
//! `t,theta1,omega1,theta2,omega2,E1,E2,E_total`.
//!
//! Two batch modes sit on top of a single run:
//! - coupling sweep: one file `results_kappa<tag>.csv` per coupling value
//! - resonance sweep: peak |theta1| for linearly spaced forcing frequencies

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::analysis::linspace;
use crate::analysis::phase::kappa_file_name;
use crate::configuration::config::{IntegratorConfig, ResonanceConfig};
use crate::error::{Error, Result};
use crate::simulation::forces::{Coupling, Damping, Forcing, Gravity, TorqueSet};
use crate::simulation::integrator::{euler_cromer_integrator, rk4_integrator};
use crate::simulation::params::PendulumParameters;
use crate::simulation::states::PendulumPair;

/// One sampled row of a pendulum run
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PendulumFrame {
    pub t: f64,
    pub theta1: f64,
    pub omega1: f64,
    pub theta2: f64,
    pub omega2: f64,
    #[serde(rename = "E1")]
    pub e1: f64,
    #[serde(rename = "E2")]
    pub e2: f64,
    #[serde(rename = "E_total")]
    pub e_total: f64,
}

/// One point of a resonance curve
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResonancePoint {
    pub omega_f: f64,
    pub max_amp_theta1: f64,
}

impl PendulumParameters {
    pub fn coupling(&self) -> Coupling {
        Coupling { kappa: self.kappa, law: self.coupling }
    }

    /// Gravity and coupling always, damping and forcing only when non-zero
    pub fn build_torques(&self) -> TorqueSet {
        let mut torques = TorqueSet::new()
            .with(Gravity { g: self.g, l: self.l, small_angle: self.small_angle })
            .with(self.coupling());
        if self.gamma != 0.0 {
            torques = torques.with(Damping { gamma: self.gamma });
        }
        if self.f0 != 0.0 {
            torques = torques.with(Forcing { f0: self.f0, omega_f: self.omega_f });
        }
        torques
    }

    /// ½ m l² ω² + m g l (1 − cos θ)
    pub fn pendulum_energy(&self, theta: f64, omega: f64) -> f64 {
        let kinetic = 0.5 * self.mass * self.l * self.l * omega * omega; // I ω² / 2 with I = m l²
        let potential = self.mass * self.g * self.l * (1.0 - theta.cos()); // bob height l (1 − cos θ) above rest
        kinetic + potential
    }

    /// Number of fixed steps covering `t_final`
    pub fn steps(&self) -> usize {
        (self.t_final / self.dt).round() as usize
    }
}

impl PendulumPair {
    /// (E1, E2, E1 + E2 + coupling potential)
    pub fn energies(&self, params: &PendulumParameters) -> (f64, f64, f64) {
        let e1 = params.pendulum_energy(self.theta(0), self.omega(0));
        let e2 = params.pendulum_energy(self.theta(1), self.omega(1));
        let vc = params.coupling().potential(self.theta(0) - self.theta(1));
        (e1, e2, e1 + e2 + vc)
    }

    pub fn frame(&self, params: &PendulumParameters) -> PendulumFrame {
        let (e1, e2, e_total) = self.energies(params);
        PendulumFrame {
            t: self.t,
            theta1: self.s[0],
            omega1: self.s[1],
            theta2: self.s[2],
            omega2: self.s[3],
            e1,
            e2,
            e_total,
        }
    }

    pub fn evolve(&mut self, integrator: IntegratorConfig, torques: &TorqueSet, dt: f64) {
        match integrator {
            IntegratorConfig::EulerCromer => euler_cromer_integrator(self, torques, dt),
            _ => rk4_integrator(self, torques, dt),
        }
    }

    /// Integrate from the current state and return the sampled frames
    pub fn run(&mut self, integrator: IntegratorConfig, params: &PendulumParameters) -> Vec<PendulumFrame> {
        let torques = params.build_torques();
        let steps = params.steps();
        let every = params.sample_every.max(1);

        let mut frames = Vec::with_capacity(steps / every + 2);
        frames.push(self.frame(params)); // t = 0

        for n in 1..=steps {
            self.evolve(integrator, &torques, params.dt);
            // decimated output, the final state is kept even off the sampling grid
            if n % every == 0 || n == steps {
                frames.push(self.frame(params));
            }
        }

        if let (Some(first), Some(last)) = (frames.first(), frames.last()) {
            debug!(
                "pendulum run: {} frames, E_total {:.6} -> {:.6}",
                frames.len(),
                first.e_total,
                last.e_total
            );
        }
        frames
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// Write rows with a header taken from the serialized field names
fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

pub fn write_frames_csv(frames: &[PendulumFrame], path: &Path) -> Result<()> {
    write_rows(frames, path)?;
    info!("wrote {} frames to {}", frames.len(), path.display());
    Ok(())
}

/// One run per coupling value, each written to `dir/results_kappa<tag>.csv`
pub fn kappa_sweep(
    initial: PendulumPair,
    integrator: IntegratorConfig,
    params: &PendulumParameters,
    values: &[f64],
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(values.len());
    for &kappa in values {
        let run_params = PendulumParameters { kappa, ..params.clone() };
        let mut pair = initial;
        let frames = pair.run(integrator, &run_params);

        let path = dir.join(kappa_file_name(kappa));
        write_frames_csv(&frames, &path)?;
        info!("kappa = {} done", kappa);
        written.push(path);
    }
    Ok(written)
}

/// Peak |theta1| over the sampled frames for each forcing frequency
pub fn resonance_sweep(
    initial: PendulumPair,
    integrator: IntegratorConfig,
    params: &PendulumParameters,
    sweep: &ResonanceConfig,
) -> Vec<ResonancePoint> {
    let omegas = linspace(sweep.omega_min, sweep.omega_max, sweep.steps);
    let total = omegas.len();

    omegas
        .into_iter()
        .enumerate()
        .map(|(i, omega_f)| {
            let run_params = PendulumParameters { omega_f, ..params.clone() };
            let mut pair = initial;
            let frames = pair.run(integrator, &run_params);
            let max_amp_theta1 = frames.iter().map(|f| f.theta1.abs()).fold(0.0, f64::max);
            debug!("resonance {}/{}: omega_f = {:.4}, max |theta1| = {:.4}", i + 1, total, omega_f, max_amp_theta1);
            ResonancePoint { omega_f, max_amp_theta1 }
        })
        .collect()
}

pub fn write_resonance_csv(points: &[ResonancePoint], path: &Path) -> Result<()> {
    write_rows(points, path)?;
    info!("wrote resonance curve ({} points) to {}", points.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_params() -> PendulumParameters {
        PendulumParameters { t_final: 1.0, dt: 0.01, sample_every: 10, ..Default::default() }
    }

    #[test]
    fn resting_pair_has_zero_energy() {
        let pair = PendulumPair::new(0.0, 0.0, 0.0, 0.0);
        let (e1, e2, et) = pair.energies(&free_params());
        assert_eq!((e1, e2, et), (0.0, 0.0, 0.0));
    }

    #[test]
    fn run_keeps_first_and_last_sample() {
        let params = PendulumParameters { t_final: 1.05, ..free_params() };
        let mut pair = PendulumPair::new(0.3, 0.0, -0.2, 0.0);
        let frames = pair.run(IntegratorConfig::Rk4, &params);
        // 105 steps: t = 0, every 10th step, then step 105
        assert_eq!(frames.len(), 1 + 10 + 1);
        assert_eq!(frames[0].t, 0.0);
        assert!((frames.last().unwrap().t - 1.05).abs() < 1e-9);
    }

    #[test]
    fn optional_terms_only_when_non_zero() {
        let params = PendulumParameters { gamma: 0.0, f0: 0.0, ..free_params() };
        let s = crate::simulation::states::PendulumVec::new(0.0, 1.0, 0.0, 1.0);
        // no damping: resting angles give no acceleration even with omega != 0
        assert_eq!(params.build_torques().accumulate(0.0, &s), [0.0, 0.0]);

        let damped = PendulumParameters { gamma: 0.5, ..free_params() };
        assert_eq!(damped.build_torques().accumulate(0.0, &s), [-0.5, -0.5]);
    }
}
