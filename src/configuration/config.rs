//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of the
//! two kinds of scenario the crate can run:
//!
//! - [`GasScenarioConfig`]      – hard disks bouncing in a box, written as a `.dat` trajectory
//! - [`PendulumScenarioConfig`] – two coupled pendulums, written as `.csv` tables
//!
//! # YAML format
//! A gas scenario:
//!
//! ```yaml
//! engine:
//!   integrator: "verlet"    # or "euler"
//! box:
//!   width: 10.0
//!   height: 10.0
//! particles:
//!   count: 25
//!   mass: 1.0
//!   radius: 0.1
//!   v_max: 1.0
//!   layout: "grid"          # or "random"
//! run:
//!   t_final: 10.0
//!   dt: 0.001
//!   dt_out: 0.05
//!   output: "results/dilute_gas.dat"
//! seed: 42                  # optional, entropy when absent
//! ```
//!
//! A pendulum scenario:
//!
//! ```yaml
//! engine:
//!   integrator: "rk4"       # or "euler_cromer"
//! physics:
//!   g: 9.81
//!   l: 1.0
//!   mass: 1.0
//!   kappa: 0.1
//!   gamma: 0.05
//!   f0: 0.0
//!   omega_f: 1.0
//!   coupling: "quadratic"   # "signed" | "linear"
//! initial: [0.5, 0.0, -0.3, 0.0]
//! run:
//!   t_final: 120.0
//!   dt: 0.001
//!   sample_every: 25
//!   output: "results/energy_transfer.csv"
//! ```
//!
//! Optional `kappa_sweep` and `resonance` sections turn a pendulum scenario
//! into a batch of runs. The scenario builders then map these types into
//! runtime structs.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Which integrator method used by the engine
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Explicit Euler drift, first order, drifts in energy
    Euler,

    #[serde(rename = "verlet")] // Velocity-Verlet, second order, symplectic
    Verlet,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta
    Rk4,

    #[serde(rename = "euler_cromer")] // Semi-implicit Euler: update omega first, then theta with the new omega
    EulerCromer,
}

/// Engine-level choice, shared by both scenario kinds
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // Time integrator used for advancing the system state
}

// =========================================================================================
// Gas in a box
// =========================================================================================

/// Initial placement of the particles
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LayoutConfig {
    #[default]
    Grid, // regular lattice filling the box
    Random, // uniform positions, rejecting overlaps
}

#[derive(Deserialize, Debug, Clone)]
pub struct BoxConfig {
    pub width: f64,
    pub height: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ParticlesConfig {
    pub count: usize, // number of balls
    #[serde(default = "default_mass")]
    pub mass: f64, // mass of every ball
    pub radius: f64, // radius of every ball
    pub v_max: f64, // velocity components drawn uniformly from [-v_max, v_max]
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub field: Option<[f64; 2]>, // optional uniform acceleration (ax, ay)
}

#[derive(Deserialize, Debug, Clone)]
pub struct GasRunConfig {
    pub t_final: f64, // simulated time
    pub dt: f64, // integration step
    pub dt_out: f64, // interval between written frames
    pub output: PathBuf, // trajectory file (.dat)
}

/// Top-level gas scenario loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct GasScenarioConfig {
    pub engine: EngineConfig,
    #[serde(rename = "box")]
    pub bounds: BoxConfig,
    pub particles: ParticlesConfig,
    pub run: GasRunConfig,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_mass() -> f64 { 1.0 }

impl GasScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.engine.integrator, IntegratorConfig::Euler | IntegratorConfig::Verlet) {
            return Err(Error::InvalidConfig(format!(
                "gas scenarios support euler or verlet, got {:?}",
                self.engine.integrator
            )));
        }
        positive("box width", self.bounds.width)?;
        positive("box height", self.bounds.height)?;
        let p = &self.particles;
        if p.count == 0 {
            return Err(Error::InvalidConfig("particle count must be at least 1".into()));
        }
        positive("particle mass", p.mass)?;
        non_negative("particle radius", p.radius)?;
        non_negative("v_max", p.v_max)?;
        if let Some([ax, ay]) = p.field {
            finite("field x", ax)?;
            finite("field y", ay)?;
        }
        if 2.0 * p.radius > self.bounds.width.min(self.bounds.height) {
            return Err(Error::InvalidConfig("particle diameter exceeds the box".into()));
        }
        validate_run(self.run.t_final, self.run.dt)?;
        positive("dt_out", self.run.dt_out)?;
        Ok(())
    }
}

// =========================================================================================
// Coupled pendulums
// =========================================================================================

/// Functional form of the interaction between the two pendulums
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CouplingConfig {
    #[default]
    Quadratic, // -kappa * d^2, always the same sign
    Signed, // -kappa * d * |d|, restoring in both directions
    Linear, // -kappa * d, harmonic spring
}

#[derive(Deserialize, Debug, Clone)]
pub struct PhysicsConfig {
    #[serde(default = "default_g")]
    pub g: f64, // gravitational acceleration
    #[serde(default = "default_length")]
    pub l: f64, // pendulum length
    #[serde(default = "default_mass")]
    pub mass: f64, // bob mass
    #[serde(default)]
    pub kappa: f64, // coupling strength
    #[serde(default)]
    pub gamma: f64, // damping coefficient
    #[serde(default)]
    pub f0: f64, // forcing amplitude
    #[serde(default = "default_omega_f")]
    pub omega_f: f64, // forcing angular frequency
    #[serde(default)]
    pub coupling: CouplingConfig,
    #[serde(default)]
    pub small_angle: bool, // replace sin(theta) by theta
}

fn default_g() -> f64 { 9.81 }
fn default_length() -> f64 { 1.0 }
fn default_omega_f() -> f64 { 1.0 }
fn default_sample_every() -> usize { 25 }

#[derive(Deserialize, Debug, Clone)]
pub struct PendulumRunConfig {
    pub t_final: f64,
    pub dt: f64,
    #[serde(default = "default_sample_every")]
    pub sample_every: usize, // write one row every n steps (last step always written)
    pub output: PathBuf, // csv file, or output directory for sweeps
}

/// Run once per coupling value, one file per value
#[derive(Deserialize, Debug, Clone)]
pub struct KappaSweepConfig {
    pub values: Vec<f64>,
}

/// Scan the forcing frequency and record the peak amplitude of pendulum 1
#[derive(Deserialize, Debug, Clone)]
pub struct ResonanceConfig {
    pub omega_min: f64,
    pub omega_max: f64,
    pub steps: usize,
}

/// Top-level pendulum scenario loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct PendulumScenarioConfig {
    pub engine: EngineConfig,
    pub physics: PhysicsConfig,
    pub initial: [f64; 4], // theta1, omega1, theta2, omega2
    pub run: PendulumRunConfig,
    #[serde(default)]
    pub kappa_sweep: Option<KappaSweepConfig>,
    #[serde(default)]
    pub resonance: Option<ResonanceConfig>,
}

impl PendulumScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.engine.integrator, IntegratorConfig::Rk4 | IntegratorConfig::EulerCromer) {
            return Err(Error::InvalidConfig(format!(
                "pendulum scenarios support rk4 or euler_cromer, got {:?}",
                self.engine.integrator
            )));
        }
        let ph = &self.physics;
        positive("pendulum length", ph.l)?;
        positive("pendulum mass", ph.mass)?;
        finite("g", ph.g)?;
        finite("kappa", ph.kappa)?;
        finite("gamma", ph.gamma)?;
        finite("f0", ph.f0)?;
        finite("omega_f", ph.omega_f)?;
        for (name, v) in ["theta1", "omega1", "theta2", "omega2"].iter().zip(self.initial) {
            finite(name, v)?;
        }
        validate_run(self.run.t_final, self.run.dt)?;
        if self.run.sample_every == 0 {
            return Err(Error::InvalidConfig("sample_every must be at least 1".into()));
        }
        if let Some(sweep) = &self.kappa_sweep {
            if sweep.values.is_empty() {
                return Err(Error::InvalidConfig("kappa_sweep needs at least one value".into()));
            }
            for &kappa in &sweep.values {
                finite("kappa_sweep value", kappa)?;
            }
        }
        if let Some(res) = &self.resonance {
            if res.steps < 2 {
                return Err(Error::InvalidConfig("resonance sweep needs at least 2 steps".into()));
            }
            finite("omega_min", res.omega_min)?;
            finite("omega_max", res.omega_max)?;
            if res.omega_max <= res.omega_min {
                return Err(Error::InvalidConfig("resonance omega_max must exceed omega_min".into()));
            }
        }
        Ok(())
    }
}

fn validate_run(t_final: f64, dt: f64) -> Result<()> {
    positive("dt", dt)?;
    positive("t_final", t_final)
}

// NaN fails every comparison, so each check is written as "not (valid)"

fn finite(name: &str, x: f64) -> Result<()> {
    if !x.is_finite() {
        return Err(Error::InvalidConfig(format!("{} must be finite, got {}", name, x)));
    }
    Ok(())
}

fn positive(name: &str, x: f64) -> Result<()> {
    finite(name, x)?;
    if !(x > 0.0) {
        return Err(Error::InvalidConfig(format!("{} must be positive, got {}", name, x)));
    }
    Ok(())
}

fn non_negative(name: &str, x: f64) -> Result<()> {
    finite(name, x)?;
    if !(x >= 0.0) {
        return Err(Error::InvalidConfig(format!("{} must be non-negative, got {}", name, x)));
    }
    Ok(())
}

// =========================================================================================
// Loading
// =========================================================================================

/// Deserialize any scenario type from a YAML file
pub fn load_yaml<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);
    Ok(serde_yaml::from_reader(reader)?)
}

pub fn load_gas_scenario(path: &Path) -> Result<GasScenarioConfig> {
    let cfg: GasScenarioConfig = load_yaml(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_pendulum_scenario(path: &Path) -> Result<PendulumScenarioConfig> {
    let cfg: PendulumScenarioConfig = load_yaml(path)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_gas_scenario_with_defaults() {
        let file = write_yaml(
            r#"
engine:
  integrator: "verlet"
box:
  width: 10.0
  height: 8.0
particles:
  count: 25
  radius: 0.1
  v_max: 1.0
run:
  t_final: 1.0
  dt: 0.001
  dt_out: 0.05
  output: "results/out.dat"
"#,
        );
        let cfg = load_gas_scenario(file.path()).unwrap();
        assert_eq!(cfg.engine.integrator, IntegratorConfig::Verlet);
        assert_eq!(cfg.particles.layout, LayoutConfig::Grid);
        assert_eq!(cfg.particles.mass, 1.0);
        assert!(cfg.particles.field.is_none());
        assert!(cfg.seed.is_none());
        assert_eq!(cfg.bounds.height, 8.0);
    }

    #[test]
    fn gas_scenario_rejects_rk4() {
        let file = write_yaml(
            r#"
engine:
  integrator: "rk4"
box: { width: 10.0, height: 10.0 }
particles: { count: 4, radius: 0.1, v_max: 1.0 }
run: { t_final: 1.0, dt: 0.01, dt_out: 0.1, output: "x.dat" }
"#,
        );
        assert!(matches!(load_gas_scenario(file.path()), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_pendulum_scenario_with_sweeps() {
        let file = write_yaml(
            r#"
engine:
  integrator: "euler_cromer"
physics:
  kappa: 0.5
  coupling: "signed"
initial: [0.5, 0.0, -0.3, 0.0]
run:
  t_final: 10.0
  dt: 0.01
  output: "results"
kappa_sweep:
  values: [0.2, 0.5]
resonance:
  omega_min: 0.2
  omega_max: 2.0
  steps: 40
"#,
        );
        let cfg = load_pendulum_scenario(file.path()).unwrap();
        assert_eq!(cfg.engine.integrator, IntegratorConfig::EulerCromer);
        assert_eq!(cfg.physics.coupling, CouplingConfig::Signed);
        assert_eq!(cfg.physics.g, 9.81);
        assert_eq!(cfg.run.sample_every, 25);
        assert_eq!(cfg.kappa_sweep.unwrap().values, vec![0.2, 0.5]);
        assert_eq!(cfg.resonance.unwrap().steps, 40);
    }

    #[test]
    fn pendulum_scenario_rejects_zero_dt() {
        let file = write_yaml(
            r#"
engine: { integrator: "rk4" }
physics: {}
initial: [0.1, 0.0, 0.0, 0.0]
run: { t_final: 1.0, dt: 0.0, output: "x.csv" }
"#,
        );
        assert!(matches!(load_pendulum_scenario(file.path()), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn gas_scenario_rejects_nan_and_infinity() {
        let fields = [
            "box: { width: .nan, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: 1.0 }\nrun: { t_final: 1.0, dt: 0.01, dt_out: 0.1, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: .nan }\nrun: { t_final: 1.0, dt: 0.01, dt_out: 0.1, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: .nan, v_max: 1.0 }\nrun: { t_final: 1.0, dt: 0.01, dt_out: 0.1, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: .inf }\nrun: { t_final: 1.0, dt: 0.01, dt_out: 0.1, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: 1.0 }\nrun: { t_final: 1.0, dt: .nan, dt_out: 0.1, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: 1.0 }\nrun: { t_final: .nan, dt: 0.01, dt_out: 0.1, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: 1.0 }\nrun: { t_final: 1.0, dt: 0.01, dt_out: .nan, output: \"x.dat\" }",
            "box: { width: 10.0, height: 10.0 }\nparticles: { count: 4, radius: 0.1, v_max: 1.0, field: [0.0, .nan] }\nrun: { t_final: 1.0, dt: 0.01, dt_out: 0.1, output: \"x.dat\" }",
        ];
        for body in fields {
            let file = write_yaml(&format!("engine: {{ integrator: \"verlet\" }}\n{}\n", body));
            let result = load_gas_scenario(file.path());
            assert!(matches!(result, Err(Error::InvalidConfig(_))), "accepted:\n{}", body);
        }
    }

    #[test]
    fn pendulum_scenario_rejects_nan() {
        let file = write_yaml(
            r#"
engine: { integrator: "rk4" }
physics: { kappa: .nan }
initial: [0.1, 0.0, 0.0, 0.0]
run: { t_final: 1.0, dt: 0.01, output: "x.csv" }
"#,
        );
        assert!(matches!(load_pendulum_scenario(file.path()), Err(Error::InvalidConfig(_))));

        let file = write_yaml(
            r#"
engine: { integrator: "rk4" }
physics: {}
initial: [.nan, 0.0, 0.0, 0.0]
run: { t_final: 1.0, dt: 0.01, output: "x.csv" }
"#,
        );
        assert!(matches!(load_pendulum_scenario(file.path()), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_gas_scenario(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
