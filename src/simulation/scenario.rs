//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a YAML-facing config and produces a runtime bundle containing:
//! - engine settings (`Engine`)
//! - numerical and physical parameters
//! - system state at t = 0
//! - active force set (`AccelSet` for the gas, `TorqueSet` via the parameters for pendulums)

use std::path::PathBuf;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::configuration::config::{
    GasScenarioConfig, KappaSweepConfig, LayoutConfig, PendulumScenarioConfig, ResonanceConfig,
};
use crate::error::Result;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{AccelSet, UniformField};
use crate::simulation::gasbox::RunSummary;
use crate::simulation::params::{GasParameters, PendulumParameters};
use crate::simulation::pendulum::{kappa_sweep, resonance_sweep, write_frames_csv, write_resonance_csv};
use crate::simulation::states::{GasBox, NVec2, PendulumPair};

/// Runtime bundle for a gas-in-a-box run
pub struct GasScenario {
    pub engine: Engine,
    pub parameters: GasParameters,
    pub system: GasBox,
    pub forces: AccelSet,
    pub output: PathBuf,
}

impl GasScenario {
    pub fn build_scenario(cfg: GasScenarioConfig) -> Self {
        let p_cfg = cfg.particles;
        let parameters = GasParameters {
            t_final: cfg.run.t_final,
            dt: cfg.run.dt,
            dt_out: cfg.run.dt_out,
            mass: p_cfg.mass,
            radius: p_cfg.radius,
            v_max: p_cfg.v_max,
            seed: cfg.seed,
        };

        let engine = Engine { integrator: cfg.engine.integrator };

        // Balls: seeded when asked for, otherwise fresh entropy per run
        let mut rng = match parameters.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut system = GasBox::new(cfg.bounds.width, cfg.bounds.height);
        match p_cfg.layout {
            LayoutConfig::Grid => system.init_grid(p_cfg.count, parameters.mass, parameters.radius, parameters.v_max, &mut rng),
            LayoutConfig::Random => system.init_random(p_cfg.count, parameters.mass, parameters.radius, parameters.v_max, &mut rng),
        }

        // Forces: free flight unless a uniform field is configured
        let mut forces = AccelSet::new();
        if let Some([ax, ay]) = p_cfg.field {
            forces = forces.with(UniformField { a: NVec2::new(ax, ay) });
        }

        Self {
            engine,
            parameters,
            system,
            forces,
            output: cfg.run.output,
        }
    }

    /// Run to `t_final` and write the trajectory to `self.output`
    pub fn run(&mut self) -> Result<RunSummary> {
        info!(
            "gas: {} particles in {}x{} box, {} integrator, t_final = {}",
            self.system.balls.len(),
            self.system.width,
            self.system.height,
            self.engine.method_name(),
            self.parameters.t_final
        );
        let summary = self.system.run_to_file(
            self.engine.integrator,
            &self.forces,
            &self.parameters,
            &self.output,
        )?;
        info!(
            "wrote {} frames to {} ({} steps, {} wall hits, {:.3} hits per unit time)",
            summary.frames,
            self.output.display(),
            summary.steps,
            summary.wall_hits,
            summary.wall_hit_rate
        );
        info!(
            "energy: initial {:.6}, final {:.6}, conservation {:.4}%",
            summary.initial_energy,
            summary.final_energy,
            summary.conservation_pct()
        );
        Ok(summary)
    }
}

/// What a pendulum scenario produces when run
#[derive(Debug, Clone)]
pub enum PendulumOutput {
    Single(PathBuf), // one csv
    KappaSweep(Vec<PathBuf>), // one csv per coupling value
    Resonance(PathBuf), // omega_f, max_amp_theta1 csv
}

/// Runtime bundle for a coupled-pendulum run
pub struct PendulumScenario {
    pub engine: Engine,
    pub parameters: PendulumParameters,
    pub system: PendulumPair,
    pub output: PathBuf,
    pub kappa_sweep: Option<KappaSweepConfig>,
    pub resonance: Option<ResonanceConfig>,
}

impl PendulumScenario {
    pub fn build_scenario(cfg: PendulumScenarioConfig) -> Self {
        let ph = cfg.physics;
        let parameters = PendulumParameters {
            g: ph.g,
            l: ph.l,
            mass: ph.mass,
            kappa: ph.kappa,
            gamma: ph.gamma,
            f0: ph.f0,
            omega_f: ph.omega_f,
            coupling: ph.coupling,
            small_angle: ph.small_angle,
            t_final: cfg.run.t_final,
            dt: cfg.run.dt,
            sample_every: cfg.run.sample_every,
        };

        let [theta1, omega1, theta2, omega2] = cfg.initial;
        let system = PendulumPair::new(theta1, omega1, theta2, omega2);

        Self {
            engine: Engine { integrator: cfg.engine.integrator },
            parameters,
            system,
            output: cfg.run.output,
            kappa_sweep: cfg.kappa_sweep,
            resonance: cfg.resonance,
        }
    }

    /// Resonance sweep takes precedence over a coupling sweep, then a single run.
    /// For a coupling sweep `self.output` is a directory
    pub fn run(&self) -> Result<PendulumOutput> {
        let integrator = self.engine.integrator;
        info!(
            "pendulum: {} integrator, kappa = {}, gamma = {}, f0 = {}, coupling {:?}",
            self.engine.method_name(),
            self.parameters.kappa,
            self.parameters.gamma,
            self.parameters.f0,
            self.parameters.coupling
        );

        if let Some(sweep) = &self.resonance {
            let points = resonance_sweep(self.system, integrator, &self.parameters, sweep);
            write_resonance_csv(&points, &self.output)?;
            return Ok(PendulumOutput::Resonance(self.output.clone()));
        }

        if let Some(sweep) = &self.kappa_sweep {
            let paths = kappa_sweep(self.system, integrator, &self.parameters, &sweep.values, &self.output)?;
            return Ok(PendulumOutput::KappaSweep(paths));
        }

        let mut pair = self.system;
        let frames = pair.run(integrator, &self.parameters);
        write_frames_csv(&frames, &self.output)?;
        Ok(PendulumOutput::Single(self.output.clone()))
    }
}
