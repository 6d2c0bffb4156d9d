//! Numerical and physical parameters for the simulations
//!
//! `GasParameters` holds the gas-box run settings:
//! - integration step, output interval and end time,
//! - per-particle mass, radius and initial speed bound,
//! - random seed for the initial layout
//!
//! `PendulumParameters` holds the pendulum constants and run settings

use crate::configuration::config::CouplingConfig;

#[derive(Debug, Clone)]
pub struct GasParameters {
    pub t_final: f64, // time end
    pub dt: f64, // step size
    pub dt_out: f64, // output interval
    pub mass: f64, // particle mass
    pub radius: f64, // particle radius
    pub v_max: f64, // bound for initial velocity components
    pub seed: Option<u64>, // deterministic seed, entropy when None
}

#[derive(Debug, Clone)]
pub struct PendulumParameters {
    pub g: f64, // gravitational acceleration
    pub l: f64, // length
    pub mass: f64, // bob mass
    pub kappa: f64, // coupling strength
    pub gamma: f64, // damping
    pub f0: f64, // forcing amplitude
    pub omega_f: f64, // forcing angular frequency
    pub coupling: CouplingConfig, // coupling law
    pub small_angle: bool, // sin(theta) ~ theta
    pub t_final: f64, // time end
    pub dt: f64, // step size
    pub sample_every: usize, // output decimation
}

impl Default for PendulumParameters {
    fn default() -> Self {
        Self {
            g: 9.81,
            l: 1.0,
            mass: 1.0,
            kappa: 0.0,
            gamma: 0.0,
            f0: 0.0,
            omega_f: 1.0,
            coupling: CouplingConfig::Quadratic,
            small_angle: false,
            t_final: 50.0,
            dt: 0.001,
            sample_every: 25,
        }
    }
}
