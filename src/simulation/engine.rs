//! High-level runtime engine settings
//!
//! Selects the integrator used when building and running a scenario

use crate::configuration::config::IntegratorConfig;

#[derive(Debug, Clone, Copy)]
pub struct Engine {
    pub integrator: IntegratorConfig, // euler, verlet, rk4 or euler_cromer
}

impl Engine {
    pub fn method_name(&self) -> &'static str {
        match self.integrator {
            IntegratorConfig::Euler => "Euler",
            IntegratorConfig::Verlet => "Velocity-Verlet",
            IntegratorConfig::Rk4 => "Runge-Kutta 4",
            IntegratorConfig::EulerCromer => "Euler-Cromer",
        }
    }
}
