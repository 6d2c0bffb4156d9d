//! Force / acceleration contributors for both simulators
//!
//! Defines the gas-box acceleration trait (an optional uniform field; wall and
//! pair collisions are impulsive and live in `gasbox`) and the pendulum
//! angular-acceleration terms: gravity, coupling, damping and forcing

use crate::configuration::config::CouplingConfig;
use crate::simulation::states::{GasBox, NVec2, PendulumVec};

/// Collection of acceleration terms acting on the balls of a [`GasBox`].
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per ball
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations at time `t` for all balls in `sys`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(&self, t: f64, sys: &GasBox, out: &mut [NVec2]) {
        for a in out.iter_mut() {
            *a = NVec2::zeros();
        }
        for term in &self.terms {
            term.acceleration(t, sys, out);
        }
    }
}

/// Trait for acceleration sources operating on a [`GasBox`]
/// Implementations add their contribution into `out[i]` for each ball
pub trait Acceleration {
    fn acceleration(&self, t: f64, sys: &GasBox, out: &mut [NVec2]);
}

/// Same acceleration for every ball, e.g. gravity pulling along -y
pub struct UniformField {
    pub a: NVec2,
}

impl Acceleration for UniformField {
    fn acceleration(&self, _t: f64, _sys: &GasBox, out: &mut [NVec2]) {
        for a in out.iter_mut() {
            *a += self.a;
        }
    }
}

// =========================================================================================
// Gas stuff above
// Pendulum stuff below
// =========================================================================================

/// Collection of angular-acceleration terms for a pendulum pair.
/// `out[i]` is d(omega_i)/dt for pendulum `i`
pub struct TorqueSet {
    terms: Vec<Box<dyn Torque + Send + Sync>>,
}

impl Default for TorqueSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TorqueSet {
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Torque + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    /// Sum every term at time `t` for state `s = [theta1, omega1, theta2, omega2]`
    pub fn accumulate(&self, t: f64, s: &PendulumVec) -> [f64; 2] {
        let mut out = [0.0; 2];
        for term in &self.terms {
            term.acceleration(t, s, &mut out);
        }
        out
    }
}

/// Trait for angular-acceleration sources on the two pendulums
pub trait Torque {
    fn acceleration(&self, t: f64, s: &PendulumVec, out: &mut [f64; 2]);
}

/// Restoring gravity: -(g/l) sin(theta), or -(g/l) theta in the small-angle model
pub struct Gravity {
    pub g: f64,
    pub l: f64,
    pub small_angle: bool,
}

impl Torque for Gravity {
    fn acceleration(&self, _t: f64, s: &PendulumVec, out: &mut [f64; 2]) {
        let w0 = self.g / self.l;
        for (i, a) in out.iter_mut().enumerate() {
            let theta = s[2 * i];
            let restoring = if self.small_angle { theta } else { theta.sin() };
            *a -= w0 * restoring;
        }
    }
}

/// Interaction between the pendulums as a function of d = theta_this - theta_other
pub struct Coupling {
    pub kappa: f64,
    pub law: CouplingConfig,
}

impl Coupling {
    /// Contribution to the pendulum whose angle difference to the other is `d`
    pub fn term(&self, d: f64) -> f64 {
        match self.law {
            CouplingConfig::Quadratic => -self.kappa * d * d,
            CouplingConfig::Signed => -self.kappa * d * d.abs(),
            CouplingConfig::Linear => -self.kappa * d,
        }
    }

    /// Potential energy stored in the coupling for d = theta1 - theta2
    pub fn potential(&self, d: f64) -> f64 {
        match self.law {
            CouplingConfig::Quadratic => self.kappa / 3.0 * d.powi(3),
            CouplingConfig::Signed => self.kappa / 3.0 * d.abs().powi(3),
            CouplingConfig::Linear => 0.5 * self.kappa * d * d,
        }
    }
}

impl Torque for Coupling {
    fn acceleration(&self, _t: f64, s: &PendulumVec, out: &mut [f64; 2]) {
        let d = s[0] - s[2];
        out[0] += self.term(d);
        out[1] += self.term(-d);
    }
}

/// Viscous damping: -gamma * omega
pub struct Damping {
    pub gamma: f64,
}

impl Torque for Damping {
    fn acceleration(&self, _t: f64, s: &PendulumVec, out: &mut [f64; 2]) {
        out[0] -= self.gamma * s[1];
        out[1] -= self.gamma * s[3];
    }
}

/// External drive F0 cos(omega_f t), identical on both pendulums
pub struct Forcing {
    pub f0: f64,
    pub omega_f: f64,
}

impl Torque for Forcing {
    fn acceleration(&self, t: f64, _s: &PendulumVec, out: &mut [f64; 2]) {
        let f = self.f0 * (self.omega_f * t).cos();
        out[0] += f;
        out[1] += f;
    }
}
