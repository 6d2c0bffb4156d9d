//! Core state types for both simulators.
//!
//! - `Ball` / `GasBox`   hard disks in a rectangular box using `NVec2`
//! - `PendulumPair`      two coupled pendulums as `[theta1, omega1, theta2, omega2]`
//!
//! Each state holds the current simulation time `t`.

use nalgebra::{Vector2, Vector4};
pub type NVec2 = Vector2<f64>;
pub type PendulumVec = Vector4<f64>;

#[derive(Debug, Clone)]
pub struct Ball {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub radius: f64, // radius (collision distance)
}

impl Ball {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, m: f64, radius: f64) -> Self {
        Self {
            x: NVec2::new(x, y),
            v: NVec2::new(vx, vy),
            m,
            radius,
        }
    }

    /// ½ m |v|²
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }

    /// Centres closer than the sum of radii
    pub fn overlaps(&self, other: &Ball) -> bool {
        (self.x - other.x).norm() < self.radius + other.radius
    }
}

#[derive(Debug, Clone)]
pub struct GasBox {
    pub width: f64, // box extent along x, walls at 0 and width
    pub height: f64, // box extent along y, walls at 0 and height
    pub balls: Vec<Ball>, // collection of particles
    pub wall_hits: u64, // number of ball-wall bounces since last reset
    pub t: f64, // time
}

impl GasBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            balls: Vec::new(),
            wall_hits: 0,
            t: 0.0,
        }
    }

    /// Total kinetic energy of every ball
    pub fn total_energy(&self) -> f64 {
        self.balls.iter().map(Ball::kinetic_energy).sum()
    }

    /// Total linear momentum Σ m v
    pub fn momentum(&self) -> NVec2 {
        self.balls.iter().fold(NVec2::zeros(), |p, b| p + b.m * b.v)
    }
}

/// Two pendulums sharing one pivot line.
/// State layout `s = [theta1, omega1, theta2, omega2]`
#[derive(Debug, Clone, Copy)]
pub struct PendulumPair {
    pub s: PendulumVec, // angles (rad) and angular velocities (rad/s)
    pub t: f64, // time
}

impl PendulumPair {
    pub fn new(theta1: f64, omega1: f64, theta2: f64, omega2: f64) -> Self {
        Self {
            s: PendulumVec::new(theta1, omega1, theta2, omega2),
            t: 0.0,
        }
    }

    pub fn theta(&self, i: usize) -> f64 {
        self.s[2 * i]
    }

    pub fn omega(&self, i: usize) -> f64 {
        self.s[2 * i + 1]
    }
}
