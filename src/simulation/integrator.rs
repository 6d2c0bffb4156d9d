//! Fixed-step time integrators
//!
//! Gas box: explicit Euler and velocity-Verlet drifts driven by `AccelSet`.
//! Walls and collisions are resolved afterwards by `GasBox::evolve`.
//!
//! Pendulums: classical RK4 and Euler–Cromer driven by `TorqueSet`.

use super::forces::{AccelSet, TorqueSet};
use super::states::{GasBox, NVec2, PendulumPair, PendulumVec};

/// Advance ball positions by one explicit Euler step
/// x_n+1 = x_n + dt v_n, v_n+1 = v_n + dt a_n
/// Time `sys.t` advances by `dt`
pub fn euler_integrator(sys: &mut GasBox, forces: &AccelSet, dt: f64) {
    let n = sys.balls.len();
    if n == 0 { // no balls, only the clock moves
        sys.t += dt;
        return;
    }

    let mut a = vec![NVec2::zeros(); n];
    if !forces.is_empty() {
        forces.accumulate_accels(sys.t, &*sys, &mut a);
    }

    for (b, a) in sys.balls.iter_mut().zip(a.iter()) {
        b.x += dt * b.v;
        b.v += dt * *a;
    }

    sys.t += dt;
}

/// Advance ball positions by one velocity–Verlet step
/// Uses two force evaluations per step and updates positions, velocities,
/// and `sys.t` in-place
pub fn verlet_integrator(sys: &mut GasBox, forces: &AccelSet, dt: f64) {
    let n = sys.balls.len();
    if n == 0 {
        sys.t += dt;
        return;
    }

    let half_dt = 0.5 * dt; // half step dt/2

    // Free flight is the common case, skip the force buffers entirely
    if forces.is_empty() {
        for b in sys.balls.iter_mut() {
            b.x += dt * b.v;
        }
        sys.t += dt;
        return;
    }

    // a_n from x_n at time t_n
    let mut a_old = vec![NVec2::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_old);

    // Kick: v_n+1/2 = v_n + (1/2 * dt) * a_n
    for (b, a) in sys.balls.iter_mut().zip(a_old.iter()) {
        b.v += half_dt * *a;
    }

    // Drift: x_n+1 = x_n + dt v_n+1/2
    for b in sys.balls.iter_mut() {
        b.x += dt * b.v;
    }

    sys.t += dt;

    // a_n+1 from x_n+1 at time t_n+1
    let mut a_new = vec![NVec2::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_new);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) * a_n+1
    for (b, a) in sys.balls.iter_mut().zip(a_new.iter()) {
        b.v += half_dt * *a;
    }
}

// =========================================================================================
// Pendulum integrators below
// =========================================================================================

/// ds/dt = [omega1, alpha1, omega2, alpha2]
pub fn derivatives(t: f64, s: &PendulumVec, torques: &TorqueSet) -> PendulumVec {
    let alpha = torques.accumulate(t, s);
    PendulumVec::new(s[1], alpha[0], s[3], alpha[1])
}

/// One classical Runge–Kutta 4 step of size `dt`
pub fn rk4_integrator(sys: &mut PendulumPair, torques: &TorqueSet, dt: f64) {
    let t = sys.t;
    let s = sys.s;
    let half_dt = 0.5 * dt;

    let k1 = derivatives(t, &s, torques);
    let k2 = derivatives(t + half_dt, &(s + half_dt * k1), torques);
    let k3 = derivatives(t + half_dt, &(s + half_dt * k2), torques);
    let k4 = derivatives(t + dt, &(s + dt * k3), torques);

    sys.s = s + (dt / 6.0) * (k1 + 2.0 * k2 + 2.0 * k3 + k4);
    sys.t += dt;
}

/// One Euler–Cromer step: omega first, then theta with the updated omega
pub fn euler_cromer_integrator(sys: &mut PendulumPair, torques: &TorqueSet, dt: f64) {
    let alpha = torques.accumulate(sys.t, &sys.s);

    sys.s[1] += alpha[0] * dt;
    sys.s[0] += sys.s[1] * dt;
    sys.s[3] += alpha[1] * dt;
    sys.s[2] += sys.s[3] * dt;

    sys.t += dt;
}
