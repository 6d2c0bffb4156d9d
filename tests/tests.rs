use std::fs;
use std::io::Write;
use std::path::Path;

use phystraj::analysis::energy::{total_kinetic_energy, ConservationStats};
use phystraj::analysis::phase::{kappa_label, poincare_section};
use phystraj::analysis::spectrum::amplitude_spectrum;
use phystraj::configuration::config::ResonanceConfig;
use phystraj::pipelines::{self, Input};
use phystraj::simulation::params::{GasParameters, PendulumParameters};
use phystraj::simulation::pendulum::{kappa_sweep, resonance_sweep, write_frames_csv, write_resonance_csv};
use phystraj::{
    AccelSet, Ball, Error, GasBox, GasFrames, GasScenario, IntegratorConfig, PendulumOutput, PendulumPair,
    PendulumScenario, PendulumSeries, ResonancePoint, ResonanceSeries, TrajectoryTable,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::tempdir;

/// Write `contents` to `dir/name` and return the full path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut f = fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
}

/// Short gas run settings
pub fn gas_params(t_final: f64) -> GasParameters {
    GasParameters {
        t_final,
        dt: 0.001,
        dt_out: 0.05,
        mass: 1.0,
        radius: 0.1,
        v_max: 1.0,
        seed: Some(42),
    }
}

/// Seeded box of `n` balls on a lattice
pub fn grid_box(n: usize, p: &GasParameters) -> GasBox {
    let mut rng = StdRng::seed_from_u64(p.seed.unwrap_or(0));
    let mut sys = GasBox::new(10.0, 10.0);
    sys.init_grid(n, p.mass, p.radius, p.v_max, &mut rng);
    sys
}

/// Free, undamped, unforced pendulum pair
pub fn free_pendulum(t_final: f64, dt: f64) -> PendulumParameters {
    PendulumParameters {
        t_final,
        dt,
        sample_every: 1,
        ..Default::default()
    }
}

/// Short Verlet run of 9 balls written to `dir/name`
pub fn simulated_run(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let p = gas_params(0.5);
    let mut sys = grid_box(9, &p);
    sys.run_to_file(IntegratorConfig::Verlet, &AccelSet::new(), &p, &path).unwrap();
    path
}

/// Forced, weakly coupled pair for short sweeps
pub fn forced_pendulum() -> PendulumParameters {
    PendulumParameters {
        kappa: 0.2,
        f0: 0.5,
        t_final: 2.0,
        dt: 0.01,
        sample_every: 5,
        ..Default::default()
    }
}

fn max_energy_drift(series: &[f64]) -> f64 {
    let e0 = series[0];
    series.iter().map(|e| (e - e0).abs()).fold(0.0, f64::max)
}

// ==================================================================================
// Trajectory loading
// ==================================================================================

#[test]
fn kinetic_energy_of_a_loaded_frame() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "two.dat", "# t x0 y0 vx0 vy0 x1 y1 vx1 vy1\n0 0 0 3 4 1 1 0 0\n");

    let table = TrajectoryTable::load_dat(&path).unwrap();
    let energy = total_kinetic_energy(&table, 1.0);

    assert_eq!(energy.len(), 1);
    assert!((energy[0] - 12.5).abs() < 1e-12, "got {}", energy[0]);
}

#[test]
fn particle_columns_follow_layout() {
    for n in 1..=3usize {
        let row: Vec<f64> = (0..1 + 4 * n).map(|c| c as f64).collect();
        let table = TrajectoryTable::from_rows(&[row], None).unwrap();
        let frames = GasFrames::new(&table);

        assert_eq!(frames.n_particles(), n);
        for i in 0..n {
            let (x, y) = frames.positions(i).unwrap();
            let (vx, vy) = frames.velocities(i).unwrap();
            assert_eq!(x[0], (1 + 4 * i) as f64);
            assert_eq!(y[0], (2 + 4 * i) as f64);
            assert_eq!(vx[0], (3 + 4 * i) as f64);
            assert_eq!(vy[0], (4 + 4 * i) as f64);
        }
    }
}

#[test]
fn ragged_dat_is_rejected() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "bad.dat", "0 1 2 3 4\n1 1 2 3\n");
    let err = TrajectoryTable::load_dat(&path).unwrap_err();
    assert!(matches!(err, Error::RaggedRow { .. }), "unexpected {:?}", err);
}

#[test]
fn simulated_trajectory_loads_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("run.dat");
    let p = gas_params(0.5);
    let mut sys = grid_box(9, &p);

    let summary = sys.run_to_file(IntegratorConfig::Verlet, &AccelSet::new(), &p, &path).unwrap();

    let table = TrajectoryTable::load_dat(&path).unwrap();
    let frames = GasFrames::new(&table);
    assert_eq!(table.n_rows(), summary.frames);
    assert_eq!(frames.n_particles(), 9);
    assert_eq!(table.time()[0], 0.0);

    let energy = total_kinetic_energy(&table, p.mass);
    assert!((energy[0] - summary.initial_energy).abs() < 1e-9);
    assert!((energy[energy.len() - 1] - summary.final_energy).abs() < 1e-9);
}

// ==================================================================================
// Gas dynamics
// ==================================================================================

#[test]
fn oblique_collision_conserves_momentum_and_energy() {
    let mut sys = GasBox::new(10.0, 10.0);
    sys.balls.push(Ball::new(5.0, 5.0, 1.0, 0.2, 1.0, 0.1));
    sys.balls.push(Ball::new(5.15, 5.05, -0.5, 0.0, 1.0, 0.1));

    let p_before = sys.momentum();
    let e_before = sys.total_energy();

    sys.resolve_collisions();

    let p_after = sys.momentum();
    let e_after = sys.total_energy();

    assert!((p_after - p_before).norm() < 1e-12, "momentum {:?} -> {:?}", p_before, p_after);
    assert!((e_after - e_before).abs() < 1e-12);
    assert!(!sys.balls[0].overlaps(&sys.balls[1]), "balls still overlap after separation");
}

#[test]
fn unequal_masses_still_conserve_momentum() {
    let mut a = Ball::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.1);
    let mut b = Ball::new(0.18, 0.0, 0.0, 0.0, 3.0, 0.1);

    let p_before = a.m * a.v + b.m * b.v;
    let e_before = a.kinetic_energy() + b.kinetic_energy();
    a.collide(&mut b);

    assert!((a.m * a.v + b.m * b.v - p_before).norm() < 1e-12);
    assert!((a.kinetic_energy() + b.kinetic_energy() - e_before).abs() < 1e-12);
    // 1-D elastic result: v1 = (m1 - m2)/(m1 + m2), v2 = 2 m1/(m1 + m2)
    assert!((a.v.x + 0.5).abs() < 1e-12);
    assert!((b.v.x - 0.5).abs() < 1e-12);
}

#[test]
fn wall_bounces_are_counted() {
    let mut sys = GasBox::new(10.0, 10.0);
    sys.balls.push(Ball::new(0.05, 5.0, -1.0, 0.0, 1.0, 0.1)); // past the left wall
    sys.balls.push(Ball::new(9.95, 9.95, 1.0, 1.0, 1.0, 0.1)); // in the corner
    sys.balls.push(Ball::new(5.0, 5.0, 1.0, 0.0, 1.0, 0.1)); // free

    let hits = sys.bounce_walls();

    assert_eq!(hits, 2);
    assert_eq!(sys.wall_hits, 2);
    assert_eq!(sys.balls[0].v.x, 1.0);
    assert_eq!(sys.balls[0].x.x, 0.1);
    assert_eq!((sys.balls[1].v.x, sys.balls[1].v.y), (-1.0, -1.0));
    assert_eq!(sys.balls[2].v.x, 1.0);
}

#[test]
fn free_gas_keeps_its_kinetic_energy() {
    let p = gas_params(2.0);
    for integrator in [IntegratorConfig::Euler, IntegratorConfig::Verlet] {
        let mut sys = grid_box(16, &p);
        let mut sink = Vec::new();
        let summary = sys.run(integrator, &AccelSet::new(), &p, &mut sink).unwrap();

        assert!(summary.steps > 0);
        assert!(
            (summary.conservation_pct() - 100.0).abs() < 1e-6,
            "{:?}: {}%",
            integrator,
            summary.conservation_pct()
        );
    }
}

#[test]
fn gas_run_reports_wall_hit_rate() {
    let p = gas_params(5.0);
    let mut sys = grid_box(25, &p);
    let mut sink = Vec::new();
    let summary = sys.run(IntegratorConfig::Verlet, &AccelSet::new(), &p, &mut sink).unwrap();

    assert!(summary.wall_hits > 0);
    let expected = summary.wall_hits as f64 / sys.t;
    assert!((summary.wall_hit_rate - expected).abs() < 1e-9);
}

// ==================================================================================
// Pendulum dynamics
// ==================================================================================

#[test]
fn rk4_beats_euler_cromer_on_energy() {
    let params = free_pendulum(20.0, 0.01);

    let mut rk4 = PendulumPair::new(0.5, 0.0, -0.3, 0.0);
    let mut ec = rk4;
    let rk4_frames = rk4.run(IntegratorConfig::Rk4, &params);
    let ec_frames = ec.run(IntegratorConfig::EulerCromer, &params);

    let rk4_e: Vec<f64> = rk4_frames.iter().map(|f| f.e_total).collect();
    let ec_e: Vec<f64> = ec_frames.iter().map(|f| f.e_total).collect();

    let rk4_drift = max_energy_drift(&rk4_e);
    let ec_drift = max_energy_drift(&ec_e);
    assert!(rk4_drift < ec_drift, "rk4 {} vs euler-cromer {}", rk4_drift, ec_drift);
    assert!(rk4_drift / rk4_e[0] < 1e-6);
}

#[test]
fn coupling_moves_energy_between_pendulums() {
    let params = PendulumParameters { kappa: 0.5, ..free_pendulum(20.0, 0.001) };
    let mut pair = PendulumPair::new(0.5, 0.0, 0.0, 0.0);
    let frames = pair.run(IntegratorConfig::Rk4, &params);

    assert_eq!(frames[0].e2, 0.0);
    let e2_max = frames.iter().map(|f| f.e2).fold(0.0, f64::max);
    assert!(e2_max > 0.0, "no energy reached the second pendulum");
}

#[test]
fn fft_finds_the_driving_frequency() {
    let dt = 0.01;
    let f = 0.5;
    let t: Vec<f64> = (0..4000).map(|i| i as f64 * dt).collect();
    let x: Vec<f64> = t.iter().map(|ti| (std::f64::consts::TAU * f * ti).sin()).collect();

    let spectrum = amplitude_spectrum(&x, dt);
    let peak = spectrum.peak_frequency().unwrap();
    assert!((peak - f).abs() < 1.0 / (4000.0 * dt) + 1e-12, "peak at {}", peak);
}

#[test]
fn poincare_section_samples_once_per_period() {
    let omega_f = 1.0;
    let dt = 0.001;
    let t: Vec<f64> = (0..=(3.0 * std::f64::consts::TAU / dt) as usize).map(|i| i as f64 * dt).collect();
    let x: Vec<f64> = t.iter().map(|ti| ti.cos()).collect();
    let v: Vec<f64> = t.iter().map(|ti| -ti.sin()).collect();

    let points = poincare_section(&t, &x, &v, omega_f);
    assert!(!points.is_empty());
    // periodic at the forcing frequency: every section point sits near (1, 0)
    for (xi, vi) in points {
        assert!((xi - 1.0).abs() < 1e-3 && vi.abs() < 0.05, "({}, {})", xi, vi);
    }
}

// ==================================================================================
// Sweeps and CSV files
// ==================================================================================

#[test]
fn kappa_sweep_files_load_back() {
    let dir = tempdir().unwrap();
    let params = PendulumParameters { t_final: 1.0, dt: 0.01, sample_every: 10, ..Default::default() };
    let initial = PendulumPair::new(0.5, 0.0, -0.3, 0.0);

    let written = kappa_sweep(initial, IntegratorConfig::Rk4, &params, &[0.5, 0.2], dir.path()).unwrap();
    assert_eq!(written.len(), 2);

    let files = pipelines::kappa_files(dir.path()).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(kappa_label(&files[0]), "k=0.2");
    assert_eq!(kappa_label(&files[1]), "k=0.5");

    for path in &files {
        let table = TrajectoryTable::load_csv(path).unwrap();
        let series = PendulumSeries::from_table(&table).unwrap();
        assert_eq!(series.len(), 11);
        assert!(series.e_total.is_some());
        assert_eq!(series.theta1[0], 0.5);
    }
}

#[test]
fn resonance_csv_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("resonance_sweep.csv");
    let points = vec![
        ResonancePoint { omega_f: 0.5, max_amp_theta1: 0.1 },
        ResonancePoint { omega_f: 1.0, max_amp_theta1: 0.4 },
    ];

    write_resonance_csv(&points, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("omega_f,max_amp_theta1"));

    let series = ResonanceSeries::from_table(&TrajectoryTable::load_csv(&path).unwrap()).unwrap();
    assert_eq!(series.omega_f, vec![0.5, 1.0]);
    assert_eq!(series.max_amp, vec![0.1, 0.4]);
}

#[test]
fn resonance_sweep_matches_single_runs() {
    let params = forced_pendulum();
    let initial = PendulumPair::new(0.1, 0.0, 0.0, 0.0);
    let sweep = ResonanceConfig { omega_min: 0.5, omega_max: 1.5, steps: 3 };

    let points = resonance_sweep(initial, IntegratorConfig::Rk4, &params, &sweep);

    let omegas: Vec<f64> = points.iter().map(|p| p.omega_f).collect();
    assert_eq!(omegas, vec![0.5, 1.0, 1.5]);

    for point in &points {
        let run_params = PendulumParameters { omega_f: point.omega_f, ..params.clone() };
        let mut pair = initial;
        let frames = pair.run(IntegratorConfig::Rk4, &run_params);
        let peak = frames.iter().map(|f| f.theta1.abs()).fold(0.0, f64::max);
        assert_eq!(point.max_amp_theta1, peak, "omega_f = {}", point.omega_f);
        assert!(peak >= 0.1);
    }
}

#[test]
fn pendulum_csv_without_energy_columns() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "short.csv", "t,theta1,omega1,theta2,omega2,ET\n0,0.1,0,0,0,0.05\n0.1,0.09,-0.1,0,0,0.05\n");

    let series = PendulumSeries::from_table(&TrajectoryTable::load_csv(&path).unwrap()).unwrap();
    assert_eq!(series.len(), 2);
    assert!(series.e1.is_none());
    assert_eq!(series.e_total, Some(vec![0.05, 0.05]));
}

// ==================================================================================
// Pipelines
// ==================================================================================

#[test]
fn missing_inputs_are_skipped() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plots");
    let inputs = [Input::new(dir.path().join("nope.dat"), "missing")];

    assert!(pipelines::gas_velocities(&inputs, &out).unwrap().is_empty());
    assert_eq!(pipelines::compare_methods(&inputs, 1.0, &out).unwrap(), 0);
    assert!(matches!(pipelines::gas_energy(&inputs[0], 1.0, &out), Err(Error::Io { .. })));
}

#[test]
fn gas_pipelines_skip_missing_and_plot_the_rest() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plots");
    let good = simulated_run(dir.path(), "good.dat");
    let inputs = [
        Input::new(dir.path().join("missing.dat"), "Missing"),
        Input::new(good, "Good Run"),
    ];

    let labels = pipelines::gas_velocities(&inputs, &out).unwrap();
    assert_eq!(labels, vec!["Good Run".to_string()]);
    assert!(out.join("dist_velocities_good_run.png").exists());
    assert!(out.join("velocity_comparison.png").exists());
    assert!(!out.join("dist_velocities_missing.png").exists());

    assert_eq!(pipelines::compare_methods(&inputs, 1.0, &out).unwrap(), 1);
    assert!(out.join("method_comparison.png").exists());

    let drawn = pipelines::gas_trajectories(&inputs, 3, 10.0, 10.0, &out).unwrap();
    assert_eq!(drawn, vec!["Good Run".to_string()]);
    assert!(out.join("trajectories_good_run.png").exists());

    let stats = pipelines::gas_energy(&inputs[1], 1.0, &out).unwrap();
    assert!(stats.relative_error_pct < 1e-6);
    assert!(out.join("energy_good_run.png").exists());

    // past the end falls back to the last frame
    let frame = pipelines::gas_snapshot(&inputs[1], 10_000, 10.0, 10.0, 0.1, &out).unwrap();
    let n_frames = TrajectoryTable::load_dat(&inputs[1].path).unwrap().n_rows();
    assert_eq!(frame, n_frames - 1);
    assert!(out.join("snapshot_good_run.png").exists());
}

#[test]
fn pendulum_pipelines_write_every_figure() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plots");

    let params = PendulumParameters { t_final: 10.0, ..forced_pendulum() };
    let mut pair = PendulumPair::new(0.5, 0.0, -0.3, 0.0);
    let csv_path = dir.path().join("energy_transfer.csv");
    write_frames_csv(&pair.run(IntegratorConfig::Rk4, &params), &csv_path).unwrap();

    let written = pipelines::pendulum_plots(&csv_path, params.omega_f, &out).unwrap();
    for name in [
        "theta_vs_t.png",
        "omega_vs_t.png",
        "energies_vs_t.png",
        "E1_vs_E2.png",
        "phase_theta1_omega1.png",
        "phase_theta2_omega2.png",
        "phase_space.png",
        "poincare_theta1.png",
        "fft_theta1.png",
    ] {
        assert!(written.iter().any(|w| w == name), "{} not reported", name);
        assert!(out.join(name).exists(), "{} not written", name);
    }

    let sweep = ResonanceConfig { omega_min: 0.5, omega_max: 1.5, steps: 4 };
    let points = resonance_sweep(PendulumPair::new(0.1, 0.0, 0.0, 0.0), IntegratorConfig::Rk4, &forced_pendulum(), &sweep);
    let res_path = dir.path().join("resonance_sweep.csv");
    write_resonance_csv(&points, &res_path).unwrap();
    pipelines::pendulum_resonance(&res_path, &out).unwrap();
    assert!(out.join("resonance_curve.png").exists());
    assert!(out.join("resonance_hist.png").exists());
}

#[test]
fn compare_skips_unreadable_sweep_files() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("plots");
    let initial = PendulumPair::new(0.5, 0.0, -0.3, 0.0);
    kappa_sweep(initial, IntegratorConfig::Rk4, &forced_pendulum(), &[0.2, 0.5], dir.path()).unwrap();
    // right name, no pendulum columns
    write_file(dir.path(), "results_kappa9p000.csv", "t,theta1\n0,0.1\n");

    let labels = pipelines::pendulum_compare(dir.path(), &out).unwrap();

    assert_eq!(labels, vec!["k=0.2".to_string(), "k=0.5".to_string()]);
    for name in ["compare_theta1.png", "compare_theta2.png", "compare_energy.png"] {
        assert!(out.join(name).exists(), "{} not written", name);
    }
}

#[test]
fn compare_needs_sweep_files() {
    let dir = tempdir().unwrap();
    let err = pipelines::pendulum_compare(dir.path(), dir.path()).unwrap_err();
    assert!(matches!(err, Error::NoInputs(_)));
}

#[test]
fn zero_reference_energy_is_an_error() {
    let err = ConservationStats::from_series(&[0.0, 1.0]).unwrap_err();
    assert!(matches!(err, Error::ZeroReferenceEnergy));
}

// ==================================================================================
// Scenarios
// ==================================================================================

#[test]
fn gas_scenario_from_yaml() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("gas.dat");
    let yaml = format!(
        "engine:\n  integrator: \"verlet\"\nbox:\n  width: 5.0\n  height: 5.0\nparticles:\n  count: 4\n  radius: 0.1\n  v_max: 1.0\n  layout: \"random\"\nrun:\n  t_final: 0.2\n  dt: 0.001\n  dt_out: 0.1\n  output: \"{}\"\nseed: 7\n",
        output.display()
    );
    let cfg_path = write_file(dir.path(), "gas.yaml", &yaml);

    let cfg = phystraj::load_gas_scenario(&cfg_path).unwrap();
    let mut scenario = GasScenario::build_scenario(cfg);
    assert_eq!(scenario.system.balls.len(), 4);

    let summary = scenario.run().unwrap();
    assert!(summary.frames >= 3);
    assert!(output.exists());
}

#[test]
fn pendulum_scenario_from_yaml() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("pendulum.csv");
    let yaml = format!(
        "engine:\n  integrator: \"rk4\"\nphysics:\n  kappa: 0.1\n  gamma: 0.05\ninitial: [0.5, 0.0, -0.3, 0.0]\nrun:\n  t_final: 0.5\n  dt: 0.01\n  sample_every: 5\n  output: \"{}\"\n",
        output.display()
    );
    let cfg_path = write_file(dir.path(), "pendulum.yaml", &yaml);

    let cfg = phystraj::load_pendulum_scenario(&cfg_path).unwrap();
    let scenario = PendulumScenario::build_scenario(cfg);
    let result = scenario.run().unwrap();
    assert!(matches!(result, PendulumOutput::Single(_)));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("t,theta1,omega1,theta2,omega2,E1,E2,E_total"));
    assert_eq!(text.lines().count(), 1 + 11);
}

#[test]
fn resonance_takes_precedence_over_kappa_sweep() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("resonance_sweep.csv");
    let yaml = format!(
        "engine:\n  integrator: \"rk4\"\nphysics:\n  f0: 0.5\ninitial: [0.1, 0.0, 0.0, 0.0]\nrun:\n  t_final: 0.5\n  dt: 0.01\n  output: \"{}\"\nkappa_sweep:\n  values: [0.2, 0.5]\nresonance:\n  omega_min: 0.5\n  omega_max: 1.5\n  steps: 3\n",
        output.display()
    );
    let cfg_path = write_file(dir.path(), "both.yaml", &yaml);

    let scenario = PendulumScenario::build_scenario(phystraj::load_pendulum_scenario(&cfg_path).unwrap());
    let result = scenario.run().unwrap();

    assert!(matches!(&result, PendulumOutput::Resonance(p) if *p == output), "got {:?}", result);
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("omega_f,max_amp_theta1"));
    assert_eq!(text.lines().count(), 1 + 3);
    assert!(pipelines::kappa_files(dir.path()).unwrap().is_empty());
}

#[test]
fn gas_scenario_rejects_pendulum_integrator() {
    let dir = tempdir().unwrap();
    let yaml = "engine:\n  integrator: \"rk4\"\nbox:\n  width: 5.0\n  height: 5.0\nparticles:\n  count: 4\n  radius: 0.1\n  v_max: 1.0\nrun:\n  t_final: 0.2\n  dt: 0.001\n  dt_out: 0.1\n  output: \"x.dat\"\n";
    let cfg_path = write_file(dir.path(), "bad.yaml", yaml);
    assert!(matches!(phystraj::load_gas_scenario(&cfg_path), Err(Error::InvalidConfig(_))));
}
