use phystraj::{load_gas_scenario, load_pendulum_scenario, GasScenario, PendulumOutput, PendulumScenario};
use phystraj::pipelines::{self, Input};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "phystraj", version, about = "Gas-in-a-box and coupled pendulum simulations and plots")]
struct Cli {
    /// Directory for generated images
    #[arg(long, global = true, default_value = "results")]
    out_dir: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Hard disks in a box
    Gas {
        #[command(subcommand)]
        command: GasCommand,
    },
    /// Two coupled nonlinear pendulums
    Pendulum {
        #[command(subcommand)]
        command: PendulumCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GasCommand {
    /// Run a YAML scenario and write its .dat trajectory
    Simulate { scenario: String },
    /// Kinetic energy conservation of one trajectory
    Energy {
        file: Option<PathBuf>,
        #[arg(long, default_value_t = pipelines::DEFAULT_MASS)]
        mass: f64,
    },
    /// Euler against velocity-Verlet energy conservation
    CompareMethods {
        euler: Option<PathBuf>,
        verlet: Option<PathBuf>,
        #[arg(long, default_value_t = pipelines::DEFAULT_MASS)]
        mass: f64,
    },
    /// Speed and component distributions against Maxwell-Boltzmann
    Velocities { files: Vec<PathBuf> },
    /// Paths of the first few particles
    Trajectories {
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = 5)]
        show: usize,
        #[arg(long, default_value_t = 10.0)]
        width: f64,
        #[arg(long, default_value_t = 10.0)]
        height: f64,
    },
    /// Particle positions in a single frame
    Snapshot {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        frame: usize,
        #[arg(long, default_value_t = 10.0)]
        width: f64,
        #[arg(long, default_value_t = 10.0)]
        height: f64,
        #[arg(long, default_value_t = 0.1)]
        radius: f64,
    },
}

#[derive(Subcommand, Debug)]
enum PendulumCommand {
    /// Run a YAML scenario (single run, coupling sweep or resonance sweep)
    Simulate { scenario: String },
    /// Time series, energies, phase space, Poincaré section and spectrum
    Plot {
        file: Option<PathBuf>,
        #[arg(long, default_value_t = 1.0)]
        omega_f: f64,
    },
    /// Resonance curve from a frequency sweep
    Resonance { file: Option<PathBuf> },
    /// Compare every results_kappa*.csv in a directory
    Compare { dir: Option<PathBuf> },
}

// scenarios are looked up as given, then under the crate's scenarios/ directory
fn scenario_path(name: &str) -> PathBuf {
    let direct = PathBuf::from(name);
    if direct.exists() {
        return direct;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name)
}

fn run_gas(command: GasCommand, out_dir: &Path) -> Result<()> {
    match command {
        GasCommand::Simulate { scenario } => {
            let path = scenario_path(&scenario);
            let cfg = load_gas_scenario(&path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?;
            let mut scenario = GasScenario::build_scenario(cfg);
            scenario.run().context("gas simulation failed")?;
        }
        GasCommand::Energy { file, mass } => {
            let input = match file {
                Some(path) => Input::from_path(path),
                None => Input::new(pipelines::DEFAULT_ENERGY_INPUT, "200 particles"),
            };
            pipelines::gas_energy(&input, mass, out_dir)
                .with_context(|| format!("energy analysis of {} failed", input.path.display()))?;
        }
        GasCommand::CompareMethods { euler, verlet, mass } => {
            let inputs = [
                Input::new(euler.unwrap_or_else(|| PathBuf::from(pipelines::DEFAULT_EULER_INPUT)), "Euler"),
                Input::new(verlet.unwrap_or_else(|| PathBuf::from(pipelines::DEFAULT_VERLET_INPUT)), "Velocity-Verlet"),
            ];
            let n = pipelines::compare_methods(&inputs, mass, out_dir)?;
            info!("compared {} runs", n);
        }
        GasCommand::Velocities { files } => {
            pipelines::gas_velocities(&inputs_or_default(files), out_dir)?;
        }
        GasCommand::Trajectories { files, show, width, height } => {
            pipelines::gas_trajectories(&inputs_or_default(files), show, width, height, out_dir)?;
        }
        GasCommand::Snapshot { file, frame, width, height, radius } => {
            let input = Input::from_path(file);
            pipelines::gas_snapshot(&input, frame, width, height, radius, out_dir)
                .with_context(|| format!("snapshot of {} failed", input.path.display()))?;
        }
    }
    Ok(())
}

fn inputs_or_default(files: Vec<PathBuf>) -> Vec<Input> {
    if files.is_empty() {
        pipelines::default_gas_runs()
    } else {
        files.into_iter().map(Input::from_path).collect()
    }
}

fn run_pendulum(command: PendulumCommand, out_dir: &Path) -> Result<()> {
    match command {
        PendulumCommand::Simulate { scenario } => {
            let path = scenario_path(&scenario);
            let cfg = load_pendulum_scenario(&path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?;
            let scenario = PendulumScenario::build_scenario(cfg);
            match scenario.run().context("pendulum simulation failed")? {
                PendulumOutput::Single(p) => info!("results in {}", p.display()),
                PendulumOutput::KappaSweep(ps) => info!("{} sweep files written", ps.len()),
                PendulumOutput::Resonance(p) => info!("resonance curve in {}", p.display()),
            }
        }
        PendulumCommand::Plot { file, omega_f } => {
            let path = file.unwrap_or_else(|| PathBuf::from(pipelines::DEFAULT_PENDULUM_INPUT));
            pipelines::pendulum_plots(&path, omega_f, out_dir)
                .with_context(|| format!("plotting {} failed", path.display()))?;
        }
        PendulumCommand::Resonance { file } => {
            let path = file.unwrap_or_else(|| PathBuf::from(pipelines::DEFAULT_RESONANCE_INPUT));
            pipelines::pendulum_resonance(&path, out_dir)
                .with_context(|| format!("resonance plots from {} failed", path.display()))?;
        }
        PendulumCommand::Compare { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("results"));
            pipelines::pendulum_compare(&dir, out_dir)
                .with_context(|| format!("comparison of sweep files in {} failed", dir.display()))?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Gas { command } => run_gas(command, &cli.out_dir),
        Commands::Pendulum { command } => run_pendulum(command, &cli.out_dir),
    }
}
