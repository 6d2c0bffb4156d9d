pub mod error;
pub mod configuration;
pub mod simulation;
pub mod trajectory;
pub mod analysis;
pub mod visualization;
pub mod pipelines;

pub use error::{Error, Result};

pub use simulation::states::{Ball, GasBox, NVec2, PendulumPair, PendulumVec};
pub use simulation::forces::{Acceleration, AccelSet, UniformField, Torque, TorqueSet, Gravity, Coupling, Damping, Forcing};
pub use simulation::integrator::{euler_integrator, verlet_integrator, rk4_integrator, euler_cromer_integrator};
pub use simulation::gasbox::RunSummary;
pub use simulation::pendulum::{PendulumFrame, ResonancePoint};
pub use simulation::scenario::{GasScenario, PendulumScenario, PendulumOutput};

pub use configuration::config::{
    IntegratorConfig, EngineConfig, CouplingConfig, LayoutConfig, GasScenarioConfig, PendulumScenarioConfig,
    load_gas_scenario, load_pendulum_scenario,
};

pub use trajectory::table::TrajectoryTable;
pub use trajectory::layout::GasFrames;
pub use trajectory::schema::{PendulumColumns, PendulumSeries, ResonanceSeries};
