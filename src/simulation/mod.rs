pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod gasbox;
pub mod pendulum;
pub mod scenario;
