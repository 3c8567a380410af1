pub mod integrator;
pub mod realization;
pub mod runner;
pub mod trace;

pub use realization::StateSpace;
pub use runner::{default_grid, simulate, simulate_with, SimConfig};
pub use trace::StepResponseTrace;
