pub mod descriptor;
pub mod request;
pub mod runner;

pub use descriptor::{LoopTopology, MethodDescriptor, Preset, TimeGrid};
pub use request::{Overrides, ScenarioRequest};
pub use runner::{compare, plant_model, run, run_request, run_with, Comparison, ScenarioResult};
