pub mod series;
pub mod synthetic;

pub use series::SampleSeries;
pub use synthetic::{FopdtExperiment, FopdtExperimentBuilder};
