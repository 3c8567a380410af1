pub mod method;
pub mod fopdt;

pub use method::IdentificationMethod;
pub use fopdt::{identify, identify_with_amplitude, IdentifiedParameters};
