pub mod pid;
pub mod tuning;

pub use pid::{build_pid, ControllerParameters};
pub use tuning::{chr0, imc, ControllerRule};
