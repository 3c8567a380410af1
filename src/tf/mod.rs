pub mod poly;
pub mod transfer;
pub mod pade;

pub use pade::{pade_delay, pade_delay_order, PADE_ORDER};
pub use transfer::{first_order, scale, series, unity_feedback, TransferFunction};
