//! First-order-plus-dead-time (FOPDT) identification and PID tuning.
//!
//! A recorded step experiment is reduced to `k e^{-θs} / (τs + 1)` by a
//! two-point method, the plant is composed with a Padé delay (and optionally
//! a tuned PID in unity feedback), and the resulting step response is
//! simulated and scored.

pub mod analysis;
pub mod control;
pub mod dataset;
pub mod error;
pub mod ident;
pub mod io;
pub mod scenario;
pub mod sim;
pub mod tf;

pub use error::{Error, Result};
pub use scenario::{
    compare, run, run_request, Comparison, MethodDescriptor, Overrides, Preset, ScenarioResult,
};
