//! Step-response metrics.
//!
//! None of these assume a monotone response: crossings are "first sample at
//! or beyond a level" and settling is checked over the whole tail, so ringing
//! and inverse-response (non-minimum-phase) traces are handled.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::StepResponseTrace;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rise-time start level, fraction of the final value.
    pub rise_low: f64,
    /// Rise-time end level, fraction of the final value.
    pub rise_high: f64,
    /// Settling band half-width, fraction of |final value|.
    pub settling_band: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rise_low: 0.1,
            rise_high: 0.9,
            settling_band: 0.02,
        }
    }
}

// ---------------------------------------------------------------------------
// Metric bundle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub final_value: f64,
    /// s; `None` when the final value is zero or a level is never crossed.
    pub rise_time: Option<f64>,
    /// s; `None` when the trace ends outside the band.
    pub settling_time: Option<f64>,
    pub peak_value: f64,
    pub overshoot_percent: f64,
    /// Against the reference series, when one was supplied.
    pub rmse: Option<f64>,
}

/// Compute every metric of `trace`.
///
/// The final value is `target` when given, else the last sample.
pub fn analyze(
    trace: &StepResponseTrace,
    target: Option<f64>,
    reference: Option<&StepResponseTrace>,
    config: &AnalysisConfig,
) -> Result<PerformanceMetrics> {
    let final_value = match target.or(trace.last_value()) {
        Some(v) => v,
        None => return Err(Error::InputValidation("cannot analyze an empty trace".into())),
    };
    let peak = peak_value(trace);
    Ok(PerformanceMetrics {
        final_value,
        rise_time: rise_time(trace, final_value, config.rise_low, config.rise_high),
        settling_time: settling_time(trace, final_value, config.settling_band),
        peak_value: peak,
        overshoot_percent: overshoot_percent(peak, final_value),
        rmse: reference.map(|r| rmse(trace, r)).transpose()?,
    })
}

// ---------------------------------------------------------------------------
// Individual metrics
// ---------------------------------------------------------------------------

/// Time of the first sample at or beyond `level`, looking in the direction
/// of `sign`.
fn first_crossing(trace: &StepResponseTrace, level: f64, sign: f64) -> Option<f64> {
    trace
        .points()
        .find(|&(_, y)| y * sign >= level * sign)
        .map(|(t, _)| t)
}

/// Time from the first crossing of `low * final` to the first crossing of
/// `high * final`.
pub fn rise_time(trace: &StepResponseTrace, final_value: f64, low: f64, high: f64) -> Option<f64> {
    if final_value == 0.0 {
        return None;
    }
    let sign = final_value.signum();
    let t_low = first_crossing(trace, low * final_value, sign)?;
    let t_high = first_crossing(trace, high * final_value, sign)?;
    Some(t_high - t_low)
}

/// Earliest sample time after which every remaining sample lies within
/// `band * |final|` of the final value.
pub fn settling_time(trace: &StepResponseTrace, final_value: f64, band: f64) -> Option<f64> {
    let tol = band * final_value.abs();
    let values = trace.value();
    match values.iter().rposition(|&y| (y - final_value).abs() > tol) {
        None => trace.time().first().copied(),
        Some(i) if i + 1 < values.len() => Some(trace.time()[i + 1]),
        Some(_) => None,
    }
}

pub fn peak_value(trace: &StepResponseTrace) -> f64 {
    trace.value().iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// 100 (peak - final) / |final| when the peak exceeds the final value.
pub fn overshoot_percent(peak: f64, final_value: f64) -> f64 {
    if peak > final_value && final_value != 0.0 {
        100.0 * (peak - final_value) / final_value.abs()
    } else {
        0.0
    }
}

/// Root-mean-square difference of two time-aligned traces.
pub fn rmse(trace: &StepResponseTrace, reference: &StepResponseTrace) -> Result<f64> {
    if trace.len() != reference.len() {
        return Err(Error::ArityMismatch(format!(
            "trace has {} samples, reference has {}",
            trace.len(),
            reference.len()
        )));
    }
    if trace.is_empty() {
        return Err(Error::ArityMismatch("cannot compare empty traces".into()));
    }
    let aligned = trace
        .time()
        .iter()
        .zip(reference.time())
        .all(|(a, b)| (a - b).abs() <= 1e-9 * a.abs().max(1.0));
    if !aligned {
        return Err(Error::ArityMismatch("trace and reference time stamps differ".into()));
    }
    let sse: f64 = trace
        .value()
        .iter()
        .zip(reference.value())
        .map(|(a, b)| (a - b).powi(2))
        .sum();
    Ok((sse / trace.len() as f64).sqrt())
}
