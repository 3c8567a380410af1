use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::tf::TransferFunction;

use super::integrator::ZohStep;
use super::realization::StateSpace;
use super::trace::StepResponseTrace;

/// Real parts closer to zero than this count as marginal, not stable.
const STABILITY_MARGIN: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

/// Default time-grid rule used when the caller supplies no grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Horizon = factor * sum of stable time constants (1/|Re p|).
    pub horizon_factor: f64,
    /// Uniform samples over [0, horizon].
    pub samples: usize,
    /// Horizon when the model has no stable pole, s.
    pub fallback_horizon: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            horizon_factor: 8.0,
            samples: 1000,
            fallback_horizon: 100.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Time grid
// ---------------------------------------------------------------------------

fn validate_grid(grid: &[f64]) -> Result<()> {
    if grid.is_empty() {
        return Err(Error::InputValidation("time grid is empty".into()));
    }
    if grid.iter().any(|t| !t.is_finite()) {
        return Err(Error::InputValidation("time grid contains non-finite values".into()));
    }
    if grid.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::InputValidation("time grid is not strictly increasing".into()));
    }
    Ok(())
}

fn horizon(ss: &StateSpace, config: &SimConfig) -> Result<f64> {
    let settle: f64 = ss
        .poles()?
        .iter()
        .filter(|p| p.re < -STABILITY_MARGIN)
        .map(|p| 1.0 / p.re.abs())
        .sum();
    Ok(if settle > 0.0 { config.horizon_factor * settle } else { config.fallback_horizon })
}

/// Uniform grid from 0 long enough for the slowest stable mode (and the
/// rationalized dead time) to settle.
pub fn default_grid(model: &TransferFunction, config: &SimConfig) -> Result<Vec<f64>> {
    let ss = StateSpace::from_transfer_function(model)?;
    grid_for(&ss, config)
}

fn grid_for(ss: &StateSpace, config: &SimConfig) -> Result<Vec<f64>> {
    let end = horizon(ss, config)?;
    let n = config.samples.max(2);
    if !end.is_finite() || end <= 0.0 {
        return Err(Error::SimulationFailure(format!("degenerate simulation horizon {end}")));
    }
    debug!(order = ss.order(), horizon = end, samples = n, "default simulation grid");
    Ok((0..n).map(|i| end * i as f64 / (n - 1) as f64).collect())
}

// ---------------------------------------------------------------------------
// Step response
// ---------------------------------------------------------------------------

/// Zero-state unit-step response of `model`, using the default grid rule
/// when `grid` is `None`.
pub fn simulate(model: &TransferFunction, grid: Option<&[f64]>) -> Result<StepResponseTrace> {
    simulate_with(model, grid, &SimConfig::default())
}

/// Same as [`simulate`] with an explicit default-grid configuration.
///
/// The step is applied at `grid[0]`, so the first value is the model's
/// feedthrough. Unstable and oscillatory models are integrated as-is; only
/// a non-finite state aborts.
pub fn simulate_with(
    model: &TransferFunction,
    grid: Option<&[f64]>,
    config: &SimConfig,
) -> Result<StepResponseTrace> {
    let ss = StateSpace::from_transfer_function(model)?;
    let time = match grid {
        Some(g) => {
            validate_grid(g)?;
            g.to_vec()
        }
        None => grid_for(&ss, config)?,
    };

    let n = ss.order();
    let mut values = Vec::with_capacity(time.len());
    let mut x = DVector::zeros(n);
    values.push(ss.output(&x, 1.0));

    let mut step: Option<ZohStep> = None;
    for w in time.windows(2) {
        if n > 0 {
            let h = w[1] - w[0];
            let current = match step.take() {
                Some(s) if s.matches(h) => s,
                _ => ZohStep::new(&ss, h)?,
            };
            x = current.advance(&x, 1.0);
            step = Some(current);
            if !x.iter().all(|v| v.is_finite()) {
                return Err(Error::SimulationFailure(format!(
                    "state diverged to a non-finite value at t = {}",
                    w[1]
                )));
            }
        }
        values.push(ss.output(&x, 1.0));
    }

    StepResponseTrace::new(time, values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tf::{first_order, pade_delay, series, unity_feedback, TransferFunction};

    #[test]
    fn first_order_matches_analytic() {
        let (k, tau) = (2.0, 3.0);
        let grid: Vec<f64> = (0..=300).map(|i| i as f64 * 0.05).collect();
        let trace = simulate(&first_order(k, tau), Some(&grid)).unwrap();
        assert_eq!(trace.len(), grid.len());
        for (t, y) in trace.points() {
            let exact = k * (1.0 - (-t / tau).exp());
            assert!((y - exact).abs() < 1e-9, "t={t}: {y} vs {exact}");
        }
    }

    #[test]
    fn non_uniform_grid_is_exact() {
        let grid = vec![0.0, 0.1, 0.15, 1.0, 1.01, 4.0];
        let trace = simulate(&first_order(1.0, 1.0), Some(&grid)).unwrap();
        for (t, y) in trace.points() {
            assert!((y - (1.0 - (-t).exp())).abs() < 1e-9);
        }
    }

    #[test]
    fn grid_used_verbatim_from_nonzero_start() {
        let grid = vec![10.0, 11.0, 12.0];
        let trace = simulate(&first_order(1.0, 1.0), Some(&grid)).unwrap();
        assert_eq!(trace.time(), &grid[..]);
        assert_eq!(trace.value()[0], 0.0);
        assert!((trace.value()[1] - (1.0 - (-1.0_f64).exp())).abs() < 1e-9);
    }

    #[test]
    fn feedthrough_at_time_zero() {
        let tf = TransferFunction::new(vec![1.0, 2.0], vec![1.0, 1.0]).unwrap();
        let trace = simulate(&tf, Some(&[0.0, 1.0])).unwrap();
        assert!((trace.value()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn default_grid_covers_eight_time_constants() {
        let trace = simulate(&first_order(1.0, 2.0), None).unwrap();
        assert_eq!(trace.len(), 1000);
        assert_eq!(trace.time()[0], 0.0);
        assert!((trace.time()[999] - 16.0).abs() < 1e-9);
        assert!((trace.last_value().unwrap() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn default_grid_covers_dead_time() {
        // Fast plant behind a long delay: the horizon must reach past theta.
        let model = series(&first_order(1.0, 0.5), &pade_delay(20.0).unwrap());
        let grid = default_grid(&model, &SimConfig::default()).unwrap();
        assert!(*grid.last().unwrap() > 20.0 + 4.0 * 0.5);
    }

    #[test]
    fn unity_feedback_final_value() {
        let g = 3.0;
        let cl = unity_feedback(&first_order(g, 1.5)).unwrap();
        let trace = simulate(&cl, None).unwrap();
        let expected = g / (1.0 + g);
        assert!((trace.last_value().unwrap() - expected).abs() < 1e-3);
    }

    #[test]
    fn pade_delayed_step_starts_late() {
        let model = series(&first_order(1.0, 1.0), &pade_delay(2.0).unwrap());
        let grid: Vec<f64> = (0..=2000).map(|i| i as f64 * 0.01).collect();
        let trace = simulate(&model, Some(&grid)).unwrap();
        // Well before the delay the response is near zero, well after it tracks the lag.
        assert!(trace.value()[100].abs() < 0.05);
        let t = 6.0;
        let exact = 1.0 - (-(t - 2.0_f64)).exp();
        assert!((trace.value()[600] - exact).abs() < 0.01);
    }

    #[test]
    fn unstable_model_is_simulated() {
        // 1 / (s - 1): y = e^t - 1
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -1.0]).unwrap();
        let grid: Vec<f64> = (0..=50).map(|i| i as f64 * 0.1).collect();
        let trace = simulate(&tf, Some(&grid)).unwrap();
        let exact = 5.0_f64.exp() - 1.0;
        assert!((trace.last_value().unwrap() - exact).abs() < 1e-6 * exact);
    }

    #[test]
    fn improper_model_fails() {
        let pid = TransferFunction::new(vec![1.0, 1.0, 1.0], vec![1.0, 0.0]).unwrap();
        assert!(matches!(simulate(&pid, None), Err(Error::SimulationFailure(_))));
    }

    #[test]
    fn divergence_fails_fast() {
        let tf = TransferFunction::new(vec![1.0], vec![1.0, -100.0]).unwrap();
        let grid = vec![0.0, 10.0, 20.0];
        assert!(matches!(simulate(&tf, Some(&grid)), Err(Error::SimulationFailure(_))));
    }

    #[test]
    fn rejects_bad_grid() {
        let g = first_order(1.0, 1.0);
        assert!(matches!(simulate(&g, Some(&[])), Err(Error::InputValidation(_))));
        assert!(matches!(simulate(&g, Some(&[0.0, 0.0])), Err(Error::InputValidation(_))));
    }

    #[test]
    fn static_gain_uses_fallback_horizon() {
        let tf = TransferFunction::new(vec![2.0], vec![1.0]).unwrap();
        let trace = simulate(&tf, None).unwrap();
        assert!((trace.time().last().unwrap() - 100.0).abs() < 1e-9);
        assert!(trace.value().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn deterministic() {
        let model = series(&first_order(2.0, 5.0), &pade_delay(1.0).unwrap());
        assert_eq!(simulate(&model, None).unwrap(), simulate(&model, None).unwrap());
    }
}
