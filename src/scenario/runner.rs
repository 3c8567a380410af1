use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{analyze, AnalysisConfig, PerformanceMetrics};
use crate::control::ControllerParameters;
use crate::dataset::SampleSeries;
use crate::error::Result;
use crate::ident::{identify_with_amplitude, IdentificationMethod, IdentifiedParameters};
use crate::sim::{simulate_with, SimConfig, StepResponseTrace};
use crate::tf::{first_order, pade_delay, scale, series, unity_feedback, TransferFunction};

use super::descriptor::{LoopTopology, MethodDescriptor, TimeGrid};
use super::request::{Overrides, ScenarioRequest};

// ---------------------------------------------------------------------------
// Result bundle
// ---------------------------------------------------------------------------

/// Everything one scenario evaluation produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub descriptor: MethodDescriptor,
    pub parameters: IdentifiedParameters,
    pub controller: Option<ControllerParameters>,
    /// Height of the step the model was driven with.
    pub step_amplitude: f64,
    /// Simulated model, step amplitude included.
    pub model: TransferFunction,
    pub trace: StepResponseTrace,
    pub metrics: PerformanceMetrics,
}

/// Open- and closed-loop variants of one identification method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub open: ScenarioResult,
    pub closed: ScenarioResult,
}

// ---------------------------------------------------------------------------
// Model chain
// ---------------------------------------------------------------------------

/// Plant, optionally closed in unity feedback, followed by the order-5
/// delay approximation.
pub fn plant_model(p: &IdentifiedParameters, topology: LoopTopology) -> Result<TransferFunction> {
    let plant = first_order(p.k, p.tau);
    let plant = match topology {
        LoopTopology::Open => plant,
        LoopTopology::Closed => unity_feedback(&plant)?,
    };
    Ok(series(&plant, &pade_delay(p.theta)?))
}

/// Identified parameters with manual values substituted field by field.
/// Identification is skipped when all three are given; `amplitude` is the
/// step height the gain is referred to.
fn resolve_parameters(
    data: &SampleSeries,
    method: IdentificationMethod,
    overrides: &Overrides,
    amplitude: f64,
) -> Result<IdentifiedParameters> {
    if let (Some(k), Some(tau), Some(theta)) = (overrides.k, overrides.tau, overrides.theta) {
        return IdentifiedParameters::new(k, tau, theta);
    }
    let identified = identify_with_amplitude(data, method, amplitude)?;
    IdentifiedParameters::new(
        overrides.k.unwrap_or(identified.k),
        overrides.tau.unwrap_or(identified.tau),
        overrides.theta.unwrap_or(identified.theta),
    )
}

// ---------------------------------------------------------------------------
// Scenario evaluation
// ---------------------------------------------------------------------------

/// Evaluate one scenario with default simulation and analysis settings.
pub fn run(
    data: &SampleSeries,
    descriptor: &MethodDescriptor,
    overrides: &Overrides,
) -> Result<ScenarioResult> {
    run_with(data, descriptor, overrides, &SimConfig::default(), &AnalysisConfig::default())
}

/// Evaluate a request read from a file.
pub fn run_request(data: &SampleSeries, request: &ScenarioRequest) -> Result<ScenarioResult> {
    run_with(data, &request.descriptor, &request.overrides, &request.sim, &request.analysis)
}

/// Evaluate one scenario.
///
/// Identification-only scenarios are driven by the experimental step
/// amplitude (mean input) and, on the recorded grid, scored by RMSE against
/// the measured output. Controller scenarios close the loop around
/// PID + plant + delay and are driven by a unit reference step; a setpoint
/// override replaces the mean input as the amplitude the gain is identified
/// against.
pub fn run_with(
    data: &SampleSeries,
    descriptor: &MethodDescriptor,
    overrides: &Overrides,
    sim: &SimConfig,
    analysis: &AnalysisConfig,
) -> Result<ScenarioResult> {
    let identification_amplitude = match (descriptor.controller, overrides.setpoint) {
        (Some(_), Some(setpoint)) => setpoint,
        (None, Some(setpoint)) => {
            warn!(setpoint, "setpoint override ignored without a controller");
            data.mean_input()
        }
        (_, None) => data.mean_input(),
    };
    let parameters =
        resolve_parameters(data, descriptor.method, overrides, identification_amplitude)?;
    let chain = plant_model(&parameters, descriptor.topology)?;

    let (unit_model, controller, step_amplitude) = match descriptor.controller {
        None => (chain, None, data.mean_input()),
        Some(rule) => {
            let gains = match overrides.controller {
                Some(manual) => manual,
                None => rule.synthesize(&parameters)?,
            };
            let open = series(&gains.transfer_function()?, &chain);
            (unity_feedback(&open)?, Some(gains), 1.0)
        }
    };
    let model = scale(&unit_model, step_amplitude);
    debug!(
        model = %model,
        order = model.den_degree(),
        "composed scenario model"
    );

    let grid = match descriptor.grid {
        TimeGrid::Recorded => Some(data.time()),
        TimeGrid::Automatic => None,
    };
    let trace = simulate_with(&model, grid, sim)?;

    let reference = match (descriptor.controller, descriptor.grid) {
        (None, TimeGrid::Recorded) => Some(StepResponseTrace::from_series_output(data)),
        _ => None,
    };
    let metrics = analyze(&trace, None, reference.as_ref(), analysis)?;

    info!(
        scenario = %descriptor.label(),
        k = parameters.k,
        tau = parameters.tau,
        theta = parameters.theta,
        rmse = ?metrics.rmse,
        "scenario evaluated"
    );

    Ok(ScenarioResult {
        descriptor: *descriptor,
        parameters,
        controller,
        step_amplitude,
        model,
        trace,
        metrics,
    })
}

/// Run the open- and closed-loop identification variants of `method` on
/// the recorded grid.
pub fn compare(
    data: &SampleSeries,
    method: IdentificationMethod,
    overrides: &Overrides,
) -> Result<Comparison> {
    let open = run(data, &MethodDescriptor::identification(method, LoopTopology::Open), overrides)?;
    let closed =
        run(data, &MethodDescriptor::identification(method, LoopTopology::Closed), overrides)?;
    Ok(Comparison { open, closed })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{chr0, ControllerRule};
    use crate::dataset::FopdtExperimentBuilder;
    use crate::error::Error;
    use crate::scenario::Preset;

    fn experiment() -> SampleSeries {
        FopdtExperimentBuilder::new(2.0, 5.0, 1.0)
            .amplitude(1.5)
            .dt(0.05)
            .duration(60.0)
            .build()
            .sample()
            .unwrap()
    }

    /// Dead time comparable to the lag, where CHR0 gives a stable loop.
    fn delay_dominant_experiment() -> SampleSeries {
        FopdtExperimentBuilder::new(2.0, 2.0, 1.5)
            .amplitude(1.5)
            .dt(0.05)
            .duration(60.0)
            .build()
            .sample()
            .unwrap()
    }

    #[test]
    fn open_loop_model_fits_experiment() {
        let data = experiment();
        let r = run(&data, &Preset::SmithOpen.descriptor(), &Overrides::none()).unwrap();
        assert_eq!(r.trace.len(), data.len());
        assert_eq!(r.trace.time(), data.time());
        assert!((r.step_amplitude - 1.5).abs() < 1e-12);
        let rmse = r.metrics.rmse.unwrap();
        assert!(rmse < 0.05, "rmse = {rmse}");
        assert!((r.trace.last_value().unwrap() - 3.0).abs() < 0.01);
    }

    #[test]
    fn closed_loop_settles_at_feedback_gain() {
        let data = experiment();
        let r = run(&data, &Preset::SundaresanClosed.descriptor(), &Overrides::none()).unwrap();
        let k = r.parameters.k;
        let expected = 1.5 * k / (1.0 + k);
        assert!((r.trace.last_value().unwrap() - expected).abs() < 1e-3);
        assert!(r.metrics.rmse.is_some());
    }

    #[test]
    fn chr_loop_tracks_unit_setpoint() {
        let data = delay_dominant_experiment();
        let r = run(&data, &Preset::Chr.descriptor(), &Overrides::none()).unwrap();
        let p = r.parameters;
        assert_eq!(r.controller, Some(chr0(p.k, p.tau, p.theta).unwrap()));
        // Integral action removes steady-state error.
        assert!((r.trace.last_value().unwrap() - 1.0).abs() < 0.02);
        assert!(r.metrics.rmse.is_none());
        assert!(r.metrics.rise_time.is_some());
    }

    #[test]
    fn imc_uses_automatic_grid() {
        let data = experiment();
        let d = Preset::Imc.descriptor().with_lambda(2.0);
        let r = run(&data, &d, &Overrides::none()).unwrap();
        assert_eq!(r.trace.len(), SimConfig::default().samples);
        assert_eq!(r.trace.time()[0], 0.0);
        assert!((r.trace.last_value().unwrap() - 1.0).abs() < 0.02);
    }

    #[test]
    fn manual_controller_and_setpoint() {
        let data = experiment();
        let manual = ControllerParameters::new(0.8, 6.0, 0.5);
        let overrides = Overrides {
            controller: Some(manual),
            setpoint: Some(2.5),
            ..Overrides::default()
        };
        let r = run(&data, &Preset::Chr.descriptor(), &overrides).unwrap();
        assert_eq!(r.controller, Some(manual));
        // Output rise 3.0 referred to a step of 2.5 instead of the mean input 1.5.
        assert!((r.parameters.k - 1.2).abs() < 1e-3, "k = {}", r.parameters.k);
        assert_eq!(r.step_amplitude, 1.0);
        assert!((r.trace.last_value().unwrap() - 1.0).abs() < 0.01);
    }

    #[test]
    fn setpoint_ignored_without_controller() {
        let data = experiment();
        let overrides = Overrides { setpoint: Some(2.5), ..Overrides::default() };
        let d = Preset::SmithOpen.descriptor();
        let with = run(&data, &d, &overrides).unwrap();
        let without = run(&data, &d, &Overrides::none()).unwrap();
        assert_eq!(with, without);
        assert!((with.step_amplitude - 1.5).abs() < 1e-12);
    }

    #[test]
    fn plant_overrides_replace_identified_values() {
        let data = experiment();
        let overrides = Overrides { tau: Some(7.0), ..Overrides::default() };
        let r = run(&data, &Preset::SmithOpen.descriptor(), &overrides).unwrap();
        assert_eq!(r.parameters.tau, 7.0);
        assert!((r.parameters.k - 2.0).abs() < 1e-3);
    }

    #[test]
    fn full_plant_override_skips_identification() {
        // Flat output would fail identification.
        let flat = SampleSeries::new(vec![0.0, 1.0, 2.0], vec![1.0; 3], vec![-1.0; 3]).unwrap();
        let overrides = Overrides {
            k: Some(1.0),
            tau: Some(1.0),
            theta: Some(0.0),
            ..Overrides::default()
        };
        let r = run(&flat, &Preset::SmithOpen.descriptor(), &overrides).unwrap();
        assert_eq!(r.parameters, IdentifiedParameters::new(1.0, 1.0, 0.0).unwrap());
    }

    #[test]
    fn chr_with_zero_dead_time_fails() {
        let data = experiment();
        let overrides = Overrides { theta: Some(0.0), ..Overrides::default() };
        let err = run(&data, &Preset::Chr.descriptor(), &overrides).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero(_)));
    }

    #[test]
    fn identification_failure_propagates() {
        let data = SampleSeries::new(vec![0.0, 1.0], vec![0.0, 0.0], vec![0.0, 1.0]).unwrap();
        let err = run(&data, &Preset::SmithOpen.descriptor(), &Overrides::none()).unwrap_err();
        assert!(matches!(err, Error::DivisionByZero(_)));
    }

    #[test]
    fn identical_inputs_identical_outputs() {
        let data = experiment();
        let d = MethodDescriptor {
            controller: Some(ControllerRule::Imc { lambda: 3.0 }),
            ..Preset::SmithClosed.descriptor()
        };
        let a = run(&data, &d, &Overrides::none()).unwrap();
        let b = run(&data, &d, &Overrides::none()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn comparison_runs_both_topologies() {
        let data = experiment();
        let c = compare(&data, IdentificationMethod::Smith, &Overrides::none()).unwrap();
        assert_eq!(c.open.descriptor.topology, LoopTopology::Open);
        assert_eq!(c.closed.descriptor.topology, LoopTopology::Closed);
        assert_eq!(c.open.parameters, c.closed.parameters);
        // The open-loop model is the one that reproduces an open-loop experiment.
        assert!(c.open.metrics.rmse.unwrap() < c.closed.metrics.rmse.unwrap());
    }

    #[test]
    fn plant_model_degrees() {
        let p = IdentifiedParameters::new(2.0, 5.0, 1.0).unwrap();
        let m = plant_model(&p, LoopTopology::Closed).unwrap();
        assert_eq!(m.den_degree(), 1 + crate::tf::PADE_ORDER);
        assert_eq!(m.num_degree(), crate::tf::PADE_ORDER);
    }
}
