//! # fopdt-tune
//!
//! Identify a FOPDT model from a synthetic step experiment, tune a PID for
//! it and report the simulated step response.
//!
//! ```bash
//! # Smith identification, open loop, default plant
//! fopdt-tune --preset smith-open
//!
//! # IMC tuning with a tighter lambda, trace written to CSV
//! fopdt-tune --preset imc --lambda 20 --csv imc.csv
//!
//! # Open vs. closed loop for one method
//! fopdt-tune --compare sundaresan --json compare.json
//!
//! # Full request from a file, debug logging
//! fopdt-tune --request scenario.toml -v
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use fopdt_tune::control::ControllerParameters;
use fopdt_tune::dataset::{FopdtExperimentBuilder, SampleSeries};
use fopdt_tune::ident::IdentificationMethod;
use fopdt_tune::io::{csv, json};
use fopdt_tune::scenario::{self, Comparison, Overrides, Preset, ScenarioRequest, ScenarioResult, TimeGrid};
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// FOPDT identification and PID tuning on a synthetic step experiment
#[derive(Parser, Debug)]
#[command(name = "fopdt-tune")]
#[command(version)]
#[command(about = "Identify a FOPDT plant, tune a PID and score its step response")]
struct Args {
    /// True plant gain of the synthetic experiment
    #[arg(long, default_value_t = 2.0)]
    plant_k: f64,

    /// True plant time constant, s
    #[arg(long, default_value_t = 3.0)]
    plant_tau: f64,

    /// True plant dead time, s
    #[arg(long, default_value_t = 1.5)]
    plant_theta: f64,

    /// Input step amplitude
    #[arg(long, default_value_t = 1.0)]
    amplitude: f64,

    /// Sample period, s
    #[arg(long, default_value_t = 0.05)]
    dt: f64,

    /// Record length, s
    #[arg(long, default_value_t = 60.0)]
    duration: f64,

    /// Named scenario (smith-open, smith-closed, sundaresan-open, sundaresan-closed, imc, chr).
    /// The chr loop is unstable for tau/theta above about 2.5.
    #[arg(long, default_value_t = Preset::SmithOpen, conflicts_with_all = ["request", "compare"])]
    preset: Preset,

    /// Scenario request file (TOML)
    #[arg(long, conflicts_with = "compare")]
    request: Option<PathBuf>,

    /// Compare open- and closed-loop identification for one method
    #[arg(long)]
    compare: Option<IdentificationMethod>,

    /// Manual plant gain
    #[arg(long)]
    k: Option<f64>,

    /// Manual plant time constant, s
    #[arg(long)]
    tau: Option<f64>,

    /// Manual plant dead time, s
    #[arg(long)]
    theta: Option<f64>,

    /// Manual proportional gain (requires --ti and --td)
    #[arg(long, requires_all = ["ti", "td"])]
    kp: Option<f64>,

    /// Manual integral time, s
    #[arg(long, requires_all = ["kp", "td"])]
    ti: Option<f64>,

    /// Manual derivative time, s
    #[arg(long, requires_all = ["kp", "ti"])]
    td: Option<f64>,

    /// Step amplitude the gain is identified against (controller scenarios)
    #[arg(long)]
    setpoint: Option<f64>,

    /// IMC closed-loop time constant, s
    #[arg(long)]
    lambda: Option<f64>,

    /// Write the simulated trace to CSV
    #[arg(long)]
    csv: Option<String>,

    /// Write the full result to JSON
    #[arg(long)]
    json: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        let controller = match (self.kp, self.ti, self.td) {
            (Some(kp), Some(ti), Some(td)) => Some(ControllerParameters::new(kp, ti, td)),
            _ => None,
        };
        Overrides {
            k: self.k,
            tau: self.tau,
            theta: self.theta,
            controller,
            setpoint: self.setpoint,
        }
    }

    /// Command-line overrides win over the ones in a request file.
    fn merge_into(&self, request: &mut ScenarioRequest) {
        let cli = self.overrides();
        let o = &mut request.overrides;
        o.k = cli.k.or(o.k);
        o.tau = cli.tau.or(o.tau);
        o.theta = cli.theta.or(o.theta);
        o.controller = cli.controller.or(o.controller);
        o.setpoint = cli.setpoint.or(o.setpoint);
        if let Some(lambda) = self.lambda {
            if !request.descriptor.uses_lambda() {
                warn!(
                    lambda,
                    scenario = %request.descriptor.label(),
                    "--lambda ignored: scenario has no IMC controller"
                );
            }
            request.descriptor = request.descriptor.with_lambda(lambda);
        }
    }
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    if let Err(e) = execute(&args) {
        error!(error = %e, "fopdt-tune failed");
        process::exit(1);
    }
}

fn setup_tracing(args: &Args) {
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).compact().init();
    }
}

fn execute(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let data = FopdtExperimentBuilder::new(args.plant_k, args.plant_tau, args.plant_theta)
        .amplitude(args.amplitude)
        .dt(args.dt)
        .duration(args.duration)
        .build()
        .sample()?;
    info!(
        samples = data.len(),
        duration = data.duration(),
        final_value = data.final_value(),
        "synthetic experiment recorded"
    );

    if let Some(method) = args.compare {
        if let Some(lambda) = args.lambda {
            warn!(lambda, "--lambda ignored: comparison runs identification only");
        }
        let comparison = scenario::compare(&data, method, &args.overrides())?;
        print_comparison(&comparison);
        if let Some(path) = &args.csv {
            let mut file = BufWriter::new(File::create(path)?);
            csv::write_comparison(&mut file, &comparison)?;
            file.flush()?;
            info!(path = %path, "comparison trace written");
        }
        if let Some(path) = &args.json {
            let mut file = BufWriter::new(File::create(path)?);
            json::write_comparison(&mut file, &comparison)?;
            file.flush()?;
            info!(path = %path, "comparison written");
        }
        return Ok(());
    }

    let mut request = match &args.request {
        Some(path) => ScenarioRequest::load(path)?,
        None => ScenarioRequest::new(args.preset.descriptor()),
    };
    args.merge_into(&mut request);

    let result = scenario::run_request(&data, &request)?;
    print_result(&result);

    if let Some(path) = &args.csv {
        let measured = recorded_output(&result, &data);
        csv::write_trace_file(path, &result.trace, measured)?;
        info!(path = %path, "trace written");
    }
    if let Some(path) = &args.json {
        json::write_result_file(path, &result)?;
        info!(path = %path, "result written");
    }
    Ok(())
}

/// The measured output shares the trace's grid only for recorded-grid runs.
fn recorded_output<'a>(result: &ScenarioResult, data: &'a SampleSeries) -> Option<&'a SampleSeries> {
    match result.descriptor.grid {
        TimeGrid::Recorded if result.trace.len() == data.len() => Some(data),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

fn opt(v: Option<f64>, unit: &str) -> String {
    match v {
        Some(x) => format!("{x:>8.3} {unit}"),
        None => format!("{:>8}", "n/a"),
    }
}

fn print_result(result: &ScenarioResult) {
    let p = &result.parameters;
    let m = &result.metrics;

    println!();
    println!("====================================================================");
    println!("  FOPDT SCENARIO: {}", result.descriptor.label());
    println!("====================================================================");
    println!();
    println!("  Model Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Gain k:        {:>8.4}       Time constant: {:>8.4} s", p.k, p.tau);
    println!("  Dead time:     {:>8.4} s     Step amplitude:{:>8.4}", p.theta, result.step_amplitude);
    if let Some(c) = &result.controller {
        let (_, ki, kd) = c.parallel_gains();
        println!("  Kp:            {:>8.4}       Ti:            {:>8.4} s", c.kp, c.ti);
        println!("  Td:            {:>8.4} s     Ki / Kd:       {:>8.4} / {:.4}", c.td, ki, kd);
    }
    println!("  Model order:   {:>8}", result.model.den_degree());
    println!();

    println!("  Step Response");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  Final value:   {:>8.4}       Peak:          {:>8.4}", m.final_value, m.peak_value);
    println!("  Rise time:     {}     Overshoot:     {:>8.2} %", opt(m.rise_time, "s"), m.overshoot_percent);
    println!("  Settling time: {}", opt(m.settling_time, "s"));
    if let Some(rmse) = m.rmse {
        println!("  RMSE vs. measured output: {rmse:.6}");
    }
    println!();
}

fn print_comparison(comparison: &Comparison) {
    let rows = [("open", &comparison.open), ("closed", &comparison.closed)];

    println!();
    println!("====================================================================");
    println!("  OPEN VS. CLOSED LOOP: {}", comparison.open.descriptor.method);
    println!("====================================================================");
    println!();
    println!("  {:<8} {:>9} {:>9} {:>9} {:>10} {:>10}", "loop", "k", "tau", "theta", "final", "rmse");
    println!("  ──────────────────────────────────────────────────────────────────");
    for (name, r) in rows {
        let rmse = r.metrics.rmse.map_or_else(|| "n/a".to_string(), |v| format!("{v:.5}"));
        println!(
            "  {:<8} {:>9.4} {:>9.4} {:>9.4} {:>10.4} {:>10}",
            name, r.parameters.k, r.parameters.tau, r.parameters.theta, r.metrics.final_value, rmse
        );
    }
    println!();
}
