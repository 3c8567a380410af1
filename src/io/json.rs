use std::io::{self, Write};

use serde::Serialize;

use crate::analysis::PerformanceMetrics;
use crate::control::ControllerParameters;
use crate::ident::IdentifiedParameters;
use crate::scenario::{Comparison, ScenarioResult};

/// Scalar outcome of a scenario, without the trace.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    pub parameters: IdentifiedParameters,
    pub controller: Option<ControllerParameters>,
    pub step_amplitude: f64,
    pub metrics: PerformanceMetrics,
}

impl ScenarioSummary {
    pub fn from_result(result: &ScenarioResult) -> Self {
        Self {
            scenario: result.descriptor.label(),
            parameters: result.parameters,
            controller: result.controller,
            step_amplitude: result.step_amplitude,
            metrics: result.metrics.clone(),
        }
    }
}

fn write_pretty<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)
}

/// Write the full result (model, trace and metrics) as JSON.
pub fn write_result<W: Write>(writer: &mut W, result: &ScenarioResult) -> io::Result<()> {
    write_pretty(writer, result)
}

/// Write only the scalar summary as JSON.
pub fn write_summary<W: Write>(writer: &mut W, result: &ScenarioResult) -> io::Result<()> {
    write_pretty(writer, &ScenarioSummary::from_result(result))
}

pub fn write_comparison<W: Write>(writer: &mut W, comparison: &Comparison) -> io::Result<()> {
    write_pretty(writer, comparison)
}

/// Write the full result JSON to a file.
pub fn write_result_file(path: &str, result: &ScenarioResult) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_result(&mut file, result)?;
    file.flush()
}
