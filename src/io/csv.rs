use std::io::{self, Write};

use crate::dataset::SampleSeries;
use crate::scenario::Comparison;
use crate::sim::StepResponseTrace;

/// Write a simulated trace to CSV.
///
/// Columns: time, value[, measured]. The measured column is the recorded
/// output and requires a trace simulated on the recorded grid.
pub fn write_trace<W: Write>(
    writer: &mut W,
    trace: &StepResponseTrace,
    measured: Option<&SampleSeries>,
) -> io::Result<()> {
    match measured {
        Some(series) => {
            if series.len() != trace.len() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "measured series has {} samples, trace has {}",
                        series.len(),
                        trace.len()
                    ),
                ));
            }
            writeln!(writer, "time,value,measured")?;
            for ((t, y), m) in trace.points().zip(series.output()) {
                writeln!(writer, "{t:.6},{y:.6},{m:.6}")?;
            }
        }
        None => {
            writeln!(writer, "time,value")?;
            for (t, y) in trace.points() {
                writeln!(writer, "{t:.6},{y:.6}")?;
            }
        }
    }
    Ok(())
}

/// Write both traces of a comparison side by side (they share the recorded grid).
pub fn write_comparison<W: Write>(writer: &mut W, comparison: &Comparison) -> io::Result<()> {
    writeln!(writer, "time,open,closed")?;
    for ((t, open), closed) in comparison
        .open
        .trace
        .points()
        .zip(comparison.closed.trace.value())
    {
        writeln!(writer, "{t:.6},{open:.6},{closed:.6}")?;
    }
    Ok(())
}

/// Write a trace to a CSV file at the given path.
pub fn write_trace_file(
    path: &str,
    trace: &StepResponseTrace,
    measured: Option<&SampleSeries>,
) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trace(&mut file, trace, measured)?;
    file.flush()
}
