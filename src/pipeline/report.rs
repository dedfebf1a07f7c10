// src/pipeline/report.rs

//! Human-readable and JSON run summaries.

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::models::RunResult;

/// How a run summary is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Summary block: totals, then one line per skip and per failed dispatch.
pub struct Summary<'a, R>(pub &'a RunResult<R>);

impl<R> fmt::Display for Summary<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        writeln!(f, "[result]")?;
        writeln!(f, "Total: {}", result.total)?;
        writeln!(f, "Count: {}", result.dispatched)?;
        if !result.skips.is_empty() {
            writeln!(f, "Skips:")?;
            for skip in &result.skips {
                writeln!(f, "  [{}] {} : {}", skip.kind, skip.url, skip.reason)?;
            }
        }
        if !result.failures.is_empty() {
            writeln!(f, "Failures:")?;
            for failure in &result.failures {
                match failure.urls.as_slice() {
                    [single] => write!(f, "  [{}] {}", failure.kind, single)?,
                    many => write!(f, "  [{}] {} url(s)", failure.kind, many.len())?,
                }
                writeln!(f, " : {}", failure.message)?;
            }
        }
        Ok(())
    }
}

pub fn render_text<R>(result: &RunResult<R>) -> String {
    Summary(result).to_string()
}

pub fn render_json<R: Serialize>(result: &RunResult<R>) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Print a run summary to stdout.
pub fn print_result<R: Serialize>(result: &RunResult<R>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print!("{}", render_text(result)),
        OutputFormat::Json => println!("{}", render_json(result)?),
    }
    Ok(())
}
