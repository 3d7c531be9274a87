use std::io::Write;

use crate::aggregate::AggregateResult;

mod human;
mod json;

pub use json::{JsonDurations, JsonStepSummary, JsonSummary, Seconds, build_summary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One compact JSON document.
    #[default]
    Json,
    /// Multi-line summary for terminals.
    HumanReadable,
}

pub trait OutputFormatter: Send + Sync {
    /// Renders a finalized aggregate into `out`. Never mutates `result`.
    fn print_summary(&self, result: &AggregateResult, out: &mut dyn Write) -> crate::Result<()>;
}

pub fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(json::JsonOutput),
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput),
    }
}

/// Success/fail percentages as whole numbers.
///
/// The success share is floored and the fail share is its complement, so the pair
/// always sums to 100. Both are 0 when nothing was observed.
pub fn percentages(success: u64, failed: u64) -> (u64, u64) {
    let total = u128::from(success) + u128::from(failed);
    if total == 0 {
        return (0, 0);
    }

    let success_perc = (u128::from(success) * 100 / total) as u64;
    (success_perc, 100 - success_perc)
}

/// Rounds a value in seconds to millisecond precision.
///
/// Rounds half away from zero on the scaled `f64` value, not on its decimal text:
/// `1.0005` becomes `1.001` because `1.0005 * 1000.0` lands on `1000.5`.
pub fn round_secs(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}
