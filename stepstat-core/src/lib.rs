mod aggregate;
mod error;
mod report;
mod serde_util;
mod signal;
mod stats;

pub mod output;
pub mod types;
pub mod verbose;

pub use aggregate::{AggregateResult, Aggregator, StepSummary};
pub use error::{Error, Result};
pub use output::{OutputFormat, OutputFormatter, formatter, percentages};
pub use report::Reporter;
pub use signal::{Completion, DoneSignal, completion};
pub use stats::RunningMean;
pub use types::{
    DebugInfo, ErrorKind, RequestError, RequestInfo, ResponseInfo, ScenarioResult,
    ScenarioStepResult,
};
pub use verbose::VerboseRecord;
