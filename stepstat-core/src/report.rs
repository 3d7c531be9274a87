use std::io::Write;

use tokio::sync::mpsc;

use crate::aggregate::{AggregateResult, Aggregator};
use crate::error::{Error, Result};
use crate::output::{OutputFormat, OutputFormatter, formatter};
use crate::signal::{Completion, DoneSignal, completion};
use crate::types::ScenarioResult;
use crate::verbose;

/// Folds a run stream and prints its summary to an explicit sink.
///
/// Lifecycle: [`Reporter::new`] (or [`Reporter::init`] to re-arm), then one
/// [`Reporter::start`] that returns once the input channel is closed and the
/// summary is flushed. [`Reporter::done`] hands out completion handles at any time.
pub struct Reporter<W> {
    out: Box<dyn OutputFormatter>,
    debug: bool,
    sink: W,
    aggregator: Aggregator,
    completion: Option<Completion>,
    done: DoneSignal,
}

impl<W: Write + Send> Reporter<W> {
    pub fn new(format: OutputFormat, debug: bool, sink: W) -> Self {
        let (completion, done) = completion();
        Self {
            out: formatter(format),
            debug,
            sink,
            aggregator: Aggregator::new(),
            completion: Some(completion),
            done,
        }
    }

    /// Discards any previous aggregation state and arms a fresh completion signal.
    ///
    /// Handles returned by earlier [`Reporter::done`] calls stay bound to the old signal.
    pub fn init(&mut self, debug: bool) {
        let (completion, done) = completion();
        self.debug = debug;
        self.aggregator = Aggregator::new();
        self.completion = Some(completion);
        self.done = done;
    }

    pub fn done(&self) -> DoneSignal {
        self.done.clone()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Consumes `input` until every sender is dropped, prints the summary and fires
    /// the completion signal.
    ///
    /// In debug mode each run's records are flushed as the run arrives. A sink I/O
    /// error ends the debug stream; aggregation carries on.
    ///
    /// The signal fires after the summary was written and flushed. It also fires when
    /// printing fails, in which case the error is returned.
    ///
    /// # Panics
    ///
    /// When called a second time without an [`Reporter::init`] in between.
    pub async fn start(
        &mut self,
        mut input: mpsc::Receiver<ScenarioResult>,
    ) -> Result<AggregateResult> {
        let Some(completion) = self.completion.take() else {
            panic!("Reporter::start called twice without Reporter::init");
        };
        let mut aggregator = std::mem::take(&mut self.aggregator);

        let mut verbose = self.debug;
        while let Some(run) = input.recv().await {
            if verbose {
                if let Err(err) = self.print_verbose(&run) {
                    tracing::warn!(%err, "debug output failed, no further records will be printed");
                    verbose = false;
                }
            }
            aggregator.fold(&run);
        }

        let result = aggregator.finish();
        tracing::info!(
            runs = result.runs_total(),
            failed_runs = result.failed_count,
            steps = result.steps.len(),
            "input closed, printing summary"
        );

        let printed = self.print_summary(&result);
        completion.fire();
        printed?;

        Ok(result)
    }

    /// Writes one record per step, then flushes so records are visible while the
    /// stream is still open. Only sink I/O errors are returned; records that cannot
    /// be encoded are skipped.
    fn print_verbose(&mut self, run: &ScenarioResult) -> Result<()> {
        for step in &run.step_results {
            match verbose::encode(step, &mut self.sink) {
                Ok(()) => {}
                Err(Error::Io(err)) => return Err(Error::Io(err)),
                Err(err) => {
                    tracing::warn!(step_id = step.step_id, %err, "skipping verbose record");
                }
            }
        }
        self.sink.flush()?;
        Ok(())
    }

    fn print_summary(&mut self, result: &AggregateResult) -> Result<()> {
        self.out.print_summary(result, &mut self.sink)?;
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_sink(self) -> W {
        self.sink
    }
}
