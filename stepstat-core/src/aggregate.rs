use std::collections::BTreeMap;
use std::time::Duration;

use crate::stats::RunningMean;
use crate::types::{METRIC_DURATION, ScenarioResult, ScenarioStepResult};

/// Running statistics for one step id.
///
/// Errored observations only touch counters and distributions; the averages in
/// `durations` are folded from clean observations exclusively.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepSummary {
    /// First non-empty step name seen for this id.
    pub name: String,
    pub status_code_dist: BTreeMap<u16, u64>,
    pub error_dist: BTreeMap<String, u64>,
    /// Keyed by metric name; [`METRIC_DURATION`] holds the overall step duration.
    pub durations: BTreeMap<String, RunningMean>,
    pub success_count: u64,
    pub failed_count: u64,
}

impl StepSummary {
    pub fn record(&mut self, step: &ScenarioStepResult) {
        if self.name.is_empty() && !step.step_name.is_empty() {
            self.name.clone_from(&step.step_name);
        }

        *self.status_code_dist.entry(step.status_code).or_default() += 1;

        if let Some(err) = &step.error {
            *self.error_dist.entry(err.reason.clone()).or_default() += 1;
            self.failed_count = self.failed_count.saturating_add(1);
            return;
        }

        self.success_count = self.success_count.saturating_add(1);
        self.push_duration(METRIC_DURATION, step.duration);
        for (name, value) in &step.metrics {
            self.push_duration(name, *value);
        }
    }

    fn push_duration(&mut self, metric: &str, value: Duration) {
        match self.durations.get_mut(metric) {
            Some(mean) => mean.push(value.as_secs_f64()),
            None => {
                let mut mean = RunningMean::default();
                mean.push(value.as_secs_f64());
                self.durations.insert(metric.to_string(), mean);
            }
        }
    }

    pub fn total(&self) -> u64 {
        self.success_count.saturating_add(self.failed_count)
    }

    /// Average of `metric` in seconds, `0.0` when no clean observation carried it.
    pub fn avg_secs(&self, metric: &str) -> f64 {
        self.durations.get(metric).map_or(0.0, RunningMean::mean)
    }
}

/// Aggregate over every folded run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregateResult {
    /// Runs without any errored step.
    pub success_count: u64,
    /// Runs with at least one errored step.
    pub failed_count: u64,
    /// Sum of per-run elapsed spans (see [`ScenarioResult::elapsed`]).
    pub total_duration: Duration,
    pub steps: BTreeMap<u16, StepSummary>,
}

impl AggregateResult {
    pub fn runs_total(&self) -> u64 {
        self.success_count.saturating_add(self.failed_count)
    }

    /// `total_duration` spread over all runs; zero when nothing was folded.
    pub fn mean_run_duration(&self) -> Duration {
        match u32::try_from(self.runs_total()) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.total_duration / n,
            Err(_) => self.total_duration.div_f64(self.runs_total() as f64),
        }
    }

    fn record_run(&mut self, run: &ScenarioResult) {
        let mut errored = false;
        for step in &run.step_results {
            errored |= step.is_errored();
            self.steps.entry(step.step_id).or_default().record(step);
        }

        if errored {
            self.failed_count = self.failed_count.saturating_add(1);
        } else {
            self.success_count = self.success_count.saturating_add(1);
        }

        self.total_duration = self.total_duration.saturating_add(run.elapsed());
    }
}

/// Single-owner fold of a run stream into an [`AggregateResult`].
///
/// The aggregator is the only writer of its state; callers hand runs to it one at
/// a time and take the finalized result with [`Aggregator::finish`].
#[derive(Debug, Default)]
pub struct Aggregator {
    result: AggregateResult,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, run: &ScenarioResult) {
        self.result.record_run(run);
        tracing::debug!(
            steps = run.step_results.len(),
            failed = run.is_failed(),
            runs_total = self.result.runs_total(),
            "folded run"
        );
    }

    /// Current state of the fold, for inspection while runs are still arriving.
    pub fn snapshot(&self) -> &AggregateResult {
        &self.result
    }

    pub fn finish(self) -> AggregateResult {
        self.result
    }
}
