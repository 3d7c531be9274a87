use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::io::Write;

use super::{OutputFormatter, percentages, round_secs};
use crate::aggregate::{AggregateResult, StepSummary};
use crate::types::{METRIC_CONNECTION, METRIC_DNS, METRIC_DURATION};

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_summary(&self, result: &AggregateResult, out: &mut dyn Write) -> crate::Result<()> {
        let summary = build_summary(result);
        serde_json::to_writer(&mut *out, &summary)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Seconds rounded to millisecond precision.
///
/// Whole values serialize as JSON integers (`0`, not `0.0`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seconds(pub f64);

impl Seconds {
    pub fn rounded(secs: f64) -> Self {
        Self(round_secs(secs))
    }
}

impl Serialize for Seconds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

        let v = self.0;
        if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_EXACT {
            serializer.serialize_i64(v as i64)
        } else {
            serializer.serialize_f64(v)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub success_perc: u64,
    pub fail_perc: u64,
    pub success_count: u64,
    pub fail_count: u64,
    /// Sum of per-run elapsed spans, in seconds.
    pub avg_duration: Seconds,
    pub steps: BTreeMap<String, JsonStepSummary>,
}

#[derive(Debug, Serialize)]
pub struct JsonStepSummary {
    pub name: String,
    pub status_code_dist: BTreeMap<String, u64>,
    pub error_dist: BTreeMap<String, u64>,
    pub durations: JsonDurations,
    pub success_count: u64,
    pub fail_count: u64,
    pub success_perc: u64,
    pub fail_perc: u64,
}

#[derive(Debug, Serialize)]
pub struct JsonDurations {
    pub connection: Seconds,
    pub dns: Seconds,
    pub total: Seconds,
}

pub fn build_summary(result: &AggregateResult) -> JsonSummary {
    let (success_perc, fail_perc) = percentages(result.success_count, result.failed_count);

    let steps = result
        .steps
        .iter()
        .map(|(id, s)| (id.to_string(), build_step(s)))
        .collect();

    JsonSummary {
        success_perc,
        fail_perc,
        success_count: result.success_count,
        fail_count: result.failed_count,
        avg_duration: Seconds::rounded(result.total_duration.as_secs_f64()),
        steps,
    }
}

fn build_step(s: &StepSummary) -> JsonStepSummary {
    let (success_perc, fail_perc) = percentages(s.success_count, s.failed_count);

    JsonStepSummary {
        name: s.name.clone(),
        status_code_dist: s
            .status_code_dist
            .iter()
            .map(|(code, n)| (code.to_string(), *n))
            .collect(),
        error_dist: s.error_dist.clone(),
        durations: JsonDurations {
            connection: Seconds::rounded(s.avg_secs(METRIC_CONNECTION)),
            dns: Seconds::rounded(s.avg_secs(METRIC_DNS)),
            total: Seconds::rounded(s.avg_secs(METRIC_DURATION)),
        },
        success_count: s.success_count,
        fail_count: s.failed_count,
        success_perc,
        fail_perc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::RunningMean;
    use crate::types::REASON_CONN_TIMEOUT;
    use serde_json::{Value, json};
    use std::time::Duration;

    fn means(pairs: &[(&str, f64)]) -> BTreeMap<String, RunningMean> {
        pairs
            .iter()
            .map(|(name, v)| (name.to_string(), std::iter::once(*v).collect()))
            .collect()
    }

    fn render(result: &AggregateResult) -> String {
        let mut out = Vec::new();
        if let Err(err) = JsonOutput.print_summary(result, &mut out) {
            panic!("print_summary failed: {err}");
        }
        match String::from_utf8(out) {
            Ok(s) => s,
            Err(err) => panic!("output is not utf-8: {err}"),
        }
    }

    fn fixture() -> AggregateResult {
        let step1 = StepSummary {
            status_code_dist: [(200, 11)].into_iter().collect(),
            success_count: 11,
            failed_count: 0,
            durations: means(&[
                (METRIC_DNS, 0.1897),
                (METRIC_CONNECTION, 0.0003),
                (METRIC_DURATION, 0.19),
            ]),
            ..StepSummary::default()
        };
        let step2 = StepSummary {
            status_code_dist: [(401, 1), (200, 9)].into_iter().collect(),
            success_count: 9,
            failed_count: 2,
            durations: means(&[
                (METRIC_DNS, 0.48),
                (METRIC_CONNECTION, 0.01356),
                (METRIC_DURATION, 0.493566),
            ]),
            error_dist: [(REASON_CONN_TIMEOUT.to_string(), 2)].into_iter().collect(),
            ..StepSummary::default()
        };

        AggregateResult {
            success_count: 9,
            failed_count: 2,
            total_duration: Duration::from_secs_f64(0.25637),
            steps: [(1, step1), (2, step2)].into_iter().collect(),
        }
    }

    #[test]
    fn renders_canonical_compact_document() {
        let expected = json!({
            "success_perc": 81,
            "fail_perc": 19,
            "success_count": 9,
            "fail_count": 2,
            "avg_duration": 0.256,
            "steps": {
                "1": {
                    "name": "",
                    "status_code_dist": {"200": 11},
                    "error_dist": {},
                    "durations": {"connection": 0, "dns": 0.19, "total": 0.19},
                    "success_count": 11,
                    "fail_count": 0,
                    "success_perc": 100,
                    "fail_perc": 0
                },
                "2": {
                    "name": "",
                    "status_code_dist": {"200": 9, "401": 1},
                    "error_dist": {"connection timeout": 2},
                    "durations": {"connection": 0.014, "dns": 0.48, "total": 0.494},
                    "success_count": 9,
                    "fail_count": 2,
                    "success_perc": 81,
                    "fail_perc": 19
                }
            }
        });

        let out = render(&fixture());
        let v: Value = match serde_json::from_str(&out) {
            Ok(v) => v,
            Err(err) => panic!("invalid json: {err}\n{out}"),
        };
        assert_eq!(v, expected);
    }

    #[test]
    fn output_is_a_single_compact_line_in_field_order() {
        let out = render(&fixture());
        assert_eq!(out.lines().count(), 1);
        assert!(out.ends_with('\n'));
        assert!(
            out.starts_with(
                r#"{"success_perc":81,"fail_perc":19,"success_count":9,"fail_count":2,"avg_duration":0.256,"steps":{"1":{"name":"","status_code_dist":{"200":11},"error_dist":{},"durations":{"connection":0,"dns":0.19,"total":0.19},"#
            ),
            "{out}"
        );
    }

    #[test]
    fn step_without_observations_has_zero_percentages() {
        let result = AggregateResult {
            steps: [(3, StepSummary::default())].into_iter().collect(),
            ..AggregateResult::default()
        };

        let summary = build_summary(&result);
        assert_eq!((summary.success_perc, summary.fail_perc), (0, 0));
        match summary.steps.get("3") {
            Some(s) => assert_eq!((s.success_perc, s.fail_perc), (0, 0)),
            None => panic!("step 3 missing"),
        }
    }

    #[test]
    fn step_keys_sort_as_strings() {
        let result = AggregateResult {
            steps: [(2, StepSummary::default()), (10, StepSummary::default())]
                .into_iter()
                .collect(),
            ..AggregateResult::default()
        };

        let keys: Vec<_> = build_summary(&result).steps.into_keys().collect();
        assert_eq!(keys, vec!["10".to_string(), "2".to_string()]);
    }

    #[test]
    fn seconds_serialize_without_trailing_zeros() -> serde_json::Result<()> {
        assert_eq!(serde_json::to_string(&Seconds::rounded(0.0003))?, "0");
        assert_eq!(serde_json::to_string(&Seconds::rounded(90.0))?, "90");
        assert_eq!(serde_json::to_string(&Seconds::rounded(0.4))?, "0.4");
        Ok(())
    }
}
