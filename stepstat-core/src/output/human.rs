use std::fmt::Write as _;
use std::io::Write;
use std::time::Duration;

use super::{OutputFormatter, percentages};
use crate::aggregate::{AggregateResult, StepSummary};
use crate::types::{METRIC_CONNECTION, METRIC_DNS, METRIC_DURATION};

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn print_summary(&self, result: &AggregateResult, out: &mut dyn Write) -> crate::Result<()> {
        out.write_all(render(result).as_bytes())?;
        Ok(())
    }
}

pub(crate) fn render(result: &AggregateResult) -> String {
    let mut out = String::new();

    let (success_perc, fail_perc) = percentages(result.success_count, result.failed_count);
    out.push_str("summary\n");
    writeln!(
        &mut out,
        "  runs: {} (success {} {success_perc}%, failed {} {fail_perc}%)",
        result.runs_total(),
        result.success_count,
        result.failed_count
    )
    .ok();
    writeln!(
        &mut out,
        "  duration: total {} mean {}",
        format_secs(result.total_duration.as_secs_f64()),
        format_secs(result.mean_run_duration().as_secs_f64())
    )
    .ok();

    if result.steps.is_empty() {
        out.push_str("  steps: none\n");
        return out;
    }

    for (id, s) in &result.steps {
        out.push('\n');
        render_step(*id, s, &mut out);
    }

    out
}

fn render_step(id: u16, s: &StepSummary, out: &mut String) {
    let (success_perc, fail_perc) = percentages(s.success_count, s.failed_count);

    if s.name.is_empty() {
        writeln!(out, "step {id}").ok();
    } else {
        writeln!(out, "step {id}: {}", s.name).ok();
    }
    writeln!(
        out,
        "  requests: {} (success {} {success_perc}%, failed {} {fail_perc}%)",
        s.total(),
        s.success_count,
        s.failed_count
    )
    .ok();

    if s.success_count > 0 {
        writeln!(
            out,
            "  durations: dns={} connection={} total={}",
            format_secs(s.avg_secs(METRIC_DNS)),
            format_secs(s.avg_secs(METRIC_CONNECTION)),
            format_secs(s.avg_secs(METRIC_DURATION))
        )
        .ok();
    } else {
        out.push_str("  durations: n/a\n");
    }

    if !s.status_code_dist.is_empty() {
        out.push_str("  status codes:\n");
        for (code, n) in &s.status_code_dist {
            let label = if *code == 0 {
                "no response".to_string()
            } else {
                code.to_string()
            };
            writeln!(out, "    {label}: {n}").ok();
        }
    }

    if !s.error_dist.is_empty() {
        out.push_str("  errors:\n");

        let mut errors: Vec<_> = s.error_dist.iter().collect();
        errors.sort_by(|(a_reason, a_count), (b_reason, b_count)| {
            b_count.cmp(a_count).then_with(|| a_reason.cmp(b_reason))
        });
        for (reason, n) in errors {
            writeln!(out, "    {reason}: {n}").ok();
        }
    }
}

/// Renders seconds as a single rounded component in one of: us, ms, s.
fn format_secs(secs: f64) -> String {
    let d = Duration::try_from_secs_f64(secs).unwrap_or_default();
    let total_ns = d.as_nanos();

    const NS_PER_US: u128 = 1_000;
    const NS_PER_MS: u128 = 1_000_000;
    const NS_PER_S: u128 = 1_000_000_000;

    if total_ns >= NS_PER_S {
        return format!("{:.3}s", d.as_secs_f64());
    }
    if total_ns >= NS_PER_MS {
        return format!("{}ms", (total_ns + NS_PER_MS / 2) / NS_PER_MS);
    }

    format!("{}us", (total_ns + NS_PER_US / 2) / NS_PER_US)
}
