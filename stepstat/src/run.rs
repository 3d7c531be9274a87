use anyhow::Context as _;
use std::io::BufWriter;
use std::path::Path;
use stepstat_core::{Reporter, ScenarioResult};
use tokio::io::AsyncReadExt as _;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cli::ReportArgs;
use crate::exit_codes::ExitCode;
use crate::run_error::RunError;

pub async fn run(args: ReportArgs) -> Result<ExitCode, RunError> {
    let text = read_input(&args.input)
        .await
        .map_err(RunError::InvalidInput)?;
    let runs = parse_runs(&text).map_err(RunError::InvalidInput)?;
    tracing::info!(
        runs = runs.len(),
        producers = args.producers.get(),
        "loaded input"
    );

    let (tx, rx) = mpsc::channel(args.channel_capacity.get());
    let producers = spawn_producers(runs, args.producers.get(), tx);

    let sink = BufWriter::new(std::io::stdout());
    let mut reporter = Reporter::new(args.output.into(), args.debug, sink);
    let done = reporter.done();
    let reporting = tokio::spawn(async move { reporter.start(rx).await });

    match args.timeout {
        Some(limit) => {
            if tokio::time::timeout(limit, done.wait()).await.is_err() {
                reporting.abort();
                return Err(RunError::TimedOut(anyhow::anyhow!(
                    "summary not ready after {}",
                    humantime::format_duration(limit)
                )));
            }
        }
        None => done.wait().await,
    }

    for producer in producers {
        producer
            .await
            .context("producer task failed")
            .map_err(RunError::RuntimeError)?;
    }

    let result = reporting
        .await
        .context("reporter task failed")
        .map_err(RunError::RuntimeError)?
        .context("failed to print summary")
        .map_err(RunError::RuntimeError)?;

    Ok(ExitCode::from_failed_runs(
        result.failed_count,
        args.fail_on_error,
    ))
}

async fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read runs from stdin")?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read runs: {}", path.display()))
}

/// One run per line; blank lines are skipped.
fn parse_runs(text: &str) -> anyhow::Result<Vec<ScenarioResult>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).with_context(|| format!("line {}: invalid run", idx + 1))
        })
        .collect()
}

/// Splits `runs` round-robin across `producers` tasks that all feed `tx`.
fn spawn_producers(
    runs: Vec<ScenarioResult>,
    producers: usize,
    tx: mpsc::Sender<ScenarioResult>,
) -> Vec<JoinHandle<()>> {
    let producers = producers.max(1);
    let mut shards: Vec<Vec<ScenarioResult>> = (0..producers).map(|_| Vec::new()).collect();
    for (i, run) in runs.into_iter().enumerate() {
        shards[i % producers].push(run);
    }

    shards
        .into_iter()
        .enumerate()
        .map(|(producer, shard)| {
            let tx = tx.clone();
            tokio::spawn(async move {
                let sent = shard.len();
                for run in shard {
                    if tx.send(run).await.is_err() {
                        tracing::warn!(producer, "reporter stopped accepting runs");
                        return;
                    }
                }
                tracing::debug!(producer, sent, "producer finished");
            })
        })
        .collect()
}
