use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One compact JSON document.
    Json,
    /// Multi-line summary.
    HumanReadable,
}

impl From<OutputFormat> for stepstat_core::OutputFormat {
    fn from(value: OutputFormat) -> Self {
        match value {
            OutputFormat::Json => Self::Json,
            OutputFormat::HumanReadable => Self::HumanReadable,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "stepstat",
    version,
    about = "Per-step statistics for recorded load-test runs",
    long_about = "stepstat folds a stream of scenario runs into per-step statistics and prints a summary.\n\nInput is newline-delimited JSON, one run per line:\n  {\"start_time\": \"2024-05-01T10:00:00Z\", \"step_results\": [{\"step_id\": 1, \"status_code\": 200, \"request_time\": \"2024-05-01T10:00:00Z\", \"duration\": \"120ms\", \"metrics\": {\"dns\": \"3ms\"}}]}",
    after_help = "Examples:\n  stepstat report runs.ndjson\n  stepstat report runs.ndjson --output human-readable\n  cat runs.ndjson | stepstat report --debug --timeout 30s\n\nDiagnostics go to stderr; set RUST_LOG=debug for per-run logs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Aggregate recorded runs and print the summary
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// NDJSON file with one run per line (`-` reads stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Output format
    #[arg(long, value_enum, env = "STEPSTAT_OUTPUT", default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    /// Also print one JSON record per step observation
    #[arg(long, env = "STEPSTAT_DEBUG")]
    pub debug: bool,

    /// Give up waiting for the summary after this long (e.g. 10s, 250ms, 1m 30s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Number of concurrent producer tasks feeding the reporter
    #[arg(long, default_value = "1")]
    pub producers: NonZeroUsize,

    /// Capacity of the run channel between producers and the reporter
    #[arg(long, default_value = "1024")]
    pub channel_capacity: NonZeroUsize,

    /// Exit with code 10 when at least one run failed
    #[arg(long)]
    pub fail_on_error: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout_of(value: &str) -> Option<Duration> {
        match Cli::try_parse_from(["stepstat", "report", "--timeout", value]) {
            Ok(cli) => {
                let Command::Report(args) = cli.command;
                args.timeout
            }
            Err(_) => None,
        }
    }

    #[test]
    fn timeout_uses_the_input_duration_grammar() {
        assert_eq!(timeout_of("250ms"), Some(Duration::from_millis(250)));
        assert_eq!(timeout_of("10s"), Some(Duration::from_secs(10)));
        assert_eq!(timeout_of("1m"), Some(Duration::from_secs(60)));
        assert_eq!(timeout_of("1s 500ms"), Some(Duration::from_millis(1500)));
        assert_eq!(timeout_of("1s500ms"), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn timeout_rejects_invalid_values() {
        assert_eq!(timeout_of(""), None);
        assert_eq!(timeout_of("abc"), None);
        assert_eq!(timeout_of("10x"), None);
    }

    #[test]
    fn cli_parses_report_flags() {
        let parsed = Cli::try_parse_from([
            "stepstat",
            "report",
            "runs.ndjson",
            "--output",
            "human-readable",
            "--debug",
            "--timeout",
            "5s",
            "--producers",
            "4",
            "--fail-on-error",
        ]);

        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        let Command::Report(args) = cli.command;
        assert_eq!(args.input, PathBuf::from("runs.ndjson"));
        assert_eq!(args.output, OutputFormat::HumanReadable);
        assert!(args.debug);
        assert_eq!(args.timeout, Some(Duration::from_secs(5)));
        assert_eq!(args.producers.get(), 4);
        assert_eq!(args.channel_capacity.get(), 1024);
        assert!(args.fail_on_error);
    }

    #[test]
    fn cli_report_defaults_to_stdin_json() {
        let cli = match Cli::try_parse_from(["stepstat", "report"]) {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        let Command::Report(args) = cli.command;
        assert_eq!(args.input, PathBuf::from("-"));
        assert_eq!(args.output, OutputFormat::Json);
        assert_eq!(args.timeout, None);
        assert_eq!(args.producers.get(), 1);
    }

    #[test]
    fn cli_rejects_zero_producers() {
        assert!(Cli::try_parse_from(["stepstat", "report", "--producers", "0"]).is_err());
    }
}
