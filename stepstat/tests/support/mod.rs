#![allow(dead_code)]

use std::io::Write as _;
use std::process::{Command, Output, Stdio};

use anyhow::Context as _;
use tempfile::NamedTempFile;

/// Two recorded runs; the first has an errored step 2.
pub const SCENARIO_RUNS: &str = concat!(
    r#"{"start_time":"2024-05-01T10:00:00Z","step_results":["#,
    r#"{"step_id":1,"step_name":"home","status_code":200,"request_time":"2024-05-01T10:00:00Z","duration":"10s","metrics":{"dns":"5s","connection":"5s"},"debug":{"request":{"url":"http://localhost/","method":"GET"},"response":{"status_code":200,"body":"ok"}}},"#,
    r#"{"step_id":2,"step_name":"login","request_time":"2024-05-01T10:00:00Z","duration":"30s","error":{"kind":"connection","reason":"connection timeout"}}"#,
    "]}\n",
    r#"{"start_time":"2024-05-01T10:01:00Z","step_results":["#,
    r#"{"step_id":1,"status_code":200,"request_time":"2024-05-01T10:01:00Z","duration":"30s","metrics":{"dns":"10s","connection":"20s"}},"#,
    r#"{"step_id":2,"status_code":401,"request_time":"2024-05-01T10:01:00Z","duration":"60s","metrics":{"dns":"20s","connection":"40s"}}"#,
    "]}\n",
);

pub fn input_file(contents: &str) -> anyhow::Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("create temp input")?;
    file.write_all(contents.as_bytes())
        .context("write temp input")?;
    file.flush().context("flush temp input")?;
    Ok(file)
}

pub fn stepstat() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stepstat"));
    cmd.env_remove("STEPSTAT_OUTPUT")
        .env_remove("STEPSTAT_DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

pub fn run_with_stdin(mut cmd: Command, stdin: &str) -> anyhow::Result<Output> {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("spawn stepstat")?;

    child
        .stdin
        .take()
        .context("stdin handle")?
        .write_all(stdin.as_bytes())
        .context("write stdin")?;

    child.wait_with_output().context("wait for stepstat")
}

pub fn status_code(out: &Output) -> i32 {
    out.status.code().unwrap_or(-1)
}

pub fn describe(out: &Output) -> String {
    format!(
        "exit={}\nstdout:\n{}\nstderr:\n{}",
        status_code(out),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    )
}
