#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// One or more runs failed and `--fail-on-error` was set.
    RunsFailed = 10,

    /// Invalid CLI flags or unreadable/malformed input.
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, crashed tasks).
    RuntimeError = 40,

    /// The summary was not produced before `--timeout` elapsed.
    TimedOut = 41,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_failed_runs(failed_runs: u64, fail_on_error: bool) -> Self {
        if fail_on_error && failed_runs > 0 {
            Self::RunsFailed
        } else {
            Self::Success
        }
    }
}
