use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use crate::serde_util;

/// Overall elapsed time of a step observation.
pub const METRIC_DURATION: &str = "duration";
/// DNS resolution time.
pub const METRIC_DNS: &str = "dns";
/// TCP connect time.
pub const METRIC_CONNECTION: &str = "connection";

pub const REASON_CONN_TIMEOUT: &str = "connection timeout";
pub const REASON_CONN_REFUSED: &str = "connection refused";

/// One complete execution of a scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioResult {
    #[serde(with = "serde_util::timestamp")]
    pub start_time: SystemTime,
    #[serde(default)]
    pub step_results: Vec<ScenarioStepResult>,
}

impl ScenarioResult {
    pub fn new(start_time: SystemTime) -> Self {
        Self {
            start_time,
            step_results: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_step(mut self, step: ScenarioStepResult) -> Self {
        self.step_results.push(step);
        self
    }

    /// A run fails as soon as one of its steps carries an error.
    pub fn is_failed(&self) -> bool {
        self.step_results.iter().any(ScenarioStepResult::is_errored)
    }

    /// Span from the run start to the end of its last step observation.
    ///
    /// Zero for runs without steps, or when clocks went backwards.
    pub fn elapsed(&self) -> Duration {
        let Some(last) = self.step_results.last() else {
            return Duration::ZERO;
        };

        let end = last
            .request_time
            .checked_add(last.duration)
            .unwrap_or(last.request_time);
        end.duration_since(self.start_time).unwrap_or_default()
    }
}

/// One executed step within a run.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioStepResult {
    pub step_id: u16,
    #[serde(default)]
    pub step_name: String,
    /// `0` when no response was received.
    #[serde(default)]
    pub status_code: u16,
    #[serde(with = "serde_util::timestamp")]
    pub request_time: SystemTime,
    #[serde(with = "serde_util::duration")]
    pub duration: Duration,
    #[serde(default)]
    pub error: Option<RequestError>,
    /// Named sub-metrics such as [`METRIC_DNS`] or [`METRIC_CONNECTION`].
    #[serde(default, with = "serde_util::duration_map")]
    pub metrics: BTreeMap<String, Duration>,
    #[serde(default)]
    pub debug: Option<DebugInfo>,
}

impl ScenarioStepResult {
    pub fn new(step_id: u16, request_time: SystemTime) -> Self {
        Self {
            step_id,
            step_name: String::new(),
            status_code: 0,
            request_time,
            duration: Duration::ZERO,
            error: None,
            metrics: BTreeMap::new(),
            debug: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.step_name = name.into();
        self
    }

    #[must_use]
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_metric(mut self, name: impl Into<String>, value: Duration) -> Self {
        self.metrics.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_error(mut self, kind: ErrorKind, reason: impl Into<String>) -> Self {
        self.error = Some(RequestError {
            kind,
            reason: reason.into(),
        });
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: DebugInfo) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// Failure injected on purpose by the scenario.
    Intended,
    Dns,
    Connection,
    Proxy,
    Tls,
    InvalidRequest,
    Response,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{kind}: {reason}")]
pub struct RequestError {
    pub kind: ErrorKind,
    pub reason: String,
}

/// Request/response material captured for verbose output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebugInfo {
    pub request: RequestInfo,
    #[serde(default)]
    pub response: Option<ResponseInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestInfo {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, with = "serde_util::body")]
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseInfo {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, with = "serde_util::body")]
    pub body: Vec<u8>,
}
