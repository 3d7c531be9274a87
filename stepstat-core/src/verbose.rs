//! Per-request debug records.
//!
//! A record is either a [`VerboseRecord::Failure`] carrying an `error` message or a
//! [`VerboseRecord::Success`] carrying a `response`; the two shapes never share the
//! other branch's key.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;

use crate::error::{Error, Result};
use crate::types::{RequestInfo, ResponseInfo, ScenarioStepResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VerboseRecord<'a> {
    #[serde(rename_all = "camelCase")]
    Failure {
        step_id: u16,
        step_name: &'a str,
        request: VerboseRequest<'a>,
        error: String,
    },
    #[serde(rename_all = "camelCase")]
    Success {
        step_id: u16,
        step_name: &'a str,
        request: VerboseRequest<'a>,
        response: VerboseResponse<'a>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerboseRequest<'a> {
    pub url: &'a str,
    pub method: &'a str,
    pub headers: &'a BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerboseResponse<'a> {
    pub status_code: u16,
    pub headers: &'a BTreeMap<String, String>,
    pub body: Value,
}

static NO_HEADERS: BTreeMap<String, String> = BTreeMap::new();

impl<'a> VerboseRecord<'a> {
    pub fn from_step(step: &'a ScenarioStepResult) -> Result<Self> {
        let debug = step.debug.as_ref();
        let request = match debug.map(|d| &d.request) {
            Some(r) => VerboseRequest::from_info(step.step_id, r)?,
            None => VerboseRequest {
                url: "",
                method: "",
                headers: &NO_HEADERS,
                body: Value::Null,
            },
        };

        if let Some(err) = &step.error {
            return Ok(Self::Failure {
                step_id: step.step_id,
                step_name: &step.step_name,
                request,
                error: err.reason.clone(),
            });
        }

        let response = match debug.and_then(|d| d.response.as_ref()) {
            Some(r) => VerboseResponse::from_info(step.step_id, r)?,
            None => VerboseResponse {
                status_code: step.status_code,
                headers: &NO_HEADERS,
                body: Value::Null,
            },
        };

        Ok(Self::Success {
            step_id: step.step_id,
            step_name: &step.step_name,
            request,
            response,
        })
    }

    pub fn step_id(&self) -> u16 {
        match self {
            Self::Failure { step_id, .. } | Self::Success { step_id, .. } => *step_id,
        }
    }
}

impl<'a> VerboseRequest<'a> {
    fn from_info(step_id: u16, info: &'a RequestInfo) -> Result<Self> {
        Ok(Self {
            url: &info.url,
            method: &info.method,
            headers: &info.headers,
            body: body_value(step_id, &info.body)?,
        })
    }
}

impl<'a> VerboseResponse<'a> {
    fn from_info(step_id: u16, info: &'a ResponseInfo) -> Result<Self> {
        Ok(Self {
            status_code: info.status_code,
            headers: &info.headers,
            body: body_value(step_id, &info.body)?,
        })
    }
}

/// JSON bodies are embedded as values, other text as a string.
fn body_value(step_id: u16, body: &[u8]) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(v) = serde_json::from_slice::<Value>(body) {
        return Ok(v);
    }

    std::str::from_utf8(body)
        .map(|s| Value::String(s.to_string()))
        .map_err(|_| Error::BodyNotUtf8 { step_id })
}

/// Writes one step observation as a single JSON line.
///
/// The line is encoded in full before anything is written, so a failing sink
/// surfaces as [`Error::Io`] and never leaves a partial record behind.
pub fn encode(step: &ScenarioStepResult, out: &mut dyn Write) -> Result<()> {
    let record = VerboseRecord::from_step(step)?;
    let mut line = serde_json::to_vec(&record)?;
    line.push(b'\n');
    out.write_all(&line)?;
    Ok(())
}
