//! Deserialization helpers for recorded run input.
//!
//! Durations accept either a human string (`"250ms"`, `"1s 500ms"`) or a number of
//! fractional seconds. Timestamps are RFC 3339.

use serde::{Deserialize, Deserializer, de::Error as _};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationRepr {
    Secs(f64),
    Text(String),
}

impl DurationRepr {
    fn into_duration<E: serde::de::Error>(self) -> Result<Duration, E> {
        match self {
            Self::Secs(secs) => Duration::try_from_secs_f64(secs)
                .map_err(|err| E::custom(format!("invalid duration {secs}: {err}"))),
            Self::Text(s) => humantime::parse_duration(s.trim())
                .map_err(|err| E::custom(format!("invalid duration '{s}': {err}"))),
        }
    }
}

pub(crate) mod duration {
    use super::*;

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        DurationRepr::deserialize(deserializer)?.into_duration()
    }
}

pub(crate) mod duration_map {
    use super::*;

    pub(crate) fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, DurationRepr>::deserialize(deserializer)?
            .into_iter()
            .map(|(name, repr)| repr.into_duration().map(|d| (name, d)))
            .collect()
    }
}

pub(crate) mod timestamp {
    use super::*;

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_rfc3339_weak(s.trim())
            .map_err(|err| D::Error::custom(format!("invalid timestamp '{s}': {err}")))
    }
}

pub(crate) mod body {
    use super::*;

    /// Strings are taken verbatim; any other JSON value is kept in its encoded form.
    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Null => Ok(Vec::new()),
            serde_json::Value::String(s) => Ok(s.into_bytes()),
            other => serde_json::to_vec(&other).map_err(D::Error::custom),
        }
    }
}
