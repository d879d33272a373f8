//! Versioned envelope for everything written to local storage.
//!
//! Stored values look like `{"version": 1, "data": ...}`. Values written
//! before the envelope existed are bare JSON and are treated as version 0.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use crate::errors::CiphertraceError;
use tracing::debug;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

pub fn encode<T: Serialize>(data: &T) -> Result<String, CiphertraceError> {
    Ok(serde_json::to_string(&Envelope { version: SCHEMA_VERSION, data })?)
}

/// Parse, migrate to the current version and deserialize a stored value.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CiphertraceError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| CiphertraceError::Storage(format!("Stored value is not valid JSON: {}", e)))?;

    let (version, data) = split_envelope(value);
    if version > SCHEMA_VERSION {
        return Err(CiphertraceError::Storage(format!(
            "Stored value has schema version {}, newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    let migrated = migrate(version, data);
    serde_json::from_value(migrated)
        .map_err(|e| CiphertraceError::Storage(format!("Stored value has an unexpected shape: {}", e)))
}

fn split_envelope(value: Value) -> (u32, Value) {
    if let Value::Object(mut map) = value {
        let is_envelope = map.len() == 2 && map.contains_key("data")
            && map.get("version").is_some_and(Value::is_u64);
        if is_envelope {
            let version = map.get("version").and_then(Value::as_u64).unwrap_or(0) as u32;
            let data = map.remove("data").unwrap_or(Value::Null);
            return (version, data);
        }
        return (0, Value::Object(map));
    }
    (0, value)
}

/// Bring `data` from `version` up to `SCHEMA_VERSION`, one step at a time.
pub fn migrate(version: u32, mut data: Value) -> Value {
    let mut current = version;
    while current < SCHEMA_VERSION {
        data = match current {
            0 => migrate_v0_to_v1(data),
            _ => data,
        };
        debug!(from = current, to = current + 1, "Migrated stored value");
        current += 1;
    }
    data
}

/// Version 0 sessions used `timestamp` and `results` and carried no source
/// or duration.
fn migrate_v0_to_v1(data: Value) -> Value {
    match data {
        Value::Array(items) => Value::Array(items.into_iter().map(migrate_v0_to_v1).collect()),
        Value::Object(map) => Value::Object(upgrade_session_v0(map)),
        other => other,
    }
}

fn upgrade_session_v0(mut map: Map<String, Value>) -> Map<String, Value> {
    if let Some(ts) = map.remove("timestamp") {
        map.entry("created_at").or_insert(ts);
    }
    if let Some(results) = map.remove("results") {
        map.entry("records").or_insert(results);
    }
    map.entry("duration_ms").or_insert(Value::from(0));
    map.entry("source").or_insert_with(|| serde_json::json!({"kind": "text", "chars": 0}));
    map
}
