//! Structured logging for the data-access layer.
//!
//! Every record is one JSON line on stderr:
//! 1. Level filtering via `LOG_LEVEL` (trace → error)
//! 2. Domain filtering via `LOG_DOMAINS` (comma-separated list or "all")
//! 3. Monotonic sequence numbers so interleaved async calls can be ordered
//! 4. Payload fingerprints instead of raw payloads

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ApiError;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Http,      // Dispatcher round trips
    Fallback,  // Synthetic substitution
    Cache,     // Single-flight dataset fetches
    Analytics, // Client-side aggregation
    System,    // Startup, config
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Http => "http",
            Domain::Fallback => "fallback",
            Domain::Cache => "cache",
            Domain::Analytics => "analytics",
            Domain::System => "system",
        }
    }

    pub fn is_enabled(&self) -> bool {
        match std::env::var("LOG_DOMAINS").as_deref() {
            Ok("all") | Err(_) => true,
            Ok(domains) => domains.split(',').any(|d| d.trim() == self.as_str()),
        }
    }
}

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

fn sanitize_fields(mut fields: Map<String, Value>) -> Map<String, Value> {
    let redacted = Value::String("[REDACTED]".to_string());
    for key in ["authorization", "Authorization", "api_key", "cookie"] {
        if fields.contains_key(key) {
            fields.insert(key.to_string(), redacted.clone());
        }
    }
    fields
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if level < Level::from_env() || !domain.is_enabled() {
        return;
    }

    let mut fields = sanitize_fields(fields);
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));

    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(fields));

    eprintln!("{}", Value::Object(entry));
}

// =============================================================================
// Domain helpers
// =============================================================================

/// One dispatcher round trip. `status` is None when the transport failed.
pub fn log_request(method: &str, path: &str, status: Option<u16>, elapsed_ms: f64) {
    let level = match status {
        Some(code) if (200..300).contains(&code) => Level::Debug,
        Some(_) => Level::Info,
        None => Level::Warn,
    };
    log(
        level,
        Domain::Http,
        "request",
        obj(&[
            ("method", v_str(method)),
            ("path", v_str(path)),
            ("status", status.map(|s| json!(s)).unwrap_or(Value::Null)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
}

/// A live call failed in a way that is served from local data instead.
pub fn log_fallback(operation: &str, kind: &str, reason: &str, payload_hash: Option<&str>) {
    log(
        Level::Warn,
        Domain::Fallback,
        "fallback",
        obj(&[
            ("operation", v_str(operation)),
            ("kind", v_str(kind)),
            ("msg", v_str(reason)),
            ("payload_hash", payload_hash.map(v_str).unwrap_or(Value::Null)),
        ]),
    );
}

/// The live call was eligible for a local answer, but producing it failed too.
pub fn log_fallback_failed(operation: &str, live: &ApiError, fallback: &ApiError) {
    log(
        Level::Error,
        Domain::Fallback,
        "fallback_failed",
        obj(&[
            ("operation", v_str(operation)),
            ("live_kind", v_str(live.kind().as_str())),
            ("fallback_kind", v_str(fallback.kind().as_str())),
            ("msg", v_str(&fallback.to_string())),
        ]),
    );
}

pub fn log_single_flight(resource: &str, joined: bool) {
    log(
        Level::Debug,
        Domain::Cache,
        if joined { "single_flight_join" } else { "single_flight_start" },
        obj(&[("resource", v_str(resource))]),
    );
}

pub fn log_aggregate(kind: &str, input_rows: usize, output_rows: usize) {
    log(
        Level::Debug,
        Domain::Analytics,
        "aggregate",
        obj(&[
            ("kind", v_str(kind)),
            ("input_rows", json!(input_rows)),
            ("output_rows", json!(output_rows)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

/// Short stable fingerprint of a serializable payload.
pub fn payload_hash<T: Serialize>(payload: &T) -> String {
    let bytes = serde_json::to_vec(payload).unwrap_or_default();
    let digest = Sha256::digest(&bytes);
    hex::encode(&digest[..8])
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}
