//! Shared types for the LVP prober.
//!
//! The pair, the per-request outcome, and the durable log record form the
//! data model used by the catalog, the EA client, the recorder, and the loop.

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// HTTP status that selects the success shape of a log record.
pub const OK_STATUS: u16 = 200;

/// Status recorded for a probe that never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// Placeholder written when the EA omits its cache indicator.
pub const CACHE_HIT_UNKNOWN: &str = "unknown";

// ---------------------------------------------------------------------------
// Pair
// ---------------------------------------------------------------------------

/// A (base, quote) symbol pair, e.g. `USD/JPY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pair {
    pub base: String,
    pub quote: String,
}

impl Pair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Liquidity grouping used to choose catalog membership.
///
/// Informational only: the loop treats every pair the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairGroup {
    /// Always-liquid majors, expected to price continuously.
    G10,
    /// Emerging/exotic currencies with local market closures.
    Emerging,
    /// Precious metals.
    Metal,
}

impl fmt::Display for PairGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairGroup::G10 => write!(f, "G10"),
            PairGroup::Emerging => write!(f, "EM"),
            PairGroup::Metal => write!(f, "Metal"),
        }
    }
}

// ---------------------------------------------------------------------------
// Request outcome
// ---------------------------------------------------------------------------

/// Body of an EA response.
///
/// Only a 200 body is decoded; every other status keeps the raw text,
/// including JSON error payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Raw(String),
}

impl ResponseBody {
    /// Text form of the body, as recorded in an ERROR record.
    pub fn to_text(&self) -> String {
        match self {
            ResponseBody::Json(v) => v.to_string(),
            ResponseBody::Raw(s) => s.clone(),
        }
    }
}

/// Any HTTP response the EA produced, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct EaResponse {
    pub status: u16,
    pub body: ResponseBody,
}

/// A probe that produced no usable HTTP response.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// Connection refused, DNS failure, timeout, or a broken body stream.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A 200 response whose body is not JSON.
    #[error("invalid JSON in 200 response")]
    Decode(#[from] serde_json::Error),
}

impl ProbeError {
    /// Status code recorded for this failure.
    pub fn status(&self) -> i32 {
        TRANSPORT_FAILURE_STATUS
    }

    /// The error message followed by its whole source chain.
    pub fn detail(&self) -> String {
        let mut text = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            text.push_str(": ");
            text.push_str(&err.to_string());
            source = err.source();
        }
        text
    }
}

/// Result of a single probe. Transient: only the derived [`LogRecord`]
/// is persisted.
pub type RequestOutcome = Result<EaResponse, ProbeError>;

/// Status code of an outcome, with the transport sentinel for failures.
pub fn outcome_status(outcome: &RequestOutcome) -> i32 {
    match outcome {
        Ok(resp) => i32::from(resp.status),
        Err(e) => e.status(),
    }
}

// ---------------------------------------------------------------------------
// Log record
// ---------------------------------------------------------------------------

/// One line of the session log.
///
/// Serialised by hand so keys keep the requester's order: `status` comes
/// last on OK records and before `error` on ERROR records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogRecord {
    #[serde(deserialize_with = "iso_timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Pair rendered as `BASE/QUOTE`.
    pub pair: String,
    #[serde(flatten)]
    pub result: RecordResult,
}

/// Status-tagged part of a record: `"status": "OK"` or `"status": "ERROR"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status")]
pub enum RecordResult {
    #[serde(rename = "OK")]
    Ok {
        price: Value,
        #[serde(rename = "providerTime")]
        provider_time: Value,
        #[serde(rename = "cacheHit")]
        cache_hit: Value,
    },
    #[serde(rename = "ERROR")]
    Error { error: String },
}

impl LogRecord {
    /// Normalise a probe outcome. Never fails: absent or malformed fields
    /// of a 200 body become `null` (or `"unknown"` for the cache flag).
    pub fn from_outcome(pair: &Pair, outcome: &RequestOutcome, at: DateTime<Utc>) -> Self {
        let result = match outcome {
            Ok(EaResponse {
                status: OK_STATUS,
                body: ResponseBody::Json(body),
            }) => {
                let nested = |section: &str, field: &str| {
                    body.get(section).and_then(|s| s.get(field)).cloned()
                };
                RecordResult::Ok {
                    price: body.get("result").cloned().unwrap_or(Value::Null),
                    provider_time: nested("data", "providerIndicatedTimeUnixMs")
                        .unwrap_or(Value::Null),
                    cache_hit: nested("debug", "cacheHit")
                        .unwrap_or_else(|| Value::String(CACHE_HIT_UNKNOWN.to_string())),
                }
            }
            Ok(resp) => RecordResult::Error {
                error: resp.body.to_text(),
            },
            Err(e) => RecordResult::Error { error: e.detail() },
        };

        Self {
            timestamp: at,
            pair: pair.to_string(),
            result,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.result, RecordResult::Ok { .. })
    }

    /// `"OK"` or `"ERROR"`.
    pub fn status_marker(&self) -> &'static str {
        match self.result {
            RecordResult::Ok { .. } => "OK",
            RecordResult::Error { .. } => "ERROR",
        }
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = match self.result {
            RecordResult::Ok { .. } => 6,
            RecordResult::Error { .. } => 4,
        };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("timestamp", &iso_timestamp::format(&self.timestamp))?;
        map.serialize_entry("pair", &self.pair)?;
        match &self.result {
            RecordResult::Ok { price, provider_time, cache_hit } => {
                map.serialize_entry("price", price)?;
                map.serialize_entry("providerTime", provider_time)?;
                map.serialize_entry("cacheHit", cache_hit)?;
                map.serialize_entry("status", self.status_marker())?;
            }
            RecordResult::Error { error } => {
                map.serialize_entry("status", self.status_marker())?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

/// ISO-8601 UTC with microseconds and no offset suffix,
/// e.g. `2024-01-02T03:04:05.123456`.
///
/// The fraction is always written, including `.000000` on a whole second,
/// where Python's `datetime.isoformat()` drops it. Reading accepts both.
pub mod iso_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const WRITE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";
    const READ_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn format(at: &DateTime<Utc>) -> String {
        at.format(WRITE_FORMAT).to_string()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, READ_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
