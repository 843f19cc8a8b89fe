//! Server timestamp codec.
//!
//! The store keeps instants as `{"seconds": i64, "nanoseconds": u32}` objects.
//! Writers may instead place a server-timestamp sentinel in a field; the store
//! replaces it with its own clock at commit. Readers convert the stored
//! objects into RFC 3339 strings so documents deserialize straight into
//! `DateTime<Utc>` fields.
//!
//! Conversion is lenient by contract: a required field that is missing or not
//! a timestamp object becomes the synchronization moment supplied by the
//! caller, never an error.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use qd_core::enums::Collection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Fields;

const SENTINEL_KEY: &str = "__qd_sentinel";
const SERVER_TIMESTAMP: &str = "serverTimestamp";

/// The store's native timestamp representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: u32,
}

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanoseconds: dt.timestamp_subsec_nanos(),
        }
    }

    /// `None` if the pair is outside chrono's representable range.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.seconds, self.nanoseconds).single()
    }

    #[must_use]
    pub fn to_value(self) -> Value {
        serde_json::json!({ "seconds": self.seconds, "nanoseconds": self.nanoseconds })
    }
}

/// Sentinel asking the store to stamp the field with its own clock.
///
/// Not allowed inside arrays; array elements carry client timestamps.
#[must_use]
pub fn server_timestamp() -> Value {
    serde_json::json!({ SENTINEL_KEY: SERVER_TIMESTAMP })
}

#[must_use]
pub fn is_server_timestamp(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|o| o.get(SENTINEL_KEY))
        .and_then(Value::as_str)
        == Some(SERVER_TIMESTAMP)
}

/// Client-side timestamp value for `dt`.
#[must_use]
pub fn timestamp_value(dt: DateTime<Utc>) -> Value {
    Timestamp::from_datetime(dt).to_value()
}

/// Convert a stored value into a date, if it is a native timestamp.
#[must_use]
pub fn convert(value: &Value) -> Option<DateTime<Utc>> {
    let obj = value.as_object()?;
    let seconds = obj.get("seconds")?.as_i64()?;
    let nanoseconds = u32::try_from(obj.get("nanoseconds")?.as_u64()?).ok()?;
    Timestamp {
        seconds,
        nanoseconds,
    }
    .to_datetime()
}

/// Replace every server-timestamp sentinel in `fields` (at any depth outside
/// arrays) with `at`.
pub fn resolve_sentinels(fields: &mut Fields, at: Timestamp) {
    for value in fields.values_mut() {
        if is_server_timestamp(value) {
            *value = at.to_value();
        } else if let Value::Object(nested) = value {
            resolve_sentinels(nested, at);
        }
    }
}

/// Which fields of a document hold timestamps.
///
/// Paths are dot-separated; a segment ending in `[]` walks every element of
/// an array (`replies[].timestamp`). Required fields fall back to the
/// synchronization moment; optional ones become absent when unconvertible.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampFields {
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
}

impl TimestampFields {
    pub const NONE: Self = Self {
        required: &[],
        optional: &[],
    };

    /// Timestamp fields of each collection's documents.
    #[must_use]
    pub const fn for_collection(collection: Collection) -> Self {
        match collection {
            Collection::Tickets => Self {
                required: &["createdAt", "updatedAt", "replies[].timestamp"],
                optional: &[],
            },
            Collection::Categories => Self::NONE,
            Collection::Users => Self {
                required: &["createdAt", "updatedAt"],
                optional: &[],
            },
            Collection::Notifications => Self {
                required: &["createdAt"],
                optional: &[],
            },
            Collection::RoleUpgradeRequests => Self {
                required: &["createdAt"],
                optional: &["processedAt"],
            },
        }
    }
}

/// Rewrite the timestamp fields of `fields` into RFC 3339 strings.
pub fn normalize_timestamps(fields: &mut Fields, layout: &TimestampFields, now: DateTime<Utc>) {
    for path in layout.required {
        let segments: Vec<&str> = path.split('.').collect();
        normalize_path(fields, &segments, now, true);
    }
    for path in layout.optional {
        let segments: Vec<&str> = path.split('.').collect();
        normalize_path(fields, &segments, now, false);
    }
}

fn normalize_path(map: &mut Fields, segments: &[&str], now: DateTime<Utc>, required: bool) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if let Some(array_key) = head.strip_suffix("[]") {
        if let Some(Value::Array(items)) = map.get_mut(array_key) {
            for item in items {
                if let Value::Object(obj) = item {
                    normalize_path(obj, rest, now, required);
                }
            }
        }
        return;
    }

    if rest.is_empty() {
        match (map.get(*head).and_then(convert), required) {
            (Some(dt), _) => {
                map.insert((*head).to_string(), rfc3339(dt));
            }
            (None, true) => {
                map.insert((*head).to_string(), rfc3339(now));
            }
            (None, false) => {
                map.remove(*head);
            }
        }
    } else if let Some(Value::Object(obj)) = map.get_mut(*head) {
        normalize_path(obj, rest, now, required);
    }
}

fn rfc3339(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339_opts(SecondsFormat::Nanos, true))
}
