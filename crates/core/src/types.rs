//! Core data types for the IPO watch system.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Current wall-clock time in milliseconds.
#[inline]
pub fn now_ms() -> TimestampMs {
    Utc::now().timestamp_millis()
}

/// A scalar value as it appeared in the feed.
///
/// Scraped feeds are inconsistent about whether a price is `95` or `"₹95"`,
/// so every raw field keeps whichever scalar it was given.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawScalar {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl RawScalar {
    /// Build a text scalar.
    pub fn text(s: impl Into<String>) -> Self {
        RawScalar::Text(s.into())
    }

    /// Convert a JSON value. Null, arrays and objects are not scalars.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RawScalar::Text(s)),
            Value::Number(n) => n.as_f64().map(RawScalar::Number),
            Value::Bool(b) => Some(RawScalar::Flag(b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Textual form of the scalar.
    ///
    /// Whole numbers render without a fractional part so that an id of `42`
    /// reads as `"42"`, not `"42.0"`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            RawScalar::Text(s) => Cow::Borrowed(s.as_str()),
            RawScalar::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Cow::Owned(format!("{}", *n as i64))
            }
            RawScalar::Number(n) => Cow::Owned(n.to_string()),
            RawScalar::Flag(b) => Cow::Owned(b.to_string()),
        }
    }
}

fn lenient_scalar<'de, D>(deserializer: D) -> std::result::Result<Option<RawScalar>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(RawScalar::from_json))
}

/// An IPO record exactly as received from the feed.
///
/// No schema is enforced: every field is optional and a field holding a
/// non-scalar JSON value is treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIpoRecord {
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub id: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub name: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub company: Option<RawScalar>,
    #[serde(rename = "type", default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub kind: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub issue_start: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub open_date: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub issue_end: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub close_date: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub listing_date: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub issue_price: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub issue_size: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub gmp: Option<RawScalar>,
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<RawScalar>,
    /// Pipe-delimited summary: `"<status> | <size> | <number> | <gain %>"`.
    #[serde(default, deserialize_with = "lenient_scalar", skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawScalar>,
}

/// Normalized IPO record, safe for classification and rendering.
///
/// Every numeric field is either a finite number or `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalIpoRecord {
    /// Unique within one batch.
    pub id: String,
    pub name: String,
    /// Issue type tag ("EQ", "SME", ...).
    #[serde(rename = "type")]
    pub kind: String,
    pub open_date: String,
    pub close_date: String,
    #[serde(default)]
    pub listing_date: String,
    pub issue_price: Option<f64>,
    pub issue_size: Option<f64>,
    /// Grey market premium; the sign carries the sentiment.
    pub gmp: Option<f64>,
    pub estimated_price: Option<f64>,
    pub gain_percentage: Option<f64>,
}

impl CanonicalIpoRecord {
    /// Create a record with only identity fields set.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: "EQ".to_string(),
            open_date: String::new(),
            close_date: String::new(),
            listing_date: String::new(),
            issue_price: None,
            issue_size: None,
            gmp: None,
            estimated_price: None,
            gain_percentage: None,
        }
    }
}

/// Where an offering sits relative to its subscription window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LifecycleStatus {
    /// Window has not opened yet (or dates are unknown).
    Upcoming,
    /// Subscription window is open now.
    Open,
    /// Window has closed.
    Closed,
}

impl LifecycleStatus {
    /// All statuses in tab order.
    pub const ALL: [LifecycleStatus; 3] = [
        LifecycleStatus::Upcoming,
        LifecycleStatus::Open,
        LifecycleStatus::Closed,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            LifecycleStatus::Upcoming => "Upcoming",
            LifecycleStatus::Open => "Open",
            LifecycleStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LifecycleStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Ok(LifecycleStatus::Upcoming),
            "open" => Ok(LifecycleStatus::Open),
            "closed" => Ok(LifecycleStatus::Closed),
            other => Err(crate::Error::data(format!("unknown lifecycle status '{}'", other))),
        }
    }
}
