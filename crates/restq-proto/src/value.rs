//! Runtime value types and kind-aware literal coercion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Semantic category of a schema field.
///
/// The kind decides how a textual literal is coerced before comparison and
/// whether the field takes part in free-text search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// UTF-8 text. Literals are taken verbatim.
    Text,
    /// Integer or floating point number.
    Number,
    /// `true` / `false`.
    Boolean,
    /// Point in time, stored as microseconds since the Unix epoch.
    Temporal,
    /// Record identifier (integer, UUID or opaque string).
    Identifier,
    /// Anything else, including collection-valued fields.
    Other,
}

impl FieldKind {
    /// Check if the kind is eligible for free-text search.
    pub fn is_text(&self) -> bool {
        matches!(self, FieldKind::Text)
    }

    /// Lowercase name used in diagnostics and schema listings.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Temporal => "temporal",
            FieldKind::Identifier => "identifier",
            FieldKind::Other => "other",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime value read from a record or coerced from a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit floating point.
    Float64(f64),
    /// UTF-8 string.
    String(String),
    /// Timestamp as microseconds since Unix epoch (UTC).
    Timestamp(i64),
    /// UUID as 16 bytes.
    Uuid([u8; 16]),
    /// Collection-valued field.
    List(Vec<Value>),
}

impl Value {
    /// Coerce a textual literal into the native representation of `kind`.
    ///
    /// Returns `None` when the literal cannot be read as that kind.
    pub fn from_literal(kind: FieldKind, literal: &str) -> Option<Value> {
        match kind {
            FieldKind::Text => Some(Value::String(literal.to_string())),
            FieldKind::Number => parse_number(literal),
            FieldKind::Boolean => {
                if literal.eq_ignore_ascii_case("true") {
                    Some(Value::Bool(true))
                } else if literal.eq_ignore_ascii_case("false") {
                    Some(Value::Bool(false))
                } else {
                    None
                }
            }
            FieldKind::Temporal => parse_timestamp(literal).map(Value::Timestamp),
            FieldKind::Identifier => {
                if let Ok(i) = literal.parse::<i64>() {
                    Some(Value::Int64(i))
                } else if let Some(u) = parse_uuid(literal) {
                    Some(Value::Uuid(u))
                } else {
                    Some(Value::String(literal.to_string()))
                }
            }
            FieldKind::Other => None,
        }
    }

    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as f64, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(f) => Some(*f),
            Value::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as timestamp.
    pub fn as_timestamp(&self) -> Option<i64> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Try to get as UUID.
    pub fn as_uuid(&self) -> Option<&[u8; 16]> {
        match self {
            Value::Uuid(u) => Some(u),
            _ => None,
        }
    }
}

fn parse_number(literal: &str) -> Option<Value> {
    if let Ok(i) = literal.parse::<i64>() {
        return Some(Value::Int64(i));
    }
    match literal.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(Value::Float64(f)),
        _ => None,
    }
}

/// Parse a temporal literal into microseconds since the Unix epoch.
///
/// Accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM:SS[.fff]` (read as UTC),
/// a bare `YYYY-MM-DD` (midnight UTC) or an integer count of microseconds.
pub fn parse_timestamp(literal: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
        return Some(dt.timestamp_micros());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_micros());
    }
    if let Ok(date) = NaiveDate::parse_from_str(literal, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp_micros());
    }
    literal.parse::<i64>().ok()
}

/// Render a timestamp as RFC 3339 in UTC.
pub fn format_timestamp(micros: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Parse a 32-digit hex or hyphenated 36-character UUID.
pub fn parse_uuid(literal: &str) -> Option<[u8; 16]> {
    if literal.len() != 32 && literal.len() != 36 {
        return None;
    }
    Uuid::parse_str(literal).ok().map(|u| *u.as_bytes())
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float64(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Timestamp(t) => match format_timestamp(*t) {
                Some(text) => serializer.serialize_str(&text),
                None => serializer.serialize_i64(*t),
            },
            Value::Uuid(u) => serializer.collect_str(&Uuid::from_bytes(*u).hyphenated()),
            Value::List(items) => serializer.collect_seq(items),
        }
    }
}

// Conversion implementations
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int64(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<[u8; 16]> for Value {
    fn from(v: [u8; 16]) -> Self {
        Value::Uuid(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(*v.as_bytes())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v.timestamp_micros())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v.into_iter().map(Value::String).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
