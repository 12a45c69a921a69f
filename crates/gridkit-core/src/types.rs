//! Core value and row types for gridkit

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const TIME_FORMAT: &str = "%H:%M:%S";

/// A single cell value supplied by the host
///
/// Values travel as plain JSON between the host and the engine. Typed date and
/// time variants only appear when a host builds rows programmatically; they
/// serialize back to ISO strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum CellValue {
    /// NULL / missing value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 text
    Text(String),
    /// Calendar date
    Date(NaiveDate),
    /// Date and time without timezone
    DateTime(NaiveDateTime),
    /// Time of day
    Time(NaiveTime),
    /// Nested JSON (arrays and objects)
    Json(serde_json::Value),
}

impl CellValue {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Whether the value counts as "empty" for sorting: NULL or an empty string
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Whether the value is numeric (integer or float)
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Try to get as a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as f64, parsing text that holds a plain number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            CellValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Build a numeric value, collapsing integral floats to `Integer`
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            CellValue::Integer(value as i64)
        } else {
            CellValue::Float(value)
        }
    }

    /// The stringified form used for filter matching, search and change detection
    ///
    /// NULL stringifies to the empty string and integral floats print without a
    /// fractional part, so `Integer(100)` and `Float(100.0)` compare equal.
    pub fn display_string(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed(""),
            CellValue::Text(s) => Cow::Borrowed(s.as_str()),
            CellValue::Bool(v) => Cow::Owned(v.to_string()),
            CellValue::Integer(v) => Cow::Owned(v.to_string()),
            CellValue::Float(v) => Cow::Owned(v.to_string()),
            CellValue::Date(v) => Cow::Owned(v.format(DATE_FORMAT).to_string()),
            CellValue::DateTime(v) => Cow::Owned(v.format(DATETIME_FORMAT).to_string()),
            CellValue::Time(v) => Cow::Owned(v.format(TIME_FORMAT).to_string()),
            CellValue::Json(v) => Cow::Owned(v.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::Json(other),
        }
    }
}

impl From<CellValue> for serde_json::Value {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Bool(b) => serde_json::Value::Bool(b),
            CellValue::Integer(i) => serde_json::Value::from(i),
            CellValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Text(s) => serde_json::Value::String(s),
            CellValue::Date(d) => serde_json::Value::String(d.format(DATE_FORMAT).to_string()),
            CellValue::DateTime(d) => {
                serde_json::Value::String(d.format(DATETIME_FORMAT).to_string())
            }
            CellValue::Time(t) => serde_json::Value::String(t.format(TIME_FORMAT).to_string()),
            CellValue::Json(v) => v,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Integer(value as i64)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Stable row identity supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowId {
    Int(i64),
    Text(String),
}

impl RowId {
    /// The id as a cell value, so `id` can be looked up like any other field
    pub fn to_cell_value(&self) -> CellValue {
        match self {
            RowId::Int(i) => CellValue::Integer(*i),
            RowId::Text(s) => CellValue::Text(s.clone()),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Int(i) => write!(f, "{}", i),
            RowId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId::Int(value)
    }
}

impl From<i32> for RowId {
    fn from(value: i32) -> Self {
        RowId::Int(value as i64)
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId::Text(value.to_string())
    }
}

impl From<String> for RowId {
    fn from(value: String) -> Self {
        RowId::Text(value)
    }
}

/// A host-supplied row: an identifier plus an open field → value mapping
///
/// The engine never mutates rows; edits are proposed to the host, which
/// produces a refreshed collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    #[serde(flatten)]
    pub values: IndexMap<String, CellValue>,
}

impl Row {
    /// Create an empty row with the given id
    pub fn new(id: impl Into<RowId>) -> Self {
        Self {
            id: id.into(),
            values: IndexMap::new(),
        }
    }

    /// Builder: set a field value
    pub fn with(mut self, field: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    /// Get a stored value by field name (the `id` field is not stored here)
    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values.get(field)
    }

    /// Get a value by field name, resolving `id` and treating missing fields as NULL
    pub fn cell(&self, field: &str) -> Cow<'_, CellValue> {
        match self.values.get(field) {
            Some(value) => Cow::Borrowed(value),
            None if field == "id" => Cow::Owned(self.id.to_cell_value()),
            None => Cow::Owned(CellValue::Null),
        }
    }

    /// Field names in insertion order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_string_collapses_integral_floats() {
        assert_eq!(CellValue::Float(100.0).display_string(), "100");
        assert_eq!(CellValue::Float(1.5).display_string(), "1.5");
        assert_eq!(CellValue::Integer(100).display_string(), "100");
        assert_eq!(CellValue::Null.display_string(), "");
        assert_eq!(CellValue::Bool(true).display_string(), "true");
    }

    #[test]
    fn test_from_f64_prefers_integer() {
        assert_eq!(CellValue::from_f64(42.0), CellValue::Integer(42));
        assert_eq!(CellValue::from_f64(4.25), CellValue::Float(4.25));
    }

    #[test]
    fn test_as_f64_strips_commas() {
        assert_eq!(CellValue::from("1,234.5").as_f64(), Some(1234.5));
        assert_eq!(CellValue::from("abc").as_f64(), None);
        assert_eq!(CellValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_row_deserializes_flat_json() {
        let row: Row = serde_json::from_str(r#"{"id": 7, "name": "Alice", "age": 31, "score": 2.5, "note": null}"#)
            .expect("row should parse");

        assert_eq!(row.id, RowId::Int(7));
        assert_eq!(row.get("name"), Some(&CellValue::Text("Alice".into())));
        assert_eq!(row.get("age"), Some(&CellValue::Integer(31)));
        assert_eq!(row.get("score"), Some(&CellValue::Float(2.5)));
        assert_eq!(row.get("note"), Some(&CellValue::Null));
        assert_eq!(row.fields().collect::<Vec<_>>(), vec!["name", "age", "score", "note"]);
    }

    #[test]
    fn test_row_cell_resolves_id_and_missing_fields() {
        let row = Row::new("abc").with("name", "Bob");
        assert_eq!(row.cell("id").into_owned(), CellValue::Text("abc".into()));
        assert_eq!(row.cell("missing").into_owned(), CellValue::Null);
        assert_eq!(row.cell("name").into_owned(), CellValue::Text("Bob".into()));
    }

    #[test]
    fn test_typed_dates_serialize_as_iso_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let json = serde_json::to_value(CellValue::Date(date)).unwrap();
        assert_eq!(json, serde_json::json!("2024-03-05"));
    }
}
