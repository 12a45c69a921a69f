//! Column definitions and normalization
//!
//! Raw column declarations come from host defaults or from the remote
//! column-definition store and may omit any attribute. `normalize` fills in
//! the documented defaults and enforces the column-list invariants:
//!
//! - `field` is unique within a list (later duplicates are dropped)
//! - `filterable` and `searchable` are mutually exclusive per column
//!
//! Normalization never fails and is idempotent.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{GridError, Result};
use crate::types::{CellValue, Row};

/// Column data type, which selects the validation/formatting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Integer,
    Float,
    Currency,
    Date,
    DateTime,
    Time,
    SingleSelect,
    Actions,
}

impl ColumnType {
    /// Wire name used by the column-definition store
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Currency => "currency",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::Time => "time",
            ColumnType::SingleSelect => "singleSelect",
            ColumnType::Actions => "actions",
        }
    }

    /// Parse a wire name. Unknown names fall back to `String`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" | "text" => ColumnType::String,
            "number" => ColumnType::Number,
            "integer" | "int" => ColumnType::Integer,
            "float" | "double" => ColumnType::Float,
            "currency" => ColumnType::Currency,
            "date" => ColumnType::Date,
            "datetime" | "timestamp" => ColumnType::DateTime,
            "time" => ColumnType::Time,
            "singleselect" | "select" => ColumnType::SingleSelect,
            "actions" => ColumnType::Actions,
            other => {
                tracing::warn!(column_type = other, "Unknown column type, treating as string");
                ColumnType::String
            }
        }
    }

    /// number, integer, float and currency share numeric validation
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Number | ColumnType::Integer | ColumnType::Float | ColumnType::Currency
        )
    }

    /// date and datetime share date validation
    pub fn is_date_like(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::DateTime)
    }

    pub fn all() -> &'static [ColumnType] {
        &[
            ColumnType::String,
            ColumnType::Number,
            ColumnType::Integer,
            ColumnType::Float,
            ColumnType::Currency,
            ColumnType::Date,
            ColumnType::DateTime,
            ColumnType::Time,
            ColumnType::SingleSelect,
            ColumnType::Actions,
        ]
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ColumnType {
    fn from(value: String) -> Self {
        ColumnType::from_name(&value)
    }
}

impl From<ColumnType> for String {
    fn from(value: ColumnType) -> Self {
        value.as_str().to_string()
    }
}

/// One choice of a `singleSelect` column
///
/// Accepts either a bare string or `{ "value": .., "label": .. }` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ValueOptionRepr")]
pub struct ValueOption {
    pub value: String,
    pub label: String,
}

impl ValueOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueOptionRepr {
    Plain(String),
    Labeled {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<ValueOptionRepr> for ValueOption {
    fn from(repr: ValueOptionRepr) -> Self {
        match repr {
            ValueOptionRepr::Plain(value) => Self {
                label: value.clone(),
                value,
            },
            ValueOptionRepr::Labeled { value, label } => Self {
                label: label.unwrap_or_else(|| value.clone()),
                value,
            },
        }
    }
}

/// Derivation function used instead of a raw field lookup (sorting and display)
#[derive(Clone)]
pub struct ValueGetter(Arc<dyn Fn(&Row, &CellValue) -> CellValue + Send + Sync>);

impl ValueGetter {
    pub fn new(f: impl Fn(&Row, &CellValue) -> CellValue + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn get(&self, row: &Row, raw: &CellValue) -> CellValue {
        (self.0)(row, raw)
    }
}

impl fmt::Debug for ValueGetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueGetter(..)")
    }
}

impl PartialEq for ValueGetter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A column declaration as supplied by a host or the remote store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawColumn {
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_options: Option<Vec<ValueOption>>,
    #[serde(skip)]
    pub value_getter: Option<ValueGetter>,
}

impl RawColumn {
    /// Create a raw column with only a field name
    pub fn named(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Default::default()
        }
    }
}

/// A fully defaulted column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub field: String,
    pub header_name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub editable: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub searchable: bool,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_field: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_options: Vec<ValueOption>,
    #[serde(skip)]
    pub value_getter: Option<ValueGetter>,
}

impl ColumnDefinition {
    /// Create a column with the documented defaults
    pub fn new(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            header_name: field.clone(),
            field,
            column_type: ColumnType::String,
            editable: false,
            sortable: true,
            filterable: false,
            searchable: false,
            visible: true,
            width: None,
            edit_field: None,
            value_options: Vec::new(),
            value_getter: None,
        }
    }

    /// Builder: set header name
    pub fn header(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }

    /// Builder: set column type
    pub fn column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Builder: mark as inline-editable
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    /// Builder: mark as hidden
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Builder: disable sorting
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Builder: mark as filterable (clears searchable)
    pub fn filterable(mut self) -> Self {
        self.set_filterable(true);
        self
    }

    /// Builder: mark as searchable (clears filterable)
    pub fn searchable(mut self) -> Self {
        self.set_searchable(true);
        self
    }

    /// Builder: set the alternate storage key used for commits
    pub fn edit_field(mut self, edit_field: impl Into<String>) -> Self {
        self.edit_field = Some(edit_field.into());
        self
    }

    /// Builder: set width
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Builder: set choices for a `singleSelect` column
    pub fn value_options(mut self, options: Vec<ValueOption>) -> Self {
        self.value_options = options;
        self
    }

    /// Builder: derive the cell value from the row instead of a raw lookup
    pub fn value_getter(
        mut self,
        f: impl Fn(&Row, &CellValue) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        self.value_getter = Some(ValueGetter::new(f));
        self
    }

    /// Toggle filterable; enabling it clears `searchable` in the same update
    pub fn set_filterable(&mut self, on: bool) {
        self.filterable = on;
        if on {
            self.searchable = false;
        }
    }

    /// Toggle searchable; enabling it clears `filterable` in the same update
    pub fn set_searchable(&mut self, on: bool) {
        self.searchable = on;
        if on {
            self.filterable = false;
        }
    }

    /// The key an inline edit is committed to
    pub fn storage_field(&self) -> &str {
        self.edit_field.as_deref().unwrap_or(&self.field)
    }

    /// The value shown in this column for `row`, honoring the value getter
    pub fn value_for(&self, row: &Row) -> CellValue {
        let raw = row.cell(&self.field);
        match &self.value_getter {
            Some(getter) => getter.get(row, &raw),
            None => raw.into_owned(),
        }
    }

    /// Label of a `singleSelect` choice, falling back to the raw value
    pub fn option_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.value_options
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.as_str())
            .unwrap_or(value)
    }

    pub fn is_actions(&self) -> bool {
        self.column_type == ColumnType::Actions
    }
}

impl From<ColumnDefinition> for RawColumn {
    fn from(column: ColumnDefinition) -> Self {
        Self {
            field: column.field,
            header_name: Some(column.header_name),
            column_type: Some(column.column_type.as_str().to_string()),
            editable: Some(column.editable),
            sortable: Some(column.sortable),
            filterable: Some(column.filterable),
            searchable: Some(column.searchable),
            visible: Some(column.visible),
            width: column.width,
            edit_field: column.edit_field,
            value_options: Some(column.value_options),
            value_getter: column.value_getter,
        }
    }
}

/// Normalize raw column declarations into complete definitions
pub fn normalize<I, C>(raw: I) -> Vec<ColumnDefinition>
where
    I: IntoIterator<Item = C>,
    C: Into<RawColumn>,
{
    normalize_with(raw, |columns| columns)
}

/// Normalize after running `extender` over the raw list
///
/// The extender sees the raw declarations first, e.g. to append a computed
/// actions column, and its output is defaulted like any other input.
pub fn normalize_with<I, C, F>(raw: I, extender: F) -> Vec<ColumnDefinition>
where
    I: IntoIterator<Item = C>,
    C: Into<RawColumn>,
    F: FnOnce(Vec<RawColumn>) -> Vec<RawColumn>,
{
    let raw: Vec<RawColumn> = raw.into_iter().map(Into::into).collect();
    let extended = extender(raw);

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(extended.len());

    for column in extended {
        let field = column.field.trim().to_string();
        if field.is_empty() {
            tracing::warn!("Dropping column declaration without a field");
            continue;
        }
        if !seen.insert(field.clone()) {
            tracing::warn!(field = %field, "Dropping duplicate column declaration");
            continue;
        }
        columns.push(default_column(field, column));
    }

    columns
}

fn default_column(field: String, raw: RawColumn) -> ColumnDefinition {
    let column_type = raw
        .column_type
        .as_deref()
        .map(ColumnType::from_name)
        .unwrap_or_default();
    let is_actions = column_type == ColumnType::Actions;

    let filterable = raw.filterable.unwrap_or(false);
    // filterable wins when a declaration sets both
    let searchable = raw.searchable.unwrap_or(false) && !filterable;

    ColumnDefinition {
        header_name: raw
            .header_name
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| field.clone()),
        column_type,
        editable: raw.editable.unwrap_or(false),
        sortable: raw.sortable.unwrap_or(!is_actions),
        filterable,
        searchable,
        visible: raw.visible.unwrap_or(true),
        width: raw.width,
        edit_field: raw.edit_field.filter(|f| !f.is_empty()),
        value_options: raw.value_options.unwrap_or_default(),
        value_getter: raw.value_getter,
        field,
    }
}

/// A normalized column list with its derived views
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSet {
    columns: Vec<ColumnDefinition>,
}

impl ColumnSet {
    /// Build from already-normalized definitions (re-normalized, which is a no-op)
    pub fn new(columns: Vec<ColumnDefinition>) -> Self {
        Self::from_raw(columns)
    }

    /// Build from raw declarations
    pub fn from_raw<I, C>(raw: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<RawColumn>,
    {
        Self {
            columns: normalize(raw),
        }
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<ColumnDefinition> {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|c| c.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.field == field)
    }

    /// filterable ∧ visible
    pub fn filter_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.filterable && c.visible)
    }

    /// searchable ∧ visible
    pub fn search_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.searchable && c.visible)
    }

    /// visible ∧ ¬filterable
    pub fn display_columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter().filter(|c| c.visible && !c.filterable)
    }

    fn get_mut(&mut self, field: &str) -> Result<&mut ColumnDefinition> {
        self.columns
            .iter_mut()
            .find(|c| c.field == field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))
    }

    pub fn set_filterable(&mut self, field: &str, on: bool) -> Result<()> {
        self.get_mut(field)?.set_filterable(on);
        Ok(())
    }

    pub fn set_searchable(&mut self, field: &str, on: bool) -> Result<()> {
        self.get_mut(field)?.set_searchable(on);
        Ok(())
    }

    pub fn set_visible(&mut self, field: &str, on: bool) -> Result<()> {
        self.get_mut(field)?.visible = on;
        Ok(())
    }

    /// Append a column; the field must not already exist
    pub fn push(&mut self, column: ColumnDefinition) -> Result<()> {
        if self.contains(&column.field) {
            return Err(GridError::DuplicateColumn(column.field));
        }
        let mut normalized = normalize([column]);
        self.columns.append(&mut normalized);
        Ok(())
    }

    /// Replace the definition for `field`, keeping its position
    ///
    /// The replacement may rename the field as long as the new name is unused.
    pub fn replace(&mut self, field: &str, column: ColumnDefinition) -> Result<()> {
        let index = self
            .position(field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))?;
        if column.field != field && self.contains(&column.field) {
            return Err(GridError::DuplicateColumn(column.field));
        }
        let mut normalized = normalize([column]);
        if let Some(column) = normalized.pop() {
            self.columns[index] = column;
        }
        Ok(())
    }

    /// Remove a column, returning it
    pub fn remove(&mut self, field: &str) -> Result<ColumnDefinition> {
        let index = self
            .position(field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))?;
        Ok(self.columns.remove(index))
    }

    /// Move the column at `from` to index `to`
    pub fn move_column(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.columns.len();
        if from >= len {
            return Err(GridError::ColumnIndexOutOfRange(from));
        }
        if to >= len {
            return Err(GridError::ColumnIndexOutOfRange(to));
        }
        let column = self.columns.remove(from);
        self.columns.insert(to, column);
        Ok(())
    }
}

impl From<Vec<ColumnDefinition>> for ColumnSet {
    fn from(columns: Vec<ColumnDefinition>) -> Self {
        Self::new(columns)
    }
}
