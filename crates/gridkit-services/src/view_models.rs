//! View models and wire types for the column-definition service

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use gridkit_core::{ColumnDefinition, ColumnSet, ColumnType, FormConfig, RawColumn};

/// Stored configuration for a `(page_name, table_name)` pair
///
/// Every attribute is optional; absence means "keep the caller's default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfigRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<RawColumn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_columns: Option<Vec<RawColumn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_row_number: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_checkbox: Option<bool>,
}

/// Resolved grid configuration: caller defaults overlaid with stored values
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnConfig {
    pub page_title: String,
    pub columns: ColumnSet,
    pub form: FormConfig,
    pub show_row_number: bool,
    pub show_checkbox: bool,
}

impl ColumnConfig {
    /// Defaults for a page: form derived from the columns
    pub fn new(page_title: impl Into<String>, columns: ColumnSet) -> Self {
        Self {
            page_title: page_title.into(),
            form: FormConfig::derive_from(&columns),
            columns,
            show_row_number: true,
            show_checkbox: false,
        }
    }

    /// Overlay a stored record
    ///
    /// When the record replaces the grid columns but carries no form columns,
    /// the form is derived again from the new columns.
    pub fn merged(self, record: ColumnConfigRecord) -> Self {
        let columns_replaced = record.columns.is_some();
        let columns = record
            .columns
            .map(ColumnSet::from_raw)
            .unwrap_or(self.columns);

        let form_columns = match record.form_columns {
            Some(raw) => ColumnSet::from_raw(raw).into_columns(),
            None if columns_replaced => FormConfig::derive_from(&columns).columns,
            None => self.form.columns,
        };

        Self {
            page_title: record.page_title.unwrap_or(self.page_title),
            form: FormConfig::new(form_columns, record.form_width.unwrap_or(self.form.width)),
            columns,
            show_row_number: record.show_row_number.unwrap_or(self.show_row_number),
            show_checkbox: record.show_checkbox.unwrap_or(self.show_checkbox),
        }
    }
}

/// Body of the save call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveConfigRequest {
    pub page_name: String,
    pub page_title: String,
    pub columns: Vec<ColumnDefinition>,
    pub form_columns: Vec<ColumnDefinition>,
    pub form_width: u32,
}

/// Whether a field exists in the live table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
    /// Not checked, or the check did not return a result
    Unknown,
}

/// field → existence flag, as of the last check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbColumnStatus {
    flags: IndexMap<String, bool>,
}

impl DbColumnStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presence(&self, field: &str) -> Presence {
        match self.flags.get(field) {
            Some(true) => Presence::Present,
            Some(false) => Presence::Absent,
            None => Presence::Unknown,
        }
    }

    pub fn set(&mut self, field: impl Into<String>, exists: bool) {
        self.flags.insert(field.into(), exists);
    }

    pub fn forget(&mut self, field: &str) {
        self.flags.shift_remove(field);
    }

    /// Fold in a newer check; fields it did not cover keep their old flag
    pub fn merge(&mut self, other: DbColumnStatus) {
        self.flags.extend(other.flags);
    }

    pub fn absent_fields(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, exists)| !**exists)
            .map(|(field, _)| field.as_str())
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<(String, bool)> for DbColumnStatus {
    fn from_iter<T: IntoIterator<Item = (String, bool)>>(iter: T) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

/// A column to create in the live table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            column_type: column_type.into(),
        }
    }
}

impl From<&ColumnDefinition> for ColumnSpec {
    fn from(column: &ColumnDefinition) -> Self {
        Self::new(column.field.clone(), column.column_type.as_str())
    }
}

/// A column reported by the full-schema fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DbColumnRepr")]
pub struct DbColumn {
    pub field: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DbColumnRepr {
    Name(String),
    Described {
        #[serde(alias = "name", alias = "column_name")]
        field: String,
        #[serde(default, rename = "type", alias = "data_type")]
        data_type: Option<String>,
    },
}

impl From<DbColumnRepr> for DbColumn {
    fn from(repr: DbColumnRepr) -> Self {
        match repr {
            DbColumnRepr::Name(field) => Self {
                field,
                data_type: None,
            },
            DbColumnRepr::Described { field, data_type } => Self { field, data_type },
        }
    }
}

impl DbColumn {
    /// A default column definition for a newly discovered field
    pub fn to_definition(&self) -> ColumnDefinition {
        let column_type = self
            .data_type
            .as_deref()
            .map(infer_column_type)
            .unwrap_or_default();
        ColumnDefinition::new(self.field.clone()).column_type(column_type)
    }
}

/// A column the add call could not create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FailedColumnRepr")]
pub struct FailedColumn {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FailedColumn {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: Some(reason.into()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FailedColumnRepr {
    Name(String),
    Described {
        field: String,
        #[serde(default, alias = "error", alias = "message")]
        reason: Option<String>,
    },
}

impl From<FailedColumnRepr> for FailedColumn {
    fn from(repr: FailedColumnRepr) -> Self {
        match repr {
            FailedColumnRepr::Name(field) => Self { field, reason: None },
            FailedColumnRepr::Described { field, reason } => Self { field, reason },
        }
    }
}

/// Partial-success result of a batch add; inspect both lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddColumnsOutcome {
    pub added_columns: Vec<String>,
    pub failed_columns: Vec<FailedColumn>,
}

impl AddColumnsOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed_columns.is_empty()
    }
}

/// Response of the delete call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Grid column type for a database type name
pub fn infer_column_type(db_type: &str) -> ColumnType {
    let lower = db_type.trim().to_lowercase();
    let base = lower.split('(').next().unwrap_or_default().trim();

    match base {
        "int" | "integer" | "smallint" | "bigint" | "tinyint" | "mediumint" | "serial"
        | "bigserial" | "smallserial" | "int2" | "int4" | "int8" => ColumnType::Integer,
        "real" | "float" | "float4" | "float8" | "double" | "double precision" => ColumnType::Float,
        "decimal" | "numeric" | "number" => ColumnType::Number,
        "money" => ColumnType::Currency,
        "date" => ColumnType::Date,
        "time" | "timetz" | "time without time zone" | "time with time zone" => ColumnType::Time,
        "enum" => ColumnType::SingleSelect,
        other if other.starts_with("timestamp") || other.starts_with("datetime") => {
            ColumnType::DateTime
        }
        _ => ColumnType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_parses_partial_payload() {
        let record: ColumnConfigRecord = serde_json::from_value(serde_json::json!({
            "page_title": "Customers",
            "columns": [{"field": "name", "headerName": "Name", "editable": true}],
            "form_width": 720
        }))
        .unwrap();

        assert_eq!(record.page_title.as_deref(), Some("Customers"));
        assert_eq!(record.form_width, Some(720));
        assert!(record.form_columns.is_none());
        assert!(record.show_checkbox.is_none());
    }

    #[test]
    fn test_merged_keeps_defaults_for_missing_attributes() {
        let defaults = ColumnConfig::new(
            "Default",
            ColumnSet::new(vec![
                ColumnDefinition::new("id"),
                ColumnDefinition::new("email").editable(),
            ]),
        );
        let merged = defaults.clone().merged(ColumnConfigRecord {
            show_checkbox: Some(true),
            ..Default::default()
        });

        assert_eq!(merged.page_title, "Default");
        assert_eq!(merged.columns, defaults.columns);
        assert_eq!(merged.form, defaults.form);
        assert!(merged.show_checkbox);
        assert!(merged.show_row_number);
    }

    #[test]
    fn test_merged_rederives_form_for_new_columns() {
        let defaults = ColumnConfig::new("T", ColumnSet::new(vec![ColumnDefinition::new("a").editable()]));
        let merged = defaults.merged(ColumnConfigRecord {
            columns: Some(vec![RawColumn {
                field: "b".into(),
                editable: Some(true),
                ..Default::default()
            }]),
            ..Default::default()
        });

        assert_eq!(merged.form.columns.len(), 1);
        assert_eq!(merged.form.columns[0].field, "b");
    }

    #[test]
    fn test_presence_distinguishes_unknown() {
        let mut status: DbColumnStatus = [("a".to_string(), true), ("b".to_string(), false)]
            .into_iter()
            .collect();
        assert_eq!(status.presence("a"), Presence::Present);
        assert_eq!(status.presence("b"), Presence::Absent);
        assert_eq!(status.presence("c"), Presence::Unknown);

        status.merge([("b".to_string(), true)].into_iter().collect());
        assert_eq!(status.presence("b"), Presence::Present);
        assert_eq!(status.absent_fields().count(), 0);
    }

    #[test]
    fn test_wire_shapes() {
        let outcome: AddColumnsOutcome = serde_json::from_value(serde_json::json!({
            "addedColumns": ["a"],
            "failedColumns": ["b", {"field": "c", "error": "bad type"}]
        }))
        .unwrap();
        assert_eq!(outcome.added_columns, vec!["a"]);
        assert_eq!(outcome.failed_columns[0], FailedColumn { field: "b".into(), reason: None });
        assert_eq!(outcome.failed_columns[1], FailedColumn::new("c", "bad type"));

        let columns: Vec<DbColumn> = serde_json::from_value(serde_json::json!([
            "plain",
            {"name": "born", "data_type": "date"},
            {"field": "amount", "type": "numeric(10,2)"}
        ]))
        .unwrap();
        assert_eq!(columns[0].to_definition().column_type, ColumnType::String);
        assert_eq!(columns[1].to_definition().column_type, ColumnType::Date);
        assert_eq!(columns[2].to_definition().column_type, ColumnType::Number);

        let spec = serde_json::to_value(ColumnSpec::new("x", "integer")).unwrap();
        assert_eq!(spec, serde_json::json!({"field": "x", "type": "integer"}));
    }

    #[test]
    fn test_infer_column_type() {
        assert_eq!(infer_column_type("BIGINT"), ColumnType::Integer);
        assert_eq!(infer_column_type("varchar(255)"), ColumnType::String);
        assert_eq!(infer_column_type("timestamp with time zone"), ColumnType::DateTime);
        assert_eq!(infer_column_type("double precision"), ColumnType::Float);
        assert_eq!(infer_column_type("money"), ColumnType::Currency);
        assert_eq!(infer_column_type("boolean"), ColumnType::String);
    }
}
