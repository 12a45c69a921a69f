//! `gridkit columns`: drive the column-definition store from the command line

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::json;

use gridkit_core::{ColumnSet, FormConfig, RawColumn};
use gridkit_services::{ColumnConfig, ColumnConfigStore, ColumnSpec, PROTECTED_FIELDS, Presence};

use crate::cli::ColumnsCommand;
use crate::logging::TimingGuard;
use crate::view::read_columns;

fn read_form_columns(path: &Path) -> Result<Vec<gridkit_core::ColumnDefinition>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form columns from {:?}", path))?;
    let raw: Vec<RawColumn> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse form columns in {:?}", path))?;
    Ok(ColumnSet::from_raw(raw).into_columns())
}

fn optional_columns(path: Option<&Path>) -> Result<ColumnSet> {
    match path {
        Some(path) => read_columns(path),
        None => Ok(ColumnSet::default()),
    }
}

/// Run one `columns` subcommand and return what to print
pub async fn run(
    store: &ColumnConfigStore,
    page_name: &str,
    table_name: &str,
    command: &ColumnsCommand,
) -> Result<String> {
    let _timer = TimingGuard::new("columns");

    match command {
        ColumnsCommand::Load { columns, title } => {
            let defaults = ColumnConfig::new(title.clone(), optional_columns(columns.as_deref())?);
            let config = match store.load_once(page_name, table_name).await {
                Some(record) => defaults.merged(record),
                None => defaults,
            };
            Ok(serde_json::to_string_pretty(&config_json(&config))?)
        }

        ColumnsCommand::Save {
            columns,
            title,
            form_columns,
            form_width,
        } => {
            let columns = read_columns(columns)?;
            let mut form = FormConfig::derive_from(&columns);
            if let Some(path) = form_columns {
                form.columns = read_form_columns(path)?;
            }
            if let Some(width) = form_width {
                form.width = *width;
            }
            store.save(page_name, title, &columns, &form).await?;
            Ok(format!(
                "Saved {} columns and {} form columns for '{}'",
                columns.len(),
                form.columns.len(),
                page_name
            ))
        }

        ColumnsCommand::Check { fields } => {
            let status = store.check_columns(table_name, fields).await?;
            let lines: Vec<String> = fields
                .iter()
                .map(|field| {
                    let state = match status.presence(field) {
                        Presence::Present => "present",
                        Presence::Absent => "missing",
                        Presence::Unknown if PROTECTED_FIELDS.contains(&field.as_str()) => "protected",
                        Presence::Unknown => "unknown",
                    };
                    format!("{}\t{}", field, state)
                })
                .collect();
            Ok(lines.join("\n"))
        }

        ColumnsCommand::Add { specs } => {
            let specs: Vec<ColumnSpec> = specs
                .iter()
                .map(|(field, column_type)| ColumnSpec::new(field.clone(), column_type.clone()))
                .collect();
            let outcome = store.add_columns(table_name, specs).await?;

            let mut lines: Vec<String> = outcome
                .added_columns
                .iter()
                .map(|field| format!("added\t{}", field))
                .collect();
            lines.extend(outcome.failed_columns.iter().map(|failed| {
                format!(
                    "failed\t{}\t{}",
                    failed.field,
                    failed.reason.as_deref().unwrap_or("unknown error")
                )
            }));
            Ok(lines.join("\n"))
        }

        ColumnsCommand::Delete { field, yes } => {
            if !yes {
                bail!(
                    "Deleting '{}' from '{}' drops its data permanently; re-run with --yes to confirm",
                    field,
                    table_name
                );
            }
            store.delete_column(table_name, field).await?;
            Ok(format!("Deleted column '{}' from '{}'", field, table_name))
        }

        ColumnsCommand::Sync { columns } => {
            let current = optional_columns(columns.as_deref())?;
            let discovered = store.sync_from_db(table_name, &current).await?;
            let definitions: Vec<_> = discovered.iter().map(|c| c.to_definition()).collect();
            Ok(serde_json::to_string_pretty(&definitions)?)
        }
    }
}

fn config_json(config: &ColumnConfig) -> serde_json::Value {
    json!({
        "pageTitle": config.page_title,
        "columns": config.columns.columns(),
        "formColumns": config.form.columns,
        "formWidth": config.form.width,
        "showRowNumber": config.show_row_number,
        "showCheckbox": config.show_checkbox,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gridkit_services::{
        AddColumnsOutcome, ColumnConfigRecord, ColumnDefTransport, DbColumn, DeleteResponse,
        SaveConfigRequest, ServiceResult,
    };
    use pretty_assertions::assert_eq;

    /// Live table with `id` and `name`; counts calls
    #[derive(Default)]
    struct FixedTransport {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ColumnDefTransport for FixedTransport {
        async fn fetch_config(&self, _: &str, _: &str) -> ServiceResult<ColumnConfigRecord> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ColumnConfigRecord {
                page_title: Some("People".into()),
                ..Default::default()
            })
        }

        async fn save_config(&self, _: &SaveConfigRequest) -> ServiceResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn check_columns(&self, _: &str, fields: &[String]) -> ServiceResult<indexmap::IndexMap<String, bool>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(fields.iter().map(|f| (f.clone(), f == "name")).collect())
        }

        async fn fetch_all_columns(&self, _: &str) -> ServiceResult<Vec<DbColumn>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                DbColumn { field: "id".into(), data_type: Some("integer".into()) },
                DbColumn { field: "name".into(), data_type: Some("text".into()) },
            ])
        }

        async fn add_columns(&self, _: &str, specs: &[ColumnSpec]) -> ServiceResult<AddColumnsOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AddColumnsOutcome {
                added_columns: specs.iter().map(|s| s.field.clone()).collect(),
                failed_columns: vec![],
            })
        }

        async fn delete_column(&self, _: &str, _: &str) -> ServiceResult<DeleteResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(DeleteResponse { success: true, message: None })
        }
    }

    fn store() -> (Arc<FixedTransport>, ColumnConfigStore) {
        let transport = Arc::new(FixedTransport::default());
        let store = ColumnConfigStore::new(transport.clone() as Arc<dyn ColumnDefTransport>);
        (transport, store)
    }

    #[tokio::test]
    async fn test_load_merges_over_defaults() {
        let (_, store) = store();
        let out = run(
            &store,
            "users",
            "users",
            &ColumnsCommand::Load { columns: None, title: "Users".into() },
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["pageTitle"], json!("People"));
        assert_eq!(value["formWidth"], json!(600));
    }

    #[tokio::test]
    async fn test_check_labels_protected_fields() {
        let (_, store) = store();
        let out = run(
            &store,
            "users",
            "users",
            &ColumnsCommand::Check {
                fields: vec!["id".into(), "name".into(), "email".into()],
            },
        )
        .await
        .unwrap();
        assert_eq!(out, "id\tprotected\nname\tpresent\nemail\tmissing");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (transport, store) = store();
        let command = ColumnsCommand::Delete { field: "name".into(), yes: false };
        assert!(run(&store, "users", "users", &command).await.is_err());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

        let command = ColumnsCommand::Delete { field: "name".into(), yes: true };
        run(&store, "users", "users", &command).await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_sync_lists_new_definitions() {
        let (_, store) = store();
        let out = run(&store, "users", "users", &ColumnsCommand::Sync { columns: None })
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["field"], json!("id"));
        assert_eq!(value[0]["type"], json!("integer"));
        assert_eq!(value[1]["field"], json!("name"));
    }
}
