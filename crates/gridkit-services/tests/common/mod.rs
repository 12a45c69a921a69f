//! Common test utilities and mocks

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;

use gridkit_services::{
    AddColumnsOutcome, ColumnConfigRecord, ColumnDefTransport, ColumnSpec, DbColumn,
    DeleteResponse, FailedColumn, SaveConfigRequest, ServiceError, ServiceResult,
};

/// In-memory column-definition service
///
/// Holds a stored configuration and a live table schema. Every call is
/// recorded in `call_log` as `"<operation> <detail>"` for assertions.
pub struct MockTransport {
    pub should_fail: bool,
    pub delete_rejected: bool,
    /// Fields the add call refuses, with their reason
    pub add_failures: Vec<(String, String)>,
    pub record: Arc<Mutex<ColumnConfigRecord>>,
    /// Live table columns in schema order
    pub live_columns: Arc<Mutex<Vec<DbColumn>>>,
    pub saved: Arc<Mutex<Vec<SaveConfigRequest>>>,
    pub call_log: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            delete_rejected: false,
            add_failures: vec![],
            record: Arc::new(Mutex::new(ColumnConfigRecord::default())),
            live_columns: Arc::new(Mutex::new(Vec::new())),
            saved: Arc::new(Mutex::new(Vec::new())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_rejected_delete(mut self) -> Self {
        self.delete_rejected = true;
        self
    }

    pub fn with_record(self, record: ColumnConfigRecord) -> Self {
        *self.record.lock() = record;
        self
    }

    /// Live columns as `(field, db_type)` pairs
    pub fn with_live_columns(self, columns: &[(&str, &str)]) -> Self {
        *self.live_columns.lock() = columns
            .iter()
            .map(|(field, data_type)| DbColumn {
                field: field.to_string(),
                data_type: Some(data_type.to_string()),
            })
            .collect();
        self
    }

    pub fn with_add_failure(mut self, field: impl Into<String>, reason: impl Into<String>) -> Self {
        self.add_failures.push((field.into(), reason.into()));
        self
    }

    pub fn call_log(&self) -> Vec<String> {
        self.call_log.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().len()
    }

    pub fn live_fields(&self) -> Vec<String> {
        self.live_columns.lock().iter().map(|c| c.field.clone()).collect()
    }

    pub fn saved(&self) -> Vec<SaveConfigRequest> {
        self.saved.lock().clone()
    }

    fn record_call(&self, call: String) -> ServiceResult<()> {
        self.call_log.lock().push(call);
        if self.should_fail {
            Err(ServiceError::Network("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ColumnDefTransport for MockTransport {
    async fn fetch_config(&self, page_name: &str, table_name: &str) -> ServiceResult<ColumnConfigRecord> {
        self.record_call(format!("fetch {} {}", page_name, table_name))?;
        Ok(self.record.lock().clone())
    }

    async fn save_config(&self, request: &SaveConfigRequest) -> ServiceResult<()> {
        self.record_call(format!("save {}", request.page_name))?;
        self.saved.lock().push(request.clone());
        Ok(())
    }

    async fn check_columns(&self, table_name: &str, fields: &[String]) -> ServiceResult<IndexMap<String, bool>> {
        self.record_call(format!("check {} {}", table_name, fields.join(",")))?;
        let live = self.live_fields();
        Ok(fields
            .iter()
            .map(|field| (field.clone(), live.contains(field)))
            .collect())
    }

    async fn fetch_all_columns(&self, table_name: &str) -> ServiceResult<Vec<DbColumn>> {
        self.record_call(format!("all {}", table_name))?;
        Ok(self.live_columns.lock().clone())
    }

    async fn add_columns(&self, table_name: &str, specs: &[ColumnSpec]) -> ServiceResult<AddColumnsOutcome> {
        let fields: Vec<&str> = specs.iter().map(|s| s.field.as_str()).collect();
        self.record_call(format!("add {} {}", table_name, fields.join(",")))?;

        let mut outcome = AddColumnsOutcome::default();
        for spec in specs {
            match self.add_failures.iter().find(|(field, _)| *field == spec.field) {
                Some((field, reason)) => outcome
                    .failed_columns
                    .push(FailedColumn::new(field.clone(), reason.clone())),
                None => {
                    self.live_columns.lock().push(DbColumn {
                        field: spec.field.clone(),
                        data_type: Some(spec.column_type.clone()),
                    });
                    outcome.added_columns.push(spec.field.clone());
                }
            }
        }
        Ok(outcome)
    }

    async fn delete_column(&self, table_name: &str, column_name: &str) -> ServiceResult<DeleteResponse> {
        self.record_call(format!("delete {} {}", table_name, column_name))?;
        if self.delete_rejected {
            return Ok(DeleteResponse {
                success: false,
                message: Some("column is referenced by a view".into()),
            });
        }
        self.live_columns.lock().retain(|c| c.field != column_name);
        Ok(DeleteResponse {
            success: true,
            message: None,
        })
    }
}
