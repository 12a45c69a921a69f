//! Column configuration persistence and live-schema reconciliation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gridkit_core::{ColumnSet, FormConfig};

use crate::error::{ServiceError, ServiceResult};
use crate::transport::ColumnDefTransport;
use crate::view_models::{
    AddColumnsOutcome, ColumnConfigRecord, ColumnSpec, DbColumn, DbColumnStatus, FailedColumn,
    SaveConfigRequest,
};

/// Fields that can never be dropped from a live table
pub const PROTECTED_FIELDS: &[&str] = &["id", "created_at", "updated_at"];

pub fn is_protected(field: &str) -> bool {
    PROTECTED_FIELDS.contains(&field)
}

/// Service for the column-definition store of one grid mount
///
/// Handles:
/// - best-effort configuration load, at most once per mount
/// - configuration save
/// - existence checks, batch add, delete and full-schema sync against the live table
pub struct ColumnConfigStore {
    transport: Arc<dyn ColumnDefTransport>,
    load_started: AtomicBool,
}

impl ColumnConfigStore {
    pub fn new(transport: Arc<dyn ColumnDefTransport>) -> Self {
        Self {
            transport,
            load_started: AtomicBool::new(false),
        }
    }

    /// Fetch stored configuration; any failure yields `None`
    ///
    /// Callers keep their defaults when this returns `None`.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, page_name: &str, table_name: &str) -> Option<ColumnConfigRecord> {
        match self.transport.fetch_config(page_name, table_name).await {
            Ok(record) => {
                tracing::info!(
                    page_name = %page_name,
                    table_name = %table_name,
                    columns = record.columns.as_ref().map(Vec::len),
                    "Loaded column configuration"
                );
                Some(record)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Column configuration load failed, using defaults");
                None
            }
        }
    }

    /// `load`, but only the first call per mount reaches the service
    pub async fn load_once(&self, page_name: &str, table_name: &str) -> Option<ColumnConfigRecord> {
        if self.load_started.swap(true, Ordering::SeqCst) {
            tracing::debug!(page_name = %page_name, "Column configuration already loaded");
            return None;
        }
        self.load(page_name, table_name).await
    }

    pub fn is_loaded(&self) -> bool {
        self.load_started.load(Ordering::SeqCst)
    }

    /// Persist columns, form columns and form width as one unit
    #[tracing::instrument(skip(self, columns, form))]
    pub async fn save(
        &self,
        page_name: &str,
        page_title: &str,
        columns: &ColumnSet,
        form: &FormConfig,
    ) -> ServiceResult<()> {
        let request = SaveConfigRequest {
            page_name: page_name.to_string(),
            page_title: page_title.to_string(),
            columns: columns.columns().to_vec(),
            form_columns: form.columns.clone(),
            form_width: form.width,
        };

        self.transport.save_config(&request).await.map_err(|e| match e {
            ServiceError::SaveFailed(message) => ServiceError::SaveFailed(message),
            other => ServiceError::SaveFailed(other.to_string()),
        })?;

        tracing::info!(
            page_name = %page_name,
            columns = request.columns.len(),
            form_columns = request.form_columns.len(),
            "Saved column configuration"
        );
        Ok(())
    }

    /// Existence flags for `fields` in the live table
    ///
    /// Protected fields are never sent; their presence stays unknown. A
    /// request made only of protected fields is rejected without a call, and
    /// an empty request makes no call.
    #[tracing::instrument(skip(self, fields), fields(count = fields.len()))]
    pub async fn check_columns(&self, table_name: &str, fields: &[String]) -> ServiceResult<DbColumnStatus> {
        let candidates: Vec<String> = fields
            .iter()
            .filter(|field| !is_protected(field))
            .cloned()
            .collect();

        if candidates.is_empty() {
            if let Some(field) = fields.first() {
                return Err(ServiceError::ProtectedField(field.clone()));
            }
            tracing::debug!("No fields, skipping existence check");
            return Ok(DbColumnStatus::new());
        }

        let flags = self.transport.check_columns(table_name, &candidates).await?;
        tracing::info!(checked = candidates.len(), returned = flags.len(), "Checked live columns");

        // only keep answers for fields we asked about
        Ok(flags
            .into_iter()
            .filter(|(field, _)| candidates.contains(field))
            .collect())
    }

    /// Best-effort batch add; protected fields are reported as failed unsent
    #[tracing::instrument(skip(self, specs), fields(count = specs.len()))]
    pub async fn add_columns(&self, table_name: &str, specs: Vec<ColumnSpec>) -> ServiceResult<AddColumnsOutcome> {
        let (protected, sendable): (Vec<ColumnSpec>, Vec<ColumnSpec>) =
            specs.into_iter().partition(|spec| is_protected(&spec.field));

        let mut outcome = if sendable.is_empty() {
            AddColumnsOutcome::default()
        } else {
            self.transport
                .add_columns(table_name, &sendable)
                .await
                .map_err(|e| ServiceError::SchemaMutationFailed(e.to_string()))?
        };

        outcome.failed_columns.extend(
            protected
                .into_iter()
                .map(|spec| FailedColumn::new(spec.field, "protected field")),
        );

        tracing::info!(
            added = outcome.added_columns.len(),
            failed = outcome.failed_columns.len(),
            "Added live columns"
        );
        Ok(outcome)
    }

    /// Irreversibly drop `field` from the live table
    #[tracing::instrument(skip(self))]
    pub async fn delete_column(&self, table_name: &str, field: &str) -> ServiceResult<()> {
        if is_protected(field) {
            tracing::warn!(field = %field, "Refusing to delete protected column");
            return Err(ServiceError::ProtectedField(field.to_string()));
        }

        let response = self
            .transport
            .delete_column(table_name, field)
            .await
            .map_err(|e| ServiceError::SchemaMutationFailed(e.to_string()))?;

        if !response.success {
            return Err(ServiceError::SchemaMutationFailed(
                response
                    .message
                    .unwrap_or_else(|| format!("could not delete column '{}'", field)),
            ));
        }

        tracing::info!(table_name = %table_name, field = %field, "Deleted live column");
        Ok(())
    }

    /// Live columns that `current` does not have yet, in schema order
    #[tracing::instrument(skip(self, current))]
    pub async fn sync_from_db(&self, table_name: &str, current: &ColumnSet) -> ServiceResult<Vec<DbColumn>> {
        let all = self.transport.fetch_all_columns(table_name).await?;
        let discovered: Vec<DbColumn> = all
            .into_iter()
            .filter(|column| !current.contains(&column.field))
            .collect();

        tracing::info!(
            table_name = %table_name,
            discovered = discovered.len(),
            "Synced columns from database"
        );
        Ok(discovered)
    }
}
