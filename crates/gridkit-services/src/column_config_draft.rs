//! Column configuration dialog workflow
//!
//! A `ColumnConfigDraft` is the editable copy of a grid's configuration while
//! the configuration dialog is open. Local edits never touch the network.
//! Live-schema operations go through `ColumnConfigStore` and only advance the
//! draft after the remote call succeeds.
//!
//! Removing a column has two paths:
//!
//! - `remove_local` drops it from the list immediately
//! - `request_delete` on a column confirmed present in the live table hands
//!   back a `DbDeleteConfirmation`; only `confirm_db_delete` with that token
//!   drops the live column, and the list changes after the drop succeeds

use uuid::Uuid;

use gridkit_core::{ColumnDefinition, ColumnSet, FormConfig, GridError};

use crate::column_config_service::{ColumnConfigStore, is_protected};
use crate::error::{ServiceError, ServiceResult};
use crate::view_models::{AddColumnsOutcome, ColumnConfig, ColumnSpec, DbColumnStatus, Presence};

/// Proof that the user confirmed a destructive live-column delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbDeleteConfirmation {
    pub field: String,
    token: Uuid,
}

/// How a delete request was handled
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteRequest {
    /// Not confirmed in the live table; removed from the list only
    RemovedLocally(ColumnDefinition),
    /// Present in the live table; confirm before anything changes
    NeedsConfirmation(DbDeleteConfirmation),
}

#[derive(Debug, Clone)]
pub struct ColumnConfigDraft {
    page_name: String,
    table_name: String,
    config: ColumnConfig,
    db_status: DbColumnStatus,
    pending_delete: Option<DbDeleteConfirmation>,
}

impl ColumnConfigDraft {
    pub fn new(page_name: impl Into<String>, table_name: impl Into<String>, config: ColumnConfig) -> Self {
        Self {
            page_name: page_name.into(),
            table_name: table_name.into(),
            config,
            db_status: DbColumnStatus::new(),
            pending_delete: None,
        }
    }

    pub fn page_name(&self) -> &str {
        &self.page_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn config(&self) -> &ColumnConfig {
        &self.config
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.config.columns
    }

    pub fn form(&self) -> &FormConfig {
        &self.config.form
    }

    pub fn db_status(&self) -> &DbColumnStatus {
        &self.db_status
    }

    pub fn presence(&self, field: &str) -> Presence {
        self.db_status.presence(field)
    }

    pub fn pending_delete(&self) -> Option<&DbDeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    // ============ Local edits ============

    pub fn set_page_title(&mut self, title: impl Into<String>) {
        self.config.page_title = title.into();
    }

    pub fn add_column(&mut self, column: ColumnDefinition) -> ServiceResult<()> {
        self.config.columns.push(column)?;
        Ok(())
    }

    pub fn update_column(&mut self, field: &str, column: ColumnDefinition) -> ServiceResult<()> {
        self.config.columns.replace(field, column)?;
        Ok(())
    }

    pub fn move_column(&mut self, from: usize, to: usize) -> ServiceResult<()> {
        self.config.columns.move_column(from, to)?;
        Ok(())
    }

    pub fn set_filterable(&mut self, field: &str, on: bool) -> ServiceResult<()> {
        self.config.columns.set_filterable(field, on)?;
        Ok(())
    }

    pub fn set_searchable(&mut self, field: &str, on: bool) -> ServiceResult<()> {
        self.config.columns.set_searchable(field, on)?;
        Ok(())
    }

    pub fn set_visible(&mut self, field: &str, on: bool) -> ServiceResult<()> {
        self.config.columns.set_visible(field, on)?;
        Ok(())
    }

    /// Drop a column from the list and the form without touching the live table
    pub fn remove_local(&mut self, field: &str) -> ServiceResult<ColumnDefinition> {
        let removed = self.config.columns.remove(field)?;
        self.config.form.columns.retain(|column| column.field != field);
        if self
            .pending_delete
            .as_ref()
            .is_some_and(|pending| pending.field == field)
        {
            self.pending_delete = None;
        }
        Ok(removed)
    }

    pub fn set_form_columns(&mut self, columns: Vec<ColumnDefinition>) {
        self.config.form.columns = columns;
    }

    pub fn set_form_width(&mut self, width: u32) {
        self.config.form.width = width;
    }

    pub fn set_show_row_number(&mut self, show: bool) {
        self.config.show_row_number = show;
    }

    pub fn set_show_checkbox(&mut self, show: bool) {
        self.config.show_checkbox = show;
    }

    // ============ Live schema ============

    fn data_fields(&self) -> Vec<String> {
        self.config
            .columns
            .columns()
            .iter()
            .filter(|column| !column.is_actions() && !is_protected(&column.field))
            .map(|column| column.field.clone())
            .collect()
    }

    /// Re-check every data column against the live table
    pub async fn refresh_db_status(&mut self, store: &ColumnConfigStore) -> ServiceResult<&DbColumnStatus> {
        let status = store.check_columns(&self.table_name, &self.data_fields()).await?;
        self.db_status.merge(status);
        Ok(&self.db_status)
    }

    /// Columns known to be missing from the live table
    pub fn missing_columns(&self) -> Vec<&ColumnDefinition> {
        self.config
            .columns
            .columns()
            .iter()
            .filter(|column| self.db_status.presence(&column.field) == Presence::Absent)
            .collect()
    }

    /// Create every missing column; added fields become present
    pub async fn add_missing_to_db(&mut self, store: &ColumnConfigStore) -> ServiceResult<AddColumnsOutcome> {
        let specs: Vec<ColumnSpec> = self
            .missing_columns()
            .into_iter()
            .map(ColumnSpec::from)
            .collect();
        if specs.is_empty() {
            return Ok(AddColumnsOutcome::default());
        }

        let outcome = store.add_columns(&self.table_name, specs).await?;
        for field in &outcome.added_columns {
            self.db_status.set(field.clone(), true);
        }
        Ok(outcome)
    }

    /// Append live columns the list does not have; returns the new fields
    pub async fn sync_from_db(&mut self, store: &ColumnConfigStore) -> ServiceResult<Vec<String>> {
        let discovered = store
            .sync_from_db(&self.table_name, &self.config.columns)
            .await?;

        let mut added = Vec::with_capacity(discovered.len());
        for column in discovered {
            self.config.columns.push(column.to_definition())?;
            self.db_status.set(column.field.clone(), true);
            added.push(column.field);
        }
        Ok(added)
    }

    /// Start removing a column, asking for confirmation if it is live
    pub fn request_delete(&mut self, field: &str) -> ServiceResult<DeleteRequest> {
        if !self.config.columns.contains(field) {
            return Err(GridError::UnknownColumn(field.to_string()).into());
        }

        match self.db_status.presence(field) {
            Presence::Present => {
                if is_protected(field) {
                    return Err(ServiceError::ProtectedField(field.to_string()));
                }
                let confirmation = DbDeleteConfirmation {
                    field: field.to_string(),
                    token: Uuid::new_v4(),
                };
                self.pending_delete = Some(confirmation.clone());
                Ok(DeleteRequest::NeedsConfirmation(confirmation))
            }
            Presence::Absent | Presence::Unknown => {
                Ok(DeleteRequest::RemovedLocally(self.remove_local(field)?))
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Drop the live column, then remove it from the list
    ///
    /// On failure the list is unchanged and the confirmation is spent; the
    /// user starts over with `request_delete`.
    pub async fn confirm_db_delete(
        &mut self,
        store: &ColumnConfigStore,
        confirmation: &DbDeleteConfirmation,
    ) -> ServiceResult<ColumnDefinition> {
        match self.pending_delete.take() {
            Some(pending) if &pending == confirmation => {}
            other => {
                self.pending_delete = other;
                return Err(ServiceError::ConfirmationMismatch);
            }
        }

        store
            .delete_column(&self.table_name, &confirmation.field)
            .await?;

        self.db_status.forget(&confirmation.field);
        self.remove_local(&confirmation.field)
    }

    /// Persist the draft; on failure the draft is untouched so the dialog can stay open
    pub async fn save(&self, store: &ColumnConfigStore) -> ServiceResult<ColumnConfig> {
        store
            .save(
                &self.page_name,
                &self.config.page_title,
                &self.config.columns,
                &self.config.form,
            )
            .await?;
        Ok(self.config.clone())
    }
}
