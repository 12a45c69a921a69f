//! Inline cell editing
//!
//! `CellEditSession` holds at most one active edit. Opening a new edit drops
//! the previous buffer without committing it. A commit validates the buffer
//! through the column type's strategy, skips the host call when the coerced
//! value stringifies the same as the original, and otherwise awaits the host
//! mutation before returning to `Idle`.

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use thiserror::Error;

use gridkit_core::{CellValue, ColumnDefinition, ColumnType, Row, RowId};

use crate::column_types::{EditorKind, strategy_for};
use crate::validation::ValidationError;

/// Host-supplied persistence for committed cell edits
#[async_trait]
pub trait CellMutator: Send + Sync {
    /// Write `value` to `field` of the row identified by `row_id`
    async fn update_cell(&self, row_id: &RowId, field: &str, value: CellValue) -> anyhow::Result<()>;
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No cell is being edited")]
    NoActiveEdit,

    #[error("Failed to save cell: {0}")]
    Mutation(#[source] anyhow::Error),
}

/// The one in-flight edit
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit {
    pub row_id: RowId,
    pub field: String,
    /// `editField` if the column has one, else `field`
    pub storage_field: String,
    pub column_type: ColumnType,
    /// Value at the storage field when the edit began
    pub original: CellValue,
    pub buffer: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Idle,
    Editing(ActiveEdit),
}

/// What a double-click on a cell turned into
#[derive(Debug, Clone, PartialEq)]
pub enum BeginEdit {
    Started { buffer: String, editor: EditorKind },
    /// Record-dialog mode is on; the host opens its dialog for this row
    RecordDialog(RowId),
    NotEditable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The host accepted the new value
    Committed {
        row_id: RowId,
        field: String,
        value: CellValue,
    },
    /// The coerced value matched the original; no host call was made
    Unchanged,
}

#[derive(Debug, Default)]
pub struct CellEditSession {
    state: EditState,
    record_dialog_mode: bool,
}

impl CellEditSession {
    pub fn new(record_dialog_mode: bool) -> Self {
        Self {
            state: EditState::Idle,
            record_dialog_mode,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        match &self.state {
            EditState::Editing(edit) => Some(edit),
            EditState::Idle => None,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.active().is_some()
    }

    /// Whether `row_id`/`field` is the cell under edit
    pub fn is_editing_cell(&self, row_id: &RowId, field: &str) -> bool {
        self.active()
            .is_some_and(|edit| &edit.row_id == row_id && edit.field == field)
    }

    pub fn record_dialog_mode(&self) -> bool {
        self.record_dialog_mode
    }

    pub fn set_record_dialog_mode(&mut self, enabled: bool) {
        self.record_dialog_mode = enabled;
        if enabled {
            self.cancel();
        }
    }

    /// Open an edit on `column` of `row`
    pub fn begin(&mut self, row: &Row, column: &ColumnDefinition) -> BeginEdit {
        if self.record_dialog_mode {
            return BeginEdit::RecordDialog(row.id.clone());
        }
        if !column.editable || column.is_actions() {
            return BeginEdit::NotEditable;
        }

        if let EditState::Editing(previous) = &self.state {
            tracing::debug!(
                row_id = %previous.row_id,
                field = %previous.field,
                "Discarding uncommitted edit"
            );
        }

        let strategy = strategy_for(column.column_type);
        let buffer = (strategy.edit_text)(&column.value_for(row));
        let storage_field = column.storage_field().to_string();

        self.state = EditState::Editing(ActiveEdit {
            row_id: row.id.clone(),
            field: column.field.clone(),
            original: row.cell(&storage_field).into_owned(),
            storage_field,
            column_type: column.column_type,
            buffer: buffer.clone(),
        });

        BeginEdit::Started {
            buffer,
            editor: (strategy.editor)(column),
        }
    }

    /// Replace the edit buffer with the editor's current text
    pub fn set_buffer(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        match &mut self.state {
            EditState::Editing(edit) => {
                edit.buffer = text.into();
                Ok(())
            }
            EditState::Idle => Err(EditError::NoActiveEdit),
        }
    }

    /// Escape: drop the buffer; returns whether an edit was open
    pub fn cancel(&mut self) -> bool {
        matches!(std::mem::take(&mut self.state), EditState::Editing(_))
    }

    /// Enter or blur
    pub async fn commit(&mut self, mutator: &dyn CellMutator) -> Result<CommitOutcome, EditError> {
        self.commit_at(mutator, Local::now().date_naive()).await
    }

    /// Commit, resolving year-less dates against `today`
    ///
    /// A validation failure leaves the session editing so the user can fix
    /// the buffer. Any other outcome, including a failed mutation, ends it.
    pub async fn commit_at(
        &mut self,
        mutator: &dyn CellMutator,
        today: NaiveDate,
    ) -> Result<CommitOutcome, EditError> {
        let EditState::Editing(edit) = &self.state else {
            return Err(EditError::NoActiveEdit);
        };

        let strategy = strategy_for(edit.column_type);
        let value = (strategy.validate)(&edit.buffer, today)
            .map_err(|message| ValidationError::new(edit.field.clone(), message))?;

        if value.display_string() == edit.original.display_string() {
            tracing::debug!(
                row_id = %edit.row_id,
                field = %edit.storage_field,
                "Edit unchanged, skipping update"
            );
            self.state = EditState::Idle;
            return Ok(CommitOutcome::Unchanged);
        }

        let row_id = edit.row_id.clone();
        let field = edit.storage_field.clone();

        // stays Editing until the host answers
        let result = mutator.update_cell(&row_id, &field, value.clone()).await;
        self.state = EditState::Idle;

        match result {
            Ok(()) => {
                tracing::info!(row_id = %row_id, field = %field, "Cell updated");
                Ok(CommitOutcome::Committed { row_id, field, value })
            }
            Err(e) => {
                tracing::warn!(row_id = %row_id, field = %field, error = %e, "Cell update failed");
                Err(EditError::Mutation(e))
            }
        }
    }
}
