//! `DataGrid`: the headless grid a view shell drives
//!
//! The grid owns the normalized columns, the host's current rows, the view
//! state, the selection, the edit session and the click disambiguator. View
//! code calls its intent methods and renders from `view()`; everything the
//! host must act on arrives as a `GridEvent` on the channel returned by
//! `DataGrid::new`.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use gridkit_core::{ColumnDefinition, ColumnSet, FormConfig, GridError, Row, RowId};

use crate::column_types::format_cell;
use crate::debounce::{Click, ClickDisambiguator};
use crate::edit::{BeginEdit, CellEditSession, CellMutator, CommitOutcome, EditError};
use crate::events::GridEvent;
use crate::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS, PaginationState};
use crate::pipeline::{self, PipelineOutput, SortState};
use crate::selection::SelectionModel;
use crate::state::GridState;

/// Default click vs double-click window
pub const DEFAULT_DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub double_click_window: Duration,
    /// Double-click opens the record dialog instead of an inline editor
    pub record_dialog_mode: bool,
    pub show_row_number: bool,
    pub show_checkbox: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            double_click_window: DEFAULT_DOUBLE_CLICK_WINDOW,
            record_dialog_mode: false,
            show_row_number: true,
            show_checkbox: false,
        }
    }
}

pub struct DataGrid {
    id: Uuid,
    columns: ColumnSet,
    rows: Vec<Row>,
    state: GridState,
    selection: SelectionModel,
    edit: CellEditSession,
    clicks: ClickDisambiguator<RowId, GridEvent>,
    form: FormConfig,
    options: GridOptions,
    events: UnboundedSender<GridEvent>,
}

impl DataGrid {
    /// Mount a grid; the receiver yields every event it raises
    pub fn new(columns: ColumnSet, options: GridOptions) -> (Self, UnboundedReceiver<GridEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();

        tracing::debug!(grid_id = %id, columns = columns.len(), "Mounting data grid");

        let grid = Self {
            id,
            form: FormConfig::derive_from(&columns),
            state: GridState::new(options.page_size),
            selection: Default::default(),
            edit: CellEditSession::new(options.record_dialog_mode),
            clicks: ClickDisambiguator::new(options.double_click_window, events.clone()),
            columns,
            rows: Vec::new(),
            options,
            events,
        };
        (grid, receiver)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn pagination(&self) -> &PaginationState {
        &self.state.pagination
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn form_config(&self) -> &FormConfig {
        &self.form
    }

    pub fn edit_session(&self) -> &CellEditSession {
        &self.edit
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    // ============ Data ============

    /// Replace the row collection (after a host refresh)
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.transition(self.state.clone());
    }

    /// Server-side totals: `Some(total)` means rows are already the current page
    pub fn set_total_override(&mut self, total: Option<usize>) {
        let next = self.state.with_total_override(total);
        self.transition(next);
    }

    /// Replace the column list, e.g. after loading stored configuration
    pub fn set_columns(&mut self, columns: ColumnSet) {
        self.columns = columns;
        self.transition(self.state.clone());
    }

    /// The current window, in display order
    pub fn view(&self) -> PipelineOutput<'_> {
        pipeline::apply(
            &self.rows,
            &self.columns,
            &self.state.filters,
            &self.state.search_term,
            &self.state.sort,
            Some(&self.state.page_request()),
        )
    }

    fn window_ids(&self) -> Vec<RowId> {
        self.view().ids()
    }

    /// Display text for one cell
    pub fn display_value(&self, row: &Row, column: &ColumnDefinition) -> String {
        format_cell(column, &column.value_for(row))
    }

    /// Absolute row number for a window position, when the column is shown
    pub fn row_number(&self, index: usize) -> Option<usize> {
        self.options
            .show_row_number
            .then(|| self.state.pagination.row_number(index))
    }

    pub fn set_show_row_number(&mut self, show: bool) {
        self.options.show_row_number = show;
    }

    pub fn set_show_checkbox(&mut self, show: bool) {
        self.options.show_checkbox = show;
    }

    pub fn set_record_dialog_mode(&mut self, enabled: bool) {
        self.options.record_dialog_mode = enabled;
        self.edit.set_record_dialog_mode(enabled);
    }

    // ============ Filter / Search / Sort ============

    pub fn set_filter(&mut self, field: &str, value: &str) {
        let next = self.state.with_filter(field, value);
        self.transition(next);
    }

    pub fn clear_filters(&mut self) {
        let next = self.state.with_filters_cleared();
        self.transition(next);
    }

    pub fn set_search(&mut self, term: &str) {
        let next = self.state.with_search(term);
        self.transition(next);
    }

    /// Header click on a sortable column; unsortable columns are ignored
    pub fn toggle_sort(&mut self, field: &str) -> Result<(), GridError> {
        let column = self
            .columns
            .get(field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))?;
        if !column.sortable {
            return Ok(());
        }
        let next = self.state.with_sort_toggled(field);
        self.transition(next);
        Ok(())
    }

    pub fn set_sort(&mut self, sort: SortState) {
        let next = self.state.with_sort(sort);
        self.transition(next);
    }

    /// Toggle filterable on a column; enabling clears its searchable flag
    pub fn set_column_filterable(&mut self, field: &str, on: bool) -> Result<(), GridError> {
        self.columns.set_filterable(field, on)?;
        self.transition(self.state.clone());
        Ok(())
    }

    /// Toggle searchable on a column; enabling clears its filterable flag
    pub fn set_column_searchable(&mut self, field: &str, on: bool) -> Result<(), GridError> {
        self.columns.set_searchable(field, on)?;
        self.transition(self.state.clone());
        Ok(())
    }

    // ============ Pagination ============

    pub fn go_to_page(&mut self, page: usize) {
        let next = self.state.with_page(page);
        self.transition(next);
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.state.pagination.page.saturating_add(1));
    }

    pub fn prev_page(&mut self) {
        self.go_to_page(self.state.pagination.page.saturating_sub(1));
    }

    pub fn first_page(&mut self) {
        self.go_to_page(1);
    }

    pub fn last_page(&mut self) {
        self.go_to_page(self.state.pagination.total_pages());
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        if page_size == self.state.pagination.page_size {
            return;
        }
        let next = self.state.with_page_size(page_size);
        self.transition(next);
    }

    /// Store the next state with its total brought up to date
    ///
    /// Emits `PageChanged` when the page or page size moved, so hosts that
    /// page server-side can fetch.
    fn transition(&mut self, next: GridState) {
        let (next, _) = next.evaluate(&self.rows, &self.columns);
        let before = self.state.pagination;
        self.state = next;

        let after = self.state.pagination;
        if before.page != after.page || before.page_size != after.page_size {
            tracing::debug!(grid_id = %self.id, page = after.page, page_size = after.page_size, "Page changed");
            self.emit(GridEvent::PageChanged {
                page: after.page,
                page_size: after.page_size,
            });
        }
    }

    // ============ Clicks / Editing ============

    fn find_row(&self, row_id: &RowId) -> Result<&Row, GridError> {
        self.rows
            .iter()
            .find(|row| &row.id == row_id)
            .ok_or_else(|| GridError::UnknownRow(row_id.to_string()))
    }

    /// A click on a cell
    ///
    /// The row-click intent is held back for the double-click window. A second
    /// click on the same row inside the window becomes a double-click and
    /// returns how the edit request was handled.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, since the held-back
    /// intent is delivered by a spawned timer.
    pub fn cell_click(&mut self, row_id: &RowId, field: &str) -> Result<Option<BeginEdit>, GridError> {
        self.find_row(row_id)?;
        let intent = GridEvent::RowClicked {
            row_id: row_id.clone(),
        };
        match self.clicks.click(row_id.clone(), intent) {
            Click::Single => Ok(None),
            Click::Double => self.open_cell(row_id, field).map(Some),
        }
    }

    /// A native double-click event on a cell
    pub fn cell_double_click(&mut self, row_id: &RowId, field: &str) -> Result<BeginEdit, GridError> {
        self.clicks.double_click();
        self.open_cell(row_id, field)
    }

    fn open_cell(&mut self, row_id: &RowId, field: &str) -> Result<BeginEdit, GridError> {
        let row = self.find_row(row_id)?.clone();
        let column = self
            .columns
            .get(field)
            .ok_or_else(|| GridError::UnknownColumn(field.to_string()))?
            .clone();

        self.emit(GridEvent::RowDoubleClicked {
            row_id: row_id.clone(),
        });

        let begin = self.edit.begin(&row, &column);
        match &begin {
            BeginEdit::RecordDialog(row_id) => self.emit(GridEvent::OpenRecordDialog {
                row_id: row_id.clone(),
            }),
            BeginEdit::Started { .. } => self.emit(GridEvent::InlineEditStarted {
                row_id: row_id.clone(),
                field: field.to_string(),
            }),
            BeginEdit::NotEditable => {}
        }
        Ok(begin)
    }

    pub fn set_edit_buffer(&mut self, text: &str) -> Result<(), EditError> {
        self.edit.set_buffer(text)
    }

    /// Escape
    pub fn cancel_edit(&mut self) -> bool {
        self.edit.cancel()
    }

    /// Enter or blur; the host refreshes rows after a successful commit
    pub async fn commit_edit(&mut self, mutator: &dyn CellMutator) -> Result<CommitOutcome, EditError> {
        self.edit.commit(mutator).await
    }

    // ============ Record intents ============

    pub fn context_edit(&mut self, row_id: &RowId) -> Result<(), GridError> {
        let row = self.find_row(row_id)?.clone();
        self.emit(GridEvent::EditRecord { row });
        Ok(())
    }

    pub fn context_delete(&mut self, row_id: &RowId) -> Result<(), GridError> {
        let row = self.find_row(row_id)?.clone();
        self.emit(GridEvent::DeleteRecord { row });
        Ok(())
    }

    pub fn add_record(&mut self) {
        self.emit(GridEvent::AddRecord);
    }

    // ============ Selection ============

    pub fn toggle_row_selected(&mut self, row_id: RowId, checked: bool) {
        self.selection.toggle(row_id, checked);
        self.emit_selection();
    }

    /// Select-all control: applies to the current page only
    pub fn select_all_visible(&mut self, checked: bool) {
        let window = self.window_ids();
        self.selection.select_all_visible(&window, checked);
        self.emit_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.emit_selection();
    }

    pub fn all_visible_selected(&self) -> bool {
        self.selection.all_visible_selected(&self.window_ids())
    }

    pub fn some_visible_selected(&self) -> bool {
        self.selection.some_visible_selected(&self.window_ids())
    }

    fn emit_selection(&self) {
        let change = self.selection.change(&self.rows);
        self.emit(GridEvent::SelectionChanged(change));
    }

    // ============ Form configuration ============

    pub fn set_form_columns(&mut self, columns: Vec<ColumnDefinition>) {
        if self.form.columns == columns {
            return;
        }
        self.form.columns = columns;
        self.emit(GridEvent::FormConfigChanged(self.form.clone()));
    }

    pub fn set_form_width(&mut self, width: u32) {
        if self.form.width == width {
            return;
        }
        self.form.width = width;
        self.emit(GridEvent::FormConfigChanged(self.form.clone()));
    }

    fn emit(&self, event: GridEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(grid_id = %self.id, "Grid event dropped, no receiver");
        }
    }
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("id", &self.id)
            .field("columns", &self.columns.len())
            .field("rows", &self.rows.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
