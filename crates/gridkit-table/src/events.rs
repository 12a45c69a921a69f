//! Intents the grid raises for its host

use gridkit_core::{FormConfig, Row, RowId};

use crate::selection::SelectionChange;

/// Events emitted by `DataGrid`
#[derive(Clone, Debug, PartialEq)]
pub enum GridEvent {
    /// Single click, delivered once the double-click window has passed
    RowClicked { row_id: RowId },
    RowDoubleClicked { row_id: RowId },
    /// Double-click while record-dialog mode is on
    OpenRecordDialog { row_id: RowId },
    /// Context-menu edit
    EditRecord { row: Row },
    /// Context-menu delete
    DeleteRecord { row: Row },
    AddRecord,
    PageChanged { page: usize, page_size: usize },
    SelectionChanged(SelectionChange),
    /// Form columns or form width changed
    FormConfigChanged(FormConfig),
    InlineEditStarted { row_id: RowId, field: String },
}
