//! Record-entry form configuration

use serde::{Deserialize, Serialize};

use crate::column::{ColumnDefinition, ColumnSet};

/// Default width of the record-entry dialog, in pixels
pub const DEFAULT_FORM_WIDTH: u32 = 600;

/// Field list and width of the record add/edit dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormConfig {
    pub columns: Vec<ColumnDefinition>,
    pub width: u32,
}

impl FormConfig {
    pub fn new(columns: Vec<ColumnDefinition>, width: u32) -> Self {
        Self { columns, width }
    }

    /// Default form: every editable, non-actions grid column
    pub fn derive_from(columns: &ColumnSet) -> Self {
        Self {
            columns: columns
                .columns()
                .iter()
                .filter(|c| c.editable && !c.is_actions())
                .cloned()
                .collect(),
            width: DEFAULT_FORM_WIDTH,
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            width: DEFAULT_FORM_WIDTH,
        }
    }
}
