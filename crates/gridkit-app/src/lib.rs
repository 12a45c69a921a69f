//! gridkit - command-line host for the data grid engine
//!
//! - `view` renders one page of a JSON row file through the grid pipeline
//! - `columns` drives the remote column-definition store

pub mod cli;
pub mod columns;
pub mod logging;
pub mod view;

use gridkit_settings::GridSettings;
use gridkit_table::GridOptions;

/// Grid options from the persisted grid defaults
pub fn grid_options(settings: &GridSettings) -> GridOptions {
    GridOptions {
        page_size: settings.grid.default_page_size,
        page_size_options: settings.grid.page_size_options.clone(),
        double_click_window: settings.grid.double_click_window(),
        record_dialog_mode: settings.grid.record_dialog_mode,
        show_row_number: settings.grid.show_row_number,
        show_checkbox: settings.grid.show_checkbox,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_grid_options_follow_settings() {
        let mut settings = GridSettings::default();
        settings.grid.default_page_size = 50;
        settings.grid.double_click_window_ms = 300;
        settings.grid.show_row_number = false;

        let options = grid_options(&settings);
        assert_eq!(options.page_size, 50);
        assert_eq!(options.double_click_window, Duration::from_millis(300));
        assert!(!options.show_row_number);
        assert_eq!(options.page_size_options, vec![10, 20, 50, 100]);
    }
}
