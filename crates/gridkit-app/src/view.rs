//! `gridkit view`: run rows from a file through a grid and render one page

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

use gridkit_core::{ColumnSet, RawColumn, Row};
use gridkit_table::{DataGrid, GridEvent, GridOptions};

use crate::cli::ViewArgs;
use crate::logging::TimingGuard;

pub fn read_rows(path: &Path) -> Result<Vec<Row>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rows from {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse rows in {:?}", path))
}

pub fn read_columns(path: &Path) -> Result<ColumnSet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read columns from {:?}", path))?;
    let raw: Vec<RawColumn> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse columns in {:?}", path))?;
    Ok(ColumnSet::from_raw(raw))
}

/// Mount a grid over `rows` and apply the requested view state
pub fn build_grid(columns: ColumnSet, rows: Vec<Row>, args: &ViewArgs, options: GridOptions) -> DataGrid {
    let (mut grid, mut events) = DataGrid::new(columns, options);
    grid.set_rows(rows);

    if let Some(page_size) = args.page_size {
        grid.set_page_size(page_size);
    }
    grid.set_total_override(args.total);

    for (field, value) in &args.filters {
        if !grid.columns().filter_columns().any(|c| &c.field == field) {
            tracing::warn!(field = %field, "Filter on a column that is not filterable is ignored");
        }
        grid.set_filter(field, value);
    }
    if let Some(term) = &args.search {
        grid.set_search(term);
    }
    if let Some(sort) = &args.sort {
        grid.set_sort(sort.clone());
    }
    grid.go_to_page(args.page);

    while let Ok(event) = events.try_recv() {
        if let GridEvent::PageChanged { page, page_size } = event {
            tracing::debug!(grid_id = %grid.id(), page, page_size, "Page requested");
        }
    }
    grid
}

/// Plain-text table of the current window followed by the pager status
pub fn render_text(grid: &DataGrid) -> String {
    let columns: Vec<_> = grid
        .columns()
        .display_columns()
        .filter(|c| !c.is_actions())
        .collect();
    let view = grid.view();
    let show_numbers = grid.options().show_row_number;

    let mut table: Vec<Vec<String>> = Vec::with_capacity(view.window.len() + 1);
    let mut header = Vec::new();
    if show_numbers {
        header.push("#".to_string());
    }
    header.extend(columns.iter().map(|c| c.header_name.clone()));
    table.push(header);

    for (index, row) in view.window.iter().enumerate() {
        let mut line = Vec::new();
        if let Some(number) = grid.row_number(index) {
            line.push(number.to_string());
        }
        line.extend(columns.iter().map(|c| grid.display_value(row, c)));
        table.push(line);
    }

    let widths: Vec<usize> = (0..table[0].len())
        .map(|i| table.iter().map(|line| line[i].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in &table {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }

    let pagination = grid.pagination();
    out.push('\n');
    out.push_str(&format!(
        "{} (page {} of {})",
        pagination.status_text(),
        pagination.page,
        pagination.total_pages()
    ));
    out.push('\n');
    out
}

/// The current window as display strings keyed by field
pub fn render_json(grid: &DataGrid) -> serde_json::Value {
    let view = grid.view();
    let rows: Vec<serde_json::Value> = view
        .window
        .iter()
        .map(|row| {
            let mut cells = serde_json::Map::new();
            cells.insert("id".to_string(), json!(row.id));
            for column in grid.columns().display_columns().filter(|c| !c.is_actions()) {
                cells.insert(column.field.clone(), json!(grid.display_value(row, column)));
            }
            serde_json::Value::Object(cells)
        })
        .collect();

    json!({
        "rows": rows,
        "pagination": grid.pagination(),
        "totalPages": view.total_pages(),
        "status": grid.pagination().status_text(),
    })
}

pub fn run(args: &ViewArgs, options: GridOptions) -> Result<String> {
    let _timer = TimingGuard::new("view");
    let columns = read_columns(&args.columns)?;
    let rows = read_rows(&args.rows)?;
    tracing::info!(rows = rows.len(), columns = columns.len(), "Loaded grid input");

    let grid = build_grid(columns, rows, args, options);
    if args.json {
        Ok(serde_json::to_string_pretty(&render_json(&grid))?)
    } else {
        Ok(render_text(&grid))
    }
}
