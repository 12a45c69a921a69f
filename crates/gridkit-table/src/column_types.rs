//! Per-type strategies for validation, edit seeding, display and editors
//!
//! Every `ColumnType` maps to one `TypeStrategy` through `strategy_for`. The
//! edit session, the grid and the CLI renderer all dispatch through this table
//! instead of branching on the column type themselves.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

use gridkit_core::{CellValue, ColumnDefinition, ColumnType, ValueOption};

static FULL_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"));

static MONTH_DAY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})$").expect("valid regex"));

const DATE_INVALID_MESSAGE: &str = "Invalid date, expected YYYY-MM-DD or MM-DD";
const NUMBER_INVALID_MESSAGE: &str = "Invalid number";

const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// The in-cell editor a column type asks the view for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorKind {
    Text,
    Numeric,
    Date,
    Time,
    Select(Vec<ValueOption>),
    /// Not editable inline (actions)
    None,
}

/// Validator, edit-text seeder, display formatter and editor builder for one type
pub struct TypeStrategy {
    /// Coerce an edit buffer; `today` resolves year-less dates
    pub validate: fn(&str, NaiveDate) -> Result<CellValue, String>,
    /// Seed the edit buffer from the current value
    pub edit_text: fn(&CellValue) -> String,
    /// Render a value for display in a cell
    pub display: fn(&CellValue, &ColumnDefinition) -> String,
    pub editor: fn(&ColumnDefinition) -> EditorKind,
}

impl std::fmt::Debug for TypeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeStrategy").finish_non_exhaustive()
    }
}

static TEXT: TypeStrategy = TypeStrategy {
    validate: accept_raw,
    edit_text: plain_edit_text,
    display: plain_display,
    editor: text_editor,
};

static NUMBER: TypeStrategy = TypeStrategy {
    validate: validate_number,
    edit_text: numeric_edit_text,
    display: number_display,
    editor: numeric_editor,
};

static CURRENCY: TypeStrategy = TypeStrategy {
    validate: validate_number,
    edit_text: numeric_edit_text,
    display: currency_display,
    editor: numeric_editor,
};

static DATE: TypeStrategy = TypeStrategy {
    validate: validate_date,
    edit_text: date_edit_text,
    display: date_display,
    editor: date_editor,
};

static DATETIME: TypeStrategy = TypeStrategy {
    validate: validate_date,
    edit_text: date_edit_text,
    display: datetime_display,
    editor: date_editor,
};

static TIME: TypeStrategy = TypeStrategy {
    validate: accept_raw,
    edit_text: plain_edit_text,
    display: plain_display,
    editor: time_editor,
};

static SINGLE_SELECT: TypeStrategy = TypeStrategy {
    validate: accept_raw,
    edit_text: plain_edit_text,
    display: select_display,
    editor: select_editor,
};

static ACTIONS: TypeStrategy = TypeStrategy {
    validate: accept_raw,
    edit_text: plain_edit_text,
    display: empty_display,
    editor: no_editor,
};

/// Look up the strategy for a column type
pub fn strategy_for(column_type: ColumnType) -> &'static TypeStrategy {
    match column_type {
        ColumnType::String => &TEXT,
        ColumnType::Number | ColumnType::Integer | ColumnType::Float => &NUMBER,
        ColumnType::Currency => &CURRENCY,
        ColumnType::Date => &DATE,
        ColumnType::DateTime => &DATETIME,
        ColumnType::Time => &TIME,
        ColumnType::SingleSelect => &SINGLE_SELECT,
        ColumnType::Actions => &ACTIONS,
    }
}

/// Display text for `value` in `column`
pub fn format_cell(column: &ColumnDefinition, value: &CellValue) -> String {
    (strategy_for(column.column_type).display)(value, column)
}

fn accept_raw(input: &str, _today: NaiveDate) -> Result<CellValue, String> {
    Ok(CellValue::Text(input.to_string()))
}

/// Accepts `YYYY-MM-DD` or `MM-DD` (current year); range-checked only
fn validate_date(input: &str, today: NaiveDate) -> Result<CellValue, String> {
    let input = input.trim();

    let (year, month, day) = if let Some(caps) = FULL_DATE_REGEX.captures(input) {
        (
            parse_component(&caps[1])?,
            parse_component(&caps[2])?,
            parse_component(&caps[3])?,
        )
    } else if let Some(caps) = MONTH_DAY_REGEX.captures(input) {
        (
            today.year() as u32,
            parse_component(&caps[1])?,
            parse_component(&caps[2])?,
        )
    } else {
        return Err(DATE_INVALID_MESSAGE.to_string());
    };

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(DATE_INVALID_MESSAGE.to_string());
    }

    Ok(CellValue::Text(format!("{:04}-{:02}-{:02}", year, month, day)))
}

fn parse_component(digits: &str) -> Result<u32, String> {
    digits
        .parse::<u32>()
        .map_err(|_| DATE_INVALID_MESSAGE.to_string())
}

/// Strips thousands separators; empty input becomes NULL
fn validate_number(input: &str, _today: NaiveDate) -> Result<CellValue, String> {
    let cleaned = input.replace(',', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(CellValue::Null);
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(CellValue::from_f64(value)),
        _ => Err(NUMBER_INVALID_MESSAGE.to_string()),
    }
}

fn plain_edit_text(value: &CellValue) -> String {
    value.display_string().into_owned()
}

fn numeric_edit_text(value: &CellValue) -> String {
    match value {
        CellValue::Integer(_) | CellValue::Float(_) => value.display_string().into_owned(),
        CellValue::Text(_) => match value.as_f64() {
            Some(parsed) => CellValue::from_f64(parsed).display_string().into_owned(),
            None => value.display_string().into_owned(),
        },
        _ => value.display_string().into_owned(),
    }
}

/// Date part only, whatever time component the stored value carries
fn date_edit_text(value: &CellValue) -> String {
    match value {
        CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        CellValue::DateTime(datetime) => datetime.date().format("%Y-%m-%d").to_string(),
        other => {
            let text = other.display_string();
            text.split(['T', ' '])
                .next()
                .unwrap_or_default()
                .to_string()
        }
    }
}

fn plain_display(value: &CellValue, _column: &ColumnDefinition) -> String {
    value.display_string().into_owned()
}

fn empty_display(_value: &CellValue, _column: &ColumnDefinition) -> String {
    String::new()
}

fn number_display(value: &CellValue, _column: &ColumnDefinition) -> String {
    match value {
        CellValue::Null => String::new(),
        other => match other.as_f64() {
            Some(parsed) => group_thousands(parsed, None),
            None => other.display_string().into_owned(),
        },
    }
}

fn currency_display(value: &CellValue, _column: &ColumnDefinition) -> String {
    match value {
        CellValue::Null => String::new(),
        other => match other.as_f64() {
            Some(parsed) => group_thousands(parsed, Some(2)),
            None => other.display_string().into_owned(),
        },
    }
}

fn date_display(value: &CellValue, _column: &ColumnDefinition) -> String {
    date_edit_text(value)
}

fn datetime_display(value: &CellValue, _column: &ColumnDefinition) -> String {
    match value {
        CellValue::DateTime(datetime) => datetime.format("%Y-%m-%d %H:%M").to_string(),
        CellValue::Date(date) => date.format("%Y-%m-%d").to_string(),
        CellValue::Text(text) => DATETIME_INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|datetime| datetime.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| text.clone()),
        other => other.display_string().into_owned(),
    }
}

fn select_display(value: &CellValue, column: &ColumnDefinition) -> String {
    let raw = value.display_string();
    column.option_label(&raw).to_string()
}

fn text_editor(_column: &ColumnDefinition) -> EditorKind {
    EditorKind::Text
}

fn numeric_editor(_column: &ColumnDefinition) -> EditorKind {
    EditorKind::Numeric
}

fn date_editor(_column: &ColumnDefinition) -> EditorKind {
    EditorKind::Date
}

fn time_editor(_column: &ColumnDefinition) -> EditorKind {
    EditorKind::Time
}

fn select_editor(column: &ColumnDefinition) -> EditorKind {
    EditorKind::Select(column.value_options.clone())
}

fn no_editor(_column: &ColumnDefinition) -> EditorKind {
    EditorKind::None
}

/// Format a number with `,` thousands separators
///
/// `decimals` fixes the fractional digits; `None` keeps the shortest
/// representation (integral values print without a fraction).
pub fn group_thousands(value: f64, decimals: Option<usize>) -> String {
    let formatted = match decimals {
        Some(places) => format!("{:.*}", places, value),
        None => CellValue::from_f64(value).display_string().into_owned(),
    };

    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
