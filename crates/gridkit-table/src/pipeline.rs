//! The row transformation pipeline: filter → search → sort → paginate
//!
//! Every stage is a pure function of the previous stage's output. Rows are
//! borrowed from the host collection and never copied or mutated; the result
//! is a window of references plus the pre-slice total.

use std::cmp::{Ordering, Reverse};

use chrono::{NaiveDateTime, NaiveTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use unicase::UniCase;

use gridkit_core::{CellValue, ColumnSet, Row};

use crate::pagination::total_pages;

/// Per-column equality filters; an empty value means "no filter"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    values: IndexMap<String, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter for `field`; an empty value removes it
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let field = field.into();
        let value = value.into();
        if value.is_empty() {
            self.values.shift_remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    /// Builder form of `set`
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// At most one active sort key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: Some(key.into()),
            direction,
        }
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }
}

/// Page request for the final stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-indexed
    pub page: usize,
    pub page_size: usize,
    /// Server-side total; when set the rows are already the requested page
    pub total_override: Option<usize>,
}

impl Pagination {
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page,
            page_size,
            total_override: None,
        }
    }

    pub fn with_total_override(mut self, total: usize) -> Self {
        self.total_override = Some(total);
        self
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput<'a> {
    /// Rows to render, in display order
    pub window: Vec<&'a Row>,
    /// Count before slicing (or the host's override)
    pub total: usize,
    page_size: Option<usize>,
}

impl PipelineOutput<'_> {
    /// `ceil(total / pageSize)`, minimum 1; 1 when unpaginated
    pub fn total_pages(&self) -> usize {
        match self.page_size {
            Some(page_size) => total_pages(self.total, page_size),
            None => 1,
        }
    }

    pub fn ids(&self) -> Vec<gridkit_core::RowId> {
        self.window.iter().map(|row| row.id.clone()).collect()
    }
}

/// Run all four stages
pub fn apply<'a>(
    rows: &'a [Row],
    columns: &ColumnSet,
    filters: &FilterState,
    search_term: &str,
    sort: &SortState,
    pagination: Option<&Pagination>,
) -> PipelineOutput<'a> {
    let filtered = filter_rows(rows.iter().collect(), columns, filters);
    let mut searched = search_rows(filtered, columns, search_term);
    sort_rows(&mut searched, columns, sort);
    paginate(searched, pagination)
}

/// Keep rows whose stringified value equals every active filter exactly
///
/// Only filter columns (filterable ∧ visible) participate; entries for other
/// fields are ignored.
pub fn filter_rows<'a>(
    rows: Vec<&'a Row>,
    columns: &ColumnSet,
    filters: &FilterState,
) -> Vec<&'a Row> {
    let active: Vec<(&str, &str)> = columns
        .filter_columns()
        .filter_map(|column| {
            filters
                .get(&column.field)
                .filter(|value| !value.is_empty())
                .map(|value| (column.field.as_str(), value))
        })
        .collect();

    if active.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            active
                .iter()
                .all(|(field, wanted)| row.cell(field).display_string() == *wanted)
        })
        .collect()
}

/// Keep rows where any search column contains the term (case-insensitive)
pub fn search_rows<'a>(rows: Vec<&'a Row>, columns: &ColumnSet, term: &str) -> Vec<&'a Row> {
    let term = term.to_lowercase();
    let search_fields: Vec<&str> = columns
        .search_columns()
        .map(|column| column.field.as_str())
        .collect();

    if term.is_empty() || search_fields.is_empty() {
        return rows;
    }

    rows.into_iter()
        .filter(|row| {
            search_fields.iter().any(|field| {
                row.cell(field)
                    .display_string()
                    .to_lowercase()
                    .contains(&term)
            })
        })
        .collect()
}

/// Stable sort by the active key; empties last ascending, first descending
pub fn sort_rows(rows: &mut [&Row], columns: &ColumnSet, sort: &SortState) {
    let Some(key) = sort.key.as_deref() else {
        return;
    };
    let column = columns.get(key);

    let key_of = |row: &&Row| -> SortKey {
        match column {
            Some(column) => SortKey::from(&column.value_for(row)),
            None => SortKey::from(row.cell(key).as_ref()),
        }
    };

    // sort_by_cached_key is stable, so Reverse keeps ties in input order
    match sort.direction {
        SortDirection::Ascending => rows.sort_by_cached_key(key_of),
        SortDirection::Descending => rows.sort_by_cached_key(|row| Reverse(key_of(row))),
    }
}

/// Slice the requested page out of the sorted sequence
pub fn paginate<'a>(rows: Vec<&'a Row>, pagination: Option<&Pagination>) -> PipelineOutput<'a> {
    let Some(pagination) = pagination else {
        let total = rows.len();
        return PipelineOutput {
            window: rows,
            total,
            page_size: None,
        };
    };

    let page_size = pagination.page_size.max(1);

    if let Some(total) = pagination.total_override {
        return PipelineOutput {
            window: rows,
            total,
            page_size: Some(page_size),
        };
    }

    let total = rows.len();
    let start = pagination
        .page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(total);
    let end = start.saturating_add(page_size).min(total);

    PipelineOutput {
        window: rows[start..end].to_vec(),
        total,
        page_size: Some(page_size),
    }
}

/// Ascending comparison with empties (NULL or "") after everything else
pub fn compare_for_sort(a: &CellValue, b: &CellValue) -> Ordering {
    SortKey::from(a).cmp(&SortKey::from(b))
}

/// Sort key for one cell
///
/// Kinds never interleave: numbers, then booleans, then dates, then times,
/// then text, then empties. Within a kind values compare natively and text
/// collates.
#[derive(Debug, Clone)]
enum SortKey {
    Number(f64),
    Bool(bool),
    Temporal(NaiveDateTime),
    Time(NaiveTime),
    Text(String),
    Empty,
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => 0,
            Self::Bool(_) => 1,
            Self::Temporal(_) => 2,
            Self::Time(_) => 3,
            Self::Text(_) => 4,
            Self::Empty => 5,
        }
    }
}

impl From<&CellValue> for SortKey {
    fn from(value: &CellValue) -> Self {
        if value.is_empty() {
            return Self::Empty;
        }
        match value {
            CellValue::Integer(v) => Self::Number(*v as f64),
            CellValue::Float(v) => Self::Number(*v),
            CellValue::Bool(v) => Self::Bool(*v),
            CellValue::Date(v) => Self::Temporal(v.and_time(NaiveTime::MIN)),
            CellValue::DateTime(v) => Self::Temporal(*v),
            CellValue::Time(v) => Self::Time(*v),
            other => Self::Text(other.display_string().into_owned()),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Temporal(a), Self::Temporal(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => collate(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey {}

/// Case-insensitive collation; on a case-only difference lowercase sorts first
fn collate(a: &str, b: &str) -> Ordering {
    UniCase::new(a)
        .cmp(&UniCase::new(b))
        .then_with(|| b.cmp(a))
}
