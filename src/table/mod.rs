pub mod arrow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use arrow::to_record_batch;

/// Semantic classification of a column, assigned once by the type
/// normalizer and fixed for the table's lifetime. Governs how the imputer
/// treats gaps in that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Categorical,
    Boolean,
    Timestamp,
}

/// Raw cell storage for one column. `Float` vs `Int` mirrors the loader's
/// widening rule: a numeric column with any gap or fractional literal is
/// stored as `Float`, an all-integer fully-populated one as `Int`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Float(Vec<Option<f64>>),
    Int(Vec<Option<i64>>),
    Bool(Vec<Option<bool>>),
    Text(Vec<Option<String>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Text(v) => v.len(),
            ColumnData::Date(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short storage-kind name for error messages and logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnData::Float(_) => "float",
            ColumnData::Int(_) => "int",
            ColumnData::Bool(_) => "bool",
            ColumnData::Text(_) => "text",
            ColumnData::Date(_) => "date",
        }
    }

    /// Number of missing cells in this column.
    pub fn missing_count(&self) -> usize {
        match self {
            ColumnData::Float(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Int(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Bool(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Text(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnData::Date(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }
}

/// One named column of the incident table.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
    /// Assigned by the type normalizer; `None` until that stage has run.
    pub semantic: Option<SemanticType>,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
            semantic: None,
        }
    }

    /// Distinct labels of a categorical column, sorted, gaps skipped.
    /// Integer-backed categoricals (e.g. derived `year`) format their
    /// values as labels. Empty for non-categorical storage.
    pub fn distinct_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = match &self.data {
            ColumnData::Text(cells) => cells.iter().flatten().cloned().collect(),
            ColumnData::Int(cells) => cells.iter().flatten().map(|v| v.to_string()).collect(),
            _ => Vec::new(),
        };
        labels.sort();
        labels.dedup();
        labels
    }
}

/// The in-memory dataset of recorded incidents: an ordered collection of
/// equal-length columns. Built once by the loader, mutated in place by the
/// pipeline stages, then held read-only for the rendering layer.
#[derive(Debug, Default)]
pub struct IncidentTable {
    columns: Vec<Column>,
}

impl IncidentTable {
    pub fn new(columns: Vec<Column>) -> Self {
        if let Some(first) = columns.first() {
            let rows = first.data.len();
            for col in &columns {
                assert_eq!(
                    col.data.len(),
                    rows,
                    "column `{}` row count mismatch",
                    col.name
                );
            }
        }
        Self { columns }
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Append a column, or replace the data of an existing one with the
    /// same name. Derived columns are added this way, never removed.
    pub fn upsert_column(&mut self, column: Column) {
        if !self.columns.is_empty() {
            assert_eq!(
                column.data.len(),
                self.num_rows(),
                "column `{}` row count mismatch",
                column.name
            );
        }
        match self.columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => self.columns.push(column),
        }
    }
}
