use crate::error::{SheetError, SheetResult};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

//==============================================================================
// Field values
//==============================================================================

/// Declared target type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    Float,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Text,
}

impl ValueType {
    /// Whether values of this type are written as numeric cells
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Float | ValueType::Decimal)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Integer => "Integer",
            ValueType::Float => "Float",
            ValueType::Decimal => "Decimal",
            ValueType::Boolean => "Boolean",
            ValueType::Date => "Date",
            ValueType::DateTime => "DateTime",
            ValueType::Text => "Text",
        };
        f.write_str(name)
    }
}

/// A typed scalar exchanged between records and cells
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Absent value (written as an empty cell)
    Null,
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    /// Calendar date, written as midnight UTC
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "Null",
            CellValue::Int(_) => "Integer",
            CellValue::Float(_) => "Float",
            CellValue::Decimal(_) => "Decimal",
            CellValue::Bool(_) => "Boolean",
            CellValue::Date(_) => "Date",
            CellValue::DateTime(_) => "DateTime",
            CellValue::Text(_) => "Text",
        }
    }
}

//==============================================================================
// Grid
//==============================================================================

/// Primitive representation of a cell in the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Text,
    Number,
    /// ISO-8601 text, never a serial number
    Date,
    Empty,
}

/// One encoded cell. The address is assigned from its grid position when
/// the sheet is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    pub raw: String,
}

impl Cell {
    pub fn new(kind: CellKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Self::new(CellKind::Text, raw)
    }

    pub fn empty() -> Self {
        Self::new(CellKind::Empty, String::new())
    }

    pub fn is_empty(&self) -> bool {
        self.kind == CellKind::Empty
    }
}

/// Rectangular header + rows representation bridging records and sheets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row; it must have exactly one cell per column
    pub fn push_row(&mut self, row: Vec<Cell>) -> SheetResult<()> {
        if row.len() != self.columns.len() {
            return Err(SheetError::RaggedRow {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Raw text of every data row
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.raw.clone()).collect())
            .collect()
    }
}
