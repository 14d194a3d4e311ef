//! Excel exporter implementation - records → Excel (.xlsx)

use crate::address::cell_reference;
use crate::error::{SheetError, SheetResult};
use crate::package::{
    Border, CellDataType, CellFormat, CellPart, Fill, Font, PatternType, RowPart, Stylesheet,
    WorkbookPackage, WorksheetPart,
};
use crate::projection;
use crate::record::SheetRecord;
use crate::schema::{resolve_export_columns, DEFAULT_SHEET_NAME};
use crate::types::{Cell, CellKind, Grid};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Name of the single sheet written
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

/// Excel exporter for a slice of records
///
/// Writes one sheet: a header row built from the record type's exported
/// columns, then one row per record in slice order.
pub struct ExcelExporter<'a, T: SheetRecord> {
    records: &'a [T],
    options: ExportOptions,
}

impl<'a, T: SheetRecord> ExcelExporter<'a, T> {
    /// Create a new Excel exporter
    pub fn new(records: &'a [T]) -> Self {
        Self {
            records,
            options: ExportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.options.sheet_name = name.into();
        self
    }

    /// Build the package without serializing it
    pub fn to_package(&self) -> SheetResult<WorkbookPackage> {
        let columns = resolve_export_columns(&T::schema());
        let grid = projection::to_grid(self.records, &columns)?;
        debug!(
            sheet = %self.options.sheet_name,
            columns = grid.column_count(),
            rows = grid.row_count(),
            "exporting records"
        );
        assemble(&grid, &self.options.sheet_name)
    }

    /// Export the records to .xlsx bytes
    pub fn export(&self) -> SheetResult<Vec<u8>> {
        self.to_package()?.to_bytes()
    }

    /// Export the records to an .xlsx file
    pub fn export_to_path<P: AsRef<Path>>(&self, output_path: P) -> SheetResult<()> {
        let package = self.to_package()?;
        let file = File::create(output_path.as_ref())?;
        let mut writer = package.save(BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}

//==============================================================================
// Assembly
//==============================================================================

/// Lay a grid out as a single-sheet workbook package
///
/// The header occupies row 1 as text cells; data rows follow from row 2.
pub fn assemble(grid: &Grid, sheet_name: &str) -> SheetResult<WorkbookPackage> {
    validate_sheet_name(sheet_name)?;

    let mut rows = Vec::with_capacity(grid.row_count() + 1);
    rows.push(RowPart {
        index: Some(1),
        cells: grid
            .columns()
            .iter()
            .enumerate()
            .map(|(col, name)| cell_part(&Cell::text(name.as_str()), col, 1))
            .collect(),
    });

    for (offset, row) in grid.rows().iter().enumerate() {
        let row_number = offset as u32 + 2;
        rows.push(RowPart {
            index: Some(row_number),
            cells: row
                .iter()
                .enumerate()
                .map(|(col, cell)| cell_part(cell, col, row_number))
                .collect(),
        });
    }

    let mut package = WorkbookPackage::create_for_write();
    package.add_worksheet(sheet_name, WorksheetPart { rows });
    *package.styles_mut() = minimal_stylesheet();
    Ok(package)
}

fn cell_part(cell: &Cell, col: usize, row: u32) -> CellPart {
    let reference = Some(cell_reference(col as u32, row));
    let data_type = match cell.kind {
        CellKind::Text => CellDataType::String,
        CellKind::Number => CellDataType::Number,
        CellKind::Date => CellDataType::Date,
        CellKind::Empty => {
            return CellPart {
                reference,
                data_type: None,
                value: None,
            }
        }
    };
    CellPart {
        reference,
        data_type: Some(data_type),
        value: Some(cell.raw.clone()),
    }
}

/// Smallest style table spreadsheet applications accept
///
/// One font, the two mandatory fills, one border and two cell formats:
/// the implicit default and one pointing at entry 0 of each table.
pub fn minimal_stylesheet() -> Stylesheet {
    Stylesheet {
        fonts: vec![Font],
        fills: vec![
            Fill {
                pattern: PatternType::None,
            },
            Fill {
                pattern: PatternType::Gray125,
            },
        ],
        borders: vec![Border],
        cell_formats: vec![
            CellFormat::default(),
            CellFormat {
                number_format_id: Some(0),
                font_id: Some(0),
                fill_id: Some(0),
                border_id: Some(0),
            },
        ],
    }
}

/// Reject sheet names spreadsheet applications refuse to open
pub fn validate_sheet_name(name: &str) -> SheetResult<()> {
    let invalid = |reason: String| SheetError::InvalidSheetName {
        name: name.to_string(),
        reason,
    };

    if name.trim().is_empty() {
        return Err(invalid("name is empty".to_string()));
    }
    let len = name.chars().count();
    if len > MAX_SHEET_NAME_LEN {
        return Err(invalid(format!(
            "{} characters, at most {} allowed",
            len, MAX_SHEET_NAME_LEN
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(c)) {
        return Err(invalid(format!("contains '{}'", c)));
    }
    Ok(())
}
