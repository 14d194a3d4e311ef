//! Excel import/export of typed records
//!
//! This module provides bidirectional records ↔ Excel conversion:
//! - Export: records → grid → single-sheet .xlsx package
//! - Import: .xlsx sheet → header + rows → records

mod exporter;
mod importer;

pub use exporter::{assemble, minimal_stylesheet, validate_sheet_name, ExcelExporter, ExportOptions};
pub use importer::{
    cell_text, locate_sheet, read_cell, read_rows, ExcelImporter, ImportOptions, RecordSet, SheetNameMatch,
};
