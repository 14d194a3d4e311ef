//! Excel importer implementation - Excel (.xlsx) → records

use crate::codec::resolve_shared_string;
use crate::error::SheetResult;
use crate::package::{CellDataType, CellPart, SheetEntry, SpreadsheetDocument, WorkbookPart, WorksheetPart};
use crate::projection;
use crate::record::SheetRecord;
use crate::schema::{resolve_sheet_name, ImportLookup};
use crate::types::{Cell, CellKind};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// How a requested sheet name is compared with the workbook's sheet names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetNameMatch {
    Exact,
    /// Surrounding whitespace is ignored on both sides
    #[default]
    Trimmed,
}

impl SheetNameMatch {
    pub fn matches(self, candidate: &str, wanted: &str) -> bool {
        match self {
            SheetNameMatch::Exact => candidate == wanted,
            SheetNameMatch::Trimmed => candidate.trim() == wanted.trim(),
        }
    }
}

/// Import settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Sheet to read instead of the one the record schema names
    pub sheet_name: Option<String>,
    pub sheet_name_match: SheetNameMatch,
}

/// Excel importer reading records out of an .xlsx stream
///
/// Every import rewinds the stream first, so one importer can read several
/// record types from the same document.
pub struct ExcelImporter<R: Read + Seek> {
    reader: R,
    options: ImportOptions,
}

impl ExcelImporter<BufReader<File>> {
    /// Open an .xlsx file for import
    pub fn open<P: AsRef<Path>>(path: P) -> SheetResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read + Seek> ExcelImporter<R> {
    /// Create a new Excel importer
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            options: ImportOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.options.sheet_name = Some(name.into());
        self
    }

    pub fn with_sheet_name_match(mut self, policy: SheetNameMatch) -> Self {
        self.options.sheet_name_match = policy;
        self
    }

    /// Import every data row of the record type's sheet
    ///
    /// A missing workbook, sheet or worksheet part yields an empty result.
    pub fn import<T: SheetRecord>(&mut self) -> SheetResult<Vec<T>> {
        let sheet_name = match &self.options.sheet_name {
            Some(name) => name.clone(),
            None => resolve_sheet_name(&T::schema()),
        };
        self.import_sheet(&sheet_name)
    }

    /// Import several record types, each from the sheet its schema names
    ///
    /// The sheet-name override in [`ImportOptions`] is not applied here.
    pub fn import_tuple<S: RecordSet>(&mut self) -> SheetResult<S::Output> {
        S::import_from(self)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn import_sheet<T: SheetRecord>(&mut self, sheet_name: &str) -> SheetResult<Vec<T>> {
        self.reader.seek(SeekFrom::Start(0))?;
        let mut document = SpreadsheetDocument::open_for_read(&mut self.reader)?;

        let Some(workbook) = document.workbook() else {
            debug!("document has no workbook, nothing to import");
            return Ok(Vec::new());
        };
        let Some(entry) = locate_sheet(workbook, sheet_name, self.options.sheet_name_match).cloned()
        else {
            debug!(sheet = %sheet_name, "sheet not found, nothing to import");
            return Ok(Vec::new());
        };
        let Some(worksheet) = document.worksheet(&entry)? else {
            debug!(sheet = %entry.name, "sheet has no worksheet part, nothing to import");
            return Ok(Vec::new());
        };

        let (header, rows) = read_rows(&worksheet, document.shared_strings());
        if header.is_empty() || rows.is_empty() {
            debug!(sheet = %entry.name, columns = header.len(), rows = rows.len(), "sheet has no header or no data rows");
            return Ok(Vec::new());
        }

        let lookup = ImportLookup::from_schema(&T::schema());
        let records = projection::from_grid(&header, &rows, &lookup)?;
        debug!(sheet = %entry.name, records = records.len(), "imported records");
        Ok(records)
    }
}

//==============================================================================
// Tuple imports
//==============================================================================

/// A group of record types read from one document
///
/// Implemented for tuples of two to five [`SheetRecord`] types; the output
/// is the matching tuple of `Vec`s.
pub trait RecordSet {
    type Output;

    fn import_from<R: Read + Seek>(importer: &mut ExcelImporter<R>) -> SheetResult<Self::Output>;
}

macro_rules! impl_record_set {
    ($($name:ident),+) => {
        impl<$($name: SheetRecord),+> RecordSet for ($($name,)+) {
            type Output = ($(Vec<$name>,)+);

            fn import_from<R: Read + Seek>(
                importer: &mut ExcelImporter<R>,
            ) -> SheetResult<Self::Output> {
                Ok(($(
                    importer.import_sheet::<$name>(&resolve_sheet_name(&$name::schema()))?,
                )+))
            }
        }
    };
}

impl_record_set!(A, B);
impl_record_set!(A, B, C);
impl_record_set!(A, B, C, D);
impl_record_set!(A, B, C, D, E);

//==============================================================================
// Sheet reading
//==============================================================================

/// Find a sheet entry by name under the given match policy
pub fn locate_sheet<'a>(
    workbook: &'a WorkbookPart,
    name: &str,
    policy: SheetNameMatch,
) -> Option<&'a SheetEntry> {
    workbook
        .sheets
        .iter()
        .find(|sheet| policy.matches(&sheet.name, name))
}

/// Split a worksheet into its header names and data rows
///
/// The first row is the header whatever it contains. Cells are taken in
/// document order; their addresses are not consulted.
pub fn read_rows(
    worksheet: &WorksheetPart,
    shared_strings: &[String],
) -> (Vec<String>, Vec<Vec<Cell>>) {
    let mut rows = worksheet.rows.iter();
    let header = rows
        .next()
        .map(|row| row.cells.iter().map(|cell| cell_text(cell, shared_strings)).collect())
        .unwrap_or_default();
    let data = rows
        .map(|row| row.cells.iter().map(|cell| read_cell(cell, shared_strings)).collect())
        .collect();
    (header, data)
}

/// A worksheet cell as the codec sees it
///
/// Untyped and `t="n"` cells are numbers; every string type, booleans and
/// errors are text.
pub fn read_cell(cell: &CellPart, shared_strings: &[String]) -> Cell {
    let text = cell_text(cell, shared_strings);
    let kind = match cell.data_type {
        _ if text.is_empty() => CellKind::Empty,
        None | Some(CellDataType::Number) => CellKind::Number,
        Some(CellDataType::Date) => CellKind::Date,
        Some(_) => CellKind::Text,
    };
    Cell::new(kind, text)
}

/// Text content of a cell, with shared strings resolved
pub fn cell_text(cell: &CellPart, shared_strings: &[String]) -> String {
    let raw = cell.value.as_deref().unwrap_or("");
    match cell.data_type {
        Some(CellDataType::SharedString) => resolve_shared_string(raw, shared_strings),
        _ => raw.to_string(),
    }
}
