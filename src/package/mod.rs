//! Spreadsheet container: a ZIP archive of XML parts
//!
//! Opens an existing document for reading ([`SpreadsheetDocument`]) or
//! collects parts for a new one ([`WorkbookPackage`]). Only the parts needed
//! for flat tabular data are modeled: workbook, worksheets, shared strings
//! and styles.

mod parts;
mod reader;
mod writer;

pub use parts::{
    Border, CellDataType, CellFormat, CellPart, Fill, Font, PatternType, RowPart, SheetEntry,
    Stylesheet, WorkbookPart, WorksheetPart,
};
pub use reader::SpreadsheetDocument;
pub use writer::WorkbookPackage;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
