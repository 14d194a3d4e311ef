//! Sheetmap - declarative record ↔ spreadsheet mapping
//!
//! This library projects collections of typed records onto a single sheet of
//! an .xlsx workbook and reads them back.
//!
//! # Features
//!
//! - Per-type schema: sheet name, column names and column order
//! - Strict export: header row plus one row per record
//! - Best-effort import: a cell that cannot be converted leaves its field at
//!   the default, the rest of the row is still read
//! - Typed cells (Integer, Float, Decimal, Boolean, Date, DateTime, Text)
//! - Shared-string and inline-string cells on import
//!
//! # Example
//!
//! ```no_run
//! use sheetmap::{CellValue, FieldBinding, FieldValue, RecordSchema, SheetError, SheetRecord, SheetResult};
//! use std::io::Cursor;
//!
//! #[derive(Debug, Default)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl SheetRecord for Person {
//!     fn schema() -> RecordSchema {
//!         RecordSchema::new()
//!             .field(FieldBinding::of::<String>("name").with_column_name("Name").with_order(0))
//!             .field(FieldBinding::of::<i32>("age").with_column_name("Age").with_order(1))
//!     }
//!
//!     fn field(&self, key: &str) -> SheetResult<CellValue> {
//!         match key {
//!             "name" => Ok(self.name.to_cell_value()),
//!             "age" => Ok(self.age.to_cell_value()),
//!             _ => Err(SheetError::UnknownField(key.to_string())),
//!         }
//!     }
//!
//!     fn set_field(&mut self, key: &str, value: CellValue) -> SheetResult<()> {
//!         match key {
//!             "name" => self.name = FieldValue::from_cell_value(value)?,
//!             "age" => self.age = FieldValue::from_cell_value(value)?,
//!             _ => return Err(SheetError::UnknownField(key.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let people = vec![Person { name: "A".into(), age: 30 }];
//! let bytes = sheetmap::export(&people, None)?;
//!
//! let back: Vec<Person> = sheetmap::import(Cursor::new(bytes))?;
//! println!("Imported {} records", back.len());
//! # Ok::<(), sheetmap::SheetError>(())
//! ```

pub mod address;
pub mod codec;
pub mod error;
pub mod excel;
pub mod package;
pub mod projection;
pub mod record;
pub mod schema;
pub mod types;

// Re-export commonly used types
pub use error::{ConversionError, SheetError, SheetResult};
pub use excel::{ExcelExporter, ExcelImporter, ExportOptions, ImportOptions, RecordSet, SheetNameMatch};
pub use record::{FieldValue, SheetRecord};
pub use schema::{FieldBinding, RecordSchema};
pub use types::{Cell, CellKind, CellValue, Grid, ValueType};

use std::io::{Read, Seek};

/// Export records to .xlsx bytes on a single sheet (`"Sheet1"` when no name
/// is given)
pub fn export<T: SheetRecord>(records: &[T], sheet_name: Option<&str>) -> SheetResult<Vec<u8>> {
    let exporter = ExcelExporter::new(records);
    match sheet_name {
        Some(name) => exporter.with_sheet_name(name).export(),
        None => exporter.export(),
    }
}

/// Import records from the sheet their schema names
pub fn import<T: SheetRecord>(reader: impl Read + Seek) -> SheetResult<Vec<T>> {
    ExcelImporter::new(reader).import()
}

/// Import several record types from one stream, e.g.
/// `import_tuple::<(Person, Order)>(&mut file)`
///
/// The stream is rewound before each record type is read.
pub fn import_tuple<S: RecordSet>(reader: &mut (impl Read + Seek)) -> SheetResult<S::Output> {
    ExcelImporter::new(reader).import_tuple::<S>()
}
