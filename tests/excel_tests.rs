//! Excel export/import tests through the public API

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sheetmap::excel::{assemble, locate_sheet, read_rows};
use sheetmap::package::SpreadsheetDocument;
use sheetmap::types::{Cell, CellKind, Grid};
use sheetmap::{
    CellValue, ExcelExporter, ExcelImporter, FieldBinding, FieldValue, RecordSchema, SheetError,
    SheetNameMatch, SheetRecord, SheetResult,
};
use std::io::Cursor;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// RECORD TYPES
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default, Clone, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

impl Person {
    fn new(name: &str, age: i32) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}

impl SheetRecord for Person {
    fn schema() -> RecordSchema {
        RecordSchema::new()
            .field(FieldBinding::of::<String>("name").with_column_name("Name").with_order(0))
            .field(FieldBinding::of::<i32>("age").with_column_name("Age").with_order(1))
    }

    fn field(&self, key: &str) -> SheetResult<CellValue> {
        match key {
            "name" => Ok(self.name.to_cell_value()),
            "age" => Ok(self.age.to_cell_value()),
            _ => Err(SheetError::UnknownField(key.to_string())),
        }
    }

    fn set_field(&mut self, key: &str, value: CellValue) -> SheetResult<()> {
        match key {
            "name" => self.name = FieldValue::from_cell_value(value)?,
            "age" => self.age = FieldValue::from_cell_value(value)?,
            _ => return Err(SheetError::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Order {
    id: u32,
    amount: Decimal,
    placed: NaiveDate,
    note: Option<String>,
}

impl SheetRecord for Order {
    fn schema() -> RecordSchema {
        RecordSchema::new()
            .with_sheet_name("Orders")
            .field(FieldBinding::of::<u32>("id").exported())
            .field(FieldBinding::of::<Decimal>("amount").exported())
            .field(FieldBinding::of::<NaiveDate>("placed").exported())
            .field(FieldBinding::of::<Option<String>>("note").exported())
    }

    fn field(&self, key: &str) -> SheetResult<CellValue> {
        match key {
            "id" => Ok(self.id.to_cell_value()),
            "amount" => Ok(self.amount.to_cell_value()),
            "placed" => Ok(self.placed.to_cell_value()),
            "note" => Ok(self.note.to_cell_value()),
            _ => Err(SheetError::UnknownField(key.to_string())),
        }
    }

    fn set_field(&mut self, key: &str, value: CellValue) -> SheetResult<()> {
        match key {
            "id" => self.id = FieldValue::from_cell_value(value)?,
            "amount" => self.amount = FieldValue::from_cell_value(value)?,
            "placed" => self.placed = FieldValue::from_cell_value(value)?,
            "note" => self.note = FieldValue::from_cell_value(value)?,
            _ => return Err(SheetError::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

/// Three fields ordered 2, unordered, 0
#[derive(Debug, Default, Clone, PartialEq)]
struct Ordered {
    f1: String,
    f2: String,
    f3: String,
}

impl SheetRecord for Ordered {
    fn schema() -> RecordSchema {
        RecordSchema::new()
            .field(FieldBinding::of::<String>("f1").with_order(2))
            .field(FieldBinding::of::<String>("f2").exported())
            .field(FieldBinding::of::<String>("f3").with_order(0))
    }

    fn field(&self, key: &str) -> SheetResult<CellValue> {
        match key {
            "f1" => Ok(self.f1.to_cell_value()),
            "f2" => Ok(self.f2.to_cell_value()),
            "f3" => Ok(self.f3.to_cell_value()),
            _ => Err(SheetError::UnknownField(key.to_string())),
        }
    }

    fn set_field(&mut self, key: &str, value: CellValue) -> SheetResult<()> {
        match key {
            "f1" => self.f1 = FieldValue::from_cell_value(value)?,
            "f2" => self.f2 = FieldValue::from_cell_value(value)?,
            "f3" => self.f3 = FieldValue::from_cell_value(value)?,
            _ => return Err(SheetError::UnknownField(key.to_string())),
        }
        Ok(())
    }
}

fn people() -> Vec<Person> {
    vec![Person::new("A", 30), Person::new("B", 25)]
}

/// Header and data rows of a sheet, as text
fn sheet_text(bytes: &[u8], sheet: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut doc = SpreadsheetDocument::open_for_read(Cursor::new(bytes)).unwrap();
    let entry = locate_sheet(doc.workbook().unwrap(), sheet, SheetNameMatch::Exact)
        .unwrap()
        .clone();
    let worksheet = doc.worksheet(&entry).unwrap().unwrap();
    let (header, rows) = read_rows(&worksheet, doc.shared_strings());
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(|cell| cell.raw).collect())
        .collect();
    (header, rows)
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_people_layout() {
    let bytes = sheetmap::export(&people(), None).unwrap();

    let (header, rows) = sheet_text(&bytes, "Sheet1");
    assert_eq!(header, vec!["Name", "Age"]);
    assert_eq!(
        rows,
        vec![
            vec!["A".to_string(), "30".to_string()],
            vec!["B".to_string(), "25".to_string()],
        ]
    );
}

#[test]
fn test_export_writes_typed_addressed_cells() {
    let bytes = sheetmap::export(&people(), None).unwrap();

    let mut doc = SpreadsheetDocument::open_for_read(Cursor::new(bytes)).unwrap();
    let entry = doc.workbook().unwrap().sheets[0].clone();
    assert_eq!(entry.name, "Sheet1");

    let worksheet = doc.worksheet(&entry).unwrap().unwrap();
    let header = &worksheet.rows[0];
    let first = &worksheet.rows[1];

    assert_eq!(header.index, Some(1));
    assert_eq!(header.cells[0].reference.as_deref(), Some("A1"));
    assert_eq!(header.cells[0].data_type.map(|t| t.as_str()), Some("str"));
    assert_eq!(first.index, Some(2));
    assert_eq!(first.cells[1].reference.as_deref(), Some("B2"));
    assert_eq!(first.cells[1].data_type.map(|t| t.as_str()), Some("n"));
}

#[test]
fn test_export_column_order() {
    let records = vec![Ordered {
        f1: "one".into(),
        f2: "two".into(),
        f3: "three".into(),
    }];
    let bytes = sheetmap::export(&records, None).unwrap();

    let (header, rows) = sheet_text(&bytes, "Sheet1");
    assert_eq!(header, vec!["f3", "f1", "f2"]);
    assert_eq!(rows[0], vec!["three", "one", "two"]);
}

#[test]
fn test_export_empty_collection_writes_header_only() {
    let bytes = sheetmap::export::<Person>(&[], None).unwrap();

    let (header, rows) = sheet_text(&bytes, "Sheet1");
    assert_eq!(header, vec!["Name", "Age"]);
    assert!(rows.is_empty());

    let back: Vec<Person> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert!(back.is_empty());
}

#[test]
fn test_export_invalid_sheet_name() {
    let result = sheetmap::export(&people(), Some("a/b"));
    assert!(matches!(result, Err(SheetError::InvalidSheetName { .. })));
}

#[test]
fn test_export_ignores_schema_sheet_name() {
    let orders = vec![Order::default()];
    let bytes = sheetmap::export(&orders, None).unwrap();

    let doc = SpreadsheetDocument::open_for_read(Cursor::new(bytes)).unwrap();
    assert_eq!(doc.workbook().unwrap().sheets[0].name, "Sheet1");
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_round_trip_people() {
    let bytes = sheetmap::export(&people(), None).unwrap();
    let back: Vec<Person> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert_eq!(back, people());
}

#[test]
fn test_round_trip_decimal_date_and_optional() {
    let orders = vec![
        Order {
            id: 7,
            amount: Decimal::new(12345, 2),
            placed: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            note: Some("rush & wrap <gift>".into()),
        },
        Order {
            id: 8,
            amount: Decimal::new(-1, 3),
            placed: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
            note: None,
        },
    ];

    let bytes = sheetmap::export(&orders, Some("Orders")).unwrap();
    let back: Vec<Order> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert_eq!(back, orders);
}

#[test]
fn test_missing_sheet_imports_nothing() {
    let bytes = sheetmap::export(&people(), None).unwrap();

    // Orders live in "Orders", the export wrote "Sheet1"
    let orders: Vec<Order> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert!(orders.is_empty());
}

#[test]
fn test_unconvertible_cells_keep_defaults() {
    let mut grid = Grid::new(vec!["Name".to_string(), "Age".to_string()]);
    grid.push_row(vec![Cell::text("A"), Cell::text("thirty")]).unwrap();
    grid.push_row(vec![Cell::text("B"), Cell::new(CellKind::Number, "25")])
        .unwrap();
    let bytes = assemble(&grid, "Sheet1").unwrap().to_bytes().unwrap();

    let back: Vec<Person> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert_eq!(back, vec![Person::new("A", 0), Person::new("B", 25)]);
}

#[test]
fn test_empty_header_imports_nothing() {
    let mut grid = Grid::new(Vec::new());
    grid.push_row(Vec::new()).unwrap();
    grid.push_row(Vec::new()).unwrap();
    let bytes = assemble(&grid, "Sheet1").unwrap().to_bytes().unwrap();

    let back: Vec<Person> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert!(back.is_empty());
}

#[test]
fn test_date_serials_read_only_from_numeric_cells() {
    let mut grid = Grid::new(vec!["id".to_string(), "placed".to_string()]);
    grid.push_row(vec![Cell::new(CellKind::Number, "1"), Cell::text("45356")])
        .unwrap();
    grid.push_row(vec![
        Cell::new(CellKind::Number, "2"),
        Cell::new(CellKind::Number, "45356"),
    ])
    .unwrap();
    let bytes = assemble(&grid, "Orders").unwrap().to_bytes().unwrap();

    let back: Vec<Order> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert_eq!(
        back,
        vec![
            Order { id: 1, ..Order::default() },
            Order {
                id: 2,
                placed: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
                ..Order::default()
            },
        ]
    );
}

#[test]
fn test_unknown_headers_are_ignored() {
    let mut grid = Grid::new(vec!["Comment".to_string(), " Age ".to_string(), "Name".to_string()]);
    grid.push_row(vec![Cell::text("x"), Cell::text("41"), Cell::text("C")])
        .unwrap();
    let bytes = assemble(&grid, "Sheet1").unwrap().to_bytes().unwrap();

    let back: Vec<Person> = sheetmap::import(Cursor::new(bytes)).unwrap();
    assert_eq!(back, vec![Person::new("C", 41)]);
}

#[test]
fn test_import_not_a_workbook() {
    let result: SheetResult<Vec<Person>> = sheetmap::import(Cursor::new(b"not a zip".to_vec()));
    assert!(matches!(result, Err(SheetError::Zip(_))));
}

#[test]
fn test_sheet_name_match_policy() {
    let bytes = sheetmap::export(&people(), Some(" People ")).unwrap();

    let trimmed: Vec<Person> = ExcelImporter::new(Cursor::new(bytes.clone()))
        .with_sheet_name("People")
        .import()
        .unwrap();
    assert_eq!(trimmed, people());

    let exact: Vec<Person> = ExcelImporter::new(Cursor::new(bytes))
        .with_sheet_name("People")
        .with_sheet_name_match(SheetNameMatch::Exact)
        .import()
        .unwrap();
    assert!(exact.is_empty());
}

#[test]
fn test_importer_rewinds_between_imports() {
    let bytes = sheetmap::export(&people(), None).unwrap();
    let mut importer = ExcelImporter::new(Cursor::new(bytes));

    let first: Vec<Person> = importer.import().unwrap();
    let second: Vec<Person> = importer.import().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn test_import_tuple_with_absent_sheet() {
    let bytes = sheetmap::export(&people(), None).unwrap();
    let mut cursor = Cursor::new(bytes);

    let (persons, orders) = sheetmap::import_tuple::<(Person, Order)>(&mut cursor).unwrap();
    assert_eq!(persons, people());
    assert!(orders.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// FILES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_to_path_and_open() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("people.xlsx");

    ExcelExporter::new(&people())
        .with_sheet_name("Staff")
        .export_to_path(&output_path)
        .unwrap();
    assert!(output_path.exists(), "Output file should exist");

    let back: Vec<Person> = ExcelImporter::open(&output_path)
        .unwrap()
        .with_sheet_name("Staff")
        .import()
        .unwrap();
    assert_eq!(back, people());
}

#[test]
fn test_open_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ExcelImporter::open(temp_dir.path().join("missing.xlsx"));
    assert!(matches!(result, Err(SheetError::Io(_))));
}
