//! Records ↔ grid projection
//!
//! Export is strict: a field that cannot be read aborts the call. Import is
//! best-effort per field: a cell that cannot be converted leaves that field
//! at its default and the rest of the row is still read. Empty cells are
//! assigned as [`CellValue::Null`](crate::types::CellValue::Null).

use crate::codec;
use crate::error::{SheetError, SheetResult};
use crate::record::SheetRecord;
use crate::schema::{ColumnSchema, ImportLookup};
use crate::types::{Cell, Grid};
use tracing::debug;

/// Project records onto a grid with one column per exported field
pub fn to_grid<T: SheetRecord>(records: &[T], columns: &ColumnSchema) -> SheetResult<Grid> {
    let mut grid = Grid::new(columns.names());

    for record in records {
        let row = columns
            .fields()
            .iter()
            .map(|binding| record.field(&binding.key).map(|value| codec::encode(&value)))
            .collect::<SheetResult<Vec<_>>>()?;
        grid.push_row(row)?;
    }

    Ok(grid)
}

/// Build one record per data row, matching cells to fields by header name
///
/// Cells are matched positionally against `header`; a row shorter than the
/// header stops early and headers with no matching field are ignored.
pub fn from_grid<T: SheetRecord>(
    header: &[String],
    rows: &[Vec<Cell>],
    lookup: &ImportLookup,
) -> SheetResult<Vec<T>> {
    let mut records = Vec::with_capacity(rows.len());

    for (row_idx, row) in rows.iter().enumerate() {
        let mut record = T::default();

        for (name, cell) in header.iter().zip(row.iter()) {
            let Some(binding) = lookup.get(name) else {
                continue;
            };

            let value = match codec::decode_cell(cell, binding.value_type) {
                Ok(value) => value,
                Err(e) => {
                    debug!(row = row_idx, field = %binding.key, error = %e, "cell conversion failed, keeping default");
                    continue;
                }
            };

            match record.set_field(&binding.key, value) {
                Ok(()) => {}
                Err(SheetError::Conversion(e)) => {
                    debug!(row = row_idx, field = %binding.key, error = %e, "field assignment failed, keeping default");
                }
                Err(e) => return Err(e),
            }
        }

        records.push(record);
    }

    Ok(records)
}
