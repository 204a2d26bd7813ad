//! Binary workbook decoding via calamine.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use super::Grid;
use crate::error::{IngestError, Result};

/// Reads the first worksheet of an xlsx/xls/ods workbook.
///
/// Cells are rendered as strings. The grid is anchored at A1: when the used
/// range starts further down or right, leading rows and cells are padded
/// with empty strings.
pub fn read_workbook(bytes: &[u8]) -> Result<Grid> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| {
            IngestError::Workbook {
                message: e.to_string(),
            }
        })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(IngestError::NoWorksheet)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Workbook {
            message: e.to_string(),
        })?;

    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = Vec::with_capacity(first_row as usize + range.height());
    grid.resize(first_row as usize, Vec::new());
    for row in range.rows() {
        let mut cells = vec![String::new(); first_col as usize];
        cells.extend(row.iter().map(cell_to_string));
        grid.push(cells);
    }

    debug!(sheet = %sheet_name, rows = grid.len(), "worksheet decoded");
    Ok(grid)
}

/// Renders a cell the way it reads in the sheet.
///
/// Whole-number floats lose their `.0` so an identity typed as a number
/// compares equal to the same identity typed as text.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.clone(),
        Data::Float(value) => format_numeric(*value),
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => format_numeric(value.as_f64()),
        Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn format_numeric(value: f64) -> String {
    let formatted = format!("{value}");
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(1234567890.0)), "1234567890");
        assert_eq!(cell_to_string(&Data::Float(3.50)), "3.5");
        assert_eq!(cell_to_string(&Data::Int(42)), "42");
        assert_eq!(cell_to_string(&Data::String("MTH101".into())), "MTH101");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_garbage_is_not_a_workbook() {
        let err = read_workbook(b"PK\x03\x04 definitely not a zip").unwrap_err();
        assert!(matches!(err, IngestError::Workbook { .. }));
    }
}
