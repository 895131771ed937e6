use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use models::{Cell, GridRow, RawGrid};
use tracing::debug;

use crate::{CodecError, SheetReader};

/// Reads `.xlsx`, `.xlsm`, `.xls` and `.ods` through calamine's format autodetection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineSheetReader;

impl SheetReader for CalamineSheetReader {
    fn read_sheet(&self, path: &Path) -> Result<RawGrid, CodecError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| CodecError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| CodecError::NoSheets {
                path: path.to_path_buf(),
            })?
            .map_err(|source| CodecError::Sheet {
                path: path.to_path_buf(),
                source,
            })?;

        let grid = range_to_grid(&range);
        debug!(path = %path.display(), rows = grid.len(), "read first worksheet");
        Ok(grid)
    }
}

/// Converts a calamine range to a text grid whose indices are absolute sheet
/// coordinates, even when the used range does not start at A1.
pub fn range_to_grid(range: &Range<Data>) -> RawGrid {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<GridRow> = vec![Vec::new(); row_offset];
    for row in range.rows() {
        let mut cells: GridRow = vec![None; col_offset];
        cells.extend(row.iter().map(cell_str));
        rows.push(cells);
    }
    RawGrid::new(rows)
}

fn cell_str(cell: &Data) -> Cell {
    match cell {
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::Empty => None,
        _ => Some(cell.to_string()),
    }
}
