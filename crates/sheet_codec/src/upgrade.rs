use std::path::{Path, PathBuf};

use models::RawGrid;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::renderer::save_workbook;
use crate::{CalamineSheetReader, CodecError, FormatUpgrader, SheetReader};

/// Rewrites a legacy `.xls` workbook as `<stem>.xlsx` next to it. Other files pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsUpgrader;

impl FormatUpgrader for XlsUpgrader {
    fn upgrade(&self, path: &Path) -> Result<PathBuf, CodecError> {
        if !is_legacy_xls(path) {
            return Ok(path.to_path_buf());
        }

        let grid = CalamineSheetReader.read_sheet(path)?;
        let target = path.with_extension("xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_grid(worksheet, &grid).map_err(|source| CodecError::Write {
            path: target.clone(),
            source,
        })?;
        save_workbook(&mut workbook, &target)?;

        info!(from = %path.display(), to = %target.display(), "upgraded legacy workbook");
        Ok(target)
    }
}

pub fn is_legacy_xls(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xls"))
}

/// Copies every present cell as text; absent cells stay absent.
fn write_grid(worksheet: &mut Worksheet, grid: &RawGrid) -> Result<(), XlsxError> {
    for (r, row) in grid.rows().iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(text) = cell {
                worksheet.write_string(r as u32, c as u16, text)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_detection_is_case_insensitive() {
        assert!(is_legacy_xls(Path::new("invoice.xls")));
        assert!(is_legacy_xls(Path::new("INVOICE.XLS")));
        assert!(!is_legacy_xls(Path::new("invoice.xlsx")));
        assert!(!is_legacy_xls(Path::new("invoice")));
    }

    #[test]
    fn test_current_format_is_passed_through() {
        let path = Path::new("does/not/exist/invoice.xlsx");
        assert_eq!(XlsUpgrader.upgrade(path).unwrap(), path.to_path_buf());
    }

    #[test]
    fn test_write_grid_keeps_text_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copy.xlsx");
        let grid = RawGrid::from_strs(&[&["", "Накладная № 5"], &["№", "1", "Подошва ПУ Черная"]]);

        let mut workbook = Workbook::new();
        write_grid(workbook.add_worksheet(), &grid).unwrap();
        save_workbook(&mut workbook, &path).unwrap();

        let copy = CalamineSheetReader.read_sheet(&path).unwrap();
        assert_eq!(copy.text(0, 0), None);
        assert_eq!(copy.text(0, 1), Some("Накладная № 5"));
        assert_eq!(copy.text(1, 1), Some("1"));
        assert_eq!(copy.text(1, 2), Some("Подошва ПУ Черная"));
    }
}
