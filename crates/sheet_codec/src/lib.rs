//! Spreadsheet I/O for the invoice summarizer.
//!
//! The pipeline only sees three seams: [`SheetReader`] turns a workbook into a
//! [`RawGrid`], [`ReportRenderer`] writes a finished [`ReportTable`], and
//! [`FormatUpgrader`] converts legacy `.xls` files before reading.

pub mod error;
pub mod reader;
pub mod renderer;
pub mod upgrade;

use std::path::{Path, PathBuf};

use models::{RawGrid, ReportTable};

pub use crate::error::CodecError;
pub use crate::reader::{range_to_grid, CalamineSheetReader};
pub use crate::renderer::XlsxReportRenderer;
pub use crate::upgrade::{is_legacy_xls, XlsUpgrader};

/// Reads the first worksheet of a workbook as text cells.
pub trait SheetReader {
    fn read_sheet(&self, path: &Path) -> Result<RawGrid, CodecError>;
}

/// Writes a styled summary workbook.
pub trait ReportRenderer {
    fn render(&self, path: &Path, report: &ReportTable) -> Result<(), CodecError>;
}

/// Converts a legacy workbook to the current format, returning the path to read.
pub trait FormatUpgrader {
    fn upgrade(&self, path: &Path) -> Result<PathBuf, CodecError>;
}
