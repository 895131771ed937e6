use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Cannot open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: calamine::Error,
    },

    #[error("Workbook {} has no worksheets", path.display())]
    NoSheets { path: PathBuf },

    #[error("Cannot read first worksheet of {}: {source}", path.display())]
    Sheet {
        path: PathBuf,
        source: calamine::Error,
    },

    #[error("Cannot write workbook {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CodecError {
    /// The workbook path the failure relates to.
    pub fn path(&self) -> &Path {
        match self {
            CodecError::Open { path, .. }
            | CodecError::NoSheets { path }
            | CodecError::Sheet { path, .. }
            | CodecError::Write { path, .. }
            | CodecError::Io { path, .. } => path,
        }
    }
}
