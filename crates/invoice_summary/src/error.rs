use models::{Field, IssueKind, RowIssue};
use sheet_codec::CodecError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummaryError>;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("No input file selected")]
    NoInputSelected,

    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Required column not found: {0}")]
    ColumnNotFound(Field),

    #[error("Malformed quantity {value:?} at row {row}")]
    MalformedQuantity { row: usize, value: String },

    #[error("Malformed total {value:?} at row {row}")]
    MalformedTotal { row: usize, value: String },

    #[error("Quantity {value} at row {row} overflows the running sum")]
    QuantityOverflow { row: usize, value: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Cannot read input selection: {0}")]
    Prompt(#[from] std::io::Error),
}

impl From<RowIssue> for SummaryError {
    fn from(issue: RowIssue) -> Self {
        match issue.kind {
            IssueKind::MalformedQuantity => SummaryError::MalformedQuantity {
                row: issue.row,
                value: issue.value,
            },
            IssueKind::MalformedTotal => SummaryError::MalformedTotal {
                row: issue.row,
                value: issue.value,
            },
            IssueKind::QuantityOverflow => SummaryError::QuantityOverflow {
                row: issue.row,
                value: issue.value,
            },
        }
    }
}
