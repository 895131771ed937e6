//! Invoice summarizer core.
//!
//! A semi-structured invoice sheet is read as a [`RawGrid`](models::RawGrid),
//! split into regions ([`region::locate`]), its line-item columns resolved
//! ([`columns::resolve`]), product names canonicalized
//! ([`canonical::canonicalize`]) and rows folded into numbered
//! [`ProductGroup`](models::ProductGroup)s ([`aggregate::Aggregator`]).
//! [`report::assemble`] turns the result into the table the renderer writes.

pub mod aggregate;
pub mod canonical;
pub mod columns;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod report;
pub mod source;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export commonly used items
pub use crate::aggregate::{Aggregation, Aggregator};
pub use crate::canonical::{canonicalize, canonicalize_with};
pub use crate::columns::resolve;
pub use crate::error::{Result, SummaryError};
pub use crate::pipeline::{output_path_for, InvoiceSummarizer, RunOptions, RunOutcome, Summary};
pub use crate::region::{locate, Regions};
pub use crate::report::assemble;
pub use crate::source::{
    input_source, select_input, ArgFileSource, FileSource, PromptFileSource, WORKBOOK_EXTENSIONS,
};

#[cfg(feature = "dialog")]
pub use crate::source::DialogFileSource;
