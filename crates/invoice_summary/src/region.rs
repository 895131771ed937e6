use models::{
    is_blank, FooterMetadata, GridRow, HeaderMetadata, LabelSettings, LabelSpec, LayoutSettings,
    Metadata, RawGrid,
};
use tracing::debug;

use crate::{Result, SummaryError};

/// Structural bands of an invoice sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Regions {
    pub header: HeaderMetadata,
    pub footer: FooterMetadata,
    pub table_header_row: usize,
    /// Column titles of the line-item table; absent cells are empty strings.
    pub table_header: Vec<String>,
    pub first_data_row: usize,
    /// Exclusive end of the line-item rows.
    pub body_end: usize,
}

impl Regions {
    /// Line-item source rows, `first_data_row..body_end`.
    pub fn body_rows<'g>(&self, grid: &'g RawGrid) -> &'g [GridRow] {
        let end = self.body_end.min(grid.len());
        let start = self.first_data_row.min(end);
        &grid.rows()[start..end]
    }
}

/// Finds header/footer metadata, the table header row and the line-item rows.
///
/// Fails with [`SummaryError::RegionNotFound`] when the table header row lies
/// beyond the sheet or no row below it carries the sentinel in the sentinel column.
pub fn locate(grid: &RawGrid, layout: &LayoutSettings, labels: &LabelSettings) -> Result<Regions> {
    let rows = grid.rows();

    let header_end = layout.header_window.min(rows.len());
    let header = scan_metadata(&rows[..header_end], &labels.header);

    let footer_start = rows.len().saturating_sub(layout.footer_window);
    let footer = scan_metadata(&rows[footer_start..], &labels.footer);

    let table_header = grid
        .row(layout.table_header_row)
        .map(|cells| {
            cells
                .iter()
                .map(|c| c.clone().unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .ok_or_else(|| {
            SummaryError::RegionNotFound(format!(
                "table header row {} is beyond the sheet ({} rows)",
                layout.table_header_row + 1,
                rows.len()
            ))
        })?;

    let first_data_row = (layout.table_header_row + 1..rows.len())
        .find(|&r| {
            grid.text(r, layout.sentinel_column)
                .is_some_and(|text| text.trim() == layout.sentinel_value)
        })
        .ok_or_else(|| {
            SummaryError::RegionNotFound(format!(
                "no row below row {} has \"{}\" in column {}",
                layout.table_header_row + 1,
                layout.sentinel_value,
                layout.sentinel_column + 1
            ))
        })?;

    let body_end = (footer_start.max(first_data_row + 1)..rows.len())
        .find(|&r| rows[r].iter().any(|cell| matches_any_label(cell.as_deref(), &labels.footer)))
        .unwrap_or(rows.len());

    debug!(
        table_header_row = layout.table_header_row,
        first_data_row, body_end, "located invoice regions"
    );

    Ok(Regions {
        header,
        footer,
        table_header_row: layout.table_header_row,
        table_header,
        first_data_row,
        body_end,
    })
}

/// Collects label values from a band of rows. Later matches overwrite earlier ones.
fn scan_metadata(rows: &[GridRow], specs: &[LabelSpec]) -> Metadata {
    let mut meta = Metadata::with_keys(specs.iter().map(|s| s.key.as_str()));

    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            let Some(text) = cell.as_deref() else {
                continue;
            };
            for spec in specs.iter().filter(|s| label_matches(text, s)) {
                let label = text.trim();
                let value = if spec.standalone {
                    label.to_string()
                } else {
                    match value_right_of(row, col) {
                        Some(value) => format!("{label} {value}"),
                        None => label.to_string(),
                    }
                };
                meta.set(&spec.key, value);
            }
        }
    }

    meta
}

fn value_right_of(row: &[Option<String>], col: usize) -> Option<&str> {
    row.iter()
        .skip(col + 1)
        .map(|c| c.as_deref())
        .find(|c| !is_blank(*c))
        .flatten()
        .map(str::trim)
}

fn label_matches(text: &str, spec: &LabelSpec) -> bool {
    let lowered = text.to_lowercase();
    spec.markers
        .iter()
        .filter(|m| !m.is_empty())
        .any(|m| lowered.contains(&m.to_lowercase()))
}

fn matches_any_label(cell: Option<&str>, specs: &[LabelSpec]) -> bool {
    cell.is_some_and(|text| specs.iter().any(|spec| label_matches(text, spec)))
}
