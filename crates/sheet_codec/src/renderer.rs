use std::fs;
use std::path::{Path, PathBuf};

use models::{ReportTable, TotalsMode};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet, XlsxError};
use tracing::info;

use crate::{CodecError, ReportRenderer};

const SEQ_COL: u16 = 0;
const NAME_COL: u16 = 1;
const UNIT_COL: u16 = 2;
const QUANTITY_COL: u16 = 3;
const TOTAL_COL: u16 = 4;

const MONEY_FORMAT: &str = "#,##0.00";

/// Renders the summary sheet: header lines, the grouped table, a totals row
/// under a thick rule, then footer lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReportRenderer;

impl ReportRenderer for XlsxReportRenderer {
    fn render(&self, path: &Path, report: &ReportTable) -> Result<(), CodecError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_report(worksheet, report).map_err(|source| CodecError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        save_workbook(&mut workbook, path)?;
        info!(path = %path.display(), groups = report.rows.len(), "summary written");
        Ok(())
    }
}

fn write_report(worksheet: &mut Worksheet, report: &ReportTable) -> Result<(), XlsxError> {
    worksheet.set_name(&report.sheet_name)?;

    let meta_format = Format::new().set_bold();
    let title_format = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let text_format = Format::new().set_border(FormatBorder::Thin);
    let count_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let money_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format(MONEY_FORMAT);
    let totals_text_format = Format::new().set_bold().set_border_top(FormatBorder::Thick);
    let totals_count_format = totals_text_format.clone().set_align(FormatAlign::Center);
    let totals_money_format = totals_text_format.clone().set_num_format(MONEY_FORMAT);

    let mut row: u32 = 0;
    for line in &report.header_lines {
        worksheet.write_string_with_format(row, 0, line, &meta_format)?;
        row += 1;
    }
    if !report.header_lines.is_empty() {
        row += 1;
    }

    for (col, title) in report.column_titles.iter().enumerate() {
        worksheet.write_string_with_format(row, col as u16, title, &title_format)?;
    }
    row += 1;

    let first_data_row = row;
    for group in &report.rows {
        worksheet.write_number_with_format(row, SEQ_COL, group.seq as f64, &count_format)?;
        worksheet.write_string_with_format(row, NAME_COL, &group.name, &text_format)?;
        worksheet.write_string_with_format(row, UNIT_COL, &group.ship_unit, &count_format)?;
        worksheet.write_number_with_format(row, QUANTITY_COL, group.quantity as f64, &count_format)?;
        worksheet.write_number_with_format(row, TOTAL_COL, group.total, &money_format)?;
        row += 1;
    }

    worksheet.write_blank(row, SEQ_COL, &totals_text_format)?;
    worksheet.write_string_with_format(row, NAME_COL, &report.totals_label, &totals_text_format)?;
    worksheet.write_blank(row, UNIT_COL, &totals_text_format)?;
    match report.totals_mode {
        TotalsMode::Formula if !report.rows.is_empty() => {
            // Excel rows are 1-based; `row` is the first row after the data.
            let quantity = Formula::new(format!("=SUM(D{}:D{})", first_data_row + 1, row))
                .set_result(report.quantity_total.to_string());
            let total = Formula::new(format!("=SUM(E{}:E{})", first_data_row + 1, row))
                .set_result(report.amount_total.to_string());
            worksheet.write_formula_with_format(row, QUANTITY_COL, quantity, &totals_count_format)?;
            worksheet.write_formula_with_format(row, TOTAL_COL, total, &totals_money_format)?;
        }
        _ => {
            worksheet.write_number_with_format(
                row,
                QUANTITY_COL,
                report.quantity_total as f64,
                &totals_count_format,
            )?;
            worksheet.write_number_with_format(row, TOTAL_COL, report.amount_total, &totals_money_format)?;
        }
    }
    row += 2;

    for line in &report.footer_lines {
        worksheet.write_string_with_format(row, 0, line, &meta_format)?;
        row += 1;
    }

    let name_width = report
        .rows
        .iter()
        .map(|g| g.name.chars().count())
        .chain(std::iter::once(report.totals_label.chars().count()))
        .max()
        .unwrap_or(10)
        .clamp(10, 60);
    worksheet.set_column_width(SEQ_COL, 6)?;
    worksheet.set_column_width(NAME_COL, name_width as f64 + 2.0)?;
    worksheet.set_column_width(UNIT_COL, 8)?;
    worksheet.set_column_width(QUANTITY_COL, 12)?;
    worksheet.set_column_width(TOTAL_COL, 16)?;

    Ok(())
}

/// Saves through a temporary sibling file so a failed save never leaves a
/// partial workbook at `path`.
pub(crate) fn save_workbook(workbook: &mut Workbook, path: &Path) -> Result<(), CodecError> {
    let tmp = temp_sibling(path);
    if let Err(source) = workbook.save(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(CodecError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    fs::rename(&tmp, path).map_err(|source| {
        let _ = fs::remove_file(&tmp);
        CodecError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "summary.xlsx".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
