use std::path::{Path, PathBuf};

use models::{ColumnIndex, RawGrid, ReportTable, Settings};
use sheet_codec::{FormatUpgrader, ReportRenderer, SheetReader};
use tracing::info;

use crate::aggregate::{Aggregation, Aggregator};
use crate::columns::resolve;
use crate::region::{locate, Regions};
use crate::report::assemble;
use crate::Result;

/// Everything computed from one invoice sheet.
#[derive(Debug, Clone)]
pub struct Summary {
    pub regions: Regions,
    pub columns: ColumnIndex,
    pub aggregation: Aggregation,
    pub report: ReportTable,
}

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides the `<prefix><file name>` sibling of the input.
    pub output: Option<PathBuf>,
    /// Summarize without writing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// The workbook actually read (the upgraded copy for legacy inputs).
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub summary: Summary,
}

pub struct InvoiceSummarizer {
    settings: Settings,
}

impl InvoiceSummarizer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Region Locator → Column Resolver → Aggregator → Report Assembler.
    pub fn summarize_grid(&self, grid: &RawGrid) -> Result<Summary> {
        let settings = &self.settings;

        let regions = locate(grid, &settings.layout, &settings.labels)?;
        let columns = resolve(&regions.table_header, &settings.columns)?;

        let aggregator = Aggregator::new(columns, &settings.canonical, &settings.aggregation);
        let aggregation = aggregator.aggregate(regions.body_rows(grid), regions.first_data_row)?;

        let report = assemble(&regions.header, &aggregation, &regions.footer, &settings.report);

        Ok(Summary {
            regions,
            columns,
            aggregation,
            report,
        })
    }

    pub fn summarize_file<R: SheetReader + ?Sized>(&self, reader: &R, path: &Path) -> Result<Summary> {
        let grid = reader.read_sheet(path)?;
        info!(path = %path.display(), rows = grid.len(), "summarizing invoice");
        self.summarize_grid(&grid)
    }

    /// Upgrades, reads, summarizes and writes one workbook. Nothing is written
    /// unless every step before rendering succeeded.
    pub fn run<U, R, W>(
        &self,
        upgrader: &U,
        reader: &R,
        renderer: &W,
        input: &Path,
        options: &RunOptions,
    ) -> Result<RunOutcome>
    where
        U: FormatUpgrader + ?Sized,
        R: SheetReader + ?Sized,
        W: ReportRenderer + ?Sized,
    {
        let source = upgrader.upgrade(input)?;
        let summary = self.summarize_file(reader, &source)?;

        if options.dry_run {
            info!("dry run, nothing written");
            return Ok(RunOutcome {
                source,
                output: None,
                summary,
            });
        }

        let target = options
            .output
            .clone()
            .unwrap_or_else(|| output_path_for(&source, &self.settings.report.output_prefix));
        renderer.render(&target, &summary.report)?;

        Ok(RunOutcome {
            source,
            output: Some(target),
            summary,
        })
    }
}

/// Sibling path with `prefix` prepended to the file name, always with an `.xlsx` extension.
pub fn output_path_for(input: &Path, prefix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "invoice".to_string());
    input.with_file_name(format!("{prefix}{stem}.xlsx"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::invoice_grid;
    use crate::SummaryError;
    use models::{Field, GroupOrder};
    use sheet_codec::CodecError;
    use std::cell::RefCell;

    struct GridReader(RawGrid);

    impl SheetReader for GridReader {
        fn read_sheet(&self, _path: &Path) -> std::result::Result<RawGrid, CodecError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        written: RefCell<Vec<(PathBuf, ReportTable)>>,
    }

    impl ReportRenderer for RecordingRenderer {
        fn render(&self, path: &Path, report: &ReportTable) -> std::result::Result<(), CodecError> {
            self.written
                .borrow_mut()
                .push((path.to_path_buf(), report.clone()));
            Ok(())
        }
    }

    struct NoUpgrade;

    impl FormatUpgrader for NoUpgrade {
        fn upgrade(&self, path: &Path) -> std::result::Result<PathBuf, CodecError> {
            Ok(path.to_path_buf())
        }
    }

    #[test]
    fn test_summarize_invoice_end_to_end() {
        let summary = InvoiceSummarizer::new(Settings::default())
            .summarize_grid(&invoice_grid())
            .unwrap();

        let groups = &summary.aggregation.groups;
        assert_eq!(groups.len(), 2);
        assert_eq!((groups[0].seq, groups[0].name.as_str()), (1, "Подошва Эва Черная"));
        assert_eq!((groups[0].quantity, groups[0].total), (15, 2250.0));
        assert_eq!(groups[0].ship_unit, "пар.");
        assert_eq!((groups[1].seq, groups[1].name.as_str()), (2, "Стелька Кожаная"));
        assert_eq!((groups[1].quantity, groups[1].total), (20, 1200.5));
        assert!(summary.aggregation.issues.is_empty());
        assert_eq!(summary.aggregation.blank_rows, 1);

        let report = &summary.report;
        assert_eq!(report.quantity_total, 35);
        assert_eq!(report.amount_total, 3450.5);
        assert_eq!(
            report.header_lines,
            vec![
                "Расходная накладная № 118 от 12.03.2024".to_string(),
                "Поставщик: ООО \"Подошва-Юг\", ИНН 6164000000".to_string(),
                "Покупатель: ИП Сидоров А.В.".to_string(),
            ]
        );
        assert_eq!(
            report.footer_lines,
            vec![
                "Итого: 3450,50".to_string(),
                "В том числе НДС: 575,08".to_string(),
                "Всего наименований 4, на сумму 3 450,50 руб.".to_string(),
            ]
        );
    }

    #[test]
    fn test_run_writes_prefixed_sibling() {
        let renderer = RecordingRenderer::default();
        let summarizer = InvoiceSummarizer::new(Settings::default());

        let outcome = summarizer
            .run(
                &NoUpgrade,
                &GridReader(invoice_grid()),
                &renderer,
                Path::new("/data/invoices/march.xlsx"),
                &RunOptions::default(),
            )
            .unwrap();

        let expected = PathBuf::from("/data/invoices/s_march.xlsx");
        assert_eq!(outcome.output, Some(expected.clone()));
        let written = renderer.written.borrow();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, expected);
        assert_eq!(written[0].1.rows.len(), 2);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let renderer = RecordingRenderer::default();
        let options = RunOptions {
            output: None,
            dry_run: true,
        };

        let outcome = InvoiceSummarizer::new(Settings::default())
            .run(&NoUpgrade, &GridReader(invoice_grid()), &renderer, Path::new("march.xlsx"), &options)
            .unwrap();

        assert!(outcome.output.is_none());
        assert!(renderer.written.borrow().is_empty());
        assert_eq!(outcome.summary.aggregation.groups.len(), 2);
    }

    #[test]
    fn test_failed_location_writes_nothing() {
        let renderer = RecordingRenderer::default();
        let grid = RawGrid::from_strs(&[&["Накладная № 1"], &[], &[], &[], &[], &[], &[], &["", "№", "Товар"]]);

        let err = InvoiceSummarizer::new(Settings::default())
            .run(&NoUpgrade, &GridReader(grid), &renderer, Path::new("bad.xlsx"), &RunOptions::default())
            .unwrap_err();

        assert!(matches!(err, SummaryError::RegionNotFound(_)));
        assert!(renderer.written.borrow().is_empty());
    }

    #[test]
    fn test_missing_column_aborts_before_aggregation() {
        let mut rows: Vec<Vec<Option<String>>> = invoice_grid().rows().to_vec();
        rows[7][6] = Some("Цена с НДС".to_string());
        let renderer = RecordingRenderer::default();

        let err = InvoiceSummarizer::new(Settings::default())
            .run(
                &NoUpgrade,
                &GridReader(RawGrid::new(rows)),
                &renderer,
                Path::new("march.xlsx"),
                &RunOptions::default(),
            )
            .unwrap_err();

        assert!(matches!(err, SummaryError::ColumnNotFound(Field::Total)));
        assert!(renderer.written.borrow().is_empty());
    }

    #[test]
    fn test_sorted_order_from_settings() {
        let mut rows: Vec<Vec<Option<String>>> = invoice_grid().rows().to_vec();
        // swap the second sole and the first insole row so equal names are no longer adjacent
        rows.swap(9, 10);
        let grid = RawGrid::new(rows);

        let as_given = InvoiceSummarizer::new(Settings::default())
            .summarize_grid(&grid)
            .unwrap();
        assert_eq!(as_given.aggregation.groups.len(), 4);

        let mut settings = Settings::default();
        settings.aggregation.order = GroupOrder::SortedByCanonicalName;
        let sorted = InvoiceSummarizer::new(settings).summarize_grid(&grid).unwrap();
        assert_eq!(sorted.aggregation.groups.len(), 2);
        assert_eq!(sorted.aggregation.quantity_total(), as_given.aggregation.quantity_total());
    }

    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("/tmp/накладная.xls"), "s_"),
            PathBuf::from("/tmp/s_накладная.xlsx")
        );
        assert_eq!(
            output_path_for(Path::new("march.xlsx"), "summary-"),
            PathBuf::from("summary-march.xlsx")
        );
    }
}
