use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use invoice_summary::{input_source, select_input, InvoiceSummarizer, RunOptions, SummaryError};
use models::{GroupOrder, MalformedPolicy, Settings, ShipUnitPolicy};
use sheet_codec::{CalamineSheetReader, XlsUpgrader, XlsxReportRenderer};

#[derive(Parser, Debug)]
#[command(
    name = "invoice_summary",
    about = "Group invoice line items by canonical product name and write a summary workbook."
)]
struct Args {
    /// Invoice workbook (.xlsx/.xls); picked in a dialog (or asked on stdin) when omitted
    input: Option<PathBuf>,

    /// Settings JSON; defaults to ./invoice_summary.json when present
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Group order
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Use this shipping-unit label for every group instead of the sheet column
    #[arg(long)]
    ship_unit_label: Option<String>,

    /// What to do with rows whose quantity or total cannot be parsed
    #[arg(long, value_enum)]
    on_malformed: Option<MalformedArg>,

    /// Output path; defaults to the prefixed sibling of the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the summary without writing a workbook
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    AsGiven,
    Sorted,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MalformedArg {
    Skip,
    Abort,
}

impl Args {
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(order) = self.order {
            settings.aggregation.order = match order {
                OrderArg::AsGiven => GroupOrder::AsGiven,
                OrderArg::Sorted => GroupOrder::SortedByCanonicalName,
            };
        }
        if let Some(label) = &self.ship_unit_label {
            settings.aggregation.ship_unit = ShipUnitPolicy::FixedLabel(label.clone());
        }
        if let Some(policy) = self.on_malformed {
            settings.aggregation.on_malformed = match policy {
                MalformedArg::Skip => MalformedPolicy::SkipRow,
                MalformedArg::Abort => MalformedPolicy::Abort,
            };
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invoice_summary=info,sheet_codec=info".into()),
        )
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut settings = settings_loader::load_settings_with_fallback(args.settings.as_ref())?;
    args.apply_overrides(&mut settings);

    let mut source = input_source(args.input.clone());
    let input = match select_input(source.as_mut()) {
        Ok(path) => path,
        Err(SummaryError::NoInputSelected) => {
            println!("No file selected. Exiting.");
            return Ok(());
        }
        Err(e) => return Err(e).context("Selecting input workbook"),
    };

    println!("📖 Reading invoice: {}", input.display());

    let summarizer = InvoiceSummarizer::new(settings);
    let options = RunOptions {
        output: args.output.clone(),
        dry_run: args.dry_run,
    };
    let outcome = summarizer
        .run(
            &XlsUpgrader,
            &CalamineSheetReader,
            &XlsxReportRenderer,
            &input,
            &options,
        )
        .with_context(|| format!("Failed summarizing {}", input.display()))?;

    if outcome.source != input {
        println!("  • converted to {}", outcome.source.display());
    }

    let report = &outcome.summary.report;
    println!("\n📊 Summary:");
    for line in &report.header_lines {
        println!("  {}", line);
    }
    for group in &report.rows {
        println!(
            "  {:>3}. {} | {} | {} | {:.2}",
            group.seq, group.name, group.ship_unit, group.quantity, group.total
        );
    }
    println!(
        "✓ {}: {} groups, quantity {}, amount {:.2}",
        report.totals_label,
        report.rows.len(),
        report.quantity_total,
        report.amount_total
    );

    for issue in &outcome.summary.aggregation.issues {
        println!("⚠ Row {} skipped: {} {:?}", issue.row, issue.kind, issue.value);
    }

    match &outcome.output {
        Some(path) => println!("Analysis complete. Output saved to {}", path.display()),
        None => println!("Dry run, nothing written."),
    }

    Ok(())
}
