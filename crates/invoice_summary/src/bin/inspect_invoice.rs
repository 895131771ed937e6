use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use invoice_summary::{locate, resolve};
use models::{Field, Metadata};
use sheet_codec::{CalamineSheetReader, SheetReader};

fn main() -> Result<()> {
    // Usage:
    //   inspect_invoice invoice.xlsx [settings.json]
    let mut args = env::args().skip(1);
    let path = PathBuf::from(args.next().unwrap_or_else(|| "invoice.xlsx".to_string()));
    let settings_path = args.next().map(PathBuf::from);

    let settings = settings_loader::load_settings_with_fallback(settings_path.as_ref())?;
    let grid = CalamineSheetReader
        .read_sheet(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    println!("== {} ==", path.display());
    println!("  rows: {}", grid.len());

    // First 15 non-empty rows, up to 12 columns.
    let mut printed = 0usize;
    for (r_idx, row) in grid.rows().iter().enumerate() {
        if printed >= 15 {
            break;
        }

        let mut cells: Vec<String> = row
            .iter()
            .take(12)
            .map(|c| c.as_deref().unwrap_or_default().trim().to_string())
            .collect();

        if cells.iter().all(|s| s.is_empty()) {
            continue;
        }

        while matches!(cells.last(), Some(s) if s.is_empty()) {
            cells.pop();
        }

        println!("  row {:>4}: {}", r_idx + 1, cells.join(" | "));
        printed += 1;
    }

    let regions = match locate(&grid, &settings.layout, &settings.labels) {
        Ok(r) => r,
        Err(e) => {
            println!("  regions: (not found: {e})");
            return Ok(());
        }
    };

    println!("  header metadata:");
    print_metadata(&regions.header);
    println!("  footer metadata:");
    print_metadata(&regions.footer);

    println!("  table header row: {}", regions.table_header_row + 1);
    println!("  first data row: {}", regions.first_data_row + 1);
    println!("  body end: {}", regions.body_end);

    match resolve(&regions.table_header, &settings.columns) {
        Ok(columns) => {
            for field in Field::ALL {
                let col = columns.get(field);
                let title = regions.table_header.get(col).map(String::as_str).unwrap_or("");
                println!("  {:<10} -> column {} ({})", field.to_string(), col + 1, title);
            }
        }
        Err(e) => println!("  columns: ({e})"),
    }

    Ok(())
}

fn print_metadata(meta: &Metadata) {
    for (key, value) in meta.entries() {
        let shown = if value.is_empty() { "(none)" } else { value };
        println!("    {key}: {shown}");
    }
}
