use models::{FooterMetadata, HeaderMetadata, ReportSettings, ReportTable};

use crate::aggregate::Aggregation;

/// Combines metadata, groups and totals into the table handed to the renderer.
pub fn assemble(
    header: &HeaderMetadata,
    aggregation: &Aggregation,
    footer: &FooterMetadata,
    settings: &ReportSettings,
) -> ReportTable {
    ReportTable {
        sheet_name: settings.sheet_name.clone(),
        header_lines: header.filled_values(),
        column_titles: settings.column_titles.clone(),
        rows: aggregation.groups.clone(),
        totals_label: settings.totals_label.clone(),
        quantity_total: aggregation.quantity_total(),
        amount_total: aggregation.amount_total(),
        totals_mode: settings.totals,
        footer_lines: footer.filled_values(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{Metadata, ProductGroup, TotalsMode};

    #[test]
    fn test_assemble_totals_and_lines() {
        let mut header = Metadata::with_keys(["invoice-number", "supplier", "buyer"]);
        header.set("invoice-number", "Накладная № 7");
        header.set("buyer", "Покупатель: ИП Петров");
        let mut footer = Metadata::with_keys(["total-declared", "tax"]);
        footer.set("tax", "НДС: 100,00");

        let aggregation = Aggregation {
            groups: vec![
                ProductGroup {
                    seq: 1,
                    name: "Подошва Эва Черная".to_string(),
                    ship_unit: "пар.".to_string(),
                    quantity: 15,
                    total: 2250.0,
                },
                ProductGroup {
                    seq: 2,
                    name: "Стелька Кожаная".to_string(),
                    ship_unit: "пар.".to_string(),
                    quantity: 20,
                    total: 1200.5,
                },
            ],
            ..Aggregation::default()
        };
        let settings = ReportSettings {
            totals: TotalsMode::Precomputed,
            ..ReportSettings::default()
        };

        let table = assemble(&header, &aggregation, &footer, &settings);

        assert_eq!(
            table.header_lines,
            vec!["Накладная № 7".to_string(), "Покупатель: ИП Петров".to_string()]
        );
        assert_eq!(table.footer_lines, vec!["НДС: 100,00".to_string()]);
        assert_eq!(table.quantity_total, 35);
        assert_eq!(table.amount_total, 3450.5);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.column_titles.len(), 5);
        assert_eq!(table.totals_mode, TotalsMode::Precomputed);
    }
}
