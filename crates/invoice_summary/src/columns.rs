use models::{ColumnIndex, ColumnMarkers, Field};
use tracing::debug;

use crate::{Result, SummaryError};

/// Resolves every line-item field to the first column (left to right) whose
/// title contains one of the field's markers, ignoring case.
pub fn resolve(header_row: &[String], markers: &ColumnMarkers) -> Result<ColumnIndex> {
    let columns = ColumnIndex {
        order_no: find_column(header_row, Field::OrderNo, markers)?,
        product: find_column(header_row, Field::Product, markers)?,
        quantity: find_column(header_row, Field::Quantity, markers)?,
        ship_unit: find_column(header_row, Field::ShipUnit, markers)?,
        total: find_column(header_row, Field::Total, markers)?,
    };
    debug!(?columns, "resolved line-item columns");
    Ok(columns)
}

fn find_column(header_row: &[String], field: Field, markers: &ColumnMarkers) -> Result<usize> {
    let wanted: Vec<String> = markers
        .markers(field)
        .iter()
        .filter(|m| !m.is_empty())
        .map(|m| m.to_lowercase())
        .collect();

    header_row
        .iter()
        .position(|title| {
            let title = title.to_lowercase();
            wanted.iter().any(|m| title.contains(m.as_str()))
        })
        .ok_or(SummaryError::ColumnNotFound(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(titles: &[&str]) -> Vec<String> {
        titles.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_resolve_russian_header() {
        let row = header(&["", "№", "Товар", "Мест", "Количество", "Цена", "Сумма, руб."]);
        let columns = resolve(&row, &ColumnMarkers::default()).unwrap();

        assert_eq!(
            columns,
            ColumnIndex {
                order_no: 1,
                product: 2,
                quantity: 4,
                ship_unit: 3,
                total: 6,
            }
        );
        assert_eq!(columns.get(Field::Total), 6);
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let row = header(&["NO.", "ITEM DESCRIPTION", "qty shipped", "UNIT", "LINE TOTAL"]);
        let columns = resolve(&row, &ColumnMarkers::default()).unwrap();

        assert_eq!(columns.order_no, 0);
        assert_eq!(columns.product, 1);
        assert_eq!(columns.quantity, 2);
        assert_eq!(columns.ship_unit, 3);
        assert_eq!(columns.total, 4);
    }

    #[test]
    fn test_first_matching_column_wins() {
        let row = header(&["№", "Товар", "Мест", "Количество", "Количество мест", "Сумма", "Сумма с НДС"]);
        let columns = resolve(&row, &ColumnMarkers::default()).unwrap();

        assert_eq!(columns.quantity, 3);
        assert_eq!(columns.ship_unit, 2);
        assert_eq!(columns.total, 5);
    }

    #[test]
    fn test_missing_total_column() {
        let row = header(&["", "№", "Товар", "Мест", "Количество", "Цена"]);
        let err = resolve(&row, &ColumnMarkers::default()).unwrap_err();

        assert!(matches!(err, SummaryError::ColumnNotFound(Field::Total)));
    }
}
