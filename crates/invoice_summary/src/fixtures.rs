use models::RawGrid;

/// A small invoice export: seven metadata rows, the column-title row, four
/// line items for two canonical products, a blank row and a three-line footer.
pub(crate) fn invoice_grid() -> RawGrid {
    RawGrid::from_strs(&[
        &["", "Расходная накладная № 118 от 12.03.2024"],
        &[],
        &["", "Поставщик:", "", "ООО \"Подошва-Юг\", ИНН 6164000000"],
        &[],
        &["", "Покупатель:", "", "ИП Сидоров А.В."],
        &[],
        &[],
        &["", "№", "Товар", "Мест", "Количество", "Цена", "Сумма"],
        &["", "1", "подошва ЭВА черная 40-45", "пар.", "10 пар", "150", "1500"],
        &["", "2", "Подошва черная ЭВА 36", "пар.", "5", "150", "750"],
        &["", "3", "Стелька кожаная 42", "пар.", "20", "40", "800"],
        &["", "4", "стелька КОЖАНАЯ 38", "пар.", "", "40", "400,50"],
        &[],
        &["", "Итого:", "", "", "", "", "3450,50"],
        &["", "В том числе НДС:", "", "", "", "", "575,08"],
        &["", "Всего наименований 4, на сумму 3 450,50 руб."],
    ])
}
