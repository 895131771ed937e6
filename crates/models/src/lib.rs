use serde::{Deserialize, Serialize};
use std::fmt;

// Source grid models

/// One cell of the source sheet. `None` is an absent/blank cell, `Some("")` an empty string.
pub type Cell = Option<String>;
pub type GridRow = Vec<Cell>;

/// Immutable text snapshot of the first worksheet, indexed by absolute (row, column).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
	rows: Vec<GridRow>,
}

impl RawGrid {
	pub fn new(rows: Vec<GridRow>) -> Self {
		Self { rows }
	}

	/// Builds a grid from string literals, treating `""` as an absent cell.
	pub fn from_strs(rows: &[&[&str]]) -> Self {
		let rows = rows
			.iter()
			.map(|row| {
				row.iter()
					.map(|s| if s.is_empty() { None } else { Some((*s).to_string()) })
					.collect()
			})
			.collect();
		Self { rows }
	}

	pub fn rows(&self) -> &[GridRow] {
		&self.rows
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn row(&self, idx: usize) -> Option<&[Cell]> {
		self.rows.get(idx).map(Vec::as_slice)
	}

	/// Text of a present cell; `None` for absent cells and out-of-range positions.
	pub fn text(&self, row: usize, col: usize) -> Option<&str> {
		self.row(row).and_then(|cells| cell_text(cells, col))
	}
}

pub fn cell_text(cells: &[Cell], col: usize) -> Option<&str> {
	cells.get(col).and_then(|c| c.as_deref())
}

/// Absent, empty and whitespace-only cells are all blank.
pub fn is_blank(cell: Option<&str>) -> bool {
	cell.map_or(true, |s| s.trim().is_empty())
}

// Metadata models

/// Ordered label-key → value mapping. Every configured key is always present;
/// unmatched keys hold an empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metadata {
	entries: Vec<(String, String)>,
}

pub type HeaderMetadata = Metadata;
pub type FooterMetadata = Metadata;

impl Metadata {
	pub fn with_keys<'a, I>(keys: I) -> Self
	where
		I: IntoIterator<Item = &'a str>,
	{
		Self {
			entries: keys.into_iter().map(|k| (k.to_string(), String::new())).collect(),
		}
	}

	/// Overwrites the value of `key`, appending the key if it was not configured.
	pub fn set(&mut self, key: &str, value: impl Into<String>) {
		let value = value.into();
		match self.entries.iter_mut().find(|(k, _)| k == key) {
			Some((_, v)) => *v = value,
			None => self.entries.push((key.to_string(), value)),
		}
	}

	pub fn get(&self, key: &str) -> &str {
		self.entries
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
			.unwrap_or("")
	}

	pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Non-empty values in key order.
	pub fn filled_values(&self) -> Vec<String> {
		self.entries
			.iter()
			.filter(|(_, v)| !v.is_empty())
			.map(|(_, v)| v.clone())
			.collect()
	}
}

// Column models

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
	OrderNo,
	Product,
	Quantity,
	ShipUnit,
	Total,
}

impl Field {
	pub const ALL: [Field; 5] = [
		Field::OrderNo,
		Field::Product,
		Field::Quantity,
		Field::ShipUnit,
		Field::Total,
	];
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Field::OrderNo => "OrderNo",
			Field::Product => "Product",
			Field::Quantity => "Quantity",
			Field::ShipUnit => "ShipUnit",
			Field::Total => "Total",
		};
		f.write_str(name)
	}
}

/// Zero-based column positions of the resolved line-item fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnIndex {
	pub order_no: usize,
	pub product: usize,
	pub quantity: usize,
	pub ship_unit: usize,
	pub total: usize,
}

impl ColumnIndex {
	pub fn get(&self, field: Field) -> usize {
		match field {
			Field::OrderNo => self.order_no,
			Field::Product => self.product,
			Field::Quantity => self.quantity,
			Field::ShipUnit => self.ship_unit,
			Field::Total => self.total,
		}
	}
}

// Line item / output models

/// One parsed table row, alive only while aggregating.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
	/// 1-based sheet row number, for diagnostics.
	pub row: usize,
	pub name: String,
	pub ship_unit: String,
	pub quantity: i64,
	pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductGroup {
	pub seq: usize,
	pub name: String,
	pub ship_unit: String,
	pub quantity: i64,
	pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
	MalformedQuantity,
	MalformedTotal,
	/// Quantity that would overflow its group's or the invoice's running sum.
	QuantityOverflow,
}

impl fmt::Display for IssueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IssueKind::MalformedQuantity => f.write_str("malformed quantity"),
			IssueKind::MalformedTotal => f.write_str("malformed total"),
			IssueKind::QuantityOverflow => f.write_str("quantity sum overflow"),
		}
	}
}

/// A data row left out of aggregation under the skip-row policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
	pub row: usize,
	pub kind: IssueKind,
	pub value: String,
}

// Report models

/// Finished table handed to the report renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
	pub sheet_name: String,
	pub header_lines: Vec<String>,
	pub column_titles: Vec<String>,
	pub rows: Vec<ProductGroup>,
	pub totals_label: String,
	pub quantity_total: i64,
	pub amount_total: f64,
	pub totals_mode: TotalsMode,
	pub footer_lines: Vec<String>,
}

// Settings models

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub layout: LayoutSettings,
	pub labels: LabelSettings,
	pub columns: ColumnMarkers,
	pub canonical: CanonicalRules,
	pub aggregation: AggregationSettings,
	pub report: ReportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
	/// Leading rows scanned for header metadata.
	pub header_window: usize,
	/// Trailing rows scanned for footer metadata.
	pub footer_window: usize,
	/// 0-based row holding the line-item column titles.
	pub table_header_row: usize,
	pub sentinel_column: usize,
	pub sentinel_value: String,
}

impl Default for LayoutSettings {
	fn default() -> Self {
		Self {
			header_window: 7,
			footer_window: 8,
			table_header_row: 7,
			sentinel_column: 1,
			sentinel_value: "1".to_string(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
	pub key: String,
	pub markers: Vec<String>,
	/// Standalone labels carry their value in the label cell itself.
	#[serde(default)]
	pub standalone: bool,
}

impl LabelSpec {
	pub fn new(key: &str, markers: &[&str], standalone: bool) -> Self {
		Self {
			key: key.to_string(),
			markers: to_strings(markers),
			standalone,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
	pub header: Vec<LabelSpec>,
	pub footer: Vec<LabelSpec>,
}

impl Default for LabelSettings {
	fn default() -> Self {
		Self {
			header: vec![
				LabelSpec::new(
					"invoice-number",
					&["Накладная №", "Счет №", "Счет на оплату №", "Invoice No"],
					true,
				),
				LabelSpec::new("supplier", &["Поставщик", "Supplier"], false),
				LabelSpec::new("buyer", &["Покупатель", "Buyer"], false),
			],
			footer: vec![
				LabelSpec::new("total-declared", &["Итого:", "Total:"], false),
				LabelSpec::new("tax", &["НДС:", "В том числе НДС", "VAT:"], false),
				LabelSpec::new("items-summary", &["Всего наименований", "Total items"], true),
			],
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMarkers {
	pub order_no: Vec<String>,
	pub product: Vec<String>,
	pub quantity: Vec<String>,
	pub ship_unit: Vec<String>,
	pub total: Vec<String>,
}

impl ColumnMarkers {
	pub fn markers(&self, field: Field) -> &[String] {
		match field {
			Field::OrderNo => &self.order_no,
			Field::Product => &self.product,
			Field::Quantity => &self.quantity,
			Field::ShipUnit => &self.ship_unit,
			Field::Total => &self.total,
		}
	}
}

impl Default for ColumnMarkers {
	fn default() -> Self {
		Self {
			order_no: to_strings(&["№", "No"]),
			product: to_strings(&["Товар", "Item"]),
			quantity: to_strings(&["Количество", "Qty"]),
			ship_unit: to_strings(&["Мест", "Ед.изм", "Unit"]),
			total: to_strings(&["Сумма", "Total"]),
		}
	}
}

/// Vocabulary for product-name canonicalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonicalRules {
	pub sole_markers: Vec<String>,
	pub insole_markers: Vec<String>,
	pub material_codes: Vec<String>,
}

impl Default for CanonicalRules {
	fn default() -> Self {
		Self {
			sole_markers: to_strings(&["подошва", "sole"]),
			insole_markers: to_strings(&["стелька", "insole"]),
			material_codes: to_strings(&["ПУ", "ТЭП", "ЭВА"]),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
	/// Group contiguous rows in sheet order.
	#[default]
	AsGiven,
	/// Stable-sort rows by canonical name (case-insensitive) before grouping.
	SortedByCanonicalName,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipUnitPolicy {
	#[default]
	CopyFromColumn,
	FixedLabel(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
	/// Leave the row out and record a `RowIssue`.
	#[default]
	SkipRow,
	Abort,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
	pub order: GroupOrder,
	pub ship_unit: ShipUnitPolicy,
	pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalsMode {
	#[default]
	Formula,
	Precomputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
	pub output_prefix: String,
	pub sheet_name: String,
	pub column_titles: Vec<String>,
	pub totals_label: String,
	pub totals: TotalsMode,
}

impl Default for ReportSettings {
	fn default() -> Self {
		Self {
			output_prefix: "s_".to_string(),
			sheet_name: "Сводка".to_string(),
			column_titles: to_strings(&["№", "Товар", "Ед.", "Количество", "Сумма"]),
			totals_label: "Итого".to_string(),
			totals: TotalsMode::Formula,
		}
	}
}

fn to_strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_grid_distinguishes_absent_from_empty() {
		let grid = RawGrid::new(vec![vec![None, Some(String::new()), Some(" x ".to_string())]]);
		assert_eq!(grid.text(0, 0), None);
		assert_eq!(grid.text(0, 1), Some(""));
		assert_eq!(grid.text(0, 2), Some(" x "));
		assert_eq!(grid.text(3, 0), None);
		assert!(is_blank(grid.text(0, 1)));
		assert!(!is_blank(grid.text(0, 2)));
	}

	#[test]
	fn test_metadata_missing_key_is_empty_string() {
		let mut meta = Metadata::with_keys(["supplier", "buyer"]);
		meta.set("buyer", "Покупатель ООО Ромашка");
		meta.set("buyer", "Покупатель ООО Лютик");
		assert_eq!(meta.get("supplier"), "");
		assert_eq!(meta.get("unknown"), "");
		assert_eq!(meta.get("buyer"), "Покупатель ООО Лютик");
		assert_eq!(meta.filled_values(), vec!["Покупатель ООО Лютик".to_string()]);
	}

	#[test]
	fn test_settings_partial_json_keeps_defaults() {
		let json = r#"{
			"aggregation": { "order": "sorted_by_canonical_name", "ship_unit": { "fixed_label": "пар." } },
			"layout": { "table_header_row": 9 }
		}"#;
		let settings: Settings = serde_json::from_str(json).unwrap();
		assert_eq!(settings.aggregation.order, GroupOrder::SortedByCanonicalName);
		assert_eq!(settings.aggregation.ship_unit, ShipUnitPolicy::FixedLabel("пар.".to_string()));
		assert_eq!(settings.aggregation.on_malformed, MalformedPolicy::SkipRow);
		assert_eq!(settings.layout.table_header_row, 9);
		assert_eq!(settings.layout.footer_window, 8);
		assert_eq!(settings.columns, ColumnMarkers::default());
	}
}
