use models::{
    cell_text, AggregationSettings, CanonicalRules, ColumnIndex, GridRow, GroupOrder, IssueKind,
    LineItem, MalformedPolicy, ProductGroup, RowIssue, ShipUnitPolicy,
};
use tracing::{debug, warn};

use crate::canonical::{capitalize_words, canonicalize_with};
use crate::{Result, SummaryError};

/// Output of one aggregation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    pub groups: Vec<ProductGroup>,
    /// Rows left out under [`MalformedPolicy::SkipRow`].
    pub issues: Vec<RowIssue>,
    /// Rows skipped because their canonical name was empty.
    pub blank_rows: usize,
}

impl Aggregation {
    /// Grand quantity. The aggregator checks the running grand total while
    /// grouping, so this only saturates for hand-built values.
    pub fn quantity_total(&self) -> i64 {
        self.groups
            .iter()
            .fold(0i64, |acc, g| acc.saturating_add(g.quantity))
    }

    pub fn amount_total(&self) -> f64 {
        self.groups.iter().map(|g| g.total).sum()
    }
}

pub struct Aggregator<'a> {
    columns: ColumnIndex,
    rules: &'a CanonicalRules,
    settings: &'a AggregationSettings,
}

impl<'a> Aggregator<'a> {
    pub fn new(columns: ColumnIndex, rules: &'a CanonicalRules, settings: &'a AggregationSettings) -> Self {
        Self {
            columns,
            rules,
            settings,
        }
    }

    /// Groups line-item rows by canonical name.
    ///
    /// `first_row` is the 0-based sheet index of `rows[0]` and only feeds the
    /// row numbers reported in issues and errors.
    pub fn aggregate(&self, rows: &[GridRow], first_row: usize) -> Result<Aggregation> {
        let mut items = Vec::with_capacity(rows.len());
        let mut issues = Vec::new();
        let mut blank_rows = 0usize;

        for (offset, cells) in rows.iter().enumerate() {
            let row_number = first_row + offset + 1;
            match self.parse_row(row_number, cells) {
                Ok(Some(item)) => items.push(item),
                Ok(None) => blank_rows += 1,
                Err(issue) => match self.settings.on_malformed {
                    MalformedPolicy::Abort => return Err(issue.into()),
                    MalformedPolicy::SkipRow => {
                        warn!(row = issue.row, value = %issue.value, "skipping row: {}", issue.kind);
                        issues.push(issue);
                    }
                },
            }
        }

        if self.settings.order == GroupOrder::SortedByCanonicalName {
            // stable: equal names keep sheet order
            items.sort_by_cached_key(|item| item.name.to_lowercase());
        }

        let (groups, overflows) = group_items(items, self.settings.on_malformed)?;
        issues.extend(overflows);
        issues.sort_by_key(|issue| issue.row);
        debug!(groups = groups.len(), issues = issues.len(), blank_rows, "aggregated line items");

        Ok(Aggregation {
            groups,
            issues,
            blank_rows,
        })
    }

    /// `Ok(None)` for rows without a product name.
    fn parse_row(&self, row: usize, cells: &[Option<String>]) -> std::result::Result<Option<LineItem>, RowIssue> {
        let raw_name = cell_text(cells, self.columns.product).unwrap_or_default();
        let name = capitalize_words(&canonicalize_with(raw_name, self.rules));
        if name.is_empty() {
            return Ok(None);
        }

        let quantity_cell = cell_text(cells, self.columns.quantity);
        let quantity = parse_quantity(quantity_cell).ok_or_else(|| RowIssue {
            row,
            kind: IssueKind::MalformedQuantity,
            value: quantity_cell.unwrap_or_default().to_string(),
        })?;

        let total_cell = cell_text(cells, self.columns.total);
        let total = parse_total(total_cell).ok_or_else(|| RowIssue {
            row,
            kind: IssueKind::MalformedTotal,
            value: total_cell.unwrap_or_default().to_string(),
        })?;

        let ship_unit = match &self.settings.ship_unit {
            ShipUnitPolicy::CopyFromColumn => cell_text(cells, self.columns.ship_unit)
                .unwrap_or_default()
                .to_string(),
            ShipUnitPolicy::FixedLabel(label) => label.clone(),
        };

        Ok(Some(LineItem {
            row,
            name,
            ship_unit,
            quantity,
            total,
        }))
    }
}

/// Quantity from the first whitespace-delimited token. Blank is 0; `None` when not an integer.
pub fn parse_quantity(cell: Option<&str>) -> Option<i64> {
    match cell.and_then(|s| s.split_whitespace().next()) {
        Some(token) => token.parse::<i64>().ok(),
        None => Some(0),
    }
}

/// Decimal total. Blank is 0; whitespace is dropped and a comma read as the decimal point.
pub fn parse_total(cell: Option<&str>) -> Option<f64> {
    let Some(raw) = cell.filter(|s| !s.trim().is_empty()) else {
        return Some(0.0);
    };
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// The group currently being accumulated.
#[derive(Debug)]
struct OpenGroup {
    name: String,
    ship_unit: String,
    quantity: i64,
    total: f64,
}

impl OpenGroup {
    fn open(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            ship_unit: item.ship_unit.clone(),
            quantity: 0,
            total: 0.0,
        }
    }

    /// Caller has already checked that the quantity fits.
    fn add(&mut self, item: &LineItem) {
        self.quantity += item.quantity;
        self.total += item.total;
    }

    fn close(self, seq: usize) -> ProductGroup {
        ProductGroup {
            seq,
            name: self.name,
            ship_unit: self.ship_unit,
            quantity: self.quantity,
            total: self.total,
        }
    }
}

#[derive(Default)]
struct Grouping {
    groups: Vec<ProductGroup>,
    open: Option<OpenGroup>,
    /// Running grand quantity, kept checked so group sums can never overflow.
    quantity: i64,
    overflows: Vec<RowIssue>,
}

/// Folds items into groups, closing the open group whenever the name changes.
/// Equal names that are not adjacent end up in separate groups.
///
/// A row whose quantity would overflow its group or the grand total is handled
/// like a malformed row: recorded and left out under
/// [`MalformedPolicy::SkipRow`], fatal under [`MalformedPolicy::Abort`].
pub fn group_items<I>(items: I, on_malformed: MalformedPolicy) -> Result<(Vec<ProductGroup>, Vec<RowIssue>)>
where
    I: IntoIterator<Item = LineItem>,
{
    let mut state = items
        .into_iter()
        .try_fold(Grouping::default(), |mut state, item| {
            let group_quantity = match &state.open {
                Some(group) if group.name == item.name => group.quantity,
                _ => 0,
            };
            let fits = group_quantity.checked_add(item.quantity).is_some()
                && state.quantity.checked_add(item.quantity).is_some();
            if !fits {
                let issue = RowIssue {
                    row: item.row,
                    kind: IssueKind::QuantityOverflow,
                    value: item.quantity.to_string(),
                };
                return match on_malformed {
                    MalformedPolicy::Abort => Err(SummaryError::from(issue)),
                    MalformedPolicy::SkipRow => {
                        warn!(row = issue.row, value = %issue.value, "skipping row: {}", issue.kind);
                        state.overflows.push(issue);
                        Ok(state)
                    }
                };
            }

            let mut current = match state.open.take() {
                Some(group) if group.name == item.name => group,
                Some(group) => {
                    let seq = state.groups.len() + 1;
                    state.groups.push(group.close(seq));
                    OpenGroup::open(&item)
                }
                None => OpenGroup::open(&item),
            };
            current.add(&item);
            state.quantity += item.quantity;
            state.open = Some(current);
            Ok::<_, SummaryError>(state)
        })?;

    if let Some(group) = state.open.take() {
        let seq = state.groups.len() + 1;
        state.groups.push(group.close(seq));
    }
    Ok((state.groups, state.overflows))
}
