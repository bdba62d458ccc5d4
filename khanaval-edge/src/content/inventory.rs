//! Stock report for the inventory printer

use chrono::{DateTime, Utc};
use khanaval_printer::ReceiptLayout;
use shared::models::{InventoryItem, inventory_value};

use super::{DocumentOptions, format_currency};
use crate::utils::time::{format_date, format_time};

const QTY_COL: usize = 10;
const VALUE_COL: usize = 11;

/// Stock on hand, grouped by category, low stock flagged with `!`
pub fn inventory_report(
    items: &[InventoryItem],
    generated_at: DateTime<Utc>,
    opts: &DocumentOptions,
) -> String {
    let mut sorted: Vec<&InventoryItem> = items.iter().collect();
    sorted.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));

    let name_col = opts.width.saturating_sub(QTY_COL + VALUE_COL + 2);
    let mut l = ReceiptLayout::new(opts.width);

    l.line("INVENTORY REPORT");
    l.center(&opts.restaurant_name);
    l.center(&format!(
        "{} {}",
        format_date(generated_at, opts.timezone),
        format_time(generated_at, opts.timezone)
    ));
    l.eq_sep();

    let mut category: Option<&str> = None;
    for item in &sorted {
        if category != Some(item.category.as_str()) {
            if category.is_some() {
                l.blank();
            }
            l.line(&format!("[{}]", item.category.to_uppercase()));
            category = Some(item.category.as_str());
        }
        let flag = if item.is_low_stock() { "!" } else { "" };
        let qty = format!("{}{} {}", flag, item.quantity.normalize(), item.unit);
        l.columns(&[
            (item.name.as_str(), name_col),
            (qty.as_str(), QTY_COL),
            (format_currency(item.stock_value()).as_str(), VALUE_COL),
        ]);
    }

    let low: Vec<&&InventoryItem> = sorted.iter().filter(|i| i.is_low_stock()).collect();

    l.dash_sep();
    l.pair("Items:", &items.len().to_string());
    l.pair("Low stock:", &low.len().to_string());
    l.pair("Total value:", &format_currency(inventory_value(items)));

    if !low.is_empty() {
        l.eq_sep();
        l.line("REORDER:");
        for item in low {
            l.line(&format!(
                "- {}: {} {} (min {})",
                item.name,
                item.quantity.normalize(),
                item.unit,
                item.min_level.normalize()
            ));
        }
    }

    l.finalize()
}
