//! Monthly sales aggregation and report

use std::collections::HashMap;

use chrono::NaiveDate;
use khanaval_printer::ReceiptLayout;
use rust_decimal::Decimal;
use shared::models::{ItemSales, MenuCatalog, Order, OrderStatus, SalesSummary};

use super::{ContentResult, DocumentOptions, format_currency, line_total, resolve_lines};
use crate::utils::time::{format_month, in_month};

const QTY_COL: usize = 5;
const REVENUE_COL: usize = 11;

/// Aggregate the orders placed in `month` (business timezone)
///
/// Cancelled orders are left out. Items are ranked by units sold; ties keep
/// the order in which the item was first sold.
pub fn summarize_sales(
    orders: &[Order],
    catalog: &MenuCatalog,
    month: NaiveDate,
    opts: &DocumentOptions,
) -> ContentResult<SalesSummary> {
    let mut summary = SalesSummary::default();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for order in orders.iter().filter(|o| {
        o.status != OrderStatus::Cancelled && in_month(o.created_at, month, opts.timezone)
    }) {
        summary.order_count += 1;
        for (item, menu_item) in resolve_lines(order, catalog, opts.catalog_mode)? {
            let amount = line_total(item, menu_item);
            summary.total_sales += amount;
            summary.total_items += u64::from(item.quantity);

            let slot = *index.entry(menu_item.id.as_str()).or_insert_with(|| {
                summary.by_item.push(ItemSales {
                    item_id: menu_item.id.clone(),
                    item_name: menu_item.name_en.clone(),
                    quantity: 0,
                    revenue: Decimal::ZERO,
                });
                summary.by_item.len() - 1
            });
            let entry = &mut summary.by_item[slot];
            entry.quantity += u64::from(item.quantity);
            entry.revenue += amount;
        }
    }

    summary.by_item.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    Ok(summary)
}

pub fn sales_report(summary: &SalesSummary, month: NaiveDate, opts: &DocumentOptions) -> String {
    let name_col = opts.width.saturating_sub(QTY_COL + REVENUE_COL + 2);
    let mut l = ReceiptLayout::new(opts.width);

    l.line("SALES REPORT");
    l.center(&opts.restaurant_name);
    l.center(&format_month(month));
    l.eq_sep();
    l.pair("Orders:", &summary.order_count.to_string());
    l.pair("Items sold:", &summary.total_items.to_string());
    l.pair("Total sales:", &format_currency(summary.total_sales));
    l.pair("Avg order value:", &format_currency(summary.average_order_value()));

    if summary.by_item.is_empty() {
        l.dash_sep();
        l.line("No sales this month");
        return l.finalize();
    }

    let row = |l: &mut ReceiptLayout, item: &ItemSales| {
        let qty = item.quantity.to_string();
        let revenue = format_currency(item.revenue);
        l.columns(&[
            (item.item_name.as_str(), name_col),
            (qty.as_str(), QTY_COL),
            (revenue.as_str(), REVENUE_COL),
        ]);
    };

    l.dash_sep();
    l.line("TOP SELLERS");
    for item in summary.top_sellers() {
        row(&mut l, item);
    }
    l.dash_sep();
    l.line("LOW SELLERS");
    for item in summary.low_sellers() {
        row(&mut l, item);
    }

    l.finalize()
}
