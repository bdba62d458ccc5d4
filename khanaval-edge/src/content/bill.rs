//! Customer bill with GST

use khanaval_printer::ReceiptLayout;
use rust_decimal::Decimal;
use shared::models::{MenuCatalog, Order};
use shared::util::short_id;

use super::{ContentResult, DocumentOptions, format_currency, line_total, resolve_lines};
use crate::utils::time::{format_date, format_time};

/// Flat GST applied to every bill
pub const GST_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

const QTY_COL: usize = 4;
const AMOUNT_COL: usize = 11;

/// Subtotal, tax and grand total of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillTotals {
    pub subtotal: Decimal,
    pub gst: Decimal,
    pub total: Decimal,
}

impl BillTotals {
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let gst = subtotal * GST_RATE;
        Self {
            subtotal,
            gst,
            total: subtotal + gst,
        }
    }
}

/// Totals over the lines the catalog can price
pub fn bill_totals(
    order: &Order,
    catalog: &MenuCatalog,
    opts: &DocumentOptions,
) -> ContentResult<BillTotals> {
    let subtotal = resolve_lines(order, catalog, opts.catalog_mode)?
        .into_iter()
        .map(|(item, menu_item)| line_total(item, menu_item))
        .sum();
    Ok(BillTotals::from_subtotal(subtotal))
}

/// Render the bill handed to the customer
pub fn bill(order: &Order, catalog: &MenuCatalog, opts: &DocumentOptions) -> ContentResult<String> {
    let lines = resolve_lines(order, catalog, opts.catalog_mode)?;
    let totals = BillTotals::from_subtotal(
        lines
            .iter()
            .map(|(item, menu_item)| line_total(item, menu_item))
            .sum(),
    );

    let name_col = opts.width.saturating_sub(QTY_COL + AMOUNT_COL + 2);
    let mut l = ReceiptLayout::new(opts.width);

    l.line(&opts.restaurant_name);
    l.center("Bill Receipt");
    l.eq_sep();
    l.pair("Order #:", short_id(&order.id));
    l.pair("Table:", &order.table_number.to_string());
    l.pair("Date:", &format_date(order.created_at, opts.timezone));
    l.pair("Time:", &format_time(order.created_at, opts.timezone));
    if let Some(customer) = order.customer_name.as_deref().filter(|c| !c.is_empty()) {
        l.pair("Customer:", customer);
    }
    if order.is_take_away {
        l.center("*** TAKE AWAY ***");
    }
    l.dash_sep();
    l.columns(&[("ITEM", name_col), ("QTY", QTY_COL), ("AMOUNT", AMOUNT_COL)]);
    for (item, menu_item) in &lines {
        l.columns(&[
            (menu_item.name_en.as_str(), name_col),
            (item.quantity.to_string().as_str(), QTY_COL),
            (format_currency(line_total(item, menu_item)).as_str(), AMOUNT_COL),
        ]);
    }
    l.dash_sep();
    l.pair("Subtotal:", &format_currency(totals.subtotal));
    l.pair(&format!("GST ({}%):", gst_percent()), &format_currency(totals.gst));
    l.eq_sep();
    l.pair("TOTAL:", &format_currency(totals.total));
    l.eq_sep();
    l.center("Thank you for dining with us!");
    l.center("Please visit again.");

    Ok(l.finalize())
}

fn gst_percent() -> Decimal {
    (GST_RATE * Decimal::ONE_HUNDRED).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;
    use shared::models::PaperWidth;

    #[test]
    fn test_totals_five_percent() {
        let totals =
            bill_totals(&fixtures::order(), &fixtures::catalog(), &fixtures::options()).unwrap();
        assert_eq!(totals.subtotal, Decimal::from(250));
        assert_eq!(totals.gst, Decimal::new(1250, 2));
        assert_eq!(totals.total, Decimal::new(26250, 2));
    }

    #[test]
    fn test_bill_layout_80mm() {
        let text = bill(&fixtures::order(), &fixtures::catalog(), &fixtures::options()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "JAYESH MACHHI KHANAVAL");
        assert!(lines.iter().all(|line| line.chars().count() <= 48));
        assert!(lines.contains(&"Surmai Fry                         2     ₹200.00"));
        assert!(lines.contains(&format!("TOTAL:{}₹262.50", " ".repeat(35)).as_str()));
        assert!(lines.contains(&format!("GST (5%):{}₹12.50", " ".repeat(33)).as_str()));
        assert!(text.contains("Thank you for dining with us!"));
    }

    #[test]
    fn test_bill_fits_58mm() {
        let opts = fixtures::options().with_paper(PaperWidth::Mm58);
        let mut order = fixtures::order();
        order.is_take_away = true;
        let text = bill(&order, &fixtures::catalog(), &opts).unwrap();

        assert!(text.lines().all(|line| line.chars().count() <= 32));
        assert!(text.contains("*** TAKE AWAY ***"));
        assert!(text.contains("₹262.50"));
    }
}
