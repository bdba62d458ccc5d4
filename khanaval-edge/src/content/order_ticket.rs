//! Kitchen order ticket (KOT)

use khanaval_printer::ReceiptLayout;
use rust_decimal::Decimal;
use shared::models::{MenuCatalog, Order};
use shared::util::short_id;

use super::{ContentResult, DocumentOptions, format_currency, line_total, resolve_lines};
use crate::utils::time::{format_date, format_time};

/// Render the ticket sent to the kitchen printer
pub fn order_ticket(
    order: &Order,
    catalog: &MenuCatalog,
    opts: &DocumentOptions,
) -> ContentResult<String> {
    let lines = resolve_lines(order, catalog, opts.catalog_mode)?;
    let mut l = ReceiptLayout::new(opts.width);

    l.line(&opts.restaurant_name);
    l.center("KITCHEN ORDER");
    l.dash_sep();
    l.line(&format!("Order ID: {}", short_id(&order.id)));
    l.line(&format!("Table: {}", order.table_number));
    if let Some(customer) = order.customer_name.as_deref().filter(|c| !c.is_empty()) {
        l.line(&format!("Customer: {customer}"));
    }
    l.line(&format!("Time: {}", format_time(order.created_at, opts.timezone)));
    l.line(&format!("Date: {}", format_date(order.created_at, opts.timezone)));
    if order.is_take_away {
        l.center("*** TAKE AWAY ***");
    }
    l.dash_sep();
    l.line("Items:");

    let mut total = Decimal::ZERO;
    for (item, menu_item) in &lines {
        total += line_total(item, menu_item);
        l.line(&format!(
            "{} x {} ({})",
            item.quantity,
            menu_item.name_en,
            format_currency(menu_item.price)
        ));
        if let Some(note) = item.notes.as_deref().filter(|n| !n.is_empty()) {
            l.line(&format!("  Note: {note}"));
        }
    }

    l.dash_sep();
    l.line(&format!("Total: {}", format_currency(total)));
    l.dash_sep();

    if let Some(notes) = order.notes.as_deref().filter(|n| !n.is_empty()) {
        l.line(&format!("Order Notes: {notes}"));
    }

    Ok(l.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::fixtures;
    use crate::content::{CatalogMode, ContentError};
    use shared::models::OrderItem;

    #[test]
    fn test_ticket_layout() {
        let mut order = fixtures::order();
        order.notes = Some("Table near window".to_string());
        let text = order_ticket(&order, &fixtures::catalog(), &fixtures::options()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "JAYESH MACHHI KHANAVAL");
        assert!(lines.contains(&"Order ID: a1b2c3d4"));
        assert!(lines.contains(&"Table: 4"));
        assert!(lines.contains(&"Time: 12:35"));
        assert!(lines.contains(&"Date: 16/10/2026"));
        assert!(lines.contains(&"2 x Surmai Fry (₹100.00)"));
        assert!(lines.contains(&"  Note: extra spicy"));
        assert!(lines.contains(&"1 x Solkadhi (₹50.00)"));
        assert!(lines.contains(&"Total: ₹250.00"));
        assert_eq!(lines.last(), Some(&"Order Notes: Table near window"));
        assert!(!text.contains("TAKE AWAY"));
    }

    #[test]
    fn test_unknown_item_skipped_or_rejected() {
        let mut order = fixtures::order();
        order.items.push(OrderItem::new("retired-dish", 1));
        order.is_take_away = true;

        let text = order_ticket(&order, &fixtures::catalog(), &fixtures::options()).unwrap();
        assert!(text.contains("Total: ₹250.00"));
        assert!(text.contains("*** TAKE AWAY ***"));

        let strict = fixtures::options().with_catalog_mode(CatalogMode::Strict);
        assert!(matches!(
            order_ticket(&order, &fixtures::catalog(), &strict),
            Err(ContentError::UnknownMenuItem { .. })
        ));
    }
}
