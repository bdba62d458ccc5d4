//! Document generators
//!
//! Pure functions turning orders, inventory and staff records into the
//! plain receipt text handed to the print service. The first line of every
//! document is its header; the formatter prints it enlarged and centered.
//!
//! Line items reference the menu catalog by id. What happens to an id the
//! catalog does not know is governed by [`CatalogMode`].

mod attendance;
mod bill;
mod inventory;
mod order_ticket;
mod sales;
mod test_page;

pub use attendance::attendance_report;
pub use bill::{BillTotals, GST_RATE, bill, bill_totals};
pub use inventory::inventory_report;
pub use order_ticket::order_ticket;
pub use sales::{sales_report, summarize_sales};
pub use test_page::test_page;

use std::fmt;
use std::str::FromStr;

use chrono_tz::Tz;
use rust_decimal::{Decimal, RoundingStrategy};
use shared::models::{MenuCatalog, MenuItem, Order, OrderItem, PaperWidth};
use thiserror::Error;
use tracing::warn;

use crate::core::Config;

/// Handling of order lines whose menu item is missing from the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogMode {
    /// Skip the line and log a warning
    #[default]
    Lenient,
    /// Refuse to build the document
    Strict,
}

impl CatalogMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for CatalogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("Unknown catalog mode: {other}")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("Order {order_id} references unknown menu item {menu_item_id}")]
    UnknownMenuItem {
        order_id: String,
        menu_item_id: String,
    },
}

pub type ContentResult<T> = Result<T, ContentError>;

/// Layout and lookup settings shared by all generators
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    pub restaurant_name: String,
    pub timezone: Tz,
    pub catalog_mode: CatalogMode,
    /// Characters per line
    pub width: usize,
}

impl DocumentOptions {
    pub fn new(restaurant_name: impl Into<String>, timezone: Tz) -> Self {
        Self {
            restaurant_name: restaurant_name.into(),
            timezone,
            catalog_mode: CatalogMode::default(),
            width: PaperWidth::default().columns(),
        }
    }

    /// Options for a printer with `paper` width
    pub fn from_config(config: &Config, paper: PaperWidth) -> Self {
        Self {
            restaurant_name: config.restaurant_name.clone(),
            timezone: config.timezone,
            catalog_mode: config.catalog_mode,
            width: paper.columns(),
        }
    }

    pub fn with_catalog_mode(mut self, mode: CatalogMode) -> Self {
        self.catalog_mode = mode;
        self
    }

    pub fn with_paper(mut self, paper: PaperWidth) -> Self {
        self.width = paper.columns();
        self
    }
}

/// `₹1234.50` (two decimals, half away from zero)
pub fn format_currency(amount: Decimal) -> String {
    let mut value = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    format!("₹{value}")
}

/// Order lines joined with their catalog entries
///
/// Unknown ids are skipped (lenient) or rejected (strict).
pub(crate) fn resolve_lines<'a>(
    order: &'a Order,
    catalog: &'a MenuCatalog,
    mode: CatalogMode,
) -> ContentResult<Vec<(&'a OrderItem, &'a MenuItem)>> {
    let mut lines = Vec::with_capacity(order.items.len());
    for item in &order.items {
        match catalog.get(&item.menu_item_id) {
            Some(menu_item) => lines.push((item, menu_item)),
            None if mode == CatalogMode::Strict => {
                return Err(ContentError::UnknownMenuItem {
                    order_id: order.id.clone(),
                    menu_item_id: item.menu_item_id.clone(),
                });
            }
            None => {
                warn!(
                    order_id = %order.id,
                    menu_item_id = %item.menu_item_id,
                    "Skipping order line with unknown menu item"
                );
            }
        }
    }
    Ok(lines)
}

/// Line total: unit price times quantity
pub(crate) fn line_total(item: &OrderItem, menu_item: &MenuItem) -> Decimal {
    menu_item.price * Decimal::from(item.quantity)
}
