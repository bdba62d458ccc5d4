//! Sales aggregates (input to the monthly sales report)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Units sold and revenue for one menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSales {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

/// Totals over a set of orders
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    /// Sorted by quantity, best seller first
    pub by_item: Vec<ItemSales>,
    pub total_sales: Decimal,
    pub order_count: u32,
    pub total_items: u64,
}

impl SalesSummary {
    pub fn average_order_value(&self) -> Decimal {
        if self.order_count == 0 {
            return Decimal::ZERO;
        }
        (self.total_sales / Decimal::from(self.order_count)).round_dp(2)
    }

    /// Size of the top and bottom bands: a quarter of the items, at most 5
    fn band(&self) -> usize {
        self.by_item.len().div_ceil(4).min(5)
    }

    pub fn top_sellers(&self) -> &[ItemSales] {
        &self.by_item[..self.band()]
    }

    /// Slowest sellers, slowest first
    pub fn low_sellers(&self) -> Vec<&ItemSales> {
        self.by_item.iter().rev().take(self.band()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sales(n: usize) -> SalesSummary {
        SalesSummary {
            by_item: (0..n)
                .map(|i| ItemSales {
                    item_id: i.to_string(),
                    item_name: format!("Item {i}"),
                    quantity: (n - i) as u64,
                    revenue: Decimal::from(10 * (n - i)),
                })
                .collect(),
            total_sales: Decimal::from(300),
            order_count: 4,
            total_items: 0,
        }
    }

    #[test]
    fn test_bands() {
        assert!(sales(0).top_sellers().is_empty());
        assert_eq!(sales(3).top_sellers().len(), 1);
        assert_eq!(sales(8).top_sellers().len(), 2);
        assert_eq!(sales(40).top_sellers().len(), 5);

        let s = sales(8);
        let low = s.low_sellers();
        assert_eq!(low[0].item_id, "7");
        assert_eq!(low[1].item_id, "6");
    }

    #[test]
    fn test_average_order_value() {
        assert_eq!(sales(1).average_order_value(), Decimal::from(75));
        assert_eq!(SalesSummary::default().average_order_value(), Decimal::ZERO);
    }
}
