//! Inventory model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    pub min_level: Decimal,
    pub cost_price: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// At or below the reorder level
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_level
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn stock_value(&self) -> Decimal {
        self.quantity * self.cost_price
    }
}

/// Total value of the stock on hand
pub fn inventory_value(items: &[InventoryItem]) -> Decimal {
    items.iter().map(InventoryItem::stock_value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(qty: i64, min: i64, cost: i64) -> InventoryItem {
        InventoryItem {
            id: "1".to_string(),
            name: "Surmai Fish".to_string(),
            category: "fish".to_string(),
            quantity: Decimal::from(qty),
            unit: "kg".to_string(),
            min_level: Decimal::from(min),
            cost_price: Decimal::from(cost),
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_stock_helpers() {
        let low = item(3, 3, 550);
        assert!(low.is_low_stock());
        assert!(low.in_stock());

        let ok = item(25, 5, 45);
        assert!(!ok.is_low_stock());
        assert_eq!(inventory_value(&[low, ok]), Decimal::from(3 * 550 + 25 * 45));
    }
}
