//! Order model (input to ticket and bill rendering)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Completed,
    Cancelled,
}

/// One line of an order, referencing a menu item by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub menu_item_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderItem {
    pub fn new(menu_item_id: &str, quantity: u32) -> Self {
        Self {
            id: crate::util::new_id(),
            menu_item_id: menu_item_id.to_string(),
            quantity,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub table_number: u32,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub is_printed: bool,
    #[serde(default)]
    pub is_take_away: bool,
}

impl Order {
    pub fn new(table_number: u32, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::util::new_id(),
            table_number,
            items,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
            notes: None,
            customer_name: None,
            is_printed: false,
            is_take_away: false,
        }
    }

    /// Caller-side hook after a ticket for this order printed successfully
    pub fn mark_printed(&mut self) {
        self.is_printed = true;
        self.updated_at = Utc::now();
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
