//! Menu catalog model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    /// Display name in the local script
    pub name: String,
    /// English name, used on printed tickets
    pub name_en: String,
    pub price: Decimal,
    pub category: String,
}

impl MenuItem {
    pub fn new(id: &str, name_en: &str, price: Decimal, category: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name_en.to_string(),
            name_en: name_en.to_string(),
            price,
            category: category.to_string(),
        }
    }
}

/// Menu items indexed by id
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog {
    items: HashMap<String, MenuItem>,
}

impl MenuCatalog {
    pub fn new(items: impl IntoIterator<Item = MenuItem>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    /// Parse a JSON array of menu items
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let items: Vec<MenuItem> = serde_json::from_str(json)?;
        Ok(Self::new(items))
    }

    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
