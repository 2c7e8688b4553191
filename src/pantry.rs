//! In-memory pantry inventory.
//!
//! Items are created when a scanned receipt is confirmed or when the user adds
//! one by hand, shrink as consumption is logged, and disappear once fully
//! consumed or discarded.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grocery category of a pantry item.
///
/// Parsing is lenient: anything unrecognised becomes [`Category::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Bakery,
    Frozen,
    Pantry,
    Beverages,
    Snacks,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Produce => "produce",
            Category::Dairy => "dairy",
            Category::Meat => "meat",
            Category::Seafood => "seafood",
            Category::Bakery => "bakery",
            Category::Frozen => "frozen",
            Category::Pantry => "pantry",
            Category::Beverages => "beverages",
            Category::Snacks => "snacks",
            Category::Other => "other",
        }
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let category = match s.trim().to_lowercase().as_str() {
            "produce" | "fruit" | "vegetables" | "vegetable" => Category::Produce,
            "dairy" | "eggs" => Category::Dairy,
            "meat" | "poultry" => Category::Meat,
            "seafood" | "fish" => Category::Seafood,
            "bakery" | "bread" => Category::Bakery,
            "frozen" => Category::Frozen,
            "pantry" | "dry goods" | "canned" => Category::Pantry,
            "beverages" | "drinks" => Category::Beverages,
            "snacks" => Category::Snacks,
            _ => Category::Other,
        };
        Ok(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked grocery item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    /// Opaque identifier
    pub id: String,
    pub name: String,
    pub category: Category,
    pub quantity: f64,
    pub unit: String,
    /// Shelf life counted from `added_on`
    pub expiration_days: u32,
    pub added_on: NaiveDate,
}

impl PantryItem {
    pub fn expires_on(&self) -> NaiveDate {
        self.added_on
            .checked_add_days(Days::new(u64::from(self.expiration_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    /// Negative once the item is past its date.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.expires_on() - today).num_days()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.days_until_expiry(today) < 0
    }
}

/// Input for creating a pantry item, e.g. one confirmed line of a scanned receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPantryItem {
    pub name: String,
    pub category: Category,
    pub quantity: f64,
    pub unit: String,
    pub expiration_days: u32,
    pub added_on: NaiveDate,
}

impl NewPantryItem {
    pub fn new(name: impl Into<String>, added_on: NaiveDate) -> Self {
        Self {
            name: name.into(),
            category: Category::Other,
            quantity: 1.0,
            unit: "item".to_string(),
            expiration_days: 7,
            added_on,
        }
    }
}

/// Result of logging consumption against an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Consumption {
    pub id: String,
    pub name: String,
    pub consumed: f64,
    pub remaining: f64,
    /// Set when the item was used up and removed from the pantry
    pub removed: bool,
}

/// Leftover quantities at or below this count as used up.
const QUANTITY_EPSILON: f64 = 1e-9;

#[derive(Debug, Default)]
pub struct Pantry {
    items: Vec<PantryItem>,
}

impl Pantry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add(&mut self, item: NewPantryItem) -> Result<PantryItem> {
        let name = item.name.trim();
        if name.is_empty() {
            anyhow::bail!("Pantry item name must not be empty");
        }
        if !(item.quantity > 0.0) {
            anyhow::bail!("Quantity for '{}' must be greater than zero", name);
        }

        let unit = item.unit.trim();
        let entry = PantryItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            category: item.category,
            quantity: item.quantity,
            unit: if unit.is_empty() { "item".to_string() } else { unit.to_string() },
            expiration_days: item.expiration_days,
            added_on: item.added_on,
        };

        tracing::debug!("Added pantry item {} ({})", entry.name, entry.id);
        self.items.push(entry.clone());
        Ok(entry)
    }

    /// Adds every item or none of them.
    pub fn add_many(&mut self, items: Vec<NewPantryItem>) -> Result<Vec<PantryItem>> {
        if let Some(bad) = items
            .iter()
            .find(|item| item.name.trim().is_empty() || !(item.quantity > 0.0))
        {
            anyhow::bail!(
                "Invalid scanned item '{}': name must be set and quantity greater than zero",
                bad.name
            );
        }

        let mut added = Vec::with_capacity(items.len());
        for item in items {
            added.push(self.add(item)?);
        }
        tracing::info!("Added {} items to pantry", added.len());
        Ok(added)
    }

    pub fn get(&self, id: &str) -> Option<&PantryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items in the order they were added.
    pub fn items(&self) -> &[PantryItem] {
        &self.items
    }

    /// Item names, the input the ingredient matcher works from.
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }

    pub fn consume(&mut self, id: &str, amount: f64) -> Result<Consumption> {
        if !(amount > 0.0) {
            anyhow::bail!("Consumed amount must be greater than zero, got {}", amount);
        }

        let index = self
            .position(id)
            .ok_or_else(|| anyhow::anyhow!("No pantry item with id {}", id))?;

        let item = &mut self.items[index];
        let consumed = amount.min(item.quantity);
        item.quantity -= consumed;
        // 1.0 - 0.7 - 0.3 leaves ~5.5e-17 behind
        let used_up = item.quantity <= QUANTITY_EPSILON;

        let mut consumption = Consumption {
            id: item.id.clone(),
            name: item.name.clone(),
            consumed,
            remaining: item.quantity.max(0.0),
            removed: false,
        };

        if used_up {
            self.items.remove(index);
            consumption.consumed = consumed + consumption.remaining;
            consumption.remaining = 0.0;
            consumption.removed = true;
            tracing::info!("{} fully consumed, removed from pantry", consumption.name);
        } else {
            tracing::debug!(
                "Logged {} of {}, {} left",
                consumed,
                consumption.name,
                consumption.remaining
            );
        }

        Ok(consumption)
    }

    /// Discards an item regardless of remaining quantity.
    pub fn remove(&mut self, id: &str) -> Result<PantryItem> {
        let index = self
            .position(id)
            .ok_or_else(|| anyhow::anyhow!("No pantry item with id {}", id))?;
        let item = self.items.remove(index);
        tracing::info!("Removed {} from pantry", item.name);
        Ok(item)
    }

    /// Items expiring within `days` of `today`, soonest first. Expired items are included.
    pub fn expiring_within(&self, days: i64, today: NaiveDate) -> Vec<&PantryItem> {
        let mut expiring: Vec<&PantryItem> = self
            .items
            .iter()
            .filter(|item| item.days_until_expiry(today) <= days)
            .collect();
        expiring.sort_by_key(|item| item.expires_on());
        expiring
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}
