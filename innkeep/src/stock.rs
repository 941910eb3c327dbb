//! Stock types: inventory items, the append-only movement ledger rows, and
//! the validated commands that mutate them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::reservation::{validate_amount, ValidationError};

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Stock entry; increases the quantity.
    Add,
    /// Stock exit; decreases the quantity.
    Remove,
}

impl MovementDirection {
    /// Returns the stored text form of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    /// Applies a positive delta to a quantity in this direction.
    ///
    /// # Examples
    ///
    /// ```
    /// use innkeep::MovementDirection;
    ///
    /// assert_eq!(MovementDirection::Add.apply(10, 5), 15);
    /// assert_eq!(MovementDirection::Remove.apply(10, 7), 3);
    /// ```
    #[must_use]
    pub const fn apply(self, current: i64, delta: i64) -> i64 {
        match self {
            Self::Add => current + delta,
            Self::Remove => current - delta,
        }
    }

    /// Returns the delta with the sign this direction implies.
    #[must_use]
    pub const fn signed(self, delta: i64) -> i64 {
        match self {
            Self::Add => delta,
            Self::Remove => -delta,
        }
    }
}

impl fmt::Display for MovementDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MovementDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            other => Err(ValidationError {
                field: "direction".into(),
                message: format!("unknown movement direction '{other}'"),
            }),
        }
    }
}

/// A persisted stock item row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Row id.
    pub id: i64,
    /// Item name.
    pub name: String,
    /// Item category, e.g. `"linen"` or `"minibar"`.
    pub category: String,
    /// Units currently on hand. Never negative.
    pub quantity: i64,
    /// Reorder threshold.
    pub min_quantity: i64,
    /// Unit price.
    pub price: f64,
    /// Free-form description.
    pub description: String,
}

impl StockItem {
    /// Returns `true` if the on-hand quantity has reached the reorder
    /// threshold.
    #[must_use]
    pub const fn needs_reorder(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

/// One immutable row of the stock movement ledger.
///
/// Movements are append-only: the store exposes no update or delete for
/// them, so the current quantity of an item is always reconstructable as
/// its initial quantity plus the signed sum of its movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    /// Row id.
    pub id: i64,
    /// The item this movement belongs to.
    pub item_id: i64,
    /// Entry or exit.
    pub direction: MovementDirection,
    /// The positive quantity moved.
    pub delta_quantity: i64,
    /// Quantity on hand before the movement.
    pub previous_qty: i64,
    /// Quantity on hand after the movement.
    pub new_qty: i64,
    /// When the movement was committed.
    pub created_at: DateTime<Utc>,
}

/// A validated request to create a stock item.
///
/// # Examples
///
/// ```
/// use innkeep::NewStockItem;
///
/// let item = NewStockItem::new("towels", "linen", 40, 10, 4.5)
///     .unwrap()
///     .with_description("Bath towels, white");
/// assert_eq!(item.name(), "towels");
///
/// // Quantities must not start negative.
/// assert!(NewStockItem::new("towels", "linen", -1, 10, 4.5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewStockItem {
    name: String,
    category: String,
    quantity: i64,
    min_quantity: i64,
    price: f64,
    description: String,
}

impl NewStockItem {
    /// Creates a stock item draft with an empty description.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the name is empty after trimming,
    /// either quantity is negative, or the price is negative, NaN, or
    /// infinite.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: i64,
        min_quantity: i64,
        price: f64,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError {
                field: "name".into(),
                message: "must be non-empty after trimming whitespace".into(),
            });
        }
        if quantity < 0 {
            return Err(ValidationError {
                field: "quantity".into(),
                message: format!("must be non-negative, got {quantity}"),
            });
        }
        if min_quantity < 0 {
            return Err(ValidationError {
                field: "min_quantity".into(),
                message: format!("must be non-negative, got {min_quantity}"),
            });
        }
        validate_amount("price", price)?;
        Ok(Self {
            name,
            category: category.into(),
            quantity,
            min_quantity,
            price,
            description: String::new(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the item name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category.
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the initial quantity.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Returns the reorder threshold.
    #[must_use]
    pub const fn min_quantity(&self) -> i64 {
        self.min_quantity
    }

    /// Returns the unit price.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A full-field update command for a stock item's descriptive fields.
///
/// The on-hand quantity is deliberately absent: quantity only changes
/// through [`InventoryLedger::adjust_quantity`](crate::InventoryLedger::adjust_quantity),
/// which records a matching ledger movement. Allowing a direct quantity
/// edit here would silently break the ledger-sum invariant.
#[derive(Debug, Clone, PartialEq)]
pub struct StockItemUpdate {
    /// Replacement name.
    pub name: String,
    /// Replacement category.
    pub category: String,
    /// Replacement reorder threshold.
    pub min_quantity: i64,
    /// Replacement unit price.
    pub price: f64,
    /// Replacement description.
    pub description: String,
}

impl StockItemUpdate {
    /// Validates the update.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty name, a negative
    /// threshold, or a price that is negative, NaN, or infinite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError {
                field: "name".into(),
                message: "must be non-empty after trimming whitespace".into(),
            });
        }
        if self.min_quantity < 0 {
            return Err(ValidationError {
                field: "min_quantity".into(),
                message: format!("must be non-negative, got {}", self.min_quantity),
            });
        }
        validate_amount("price", self.price)
    }
}

/// A validated quantity adjustment for a stock item.
///
/// # Examples
///
/// ```
/// use innkeep::{MovementDirection, StockAdjustment};
///
/// let adjustment = StockAdjustment::new(3, 5, MovementDirection::Add).unwrap();
/// assert_eq!(adjustment.quantity(), 5);
///
/// // Zero and negative deltas are rejected.
/// assert!(StockAdjustment::new(3, 0, MovementDirection::Remove).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    item_id: i64,
    quantity: i64,
    direction: MovementDirection,
}

impl StockAdjustment {
    /// Creates an adjustment.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the item id is non-positive or the
    /// quantity is not strictly positive.
    pub fn new(
        item_id: i64,
        quantity: i64,
        direction: MovementDirection,
    ) -> Result<Self, ValidationError> {
        if item_id <= 0 {
            return Err(ValidationError {
                field: "item_id".into(),
                message: format!("item_id must be positive, got {item_id}"),
            });
        }
        if quantity <= 0 {
            return Err(ValidationError {
                field: "quantity".into(),
                message: format!("adjustment quantity must be positive, got {quantity}"),
            });
        }
        Ok(Self {
            item_id,
            quantity,
            direction,
        })
    }

    /// Returns the target item id.
    #[must_use]
    pub const fn item_id(&self) -> i64 {
        self.item_id
    }

    /// Returns the positive quantity to move.
    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Returns the movement direction.
    #[must_use]
    pub const fn direction(&self) -> MovementDirection {
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        for direction in [MovementDirection::Add, MovementDirection::Remove] {
            let parsed: MovementDirection = direction.as_str().parse().unwrap();
            assert_eq!(parsed, direction);
        }
        assert!("transfer".parse::<MovementDirection>().is_err());
    }

    #[test]
    fn test_direction_apply_and_signed() {
        assert_eq!(MovementDirection::Add.apply(10, 5), 15);
        assert_eq!(MovementDirection::Remove.apply(10, 5), 5);
        assert_eq!(MovementDirection::Remove.apply(3, 5), -2);
        assert_eq!(MovementDirection::Add.signed(5), 5);
        assert_eq!(MovementDirection::Remove.signed(5), -5);
    }

    #[test]
    fn test_new_stock_item_validation() {
        assert!(NewStockItem::new("towels", "linen", 40, 10, 4.5).is_ok());
        assert!(NewStockItem::new(" ", "linen", 40, 10, 4.5).is_err());
        assert!(NewStockItem::new("towels", "linen", -1, 10, 4.5).is_err());
        assert!(NewStockItem::new("towels", "linen", 40, -1, 4.5).is_err());
        assert!(NewStockItem::new("towels", "linen", 40, 10, f64::NAN).is_err());
        assert!(NewStockItem::new("towels", "", 0, 0, 0.0).is_ok());
    }

    #[test]
    fn test_new_stock_item_trims_name() {
        let item = NewStockItem::new("  towels ", "linen", 1, 0, 1.0).unwrap();
        assert_eq!(item.name(), "towels");
    }

    #[test]
    fn test_stock_item_update_validation() {
        let mut update = StockItemUpdate {
            name: "towels".into(),
            category: "linen".into(),
            min_quantity: 10,
            price: 4.5,
            description: String::new(),
        };
        assert!(update.validate().is_ok());

        update.min_quantity = -2;
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_needs_reorder() {
        let mut item = StockItem {
            id: 1,
            name: "towels".into(),
            category: "linen".into(),
            quantity: 11,
            min_quantity: 10,
            price: 4.5,
            description: String::new(),
        };
        assert!(!item.needs_reorder());
        item.quantity = 10;
        assert!(item.needs_reorder());
        item.quantity = 0;
        assert!(item.needs_reorder());
    }

    #[test]
    fn test_adjustment_validation() {
        assert!(StockAdjustment::new(1, 5, MovementDirection::Add).is_ok());
        assert!(StockAdjustment::new(0, 5, MovementDirection::Add).is_err());
        assert!(StockAdjustment::new(1, 0, MovementDirection::Add).is_err());
        assert!(StockAdjustment::new(1, -5, MovementDirection::Remove).is_err());
    }

    #[test]
    fn test_movement_serde() {
        let movement = StockMovement {
            id: 1,
            item_id: 3,
            direction: MovementDirection::Remove,
            delta_quantity: 7,
            previous_qty: 15,
            new_qty: 8,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let json = serde_json::to_string(&movement).unwrap();
        assert!(json.contains("\"remove\""));
        let back: StockMovement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, movement);
    }
}
