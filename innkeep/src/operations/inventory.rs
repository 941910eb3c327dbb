//! Inventory ledger: audited stock quantity adjustments.
//!
//! Each adjustment is one unit of work: an immediate transaction reads the
//! current quantity, validates the result, writes the new quantity, and
//! appends exactly one immutable movement row. Because the write lock is
//! held from the first read, two concurrent adjustments of the same item
//! serialize and neither can observe a stale quantity; the quantity and
//! its movement history cannot drift apart.

use chrono::Utc;

use crate::error::{Error, Result};
use crate::stock::{MovementDirection, StockAdjustment, StockItem};
use crate::store::{stock, Store};

/// Mutates stock quantities with an append-only movement audit trail.
///
/// Holds an exclusive borrow of the store handle for the duration of the
/// ledger operations it performs.
///
/// # Examples
///
/// ```no_run
/// use innkeep::{InventoryLedger, MovementDirection, StockAdjustment, Store, StoreConfig};
///
/// let mut store = Store::open(StoreConfig::new("/tmp/innkeep.db")).unwrap();
///
/// let adjustment = StockAdjustment::new(1, 5, MovementDirection::Add).unwrap();
/// let item = InventoryLedger::new(&mut store).adjust_quantity(&adjustment).unwrap();
/// println!("{} now at {}", item.name, item.quantity);
/// ```
pub struct InventoryLedger<'a> {
    store: &'a mut Store,
}

impl<'a> InventoryLedger<'a> {
    /// Creates a ledger over the given store handle.
    #[must_use]
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Applies a quantity adjustment and records the movement.
    ///
    /// Within one transaction: reads the item's current quantity, computes
    /// the new quantity, persists it, and appends one movement row holding
    /// the before/after quantities. Returns the refreshed item.
    ///
    /// # Errors
    ///
    /// - [`Error::ItemNotFound`] if the item does not exist
    /// - [`Error::InsufficientStock`] when a removal would drive the
    ///   quantity below zero; neither the item row nor a movement row is
    ///   written in that case
    /// - [`Error::Storage`] on any persistence fault, with full rollback
    pub fn adjust_quantity(&mut self, adjustment: &StockAdjustment) -> Result<StockItem> {
        let tx = self.store.begin_transaction()?;

        let item = stock::fetch_item(&tx, adjustment.item_id())?.ok_or(Error::ItemNotFound {
            item_id: adjustment.item_id(),
        })?;

        let new_quantity = adjustment
            .direction()
            .apply(item.quantity, adjustment.quantity());
        if new_quantity < 0 {
            log::debug!(
                "rejecting removal of {} x '{}': only {} on hand",
                adjustment.quantity(),
                item.name,
                item.quantity
            );
            return Err(Error::InsufficientStock {
                item_id: item.id,
                requested: adjustment.quantity(),
                available: item.quantity,
            });
        }

        stock::set_quantity(&tx, item.id, new_quantity)?;
        stock::insert_movement(
            &tx,
            item.id,
            adjustment.direction(),
            adjustment.quantity(),
            item.quantity,
            new_quantity,
            Utc::now(),
        )?;

        let refreshed = stock::fetch_item(&tx, item.id)?.ok_or(Error::ItemNotFound {
            item_id: item.id,
        })?;
        tx.commit()?;
        Ok(refreshed)
    }

    /// Records a stock entry: a convenience over
    /// [`adjust_quantity`](Self::adjust_quantity) in the `add` direction.
    ///
    /// # Errors
    ///
    /// As [`adjust_quantity`](Self::adjust_quantity), plus
    /// [`Error::Validation`] for a non-positive quantity.
    pub fn register_entry(&mut self, item_id: i64, quantity: i64) -> Result<StockItem> {
        let adjustment = StockAdjustment::new(item_id, quantity, MovementDirection::Add)?;
        self.adjust_quantity(&adjustment)
    }

    /// Records a stock exit: a convenience over
    /// [`adjust_quantity`](Self::adjust_quantity) in the `remove`
    /// direction.
    ///
    /// # Errors
    ///
    /// As [`adjust_quantity`](Self::adjust_quantity), plus
    /// [`Error::Validation`] for a non-positive quantity.
    pub fn register_exit(&mut self, item_id: i64, quantity: i64) -> Result<StockItem> {
        let adjustment = StockAdjustment::new(item_id, quantity, MovementDirection::Remove)?;
        self.adjust_quantity(&adjustment)
    }
}
