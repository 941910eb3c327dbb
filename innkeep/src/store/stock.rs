//! Stock data access.
//!
//! Item CRUD plus the append-only movement ledger. Movements can be
//! inserted and listed; there is deliberately no update or delete for
//! them.

use chrono::DateTime;
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::reservation::ValidationError;
use crate::stock::{
    MovementDirection, NewStockItem, StockItem, StockItemUpdate, StockMovement,
};

use super::connection::Store;

const SELECT_ITEM: &str = r"
    SELECT id, name, category, quantity, min_quantity, price, description
    FROM stock_items
    WHERE id = ?
";

const LIST_ITEMS: &str = r"
    SELECT id, name, category, quantity, min_quantity, price, description
    FROM stock_items
    ORDER BY name ASC
";

const INSERT_ITEM: &str = r"
    INSERT INTO stock_items (name, category, quantity, min_quantity, price, description)
    VALUES (?, ?, ?, ?, ?, ?)
";

const UPDATE_ITEM: &str = r"
    UPDATE stock_items
    SET name = ?, category = ?, min_quantity = ?, price = ?, description = ?
    WHERE id = ?
";

const UPDATE_QUANTITY: &str = "UPDATE stock_items SET quantity = ? WHERE id = ?";

const DELETE_ITEM: &str = "DELETE FROM stock_items WHERE id = ?";

const INSERT_MOVEMENT: &str = r"
    INSERT INTO stock_movements
        (item_id, direction, delta_quantity, previous_qty, new_qty, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";

const LIST_MOVEMENTS: &str = r"
    SELECT id, item_id, direction, delta_quantity, previous_qty, new_qty, created_at
    FROM stock_movements
    ORDER BY created_at DESC, id DESC
";

const LIST_MOVEMENTS_FOR_ITEM: &str = r"
    SELECT id, item_id, direction, delta_quantity, previous_qty, new_qty, created_at
    FROM stock_movements
    WHERE item_id = ?
    ORDER BY created_at DESC, id DESC
";

const COUNT_ITEM_MOVEMENTS: &str = "SELECT COUNT(*) FROM stock_movements WHERE item_id = ?";

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<StockItem> {
    Ok(StockItem {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        quantity: row.get(3)?,
        min_quantity: row.get(4)?,
        price: row.get(5)?,
        description: row.get(6)?,
    })
}

fn row_to_movement(row: &rusqlite::Row<'_>) -> rusqlite::Result<StockMovement> {
    let direction_text: String = row.get(2)?;
    let created_secs: i64 = row.get(6)?;

    let direction = direction_text
        .parse::<MovementDirection>()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let created_at = DateTime::from_timestamp(created_secs, 0).ok_or_else(|| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(ValidationError {
            field: "created_at".into(),
            message: format!("timestamp {created_secs} out of range"),
        }))
    })?;

    Ok(StockMovement {
        id: row.get(0)?,
        item_id: row.get(1)?,
        direction,
        delta_quantity: row.get(3)?,
        previous_qty: row.get(4)?,
        new_qty: row.get(5)?,
        created_at,
    })
}

/// Retrieves a stock item using an existing connection or transaction.
pub(crate) fn fetch_item(conn: &Connection, id: i64) -> Result<Option<StockItem>> {
    let mut stmt = conn.prepare(SELECT_ITEM)?;
    match stmt.query_row(params![id], row_to_item) {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Writes an item's on-hand quantity using an existing connection or
/// transaction. Returns `true` if a row was updated.
pub(crate) fn set_quantity(conn: &Connection, id: i64, quantity: i64) -> Result<bool> {
    let rows_affected = conn.execute(UPDATE_QUANTITY, params![quantity, id])?;
    Ok(rows_affected > 0)
}

/// Appends one movement row using an existing connection or transaction,
/// returning the new row id.
#[allow(clippy::too_many_arguments)]
pub(crate) fn insert_movement(
    conn: &Connection,
    item_id: i64,
    direction: MovementDirection,
    delta_quantity: i64,
    previous_qty: i64,
    new_qty: i64,
    created_at: DateTime<chrono::Utc>,
) -> Result<i64> {
    conn.execute(
        INSERT_MOVEMENT,
        params![
            item_id,
            direction.as_str(),
            delta_quantity,
            previous_qty,
            new_qty,
            created_at.timestamp(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Store {
    /// Creates a stock item.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the insert fails (full rollback).
    pub fn create_stock_item(&mut self, item: &NewStockItem) -> Result<StockItem> {
        let tx = self.begin_transaction()?;

        tx.execute(
            INSERT_ITEM,
            params![
                item.name(),
                item.category(),
                item.quantity(),
                item.min_quantity(),
                item.price(),
                item.description(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        let created = fetch_item(&tx, id)?.ok_or(Error::ItemNotFound { item_id: id })?;
        tx.commit()?;
        Ok(created)
    }

    /// Retrieves a stock item by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_stock_item(&self, id: i64) -> Result<Option<StockItem>> {
        fetch_item(&self.conn, id)
    }

    /// Lists all stock items ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_stock_items(&self) -> Result<Vec<StockItem>> {
        let mut stmt = self.conn.prepare(LIST_ITEMS)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(items)
    }

    /// Replaces the descriptive fields of a stock item.
    ///
    /// The on-hand quantity is not touched; it only changes through the
    /// inventory ledger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] if the item does not exist, or a
    /// validation error for malformed fields.
    pub fn update_stock_item(&mut self, id: i64, update: &StockItemUpdate) -> Result<StockItem> {
        update.validate()?;
        let tx = self.begin_transaction()?;

        if fetch_item(&tx, id)?.is_none() {
            return Err(Error::ItemNotFound { item_id: id });
        }

        tx.execute(
            UPDATE_ITEM,
            params![
                update.name.trim(),
                update.category,
                update.min_quantity,
                update.price,
                update.description,
                id,
            ],
        )?;

        let updated = fetch_item(&tx, id)?.ok_or(Error::ItemNotFound { item_id: id })?;
        tx.commit()?;
        Ok(updated)
    }

    /// Deletes a stock item.
    ///
    /// Items with ledger history cannot be deleted; the movement trail
    /// must stay reconstructable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ItemNotFound`] if the item does not exist, or
    /// [`Error::Conflict`] if movements reference it.
    pub fn delete_stock_item(&mut self, id: i64) -> Result<()> {
        let tx = self.begin_transaction()?;

        let item = fetch_item(&tx, id)?.ok_or(Error::ItemNotFound { item_id: id })?;

        let movements: i64 = tx.query_row(COUNT_ITEM_MOVEMENTS, params![id], |row| row.get(0))?;
        if movements > 0 {
            return Err(Error::Conflict {
                details: format!(
                    "cannot delete stock item '{}': {movements} ledger movement(s) reference it",
                    item.name
                ),
            });
        }

        tx.execute(DELETE_ITEM, params![id])?;
        tx.commit()?;
        Ok(())
    }

    /// Lists all stock movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_movements(&self) -> Result<Vec<StockMovement>> {
        let mut stmt = self.conn.prepare(LIST_MOVEMENTS)?;
        let movements = stmt
            .query_map([], row_to_movement)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(movements)
    }

    /// Lists one item's stock movements, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_movements_for_item(&self, item_id: i64) -> Result<Vec<StockMovement>> {
        let mut stmt = self.conn.prepare(LIST_MOVEMENTS_FOR_ITEM)?;
        let movements = stmt
            .query_map(params![item_id], row_to_movement)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(movements)
    }
}
