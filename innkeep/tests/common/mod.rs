//! Shared helpers for integration tests.

// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use tempfile::TempDir;

use innkeep::{NewRoom, NewStockItem, Room, StayInterval, StockItem, Store, StoreConfig};

/// Creates a temp directory and returns it with the store path inside it.
///
/// The `TempDir` must be kept alive for as long as the store is in use.
pub fn store_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("innkeep.db");
    (dir, path)
}

/// Opens a store handle on the given path.
pub fn open_store(path: &Path) -> Store {
    Store::open(StoreConfig::new(path)).unwrap()
}

/// Creates a double room at 120.0 per night.
pub fn create_room(store: &mut Store, number: &str) -> Room {
    store
        .create_room(&NewRoom::new(number, "double", 120.0).unwrap())
        .unwrap()
}

/// Creates a stock item in the `supplies` category.
pub fn create_item(store: &mut Store, name: &str, quantity: i64) -> StockItem {
    store
        .create_stock_item(&NewStockItem::new(name, "supplies", quantity, 5, 2.0).unwrap())
        .unwrap()
}

/// Builds a stay interval `start`..`end` days from today.
pub fn future_interval(start: i64, end: i64) -> StayInterval {
    let today = Utc::now().date_naive();
    StayInterval::new(today + Duration::days(start), today + Duration::days(end)).unwrap()
}
