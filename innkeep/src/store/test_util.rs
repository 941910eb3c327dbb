//! Shared test utilities for store unit tests.

use chrono::{Duration, Utc};
use tempfile::tempdir;

use crate::reservation::StayInterval;
use crate::room::{NewRoom, Room};
use crate::stock::{NewStockItem, StockItem};

use super::{Store, StoreConfig};

/// Creates a temporary test store that will be cleaned up automatically.
///
/// # Panics
///
/// Panics if the temporary directory or store cannot be created. This is
/// acceptable in test code where we want to fail fast.
#[must_use]
pub fn create_test_store() -> Store {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let config = StoreConfig::new(path);
    let store = Store::open(config).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    store
}

/// Creates a double room with the given number at 120.0 per night.
///
/// # Panics
///
/// Panics on any failure; acceptable in test code.
pub fn create_test_room(store: &mut Store, number: &str) -> Room {
    store
        .create_room(&NewRoom::new(number, "double", 120.0).unwrap())
        .unwrap()
}

/// Creates a stock item in the `supplies` category at 1.0 per unit.
///
/// # Panics
///
/// Panics on any failure; acceptable in test code.
pub fn create_test_item(store: &mut Store, name: &str, quantity: i64) -> StockItem {
    store
        .create_stock_item(&NewStockItem::new(name, "supplies", quantity, 0, 1.0).unwrap())
        .unwrap()
}

/// Builds a stay interval `start`..`end` days from today.
///
/// Availability validation rejects past check-in dates, so tests work in
/// offsets from the current date rather than fixed calendar days.
///
/// # Panics
///
/// Panics if `end <= start`; acceptable in test code.
#[must_use]
pub fn future_interval(start: i64, end: i64) -> StayInterval {
    let today = Utc::now().date_naive();
    StayInterval::new(today + Duration::days(start), today + Duration::days(end)).unwrap()
}
