//! Persistence layer for rooms, reservations, and stock.
//!
//! This module provides a `SQLite`-based store with connection
//! management, schema versioning, and the data-access operations the
//! booking and inventory cores compose. Multi-step writes run inside
//! immediate transactions obtained from [`Store::begin_transaction`];
//! the connection-level helper functions in the submodules are designed
//! to be called through such a transaction so several steps commit as
//! one unit of work.
//!
//! # Examples
//!
//! ```no_run
//! use innkeep::{NewRoom, Store, StoreConfig};
//!
//! let config = StoreConfig::new("/tmp/innkeep.db");
//! let mut store = Store::open(config).unwrap();
//!
//! let room = store
//!     .create_room(&NewRoom::new("101", "double", 120.0).unwrap())
//!     .unwrap();
//! println!("created room {}", room.number);
//! ```

mod config;
mod connection;
pub mod migrations;
mod schema;

pub(crate) mod reservations;
pub(crate) mod rooms;
pub(crate) mod stock;

#[cfg(test)]
pub(crate) mod test_util;

// Re-export public API
pub use config::{default_data_dir, resolve_store_path, StoreConfig};
pub use connection::Store;

// Re-export migration functions for advanced use cases
pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};
