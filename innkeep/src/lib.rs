#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # innkeep
//!
//! A library for hotel room availability, reservations, and stock
//! inventory over an embedded `SQLite` store.
//!
//! The crate owns the booking and inventory consistency core: room
//! availability over date intervals, the reservation state machine with
//! its room-occupancy side effects, and an audited stock quantity ledger.
//! Every multi-step mutation runs as one transactional unit of work, so an
//! operation either fully succeeds or leaves no observable side effect.
//!
//! ## Core Types
//!
//! - [`Store`] and [`StoreConfig`]: the persistence handle
//! - [`Room`], [`Reservation`], [`StockItem`]: the persisted entities
//! - [`AvailabilityEngine`], [`ReservationLifecycle`], [`InventoryLedger`]:
//!   the three operational components
//! - [`Error`] and [`Result`]: error handling types
//!
//! ## Examples
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use innkeep::{
//!     AvailabilityEngine, AvailabilityQuery, BookingRequest, NewRoom,
//!     ReservationLifecycle, StayInterval, Store, StoreConfig,
//! };
//!
//! let mut store = Store::open(StoreConfig::new("/tmp/innkeep.db")).unwrap();
//! let room = store
//!     .create_room(&NewRoom::new("101", "double", 120.0).unwrap())
//!     .unwrap();
//!
//! let today = Utc::now().date_naive();
//! let query = AvailabilityQuery::new(
//!     today + Duration::days(7),
//!     today + Duration::days(9),
//!     None,
//! )
//! .unwrap();
//! let free = AvailabilityEngine::new(&store).find_available(&query).unwrap();
//! assert!(free.iter().any(|r| r.id == room.id));
//!
//! let request = BookingRequest::new(1, room.id, query.interval(), 240.0).unwrap();
//! let record = ReservationLifecycle::new(&mut store).create(&request).unwrap();
//! println!("booked room {}", record.room_number);
//! ```

pub mod error;
pub mod operations;
pub mod reservation;
pub mod room;
pub mod stock;
pub mod store;

// Re-export key types at crate root for convenience
pub use error::{Error, Result, RoomUnavailableReason};
pub use operations::{
    AvailabilityEngine, AvailabilityQuery, InventoryLedger, ReservationLifecycle,
};
pub use reservation::{
    BookingRequest, Reservation, ReservationPatch, ReservationRecord, ReservationStatus,
    StayInterval, ValidationError,
};
pub use room::{NewRoom, Room, RoomStatus, RoomUpdate};
pub use stock::{
    MovementDirection, NewStockItem, StockAdjustment, StockItem, StockItemUpdate, StockMovement,
};
pub use store::{Store, StoreConfig};
