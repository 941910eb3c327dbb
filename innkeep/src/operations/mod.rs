//! The booking and inventory cores.
//!
//! Three components, each constructed over an explicitly injected store
//! handle:
//!
//! - [`AvailabilityEngine`]: pure reads computing the set of rooms free
//!   over a date interval.
//! - [`ReservationLifecycle`]: reservation creation, status transitions,
//!   and the administrative patch, each inside one write transaction.
//! - [`InventoryLedger`]: audited stock adjustments, each inside one
//!   write transaction.
//!
//! The lifecycle and the ledger use the store's transaction primitive
//! directly; they share no higher orchestration layer. The lifecycle
//! re-runs the availability overlap check inside its own transaction, so
//! an engine-level read going stale cannot produce a double booking.

pub mod availability;
pub mod booking;
pub mod inventory;

pub use availability::{AvailabilityEngine, AvailabilityQuery};
pub use booking::ReservationLifecycle;
pub use inventory::InventoryLedger;
