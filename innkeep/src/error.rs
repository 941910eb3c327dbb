//! Error types for the innkeep library.
//!
//! This module provides the error taxonomy shared by every operation in
//! the library, using `thiserror` for ergonomic error handling. Domain
//! rule violations are reported before any mutation is attempted; storage
//! faults abort the enclosing transaction in full.

use thiserror::Error;

use crate::reservation::ReservationStatus;

/// Result type alias for operations that may fail with an innkeep error.
///
/// # Examples
///
/// ```
/// use innkeep::{Error, Result};
///
/// fn example_operation() -> Result<i64> {
///     Ok(42)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the innkeep library.
///
/// This enum encompasses all failure classes of the booking and inventory
/// core. The boundary layer (HTTP, CLI, whatever hosts the library) is
/// expected to map these onto its own status codes.
#[derive(Debug, Error)]
pub enum Error {
    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// A room cannot be booked for the requested interval.
    #[error("room {room_id} unavailable: {reason}")]
    RoomUnavailable {
        /// The room that failed the availability check.
        room_id: i64,
        /// The reason the room is unavailable.
        reason: RoomUnavailableReason,
    },

    /// A uniqueness or state conflict occurred.
    #[error("conflict: {details}")]
    Conflict {
        /// Details about the conflict.
        details: String,
    },

    /// An unsupported reservation status transition was attempted.
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// The current status of the reservation.
        from: ReservationStatus,
        /// The requested target status.
        to: ReservationStatus,
    },

    /// A stock removal would drive the quantity below zero.
    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The stock item being adjusted.
        item_id: i64,
        /// The quantity requested for removal.
        requested: i64,
        /// The quantity actually on hand.
        available: i64,
    },

    /// The referenced stock item does not exist.
    #[error("stock item {item_id} not found")]
    ItemNotFound {
        /// The missing item id.
        item_id: i64,
    },

    /// A storage-layer error occurred.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The schema version this build expects.
        expected: i32,
        /// The schema version found in the store.
        found: i32,
    },
}

/// Reason why a room is unavailable for a requested interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomUnavailableReason {
    /// The room's operational status flag is not `available`.
    FlaggedOccupied,
    /// An active (non-cancelled) reservation overlaps the interval.
    OverlappingReservation,
}

impl std::fmt::Display for RoomUnavailableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FlaggedOccupied => write!(f, "flagged occupied"),
            Self::OverlappingReservation => write!(f, "overlapping reservation"),
        }
    }
}

impl From<crate::reservation::ValidationError> for Error {
    fn from(err: crate::reservation::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if the error indicates a missing resource.
    ///
    /// Covers both the generic [`Error::NotFound`] and the stock-specific
    /// [`Error::ItemNotFound`].
    ///
    /// # Examples
    ///
    /// ```
    /// use innkeep::Error;
    ///
    /// let err = Error::NotFound { resource: "room 7".into() };
    /// assert!(err.is_not_found());
    ///
    /// let err = Error::ItemNotFound { item_id: 3 };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::ItemNotFound { .. })
    }

    /// Check if the error is a domain-rule rejection rather than a fault.
    ///
    /// Domain rejections are produced before any mutation and leave no
    /// side effect; storage and I/O errors may have aborted a transaction
    /// mid-flight (which the store rolls back).
    #[must_use]
    pub fn is_domain_rejection(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::NotFound { .. }
                | Self::RoomUnavailable { .. }
                | Self::Conflict { .. }
                | Self::InvalidTransition { .. }
                | Self::InsufficientStock { .. }
                | Self::ItemNotFound { .. }
        )
    }
}
