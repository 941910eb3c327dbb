//! Room types: the persisted room row, its operational status flag, and
//! the validated create/update command structures.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reservation::{validate_amount, ValidationError};

/// Operational status flag of a room.
///
/// This flag is a coarse indicator toggled by the booking lifecycle (and
/// by staff through [`Store::set_room_status`](crate::Store::set_room_status));
/// it is *not* the source of truth for date-range occupancy, which is
/// always derived from reservations. The two can legitimately diverge and
/// the availability query requires both to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Bookable.
    Available,
    /// Held by a reservation or blocked by staff.
    Occupied,
}

impl RoomStatus {
    /// Returns the stored text form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RoomStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "occupied" => Ok(Self::Occupied),
            other => Err(ValidationError {
                field: "status".into(),
                message: format!("unknown room status '{other}'"),
            }),
        }
    }
}

/// A persisted room row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Row id.
    pub id: i64,
    /// Unique room number, e.g. `"101"`.
    pub number: String,
    /// Room category, e.g. `"double"`.
    pub room_type: String,
    /// Free-form description.
    pub description: String,
    /// Ordered feature list (stored as a JSON array).
    pub features: Vec<String>,
    /// Nightly rate.
    pub price_per_night: f64,
    /// Operational status flag.
    pub status: RoomStatus,
}

/// A validated request to create a room.
///
/// New rooms start out `available` unless overridden.
///
/// # Examples
///
/// ```
/// use innkeep::NewRoom;
///
/// let room = NewRoom::new("101", "double", 120.0)
///     .unwrap()
///     .with_description("Street-facing double")
///     .with_features(vec!["wifi".into(), "minibar".into()]);
/// assert_eq!(room.number(), "101");
///
/// // Room numbers must be non-empty.
/// assert!(NewRoom::new("  ", "double", 120.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoom {
    number: String,
    room_type: String,
    description: String,
    features: Vec<String>,
    price_per_night: f64,
    status: RoomStatus,
}

impl NewRoom {
    /// Creates a room draft with an empty description and feature list.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the number or type is empty after
    /// trimming, or the price is negative, NaN, or infinite.
    pub fn new(
        number: impl Into<String>,
        room_type: impl Into<String>,
        price_per_night: f64,
    ) -> Result<Self, ValidationError> {
        let number = non_empty("number", number.into())?;
        let room_type = non_empty("room_type", room_type.into())?;
        validate_amount("price_per_night", price_per_night)?;
        Ok(Self {
            number,
            room_type,
            description: String::new(),
            features: Vec::new(),
            price_per_night,
            status: RoomStatus::Available,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the feature list.
    #[must_use]
    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }

    /// Sets the initial status flag.
    #[must_use]
    pub const fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the room number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the room type.
    #[must_use]
    pub fn room_type(&self) -> &str {
        &self.room_type
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the feature list.
    #[must_use]
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Returns the nightly rate.
    #[must_use]
    pub const fn price_per_night(&self) -> f64 {
        self.price_per_night
    }

    /// Returns the initial status flag.
    #[must_use]
    pub const fn status(&self) -> RoomStatus {
        self.status
    }
}

/// A full-field update command for a room.
///
/// Every mutable field is listed explicitly and replaced wholesale, the
/// way the staff room editor submits it. Use
/// [`Store::set_room_status`](crate::Store::set_room_status) to toggle
/// only the status flag.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomUpdate {
    /// Replacement room number (still unique).
    pub number: String,
    /// Replacement room type.
    pub room_type: String,
    /// Replacement description.
    pub description: String,
    /// Replacement feature list.
    pub features: Vec<String>,
    /// Replacement nightly rate.
    pub price_per_night: f64,
    /// Replacement status flag.
    pub status: RoomStatus,
}

impl RoomUpdate {
    /// Validates the update against the same rules as [`NewRoom::new`].
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an empty number or type, or a
    /// price that is negative, NaN, or infinite.
    pub fn validate(&self) -> Result<(), ValidationError> {
        non_empty("number", self.number.clone())?;
        non_empty("room_type", self.room_type.clone())?;
        validate_amount("price_per_night", self.price_per_night)
    }
}

impl From<Room> for RoomUpdate {
    fn from(room: Room) -> Self {
        Self {
            number: room.number,
            room_type: room.room_type,
            description: room.description,
            features: room.features,
            price_per_night: room.price_per_night,
            status: room.status,
        }
    }
}

fn non_empty(field: &str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError {
            field: field.into(),
            message: "must be non-empty after trimming whitespace".into(),
        });
    }
    Ok(trimmed.to_string())
}
