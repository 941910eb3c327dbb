//! Room availability queries.
//!
//! The availability engine is a pure read: it computes the set of rooms
//! free over a date interval against current committed state. It takes no
//! locks, so its answer is only a snapshot; the booking lifecycle re-runs
//! the same overlap predicate inside its own write transaction before
//! committing a reservation.

use chrono::{NaiveDate, Utc};

use crate::error::{Error, Result};
use crate::reservation::StayInterval;
use crate::room::Room;
use crate::store::{rooms, Store};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated availability query.
///
/// Construction enforces the interval rules: `check_in < check_out` and
/// `check_in` no earlier than today (date-only, UTC).
///
/// # Examples
///
/// ```no_run
/// use chrono::{Duration, Utc};
/// use innkeep::AvailabilityQuery;
///
/// let today = Utc::now().date_naive();
/// let query = AvailabilityQuery::new(
///     today + Duration::days(7),
///     today + Duration::days(9),
///     Some("double".to_string()),
/// )
/// .unwrap();
/// assert_eq!(query.room_type(), Some("double"));
///
/// // Past check-in dates are rejected.
/// assert!(AvailabilityQuery::new(
///     today - Duration::days(1),
///     today + Duration::days(1),
///     None,
/// )
/// .is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityQuery {
    interval: StayInterval,
    room_type: Option<String>,
}

impl AvailabilityQuery {
    /// Creates an availability query.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `check_out <= check_in` or
    /// `check_in` is before today.
    pub fn new(
        check_in: NaiveDate,
        check_out: NaiveDate,
        room_type: Option<String>,
    ) -> Result<Self> {
        let interval = StayInterval::new(check_in, check_out).map_err(Error::from)?;
        ensure_not_past(&interval)?;
        Ok(Self {
            interval,
            room_type: room_type.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Creates an availability query from raw date strings (`YYYY-MM-DD`),
    /// the form in which the transport boundary receives them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either date is unparsable, in
    /// addition to the rules enforced by [`AvailabilityQuery::new`].
    pub fn parse(
        check_in: &str,
        check_out: &str,
        room_type: Option<String>,
    ) -> Result<Self> {
        let check_in = parse_date("check_in", check_in)?;
        let check_out = parse_date("check_out", check_out)?;
        Self::new(check_in, check_out, room_type)
    }

    /// Returns the queried interval.
    #[must_use]
    pub const fn interval(&self) -> StayInterval {
        self.interval
    }

    /// Returns the room-type filter, if any.
    #[must_use]
    pub fn room_type(&self) -> Option<&str> {
        self.room_type.as_deref()
    }
}

/// Computes room availability over date intervals.
///
/// Holds a shared borrow of the store handle; availability never writes.
pub struct AvailabilityEngine<'a> {
    store: &'a Store,
}

impl<'a> AvailabilityEngine<'a> {
    /// Creates an engine over the given store handle.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Returns every room that is flagged `available` and has no active
    /// reservation overlapping the queried interval, ordered by room
    /// number.
    ///
    /// Both occupancy signals must clear: the stored status flag and the
    /// interval-derived check against non-cancelled reservations, the
    /// latter under the inclusive-both-ends overlap rule.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the query fails.
    pub fn find_available(&self, query: &AvailabilityQuery) -> Result<Vec<Room>> {
        rooms::find_available_rooms(
            self.store.connection(),
            &query.interval(),
            query.room_type(),
        )
    }
}

fn parse_date(field: &str, text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(|e| Error::Validation {
        field: field.into(),
        message: format!("unparsable date '{text}': {e}"),
    })
}

/// Rejects intervals whose check-in date is already in the past
/// (date-only comparison; time of day is ignored).
pub(crate) fn ensure_not_past(interval: &StayInterval) -> Result<()> {
    let today = Utc::now().date_naive();
    if interval.check_in() < today {
        return Err(Error::Validation {
            field: "check_in".into(),
            message: format!("check_in {} is before today {today}", interval.check_in()),
        });
    }
    Ok(())
}
