//! Reservation types: stay intervals, the status state machine, and the
//! validated request/patch structures consumed by the booking lifecycle.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A stay window bounded by check-in and check-out dates.
///
/// For conflict purposes the interval is *inclusive on both ends*: a
/// reservation ending the same day another begins counts as overlapping,
/// which sidesteps same-day turnover ambiguity.
///
/// `check_out` must be strictly after `check_in`; the constructor enforces
/// this for every interval that can exist in the system.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use innkeep::StayInterval;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
///
/// let first = StayInterval::new(d(2030, 6, 10), d(2030, 6, 12)).unwrap();
/// let second = StayInterval::new(d(2030, 6, 12), d(2030, 6, 14)).unwrap();
///
/// // Back-to-back stays share a day, so they conflict.
/// assert!(first.overlaps(&second));
///
/// // A one-day gap is enough.
/// let third = StayInterval::new(d(2030, 6, 13), d(2030, 6, 15)).unwrap();
/// assert!(!first.overlaps(&third));
///
/// // check_out must come after check_in.
/// assert!(StayInterval::new(d(2030, 6, 12), d(2030, 6, 12)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayInterval {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl StayInterval {
    /// Creates a stay interval.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if `check_out` is not strictly after
    /// `check_in`.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self, ValidationError> {
        if check_out <= check_in {
            return Err(ValidationError {
                field: "check_out".into(),
                message: format!("check_out {check_out} must be after check_in {check_in}"),
            });
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in date.
    #[must_use]
    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Returns the check-out date.
    #[must_use]
    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Returns the number of nights spanned by the interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use innkeep::StayInterval;
    ///
    /// let interval = StayInterval::new(
    ///     NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
    ///     NaiveDate::from_ymd_opt(2030, 6, 12).unwrap(),
    /// )
    /// .unwrap();
    /// assert_eq!(interval.nights(), 2);
    /// ```
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Returns `true` if the two intervals conflict under the
    /// inclusive-both-ends rule:
    /// `self.check_in <= other.check_out && self.check_out >= other.check_in`.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in <= other.check_out && self.check_out >= other.check_in
    }
}

impl fmt::Display for StayInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.check_in, self.check_out)
    }
}

/// Status of a reservation.
///
/// The state machine is `pending -> confirmed`, `pending -> cancelled`, and
/// `confirmed -> cancelled`. Nothing leaves `cancelled`. Re-asserting the
/// current status is always permitted so that, in particular, re-cancelling
/// an already-cancelled reservation stays idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Created, awaiting confirmation.
    Pending,
    /// Confirmed stay.
    Confirmed,
    /// Cancelled; terminal.
    Cancelled,
}

impl ReservationStatus {
    /// Returns the stored text form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` if the reservation still blocks its room's interval.
    ///
    /// Pending and confirmed reservations count against availability;
    /// cancelled ones do not.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Returns `true` if the transition from `self` to `to` is supported.
    ///
    /// # Examples
    ///
    /// ```
    /// use innkeep::ReservationStatus;
    ///
    /// assert!(ReservationStatus::Pending.can_transition_to(ReservationStatus::Confirmed));
    /// assert!(ReservationStatus::Confirmed.can_transition_to(ReservationStatus::Cancelled));
    /// assert!(ReservationStatus::Cancelled.can_transition_to(ReservationStatus::Cancelled));
    /// assert!(!ReservationStatus::Cancelled.can_transition_to(ReservationStatus::Confirmed));
    /// ```
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReservationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ValidationError {
                field: "status".into(),
                message: format!("unknown reservation status '{other}'"),
            }),
        }
    }
}

/// A persisted reservation row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Row id.
    pub id: i64,
    /// Reference to the externally-owned client identity.
    pub client_id: i64,
    /// The booked room.
    pub room_id: i64,
    /// The stay window.
    pub interval: StayInterval,
    /// Total charge for the stay.
    pub total_amount: f64,
    /// Current lifecycle status.
    pub status: ReservationStatus,
    /// When the reservation row was created.
    pub created_at: DateTime<Utc>,
}

/// A reservation joined with the metadata of its room.
///
/// This is the shape returned to callers of the booking lifecycle and the
/// reservation queries: the row itself plus the room number and type, so
/// the boundary layer never needs a second round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// The reservation row.
    pub reservation: Reservation,
    /// The booked room's number.
    pub room_number: String,
    /// The booked room's type.
    pub room_type: String,
}

/// A validated request to create a reservation.
///
/// The authenticated caller's identity arrives as `client_id`; the core
/// does not verify that the caller may act on that identity; ownership
/// enforcement belongs to the boundary.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use innkeep::{BookingRequest, StayInterval};
///
/// let interval = StayInterval::new(
///     NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
///     NaiveDate::from_ymd_opt(2030, 6, 12).unwrap(),
/// )
/// .unwrap();
///
/// let request = BookingRequest::new(1, 7, interval, 240.0).unwrap();
/// assert_eq!(request.room_id(), 7);
///
/// // Amounts must be finite and non-negative.
/// assert!(BookingRequest::new(1, 7, interval, -5.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    client_id: i64,
    room_id: i64,
    interval: StayInterval,
    total_amount: f64,
}

impl BookingRequest {
    /// Creates a booking request.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if either id is non-positive or the
    /// amount is negative, NaN, or infinite.
    pub fn new(
        client_id: i64,
        room_id: i64,
        interval: StayInterval,
        total_amount: f64,
    ) -> Result<Self, ValidationError> {
        if client_id <= 0 {
            return Err(ValidationError {
                field: "client_id".into(),
                message: format!("client_id must be positive, got {client_id}"),
            });
        }
        if room_id <= 0 {
            return Err(ValidationError {
                field: "room_id".into(),
                message: format!("room_id must be positive, got {room_id}"),
            });
        }
        validate_amount("total_amount", total_amount)?;
        Ok(Self {
            client_id,
            room_id,
            interval,
            total_amount,
        })
    }

    /// Returns the client reference.
    #[must_use]
    pub const fn client_id(&self) -> i64 {
        self.client_id
    }

    /// Returns the target room id.
    #[must_use]
    pub const fn room_id(&self) -> i64 {
        self.room_id
    }

    /// Returns the requested stay interval.
    #[must_use]
    pub const fn interval(&self) -> StayInterval {
        self.interval
    }

    /// Returns the total charge.
    #[must_use]
    pub const fn total_amount(&self) -> f64 {
        self.total_amount
    }
}

/// An administrative patch for a reservation.
///
/// Every mutable field is enumerated explicitly; there is no way to smuggle
/// an unknown field through. Applying a patch bypasses the availability
/// check and the room-status synchronization on purpose; see
/// [`ReservationLifecycle::update`](crate::ReservationLifecycle::update)
/// for the caveats.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationPatch {
    /// New check-in date, if changing.
    pub check_in: Option<NaiveDate>,
    /// New check-out date, if changing.
    pub check_out: Option<NaiveDate>,
    /// New total amount, if changing.
    pub total_amount: Option<f64>,
    /// New status, if changing.
    pub status: Option<ReservationStatus>,
}

impl ReservationPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the check-in date.
    #[must_use]
    pub const fn with_check_in(mut self, check_in: NaiveDate) -> Self {
        self.check_in = Some(check_in);
        self
    }

    /// Sets the check-out date.
    #[must_use]
    pub const fn with_check_out(mut self, check_out: NaiveDate) -> Self {
        self.check_out = Some(check_out);
        self
    }

    /// Sets the total amount.
    #[must_use]
    pub const fn with_total_amount(mut self, total_amount: f64) -> Self {
        self.total_amount = Some(total_amount);
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: ReservationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.check_in.is_none()
            && self.check_out.is_none()
            && self.total_amount.is_none()
            && self.status.is_none()
    }
}

/// Error type for validation failures raised by domain constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates that a monetary amount is finite and non-negative.
pub(crate) fn validate_amount(field: &str, amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError {
            field: field.into(),
            message: format!("must be a non-negative finite number, got {amount}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn interval(ci: (i32, u32, u32), co: (i32, u32, u32)) -> StayInterval {
        StayInterval::new(date(ci.0, ci.1, ci.2), date(co.0, co.1, co.2)).unwrap()
    }

    #[test]
    fn test_interval_rejects_equal_dates() {
        let result = StayInterval::new(date(2030, 6, 10), date(2030, 6, 10));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().field, "check_out");
    }

    #[test]
    fn test_interval_rejects_inverted_dates() {
        assert!(StayInterval::new(date(2030, 6, 12), date(2030, 6, 10)).is_err());
    }

    #[test]
    fn test_interval_nights() {
        assert_eq!(interval((2030, 6, 10), (2030, 6, 12)).nights(), 2);
        assert_eq!(interval((2030, 6, 30), (2030, 7, 1)).nights(), 1);
    }

    #[test]
    fn test_overlap_contained() {
        let outer = interval((2030, 6, 1), (2030, 6, 30));
        let inner = interval((2030, 6, 10), (2030, 6, 12));
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_overlap_shared_boundary_day() {
        // Checkout day equals the other stay's check-in day: conflict by design.
        let first = interval((2030, 6, 10), (2030, 6, 12));
        let second = interval((2030, 6, 12), (2030, 6, 14));
        assert!(first.overlaps(&second));
        assert!(second.overlaps(&first));
    }

    #[test]
    fn test_overlap_disjoint() {
        let first = interval((2030, 6, 10), (2030, 6, 12));
        let later = interval((2030, 6, 13), (2030, 6, 15));
        assert!(!first.overlaps(&later));
        assert!(!later.overlaps(&first));
    }

    #[test]
    fn test_interval_display() {
        let i = interval((2030, 6, 10), (2030, 6, 12));
        assert_eq!(format!("{i}"), "2030-06-10..2030-06-12");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ] {
            let parsed: ReservationStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("checked_in".parse::<ReservationStatus>().is_err());
    }

    #[test]
    fn test_status_transitions() {
        use ReservationStatus::{Cancelled, Confirmed, Pending};

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));

        // Nothing reanimates a cancelled reservation.
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));

        // Demoting a confirmed reservation is not supported either.
        assert!(!Confirmed.can_transition_to(Pending));

        // Re-asserting the current status is idempotent.
        assert!(Pending.can_transition_to(Pending));
        assert!(Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn test_status_activity() {
        assert!(ReservationStatus::Pending.is_active());
        assert!(ReservationStatus::Confirmed.is_active());
        assert!(!ReservationStatus::Cancelled.is_active());
    }

    #[test]
    fn test_booking_request_validation() {
        let i = interval((2030, 6, 10), (2030, 6, 12));

        assert!(BookingRequest::new(1, 1, i, 0.0).is_ok());
        assert!(BookingRequest::new(0, 1, i, 10.0).is_err());
        assert!(BookingRequest::new(1, -3, i, 10.0).is_err());
        assert!(BookingRequest::new(1, 1, i, f64::NAN).is_err());
        assert!(BookingRequest::new(1, 1, i, f64::INFINITY).is_err());
        assert!(BookingRequest::new(1, 1, i, -0.01).is_err());
    }

    #[test]
    fn test_patch_builder() {
        let patch = ReservationPatch::new()
            .with_check_in(date(2030, 6, 11))
            .with_total_amount(99.5);

        assert_eq!(patch.check_in, Some(date(2030, 6, 11)));
        assert_eq!(patch.check_out, None);
        assert_eq!(patch.total_amount, Some(99.5));
        assert_eq!(patch.status, None);
        assert!(!patch.is_empty());
        assert!(ReservationPatch::new().is_empty());
    }

    #[test]
    fn test_reservation_serde() {
        let reservation = Reservation {
            id: 1,
            client_id: 2,
            room_id: 3,
            interval: interval((2030, 6, 10), (2030, 6, 12)),
            total_amount: 240.0,
            status: ReservationStatus::Pending,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_string(&reservation).unwrap();
        assert!(json.contains("\"pending\""));
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reservation);
    }

    // Property-based tests for the overlap rule and the state machine.
    // These verify the invariants the booking core leans on.
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        // Strategy producing an arbitrary valid StayInterval within a
        // ten-year window.
        fn interval_strategy() -> impl Strategy<Value = StayInterval> {
            (0i64..3650, 1i64..60).prop_map(|(start, len)| {
                let base = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
                let check_in = base + chrono::Duration::days(start);
                let check_out = check_in + chrono::Duration::days(len);
                StayInterval::new(check_in, check_out).unwrap()
            })
        }

        fn status_strategy() -> impl Strategy<Value = ReservationStatus> {
            prop_oneof![
                Just(ReservationStatus::Pending),
                Just(ReservationStatus::Confirmed),
                Just(ReservationStatus::Cancelled),
            ]
        }

        // PROPERTY: overlap is symmetric.
        proptest! {
            #[test]
            fn prop_overlap_symmetric(a in interval_strategy(), b in interval_strategy()) {
                prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            }
        }

        // PROPERTY: every interval overlaps itself.
        proptest! {
            #[test]
            fn prop_overlap_reflexive(a in interval_strategy()) {
                prop_assert!(a.overlaps(&a));
            }
        }

        // PROPERTY: non-overlap means one interval ends strictly before
        // the other begins. This pins the inclusive-both-ends rule: a
        // shared boundary day is never a non-overlap.
        proptest! {
            #[test]
            fn prop_disjoint_iff_strict_gap(a in interval_strategy(), b in interval_strategy()) {
                let disjoint = !a.overlaps(&b);
                let strict_gap =
                    a.check_out() < b.check_in() || b.check_out() < a.check_in();
                prop_assert_eq!(disjoint, strict_gap);
            }
        }

        // PROPERTY: cancelled is absorbing. The only status reachable
        // from cancelled is cancelled itself.
        proptest! {
            #[test]
            fn prop_cancelled_is_absorbing(to in status_strategy()) {
                let allowed = ReservationStatus::Cancelled.can_transition_to(to);
                prop_assert_eq!(allowed, to == ReservationStatus::Cancelled);
            }
        }

        // PROPERTY: re-asserting any status is allowed (idempotency of
        // status updates).
        proptest! {
            #[test]
            fn prop_self_transition_allowed(s in status_strategy()) {
                prop_assert!(s.can_transition_to(s));
            }
        }
    }
}
