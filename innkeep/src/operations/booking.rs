//! Reservation lifecycle: creation, status transitions, and the
//! administrative patch.
//!
//! Every mutation here is one unit of work: an immediate transaction that
//! takes the store's write lock before the first read, so the guard checks
//! and the writes they protect commit atomically. In particular, `create`
//! re-runs the availability check inside its transaction, which closes the
//! gap between an engine-level availability read and the reservation
//! insert; two concurrent creates for the same room serialize on the write
//! lock and the loser observes the winner's committed reservation.

use chrono::Utc;

use crate::error::{Error, Result, RoomUnavailableReason};
use crate::operations::availability::ensure_not_past;
use crate::reservation::{
    validate_amount, BookingRequest, ReservationPatch, ReservationRecord, ReservationStatus,
    StayInterval,
};
use crate::room::RoomStatus;
use crate::store::{reservations, rooms, Store};

/// Orchestrates reservation creation, status transitions, and the
/// administrative patch.
///
/// Holds an exclusive borrow of the store handle for the duration of the
/// lifecycle operations it performs.
///
/// # Examples
///
/// ```no_run
/// use chrono::{Duration, Utc};
/// use innkeep::{BookingRequest, ReservationLifecycle, StayInterval, Store, StoreConfig};
///
/// let mut store = Store::open(StoreConfig::new("/tmp/innkeep.db")).unwrap();
///
/// let today = Utc::now().date_naive();
/// let interval = StayInterval::new(
///     today + Duration::days(7),
///     today + Duration::days(9),
/// )
/// .unwrap();
/// let request = BookingRequest::new(1, 1, interval, 240.0).unwrap();
///
/// let record = ReservationLifecycle::new(&mut store).create(&request).unwrap();
/// println!("booked room {}", record.room_number);
/// ```
pub struct ReservationLifecycle<'a> {
    store: &'a mut Store,
}

impl<'a> ReservationLifecycle<'a> {
    /// Creates a lifecycle over the given store handle.
    #[must_use]
    pub fn new(store: &'a mut Store) -> Self {
        Self { store }
    }

    /// Creates a reservation.
    ///
    /// Within one transaction: loads the room, requires its status flag to
    /// be `available` and the interval to be free of active reservations
    /// (the same overlap rule the availability engine uses), inserts the
    /// reservation with status `pending`, and flips the room to
    /// `occupied`. Returns the reservation joined with the room's number
    /// and type.
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if the check-in date is in the past
    /// - [`Error::NotFound`] if the room does not exist
    /// - [`Error::RoomUnavailable`] if the flag or the overlap check fails
    /// - [`Error::Storage`] on any persistence fault; no reservation row
    ///   and no status change survive a failed attempt
    pub fn create(&mut self, request: &BookingRequest) -> Result<ReservationRecord> {
        ensure_not_past(&request.interval())?;

        let tx = self.store.begin_transaction()?;

        let room = rooms::fetch_room(&tx, request.room_id())?.ok_or_else(|| Error::NotFound {
            resource: format!("room {}", request.room_id()),
        })?;

        if room.status != RoomStatus::Available {
            return Err(Error::RoomUnavailable {
                room_id: room.id,
                reason: RoomUnavailableReason::FlaggedOccupied,
            });
        }
        if !reservations::room_is_free(&tx, room.id, &request.interval())? {
            log::debug!(
                "booking conflict on room {} for {}",
                room.number,
                request.interval()
            );
            return Err(Error::RoomUnavailable {
                room_id: room.id,
                reason: RoomUnavailableReason::OverlappingReservation,
            });
        }

        let id = reservations::insert_reservation(&tx, request, Utc::now())?;
        rooms::set_status(&tx, room.id, RoomStatus::Occupied)?;

        let record = reservations::fetch_record(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("reservation {id}"),
        })?;
        tx.commit()?;
        Ok(record)
    }

    /// Advances a reservation's status.
    ///
    /// When the new status is `cancelled`, the room's status flag is set
    /// back to `available` in the same transaction. Re-asserting the
    /// current status is accepted; re-cancelling therefore simply
    /// re-asserts `available` on the room, which is harmless.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the reservation does not exist
    /// - [`Error::InvalidTransition`] for unsupported transitions, in
    ///   particular anything that would leave `cancelled`
    /// - [`Error::Storage`] on persistence faults (full rollback)
    pub fn update_status(
        &mut self,
        id: i64,
        new_status: ReservationStatus,
    ) -> Result<ReservationRecord> {
        let tx = self.store.begin_transaction()?;

        let current = reservations::fetch_record(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("reservation {id}"),
        })?;

        let from = current.reservation.status;
        if !from.can_transition_to(new_status) {
            return Err(Error::InvalidTransition {
                from,
                to: new_status,
            });
        }

        reservations::set_status(&tx, id, new_status)?;
        if new_status == ReservationStatus::Cancelled {
            rooms::set_status(&tx, current.reservation.room_id, RoomStatus::Available)?;
        }

        let refreshed = reservations::fetch_record(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("reservation {id}"),
        })?;
        tx.commit()?;
        Ok(refreshed)
    }

    /// Applies an administrative patch to a reservation.
    ///
    /// This is an escape hatch for staff corrections. It rewrites the
    /// patched fields directly: no availability re-check runs, the room's
    /// status flag is not synchronized, and a status set through a patch
    /// bypasses the transition guard. A patch can therefore leave the
    /// room's occupancy flag inconsistent with the reservation's dates;
    /// callers must be aware of that.
    ///
    /// The merged row must still satisfy the unconditional invariants:
    /// `check_out > check_in` and a finite, non-negative amount.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the reservation does not exist
    /// - [`Error::Validation`] if the merged fields violate the row
    ///   invariants; nothing is written in that case
    /// - [`Error::Storage`] on persistence faults (full rollback)
    pub fn update(&mut self, id: i64, patch: &ReservationPatch) -> Result<ReservationRecord> {
        let tx = self.store.begin_transaction()?;

        let current = reservations::fetch_record(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("reservation {id}"),
        })?;

        let merged_interval = StayInterval::new(
            patch.check_in.unwrap_or(current.reservation.interval.check_in()),
            patch
                .check_out
                .unwrap_or(current.reservation.interval.check_out()),
        )?;
        let merged_amount = patch.total_amount.unwrap_or(current.reservation.total_amount);
        validate_amount("total_amount", merged_amount)?;
        let merged_status = patch.status.unwrap_or(current.reservation.status);

        reservations::apply_patch(&tx, id, &merged_interval, merged_amount, merged_status)?;

        let refreshed = reservations::fetch_record(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("reservation {id}"),
        })?;
        tx.commit()?;
        Ok(refreshed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_util::{create_test_room, create_test_store, future_interval};
    use chrono::Duration;

    fn book(
        store: &mut Store,
        client_id: i64,
        room_id: i64,
        start: i64,
        end: i64,
    ) -> Result<ReservationRecord> {
        let request =
            BookingRequest::new(client_id, room_id, future_interval(start, end), 240.0).unwrap();
        ReservationLifecycle::new(store).create(&request)
    }

    #[test]
    fn test_create_books_room_and_flips_flag() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");

        let record = book(&mut store, 1, room.id, 10, 12).unwrap();
        assert_eq!(record.reservation.status, ReservationStatus::Pending);
        assert_eq!(record.room_number, "101");
        assert_eq!(record.room_type, "double");

        let room = store.get_room(room.id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
    }

    #[test]
    fn test_create_rejects_missing_room() {
        let mut store = create_test_store();
        let result = book(&mut store, 1, 42, 10, 12);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_create_rejects_past_check_in() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");

        let today = Utc::now().date_naive();
        let interval =
            StayInterval::new(today - Duration::days(2), today + Duration::days(1)).unwrap();
        let request = BookingRequest::new(1, room.id, interval, 100.0).unwrap();

        let result = ReservationLifecycle::new(&mut store).create(&request);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_create_rejects_flagged_room() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        store
            .set_room_status(room.id, RoomStatus::Occupied)
            .unwrap();

        let result = book(&mut store, 1, room.id, 10, 12);
        assert!(matches!(
            result,
            Err(Error::RoomUnavailable {
                reason: RoomUnavailableReason::FlaggedOccupied,
                ..
            })
        ));
    }

    #[test]
    fn test_create_rejects_overlap_even_when_flag_clear() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        book(&mut store, 1, room.id, 10, 12).unwrap();

        // Clear the flag so only the interval-derived check can catch the
        // conflict; the two signals are independent on purpose.
        store
            .set_room_status(room.id, RoomStatus::Available)
            .unwrap();

        let result = book(&mut store, 2, room.id, 11, 13);
        assert!(matches!(
            result,
            Err(Error::RoomUnavailable {
                reason: RoomUnavailableReason::OverlappingReservation,
                ..
            })
        ));

        // The failed attempt wrote nothing.
        assert_eq!(store.list_reservations().unwrap().len(), 1);
    }

    #[test]
    fn test_create_boundary_day_conflicts() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        book(&mut store, 1, room.id, 10, 12).unwrap();
        store
            .set_room_status(room.id, RoomStatus::Available)
            .unwrap();

        // New stay beginning on the existing checkout day still conflicts.
        let result = book(&mut store, 2, room.id, 12, 14);
        assert!(matches!(result, Err(Error::RoomUnavailable { .. })));

        // A strict one-day gap books fine.
        assert!(book(&mut store, 2, room.id, 13, 15).is_ok());
    }

    #[test]
    fn test_create_allows_rebooking_after_cancellation() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();

        ReservationLifecycle::new(&mut store)
            .update_status(record.reservation.id, ReservationStatus::Cancelled)
            .unwrap();

        assert!(book(&mut store, 2, room.id, 10, 12).is_ok());
    }

    #[test]
    fn test_update_status_confirm() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();

        let confirmed = ReservationLifecycle::new(&mut store)
            .update_status(record.reservation.id, ReservationStatus::Confirmed)
            .unwrap();
        assert_eq!(confirmed.reservation.status, ReservationStatus::Confirmed);

        // Confirming does not touch the room flag.
        let room = store.get_room(room.id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
    }

    #[test]
    fn test_update_status_cancel_frees_room() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();

        let cancelled = ReservationLifecycle::new(&mut store)
            .update_status(record.reservation.id, ReservationStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.reservation.status, ReservationStatus::Cancelled);

        let room = store.get_room(room.id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[test]
    fn test_update_status_recancel_is_idempotent() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();
        let id = record.reservation.id;

        ReservationLifecycle::new(&mut store)
            .update_status(id, ReservationStatus::Cancelled)
            .unwrap();

        // Simulate staff re-occupying the room, then re-cancelling the
        // reservation: the cancel re-asserts `available`.
        store
            .set_room_status(room.id, RoomStatus::Occupied)
            .unwrap();
        ReservationLifecycle::new(&mut store)
            .update_status(id, ReservationStatus::Cancelled)
            .unwrap();

        let room = store.get_room(room.id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Available);
    }

    #[test]
    fn test_update_status_rejects_reanimation() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();
        let id = record.reservation.id;

        ReservationLifecycle::new(&mut store)
            .update_status(id, ReservationStatus::Cancelled)
            .unwrap();

        let result =
            ReservationLifecycle::new(&mut store).update_status(id, ReservationStatus::Confirmed);
        assert!(matches!(
            result,
            Err(Error::InvalidTransition {
                from: ReservationStatus::Cancelled,
                to: ReservationStatus::Confirmed,
            })
        ));
    }

    #[test]
    fn test_update_status_not_found() {
        let mut store = create_test_store();
        let result =
            ReservationLifecycle::new(&mut store).update_status(7, ReservationStatus::Confirmed);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_patch_moves_dates_without_room_sync() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();

        let moved = future_interval(40, 45);
        let patch = ReservationPatch::new()
            .with_check_in(moved.check_in())
            .with_check_out(moved.check_out());

        let updated = ReservationLifecycle::new(&mut store)
            .update(record.reservation.id, &patch)
            .unwrap();
        assert_eq!(updated.reservation.interval, moved);

        // The escape hatch leaves the room flag untouched: still occupied,
        // even though the stay moved. Documented desync.
        let room = store.get_room(room.id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
    }

    #[test]
    fn test_patch_rejects_inverted_merge() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();
        let id = record.reservation.id;

        // Patching only check_in past the current check_out must fail on
        // the merged row.
        let bad_patch =
            ReservationPatch::new().with_check_in(future_interval(20, 21).check_in());
        let result = ReservationLifecycle::new(&mut store).update(id, &bad_patch);
        assert!(matches!(result, Err(Error::Validation { .. })));

        // And nothing changed.
        let current = store.get_reservation(id).unwrap().unwrap();
        assert_eq!(current.reservation.interval, record.reservation.interval);
    }

    #[test]
    fn test_patch_rejects_bad_amount() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();

        let patch = ReservationPatch::new().with_total_amount(-10.0);
        let result = ReservationLifecycle::new(&mut store).update(record.reservation.id, &patch);
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[test]
    fn test_patch_not_found() {
        let mut store = create_test_store();
        let patch = ReservationPatch::new().with_total_amount(10.0);
        let result = ReservationLifecycle::new(&mut store).update(99, &patch);
        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_patch_can_set_status_directly() {
        let mut store = create_test_store();
        let room = create_test_room(&mut store, "101");
        let record = book(&mut store, 1, room.id, 10, 12).unwrap();

        // The patch path does not run the transition guard and does not
        // free the room; that is what update_status is for.
        let patch = ReservationPatch::new().with_status(ReservationStatus::Cancelled);
        let updated = ReservationLifecycle::new(&mut store)
            .update(record.reservation.id, &patch)
            .unwrap();
        assert_eq!(updated.reservation.status, ReservationStatus::Cancelled);

        let room = store.get_room(room.id).unwrap().unwrap();
        assert_eq!(room.status, RoomStatus::Occupied);
    }
}
