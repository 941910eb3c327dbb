//! Room data access.
//!
//! Reads are plain queries; every mutation runs inside an immediate
//! transaction so the guard checks and the write commit as one unit.

use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::room::{NewRoom, Room, RoomStatus, RoomUpdate};

use super::connection::Store;

const SELECT_ROOM: &str = r"
    SELECT id, number, room_type, description, features, price_per_night, status
    FROM rooms
    WHERE id = ?
";

const LIST_ROOMS: &str = r"
    SELECT id, number, room_type, description, features, price_per_night, status
    FROM rooms
    ORDER BY number ASC
";

const INSERT_ROOM: &str = r"
    INSERT INTO rooms (number, room_type, description, features, price_per_night, status)
    VALUES (?, ?, ?, ?, ?, ?)
";

const UPDATE_ROOM: &str = r"
    UPDATE rooms
    SET number = ?, room_type = ?, description = ?, features = ?,
        price_per_night = ?, status = ?
    WHERE id = ?
";

const UPDATE_ROOM_STATUS: &str = "UPDATE rooms SET status = ? WHERE id = ?";

const DELETE_ROOM: &str = "DELETE FROM rooms WHERE id = ?";

const COUNT_NUMBER_TAKEN: &str = "SELECT COUNT(*) FROM rooms WHERE number = ? AND id != ?";

const COUNT_ROOM_RESERVATIONS: &str = "SELECT COUNT(*) FROM reservations WHERE room_id = ?";

const FIND_AVAILABLE: &str = r"
    SELECT r.id, r.number, r.room_type, r.description, r.features, r.price_per_night, r.status
    FROM rooms r
    WHERE r.status = 'available'
      AND r.id NOT IN (
          SELECT room_id
          FROM reservations
          WHERE check_in <= ? AND check_out >= ?
            AND status != 'cancelled'
      )
    ORDER BY r.number ASC
";

const FIND_AVAILABLE_BY_TYPE: &str = r"
    SELECT r.id, r.number, r.room_type, r.description, r.features, r.price_per_night, r.status
    FROM rooms r
    WHERE r.status = 'available'
      AND r.id NOT IN (
          SELECT room_id
          FROM reservations
          WHERE check_in <= ? AND check_out >= ?
            AND status != 'cancelled'
      )
      AND r.room_type = ?
    ORDER BY r.number ASC
";

/// Deserializes a room from a database row.
///
/// Expects columns in this order: id, number, `room_type`, description,
/// features, `price_per_night`, status.
fn row_to_room(row: &rusqlite::Row<'_>) -> rusqlite::Result<Room> {
    let features_json: String = row.get(4)?;
    let status_text: String = row.get(6)?;

    let status = status_text
        .parse::<RoomStatus>()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    Ok(Room {
        id: row.get(0)?,
        number: row.get(1)?,
        room_type: row.get(2)?,
        description: row.get(3)?,
        // Tolerate malformed feature JSON rather than poisoning reads.
        features: serde_json::from_str(&features_json).unwrap_or_default(),
        price_per_night: row.get(5)?,
        status,
    })
}

fn encode_features(features: &[String]) -> Result<String> {
    serde_json::to_string(features).map_err(|e| Error::Validation {
        field: "features".into(),
        message: format!("feature list is not serializable: {e}"),
    })
}

/// Retrieves a room by id using an existing connection or transaction.
pub(crate) fn fetch_room(conn: &Connection, id: i64) -> Result<Option<Room>> {
    let mut stmt = conn.prepare(SELECT_ROOM)?;
    match stmt.query_row(params![id], row_to_room) {
        Ok(room) => Ok(Some(room)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Finds rooms whose status flag is `available` and that have no active
/// reservation overlapping the interval, optionally filtered by type.
///
/// The overlap condition mirrors
/// [`reservations::room_is_free`](super::reservations::room_is_free):
/// inclusive on both ends.
pub(crate) fn find_available_rooms(
    conn: &Connection,
    interval: &crate::reservation::StayInterval,
    room_type: Option<&str>,
) -> Result<Vec<Room>> {
    let check_out = interval.check_out().to_string();
    let check_in = interval.check_in().to_string();

    let rooms = match room_type {
        Some(kind) => {
            let mut stmt = conn.prepare(FIND_AVAILABLE_BY_TYPE)?;
            let rooms = stmt
                .query_map(params![check_out, check_in, kind], row_to_room)?
                .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
            rooms
        }
        None => {
            let mut stmt = conn.prepare(FIND_AVAILABLE)?;
            let rooms = stmt
                .query_map(params![check_out, check_in], row_to_room)?
                .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
            rooms
        }
    };
    Ok(rooms)
}

/// Sets a room's status flag using an existing connection or transaction.
///
/// Returns `true` if a row was updated.
pub(crate) fn set_status(conn: &Connection, id: i64, status: RoomStatus) -> Result<bool> {
    let rows_affected = conn.execute(UPDATE_ROOM_STATUS, params![status.as_str(), id])?;
    Ok(rows_affected > 0)
}

fn ensure_number_free(conn: &Connection, number: &str, exclude_id: i64) -> Result<()> {
    let taken: i64 = conn.query_row(COUNT_NUMBER_TAKEN, params![number, exclude_id], |row| {
        row.get(0)
    })?;
    if taken > 0 {
        return Err(Error::Conflict {
            details: format!("room number '{number}' already exists"),
        });
    }
    Ok(())
}

impl Store {
    /// Creates a room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if the room number is already taken,
    /// or a storage error if the insert fails (full rollback).
    pub fn create_room(&mut self, room: &NewRoom) -> Result<Room> {
        let features = encode_features(room.features())?;
        let tx = self.begin_transaction()?;

        ensure_number_free(&tx, room.number(), 0)?;

        tx.execute(
            INSERT_ROOM,
            params![
                room.number(),
                room.room_type(),
                room.description(),
                features,
                room.price_per_night(),
                room.status().as_str(),
            ],
        )?;
        let id = tx.last_insert_rowid();

        let created = fetch_room(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("room {id}"),
        })?;
        tx.commit()?;
        Ok(created)
    }

    /// Retrieves a room by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_room(&self, id: i64) -> Result<Option<Room>> {
        fetch_room(&self.conn, id)
    }

    /// Lists all rooms ordered by room number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_rooms(&self) -> Result<Vec<Room>> {
        let mut stmt = self.conn.prepare(LIST_ROOMS)?;
        let rooms = stmt
            .query_map([], row_to_room)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(rooms)
    }

    /// Replaces every mutable field of a room.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the room does not exist,
    /// [`Error::Conflict`] if the new number collides with another room,
    /// or a validation error for malformed fields. Nothing is written on
    /// any failure.
    pub fn update_room(&mut self, id: i64, update: &RoomUpdate) -> Result<Room> {
        update.validate()?;
        let features = encode_features(&update.features)?;
        let tx = self.begin_transaction()?;

        if fetch_room(&tx, id)?.is_none() {
            return Err(Error::NotFound {
                resource: format!("room {id}"),
            });
        }
        ensure_number_free(&tx, update.number.trim(), id)?;

        tx.execute(
            UPDATE_ROOM,
            params![
                update.number.trim(),
                update.room_type.trim(),
                update.description,
                features,
                update.price_per_night,
                update.status.as_str(),
                id,
            ],
        )?;

        let updated = fetch_room(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("room {id}"),
        })?;
        tx.commit()?;
        Ok(updated)
    }

    /// Sets only the operational status flag of a room.
    ///
    /// This is the staff-facing toggle; the booking lifecycle flips the
    /// same flag as part of its own transactions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the room does not exist.
    pub fn set_room_status(&mut self, id: i64, status: RoomStatus) -> Result<Room> {
        let tx = self.begin_transaction()?;

        if !set_status(&tx, id, status)? {
            return Err(Error::NotFound {
                resource: format!("room {id}"),
            });
        }
        let updated = fetch_room(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("room {id}"),
        })?;
        tx.commit()?;
        Ok(updated)
    }

    /// Deletes a room.
    ///
    /// A room cannot be deleted while its status flag is `occupied` or
    /// while any reservation row references it, active or not; the
    /// reservation history doubles as an audit trail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the room does not exist, or
    /// [`Error::Conflict`] if a guard rejects the deletion. The guards
    /// run before any mutation.
    pub fn delete_room(&mut self, id: i64) -> Result<()> {
        let tx = self.begin_transaction()?;

        let room = fetch_room(&tx, id)?.ok_or_else(|| Error::NotFound {
            resource: format!("room {id}"),
        })?;
        if room.status == RoomStatus::Occupied {
            return Err(Error::Conflict {
                details: format!("cannot delete room '{}': currently occupied", room.number),
            });
        }

        let reservations: i64 =
            tx.query_row(COUNT_ROOM_RESERVATIONS, params![id], |row| row.get(0))?;
        if reservations > 0 {
            return Err(Error::Conflict {
                details: format!(
                    "cannot delete room '{}': {reservations} reservation(s) reference it",
                    room.number
                ),
            });
        }

        tx.execute(DELETE_ROOM, params![id])?;
        tx.commit()?;
        Ok(())
    }
}
