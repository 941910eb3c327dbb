//! Reservation data access.
//!
//! Row mapping, joined reads, and the connection-level helpers the
//! booking lifecycle composes inside its own transactions. The overlap
//! predicate here is the single authoritative implementation of the
//! inclusive-both-ends conflict rule; the availability engine and the
//! lifecycle both call it.

use chrono::{DateTime, NaiveDate};
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::reservation::{
    BookingRequest, Reservation, ReservationRecord, ReservationStatus, StayInterval,
    ValidationError,
};

use super::connection::Store;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_RECORD: &str = r"
    SELECT r.id, r.client_id, r.room_id, r.check_in, r.check_out,
           r.total_amount, r.status, r.created_at,
           rm.number AS room_number, rm.room_type AS room_type
    FROM reservations r
    JOIN rooms rm ON r.room_id = rm.id
    WHERE r.id = ?
";

const LIST_RECORDS: &str = r"
    SELECT r.id, r.client_id, r.room_id, r.check_in, r.check_out,
           r.total_amount, r.status, r.created_at,
           rm.number AS room_number, rm.room_type AS room_type
    FROM reservations r
    JOIN rooms rm ON r.room_id = rm.id
    ORDER BY r.created_at DESC, r.id DESC
";

const LIST_RECORDS_FOR_CLIENT: &str = r"
    SELECT r.id, r.client_id, r.room_id, r.check_in, r.check_out,
           r.total_amount, r.status, r.created_at,
           rm.number AS room_number, rm.room_type AS room_type
    FROM reservations r
    JOIN rooms rm ON r.room_id = rm.id
    WHERE r.client_id = ?
    ORDER BY r.created_at DESC, r.id DESC
";

const INSERT_RESERVATION: &str = r"
    INSERT INTO reservations
        (client_id, room_id, check_in, check_out, total_amount, status, created_at)
    VALUES (?, ?, ?, ?, ?, 'pending', ?)
";

const COUNT_OVERLAPPING_ACTIVE: &str = r"
    SELECT COUNT(*)
    FROM reservations
    WHERE room_id = ?
      AND status != 'cancelled'
      AND check_in <= ?
      AND check_out >= ?
";

const UPDATE_STATUS: &str = "UPDATE reservations SET status = ? WHERE id = ?";

const APPLY_PATCH: &str = r"
    UPDATE reservations
    SET check_in = ?, check_out = ?, total_amount = ?, status = ?
    WHERE id = ?
";

fn parse_date(field: &str, text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(ValidationError {
            field: field.into(),
            message: format!("unparsable stored date '{text}': {e}"),
        }))
    })
}

/// Deserializes a joined reservation record from a database row.
///
/// Expects columns in this order: id, `client_id`, `room_id`, `check_in`,
/// `check_out`, `total_amount`, status, `created_at`, `room_number`,
/// `room_type`.
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReservationRecord> {
    let check_in_text: String = row.get(3)?;
    let check_out_text: String = row.get(4)?;
    let status_text: String = row.get(6)?;
    let created_secs: i64 = row.get(7)?;

    let interval = StayInterval::new(
        parse_date("check_in", &check_in_text)?,
        parse_date("check_out", &check_out_text)?,
    )
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let status = status_text
        .parse::<ReservationStatus>()
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let created_at = DateTime::from_timestamp(created_secs, 0).ok_or_else(|| {
        rusqlite::Error::ToSqlConversionFailure(Box::new(ValidationError {
            field: "created_at".into(),
            message: format!("timestamp {created_secs} out of range"),
        }))
    })?;

    Ok(ReservationRecord {
        reservation: Reservation {
            id: row.get(0)?,
            client_id: row.get(1)?,
            room_id: row.get(2)?,
            interval,
            total_amount: row.get(5)?,
            status,
            created_at,
        },
        room_number: row.get(8)?,
        room_type: row.get(9)?,
    })
}

/// Inserts a pending reservation using an existing connection or
/// transaction, returning the new row id.
pub(crate) fn insert_reservation(
    conn: &Connection,
    request: &BookingRequest,
    created_at: DateTime<chrono::Utc>,
) -> Result<i64> {
    conn.execute(
        INSERT_RESERVATION,
        params![
            request.client_id(),
            request.room_id(),
            request.interval().check_in().to_string(),
            request.interval().check_out().to_string(),
            request.total_amount(),
            created_at.timestamp(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Retrieves a reservation joined with its room metadata.
pub(crate) fn fetch_record(conn: &Connection, id: i64) -> Result<Option<ReservationRecord>> {
    let mut stmt = conn.prepare(SELECT_RECORD)?;
    match stmt.query_row(params![id], row_to_record) {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Returns `true` if no active (non-cancelled) reservation on the room
/// overlaps the interval under the inclusive-both-ends rule.
///
/// Run inside a write transaction this is the authoritative half of the
/// check-then-reserve sequence; run outside one it is only a snapshot.
pub(crate) fn room_is_free(
    conn: &Connection,
    room_id: i64,
    interval: &StayInterval,
) -> Result<bool> {
    let overlapping: i64 = conn.query_row(
        COUNT_OVERLAPPING_ACTIVE,
        params![
            room_id,
            interval.check_out().to_string(),
            interval.check_in().to_string(),
        ],
        |row| row.get(0),
    )?;
    Ok(overlapping == 0)
}

/// Sets a reservation's status using an existing connection or
/// transaction. Returns `true` if a row was updated.
pub(crate) fn set_status(conn: &Connection, id: i64, status: ReservationStatus) -> Result<bool> {
    let rows_affected = conn.execute(UPDATE_STATUS, params![status.as_str(), id])?;
    Ok(rows_affected > 0)
}

/// Overwrites the mutable fields of a reservation with merged values.
/// Returns `true` if a row was updated.
pub(crate) fn apply_patch(
    conn: &Connection,
    id: i64,
    interval: &StayInterval,
    total_amount: f64,
    status: ReservationStatus,
) -> Result<bool> {
    let rows_affected = conn.execute(
        APPLY_PATCH,
        params![
            interval.check_in().to_string(),
            interval.check_out().to_string(),
            total_amount,
            status.as_str(),
            id,
        ],
    )?;
    Ok(rows_affected > 0)
}

impl Store {
    /// Retrieves a reservation by id, joined with its room metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be decoded.
    pub fn get_reservation(&self, id: i64) -> Result<Option<ReservationRecord>> {
        fetch_record(&self.conn, id)
    }

    /// Lists all reservations, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_reservations(&self) -> Result<Vec<ReservationRecord>> {
        let mut stmt = self.conn.prepare(LIST_RECORDS)?;
        let records = stmt
            .query_map([], row_to_record)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(records)
    }

    /// Lists one client's reservations, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_reservations_for_client(&self, client_id: i64) -> Result<Vec<ReservationRecord>> {
        let mut stmt = self.conn.prepare(LIST_RECORDS_FOR_CLIENT)?;
        let records = stmt
            .query_map(params![client_id], row_to_record)?
            .collect::<std::result::Result<Vec<_>, rusqlite::Error>>()?;
        Ok(records)
    }
}
