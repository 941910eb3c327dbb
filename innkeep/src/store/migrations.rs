//! Schema initialization and version checking.

use rusqlite::Connection;

use crate::error::{Error, Result};

use super::schema::{
    CREATE_METADATA_TABLE, CREATE_MOVEMENT_ITEM_INDEX, CREATE_RESERVATIONS_TABLE,
    CREATE_RESERVATION_CLIENT_INDEX, CREATE_RESERVATION_ROOM_INDEX, CREATE_ROOMS_TABLE,
    CREATE_STOCK_ITEMS_TABLE, CREATE_STOCK_MOVEMENTS_TABLE, CURRENT_SCHEMA_VERSION,
    INSERT_SCHEMA_VERSION, SELECT_SCHEMA_VERSION,
};

/// Initializes the schema on a fresh store.
///
/// Creates all tables, indices, and the metadata row. Intended for a store
/// that has not been initialized yet; all statements are idempotent.
///
/// # Errors
///
/// Returns an error if any DDL statement fails to execute.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;
    conn.execute(CREATE_ROOMS_TABLE, [])?;
    conn.execute(CREATE_RESERVATIONS_TABLE, [])?;
    conn.execute(CREATE_STOCK_ITEMS_TABLE, [])?;
    conn.execute(CREATE_STOCK_MOVEMENTS_TABLE, [])?;

    conn.execute(CREATE_RESERVATION_ROOM_INDEX, [])?;
    conn.execute(CREATE_RESERVATION_CLIENT_INDEX, [])?;
    conn.execute(CREATE_MOVEMENT_ITEM_INDEX, [])?;

    conn.execute(INSERT_SCHEMA_VERSION, [CURRENT_SCHEMA_VERSION])?;

    log::debug!("initialized fresh schema at version {CURRENT_SCHEMA_VERSION}");
    Ok(())
}

/// Gets the schema version recorded in the store.
///
/// # Returns
///
/// - `Ok(0)` if the metadata table doesn't exist or holds no version
/// - `Ok(version)` if a version is found
///
/// # Errors
///
/// Returns an error on any other database failure.
pub fn get_schema_version(conn: &Connection) -> Result<i32> {
    match conn.query_row(SELECT_SCHEMA_VERSION, [], |row| {
        let value: String = row.get(0)?;
        value
            .parse::<i32>()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => {
            // "no such table" means the store was never initialized.
            if let rusqlite::Error::SqliteFailure(ref sqlite_err, _) = e {
                if sqlite_err.code == rusqlite::ErrorCode::Unknown {
                    return Ok(0);
                }
            }
            Err(e.into())
        }
    }
}

/// Checks schema compatibility, initializing a fresh store if needed.
///
/// # Errors
///
/// Returns [`Error::UnsupportedSchemaVersion`] if the store's schema
/// version differs from this build's, or a storage error if
/// initialization fails.
pub fn check_schema_compatibility(conn: &Connection) -> Result<()> {
    let version = get_schema_version(conn)?;

    if version == 0 {
        initialize_schema(conn)?;
    } else if version != CURRENT_SCHEMA_VERSION {
        return Err(Error::UnsupportedSchemaVersion {
            expected: CURRENT_SCHEMA_VERSION,
            found: version,
        });
    }

    Ok(())
}
