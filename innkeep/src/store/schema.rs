//! Schema definitions and DDL constants for the innkeep store.

/// Current schema version, stored in the metadata table.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// SQL statement to create the metadata table.
///
/// The metadata table stores key-value pairs for versioning and store
/// configuration.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// SQL statement to create the rooms table.
///
/// Room numbers are unique; the status flag holds the coarse operational
/// state and is distinct from interval-derived occupancy.
pub const CREATE_ROOMS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS rooms (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        number TEXT NOT NULL UNIQUE,
        room_type TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        features TEXT NOT NULL DEFAULT '[]',
        price_per_night REAL NOT NULL,
        status TEXT NOT NULL DEFAULT 'available'
            CHECK (status IN ('available', 'occupied'))
    )";

/// SQL statement to create the reservations table.
///
/// Stay dates are ISO-8601 text, so lexicographic comparison in SQL equals
/// chronological comparison; the CHECK backstops the `check_out > check_in`
/// row invariant at the store level.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id INTEGER NOT NULL,
        room_id INTEGER NOT NULL REFERENCES rooms(id),
        check_in TEXT NOT NULL,
        check_out TEXT NOT NULL,
        total_amount REAL NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'confirmed', 'cancelled')),
        created_at INTEGER NOT NULL,
        CHECK (check_out > check_in)
    )";

/// SQL statement to create the stock items table.
///
/// The quantity CHECK is the store-level backstop for the ledger
/// invariant: no committed write may leave a negative quantity.
pub const CREATE_STOCK_ITEMS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS stock_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL DEFAULT '',
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        min_quantity INTEGER NOT NULL DEFAULT 0,
        price REAL NOT NULL DEFAULT 0,
        description TEXT NOT NULL DEFAULT ''
    )";

/// SQL statement to create the stock movements table.
///
/// Movement rows are append-only; nothing in the store updates or deletes
/// them.
pub const CREATE_STOCK_MOVEMENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS stock_movements (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_id INTEGER NOT NULL REFERENCES stock_items(id),
        direction TEXT NOT NULL CHECK (direction IN ('add', 'remove')),
        delta_quantity INTEGER NOT NULL CHECK (delta_quantity > 0),
        previous_qty INTEGER NOT NULL,
        new_qty INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    )";

/// Index speeding up per-room overlap checks.
pub const CREATE_RESERVATION_ROOM_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_room ON reservations(room_id)";

/// Index speeding up per-client reservation listings.
pub const CREATE_RESERVATION_CLIENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_client ON reservations(client_id)";

/// Index speeding up per-item movement listings.
pub const CREATE_MOVEMENT_ITEM_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_stock_movements_item ON stock_movements(item_id)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";
