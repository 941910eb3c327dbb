//! Store configuration and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Configuration for opening the store.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use innkeep::StoreConfig;
///
/// let config = StoreConfig::new("/tmp/innkeep.db")
///     .with_busy_timeout(Duration::from_secs(10));
/// assert!(config.auto_create);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// How long a unit of work waits for the write lock before failing.
    pub busy_timeout: Duration,
    /// Whether to create the database (and parent directory) if absent.
    pub auto_create: bool,
    /// Whether to open the store read-only.
    pub read_only: bool,
}

impl StoreConfig {
    /// Creates a configuration with default settings.
    ///
    /// Defaults: 5 second busy timeout, auto-create on, read-write.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(5000),
            auto_create: true,
            read_only: false,
        }
    }

    /// Sets the busy timeout.
    ///
    /// Concurrent units of work queue on the store's write lock for up to
    /// this long before the operation fails with a storage error.
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Configures the store to be opened read-only.
    ///
    /// Read-only mode disables `auto_create`.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self.auto_create = false;
        self
    }
}

/// Returns the default data directory, `~/.innkeep`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|home| home.join(".innkeep"))
        .ok_or_else(|| Error::Validation {
            field: "home_directory".into(),
            message: "cannot determine home directory".into(),
        })
}

/// Resolves the store path from the environment or the default location.
///
/// Resolution order:
/// 1. `$INNKEEP_DATA_DIR/innkeep.db` if `INNKEEP_DATA_DIR` is set
/// 2. `~/.innkeep/innkeep.db` otherwise
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined and
/// `INNKEEP_DATA_DIR` is not set.
pub fn resolve_store_path() -> Result<PathBuf> {
    if let Ok(data_dir) = std::env::var("INNKEEP_DATA_DIR") {
        Ok(PathBuf::from(data_dir).join("innkeep.db"))
    } else {
        Ok(default_data_dir()?.join("innkeep.db"))
    }
}
