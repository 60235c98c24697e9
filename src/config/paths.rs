// Filesystem path utilities.
// Resolves default locations for the database and seed data.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "prodev.sqlite";

/// Default seed CSV file, relative to the working directory.
pub const DEFAULT_CSV: &str = "user_data.csv";

/// Get the base data directory (~/.local/share/prodev on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "prodev").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Default database path, falling back to the working directory.
pub fn default_database_path() -> PathBuf {
    data_dir()
        .map(|dir| dir.join(DATABASE_FILE))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
}

/// Default seed CSV path.
pub fn default_csv_path() -> PathBuf {
    PathBuf::from(DEFAULT_CSV)
}
