// Seeding of the user_data table from a CSV file.
// Existing data is never duplicated: a populated table is left untouched.

use std::fs;
use std::path::Path;

use rusqlite::{Connection, params};
use tracing::info;
use uuid::Uuid;

use crate::db::DatabaseConnection;
use crate::error::Result;

use super::User;

/// Rows inserted per transaction.
pub const INSERT_BATCH_SIZE: usize = 100;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS user_data (
        user_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        age INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_user_id ON user_data (user_id);
";

const INSERT_USER: &str =
    "INSERT OR IGNORE INTO user_data (user_id, name, email, age) VALUES (?1, ?2, ?3, ?4)";

/// Result of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The table already held rows; nothing was read.
    Skipped { existing: u64 },
    /// Number of rows actually inserted.
    Inserted(usize),
}

/// Create user_data and its index if missing.
pub fn create_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLE)?;
    info!("table user_data ready");
    Ok(())
}

/// Number of rows in user_data.
pub fn count_users(conn: &Connection) -> Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM user_data", [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Parse users from CSV, skipping the header row.
///
/// Rows with fewer than four fields are ignored. An empty user_id gets a
/// fresh v4 UUID and an unparseable age becomes 0.
pub fn read_users(csv_path: &Path) -> Result<Vec<User>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(csv_path)?;

    let mut users = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() < 4 {
            continue;
        }

        let user_id = match row[0].trim() {
            "" => Uuid::new_v4().to_string(),
            id => id.to_string(),
        };
        users.push(User {
            user_id,
            name: row[1].to_string(),
            email: row[2].to_string(),
            age: row[3].trim().parse().unwrap_or(0),
        });
    }
    Ok(users)
}

/// Load `csv_path` into user_data unless the table already has rows.
pub fn insert_data(conn: &Connection, csv_path: &Path) -> Result<SeedOutcome> {
    let existing = count_users(conn)?;
    if existing > 0 {
        info!(existing, "data already present, skipping insertion");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let users = read_users(csv_path)?;
    let mut inserted = 0;
    for batch in users.chunks(INSERT_BATCH_SIZE) {
        let tx = conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_USER)?;
            for user in batch {
                inserted += stmt.execute(params![user.user_id, user.name, user.email, user.age])?;
            }
        }
        tx.commit()?;
    }

    info!(inserted, parsed = users.len(), path = %csv_path.display(), "inserted users");
    Ok(SeedOutcome::Inserted(inserted))
}

/// Create the database file if needed, then the table, then load the CSV.
pub fn seed_database(database: &Path, csv_path: &Path) -> Result<SeedOutcome> {
    if let Some(parent) = database.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = DatabaseConnection::open(database)?;
    create_table(&conn)?;
    let outcome = insert_data(&conn, csv_path)?;
    conn.close()?;
    Ok(outcome)
}
