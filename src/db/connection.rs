// Scoped database access.
// Connections are opened per unit of work and closed when it ends.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, Params, Row, params_from_iter};
use serde_json::Value;
use tracing::debug;

use crate::error::Result;

use super::Record;

/// An open SQLite connection, closed on drop or by [`DatabaseConnection::close`].
#[derive(Debug)]
pub struct DatabaseConnection {
    path: PathBuf,
    conn: Connection,
}

impl DatabaseConnection {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "opening database connection");
        let conn = Connection::open(&path)?;
        Ok(Self { path, conn })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the connection, reporting any failure to do so.
    pub fn close(self) -> Result<()> {
        let Self { path, conn } = self;
        debug!(path = %path.display(), "closing database connection");
        conn.close().map_err(|(_, e)| e.into())
    }
}

impl Deref for DatabaseConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

/// A parameterized query bound to a database file.
///
/// [`ExecuteQuery::run`] opens a connection, executes, fetches every row,
/// and closes the connection again, whether or not the query succeeded.
#[derive(Debug, Clone)]
pub struct ExecuteQuery {
    database: PathBuf,
    query: String,
    params: Vec<SqlValue>,
}

impl ExecuteQuery {
    pub fn new(database: impl Into<PathBuf>, query: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            database: database.into(),
            query: query.into(),
            params,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn run(&self) -> Result<Vec<Record>> {
        let conn = DatabaseConnection::open(&self.database)?;
        let result = query_records(&conn, &self.query, params_from_iter(self.params.iter()));
        let closed = conn.close();
        let records = result?;
        closed?;
        Ok(records)
    }
}

/// Execute `sql` and collect every row as a [`Record`].
pub fn query_records<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params)?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        records.push(row_to_record(row, &columns)?);
    }
    Ok(records)
}

fn row_to_record(row: &Row<'_>, columns: &[String]) -> Result<Record> {
    let mut record = Record::new();
    for (index, name) in columns.iter().enumerate() {
        record.insert(name.clone(), to_json(row.get_ref(index)?));
    }
    Ok(record)
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => Value::from(bytes.to_vec()),
    }
}
