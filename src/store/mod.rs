// Tag store adapter - thin access to the calibre metadata.db
// The schema belongs to calibre; we only run queries and insert/delete rows.
// A connection lives for one unit of work so other processes sharing the file don't fight over locks.

pub mod tags; // tag and link row primitives

pub use tags::Tag;

use crate::error::{StoreError, StoreResult};
use rusqlite::{Connection, OpenFlags, Params, Row};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the externally owned tag store. Holds no connection.
#[derive(Debug, Clone)]
pub struct TagStore {
    db_path: PathBuf,
}

impl TagStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a session. The file must already exist - we never create calibre's database.
    pub fn open(&self) -> StoreResult<StoreSession> {
        debug!("Opening tag store {}", self.db_path.display());
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            StoreError::new(format!(
                "opening {} failed: {}",
                self.db_path.display(),
                e
            ))
        })?;
        Ok(StoreSession { conn })
    }

    /// Run one unit of work: open, call `work`, close.
    /// On error the connection is dropped (and closed) before the error is returned.
    pub fn with_session<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&StoreSession) -> Result<T, E>,
    {
        let session = self.open()?;
        let value = work(&session)?;
        session.close()?;
        Ok(value)
    }
}

/// An open connection to the tag store, valid for a single unit of work.
pub struct StoreSession {
    conn: Connection,
}

impl StoreSession {
    /// Run a query and map every row, in the order the store returns them.
    pub fn query<T, P, F>(&self, sql: &str, params: P, map: F) -> StoreResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!(sql, "query");
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Run a statement, returning the number of rows it touched.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> StoreResult<usize> {
        debug!(sql, "execute");
        Ok(self.conn.execute(sql, params)?)
    }

    /// Run an INSERT and hand back the new row id.
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> StoreResult<i64> {
        self.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))?;
        debug!("Closed tag store");
        Ok(())
    }
}

/// Escape `%`, `_` and `\` so `s` matches literally inside a LIKE pattern using `ESCAPE '\'`.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// LIKE pattern matching anything that starts with `s`.
pub fn starts_with_pattern(s: &str) -> String {
    format!("{}%", escape_like(s))
}
