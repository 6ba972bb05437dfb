//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params, OptionalExtension};
use crate::{Result, Error};
use crate::contact::{Column, Contact, ContactFields};
use super::schema;

const SELECT_COLUMNS: &str = "SELECT id, name, phone, email, street, city, state, zip FROM contacts";

/// SQLite-backed storage for contacts.
///
/// The store is the single writer of the `contacts` table. It does no
/// locking of its own; callers sharing it across threads wrap it in a mutex.
pub struct ContactStore {
    conn: Connection,
}

impl ContactStore {
    /// Open a database file (creates it and its directory if missing)
    pub fn open(path: &Path) -> Result<Self> {
        let unavailable = |cause: &dyn std::fmt::Display| {
            Error::StorageUnavailable(format!("{}: {}", path.display(), cause))
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| unavailable(&e))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| unavailable(&e))?;
        let store = Self { conn };
        store.initialize_schema().map_err(|e| match e {
            Error::Storage(e) => unavailable(&e),
            other => other,
        })?;
        tracing::debug!("Opened contacts database at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::StorageUnavailable(format!("in-memory database: {}", e)))?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create the schema on first use.
    ///
    /// There is exactly one schema version. Upgrading is a no-op beyond
    /// stamping the version; a file written by a newer schema is refused.
    fn initialize_schema(&self) -> Result<()> {
        let version: i64 = self.conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version > schema::SCHEMA_VERSION {
            return Err(Error::StorageUnavailable(format!(
                "database schema version {} is newer than supported version {}",
                version,
                schema::SCHEMA_VERSION
            )));
        }

        if version < schema::SCHEMA_VERSION {
            for stmt in schema::all_schema_statements() {
                self.conn.execute(stmt, [])?;
            }
            self.conn.pragma_update(None, "user_version", schema::SCHEMA_VERSION)?;
            tracing::debug!("Initialized contacts schema v{}", schema::SCHEMA_VERSION);
        }
        Ok(())
    }

    // ========== Row Operations ==========

    /// Append a new row and return its engine-assigned id.
    ///
    /// Returns 0 when the statement wrote no row (a trigger ignored it).
    pub fn insert_row(&self, fields: &ContactFields) -> Result<i64> {
        let inserted = self
            .conn
            .execute(
                r#"
                INSERT INTO contacts (name, phone, email, street, city, state, zip)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    fields.name,
                    fields.phone,
                    fields.email,
                    fields.street,
                    fields.city,
                    fields.state,
                    fields.zip,
                ],
            )
            .map_err(Error::Write)?;
        if inserted == 0 {
            return Ok(0);
        }
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace all seven text columns of the row with `id`.
    ///
    /// Returns the number of rows changed (0 or 1). No match is not an error.
    pub fn update_row(&self, id: i64, fields: &ContactFields) -> Result<usize> {
        self.conn
            .execute(
                r#"
                UPDATE contacts
                SET name = ?1, phone = ?2, email = ?3, street = ?4, city = ?5, state = ?6, zip = ?7
                WHERE id = ?8
                "#,
                params![
                    fields.name,
                    fields.phone,
                    fields.email,
                    fields.street,
                    fields.city,
                    fields.state,
                    fields.zip,
                    id,
                ],
            )
            .map_err(Error::Write)
    }

    /// Delete the row with `id`, returning the number of rows removed (0 or 1)
    pub fn delete_row(&self, id: i64) -> Result<usize> {
        self.conn
            .execute("DELETE FROM contacts WHERE id = ?1", [id])
            .map_err(Error::Write)
    }

    /// Read rows, optionally restricted to one id and ordered by a column.
    ///
    /// Text columns sort with SQLite's NOCASE collation (ASCII case folding),
    /// ascending, with `id` as tie-breaker. Without a sort key the order is
    /// whatever SQLite returns.
    pub fn query_rows(&self, filter: Option<i64>, sort_key: Option<Column>) -> Result<Vec<Contact>> {
        let mut sql = String::from(SELECT_COLUMNS);
        if filter.is_some() {
            sql.push_str(" WHERE id = ?1");
        }
        match sort_key {
            Some(column) if column.is_text() => {
                sql.push_str(&format!(" ORDER BY {} COLLATE NOCASE ASC, id ASC", column.as_str()))
            }
            Some(column) => sql.push_str(&format!(" ORDER BY {} ASC", column.as_str())),
            None => {}
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let contacts = stmt
            .query_map(rusqlite::params_from_iter(filter), |row| self.row_to_contact(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contacts)
    }

    /// Get a single contact by id
    pub fn get_row(&self, id: i64) -> Result<Option<Contact>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                [id],
                |row| self.row_to_contact(row),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Count all contacts
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Helper to convert a row to a Contact
    fn row_to_contact(&self, row: &rusqlite::Row) -> rusqlite::Result<Contact> {
        Ok(Contact {
            id: row.get(0)?,
            fields: ContactFields {
                name: row.get(1)?,
                phone: row.get(2)?,
                email: row.get(3)?,
                street: row.get(4)?,
                city: row.get(5)?,
                state: row.get(6)?,
                zip: row.get(7)?,
            },
        })
    }
}
