//! SQLite storage for users and their settings.

use log::debug;
use rusqlite::Connection;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

const SCHEMA: &str = include_str!("schema.sql");

/// An error opening or initializing the database.
#[derive(Debug, Error)]
pub enum Error {
    /// The directory holding the database could not be created.
    #[error("Could not create database directory: {0}")]
    Io(#[from] io::Error),

    /// An error reported by SQLite.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// A handle to the aikeys database.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the database stored at `path`, creating it and any missing
    /// parent directories if necessary.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!("Opening database at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// Opens a fresh database that lives only in memory.
    ///
    /// Mostly useful for testing.
    pub fn open_in_memory() -> Result<Self, Error> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, Error> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// The underlying SQLite connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let mut stmt = db
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|name| name.unwrap())
            .collect();
        names
    }

    #[test]
    fn it_creates_the_schema() {
        let db = Database::open_in_memory().unwrap();
        let tables = table_names(&db);
        assert!(tables.contains(&String::from("user")));
        assert!(tables.contains(&String::from("settings")));
    }

    #[test]
    fn it_applies_the_schema_idempotently() {
        let dir = std::env::temp_dir().join(format!("aikeys-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("aikeys.db");
        {
            let db = Database::open(&path).unwrap();
            db.connection()
                .execute(
                    "INSERT INTO user (username, password) VALUES ('test', 'x')",
                    [],
                )
                .unwrap();
        }
        let db = Database::open(&path).unwrap();
        let count: i64 = db
            .connection()
            .query_row("SELECT COUNT(*) FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
        fs::remove_dir_all(dir).unwrap();
    }
}
