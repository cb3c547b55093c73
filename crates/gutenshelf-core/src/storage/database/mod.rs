mod connection;
mod migrations;
mod schema;

pub use connection::ConnectionPool;
pub use migrations::{Migration, get_applied_versions, run_migrations};
pub use schema::{SCHEMA_VERSION, init_schema};

use std::path::Path;

use rusqlite::{Connection, TransactionBehavior};

use crate::error::Result;
use crate::models::{Author, Book};

use super::repositories::{AuthorRepository, BookRepository, SqliteAuthorRepository, SqliteBookRepository};

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// The catalog store. Every call takes the connection lock for its duration.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn path(&self) -> Option<&str> {
        self.pool.path()
    }

    /// Run read-only work against the connection.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.pool.get_connection();
        f(&conn)
    }

    /// Run `f` inside an IMMEDIATE transaction.
    ///
    /// Commits when `f` returns `Ok`; any error rolls the whole unit back.
    pub fn write<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut conn = self.pool.get_connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn applied_versions(&self) -> Result<Vec<u32>> {
        self.read(get_applied_versions)
    }

    pub fn find_book_by_external_id(&self, external_id: i64) -> Result<Option<Book>> {
        self.read(|conn| SqliteBookRepository::new(conn).find_by_external_id(external_id))
    }

    pub fn find_author_by_canonical_name(&self, name: &str) -> Result<Option<Author>> {
        self.read(|conn| SqliteAuthorRepository::new(conn).find_by_canonical_name(name))
    }

    pub fn count_books(&self) -> Result<usize> {
        self.read(|conn| SqliteBookRepository::new(conn).count())
    }

    pub fn count_authors(&self) -> Result<usize> {
        self.read(|conn| SqliteAuthorRepository::new(conn).count())
    }
}
