use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 1;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS books (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id    INTEGER NOT NULL UNIQUE,
            title          TEXT NOT NULL,
            language_code  TEXT NOT NULL
                           CHECK(language_code IN ('en', 'es', 'fr', 'pt', 'other')),
            download_count INTEGER NOT NULL DEFAULT 0 CHECK(download_count >= 0),
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS authors (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            canonical_name TEXT NOT NULL UNIQUE,
            last_name      TEXT,
            first_name     TEXT,
            birth_year     INTEGER,
            death_year     INTEGER,
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS book_authors (
            book_id   INTEGER NOT NULL REFERENCES books(id) ON DELETE CASCADE,
            author_id INTEGER NOT NULL REFERENCES authors(id) ON DELETE CASCADE,
            position  INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (book_id, author_id)
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_books_language     ON books(language_code);
        CREATE INDEX IF NOT EXISTS idx_books_created_at   ON books(created_at);
        CREATE INDEX IF NOT EXISTS idx_authors_last_name  ON authors(last_name);
        CREATE INDEX IF NOT EXISTS idx_authors_birth_year ON authors(birth_year);
        CREATE INDEX IF NOT EXISTS idx_book_authors_author ON book_authors(author_id);
        ",
    )?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    create_tables(conn)?;
    create_indexes(conn)?;
    Ok(())
}
