use rusqlite::Connection;

use crate::error::Result;
use crate::models::CatalogStats;
use crate::storage::repositories::{AuthorRepository, BookRepository, SqliteAuthorRepository, SqliteBookRepository};

pub struct CatalogStatsQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CatalogStatsQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get_stats(&self) -> Result<CatalogStats> {
        let books = SqliteBookRepository::new(self.conn);
        let authors = SqliteAuthorRepository::new(self.conn);

        Ok(CatalogStats {
            total_books: books.count()?,
            total_authors: authors.count()?,
            books_by_language: books.count_by_language()?,
        })
    }
}
