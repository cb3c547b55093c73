use crate::error::Result;
use crate::models::{Author, Book, CatalogStats, Language};
use crate::storage::database::Database;
use crate::storage::queries::CatalogStatsQuery;
use crate::storage::repositories::{AuthorRepository, BookRepository, SqliteAuthorRepository, SqliteBookRepository};

/// How many books `top_books_by_author` returns when the caller has no preference.
pub const DEFAULT_TOP_BOOKS: usize = 3;

/// Read-only views over the catalog. Empty results are empty vectors, never errors.
pub struct CatalogQueryService<'a> {
    db: &'a Database,
}

impl<'a> CatalogQueryService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Newest first.
    pub fn list_all_books(&self) -> Result<Vec<Book>> {
        self.db
            .read(|conn| SqliteBookRepository::new(conn).list_order_by_created_desc())
    }

    pub fn list_books_by_language(&self, language: Language) -> Result<Vec<Book>> {
        self.db
            .read(|conn| SqliteBookRepository::new(conn).list_by_language(language))
    }

    /// Ordered by last name; authors without one come first.
    pub fn list_all_authors(&self) -> Result<Vec<Author>> {
        self.db
            .read(|conn| SqliteAuthorRepository::new(conn).list_order_by_last_name())
    }

    pub fn list_authors_alive_in_year(&self, year: i32) -> Result<Vec<Author>> {
        self.db
            .read(|conn| SqliteAuthorRepository::new(conn).list_alive_in_year(year))
    }

    /// An author's most downloaded books, at most `limit` of them.
    pub fn top_books_by_author(&self, author_id: i64, limit: usize) -> Result<Vec<Book>> {
        let books = self.db.read(|conn| {
            SqliteBookRepository::new(conn).list_by_author_order_by_downloads_desc(author_id)
        })?;
        Ok(books.into_iter().take(limit).collect())
    }

    pub fn stats(&self) -> Result<CatalogStats> {
        self.db.read(|conn| CatalogStatsQuery::new(conn).get_stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_returns_empty_lists() {
        let db = Database::open_in_memory().unwrap();
        let service = CatalogQueryService::new(&db);

        assert!(service.list_all_books().unwrap().is_empty());
        assert!(service.list_books_by_language(Language::En).unwrap().is_empty());
        assert!(service.list_all_authors().unwrap().is_empty());
        assert!(service.list_authors_alive_in_year(1900).unwrap().is_empty());
        assert!(service.top_books_by_author(42, DEFAULT_TOP_BOOKS).unwrap().is_empty());
        assert_eq!(service.stats().unwrap().total_books, 0);
    }
}
