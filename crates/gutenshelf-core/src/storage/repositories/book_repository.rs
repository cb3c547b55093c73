use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Params, params};
use tracing::debug;

use crate::error::Result;
use crate::models::{AuthorRef, Book, Language, NewBook};

use super::{Repository, format_timestamp, now, parse_timestamp};

const BOOK_COLUMNS: &str = "b.id, b.external_id, b.title, b.language_code, b.download_count, b.created_at";

pub trait BookRepository: Repository<Entity = Book, Draft = NewBook, Id = i64> {
    fn find_by_external_id(&self, external_id: i64) -> Result<Option<Book>>;
    fn list_order_by_created_desc(&self) -> Result<Vec<Book>>;
    fn list_by_language(&self, language: Language) -> Result<Vec<Book>>;
    fn list_by_author_order_by_downloads_desc(&self, author_id: i64) -> Result<Vec<Book>>;
    fn count(&self) -> Result<usize>;
    fn count_by_language(&self) -> Result<Vec<(Language, usize)>>;
}

pub struct SqliteBookRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteBookRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let language_str: String = row.get(3)?;
        let language = Language::from_str(&language_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
        let created_at: String = row.get(5)?;

        Ok(Book::from_parts(
            row.get(0)?,
            row.get(1)?,
            row.get(2)?,
            language,
            row.get(4)?,
            parse_timestamp(5, &created_at)?,
        ))
    }

    fn load_authors(&self, book_id: i64) -> Result<Vec<AuthorRef>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT a.id, a.canonical_name, a.last_name, a.first_name
             FROM book_authors ba
             JOIN authors a ON a.id = ba.author_id
             WHERE ba.book_id = ?1
             ORDER BY ba.position, a.id",
        )?;

        let rows = stmt
            .query_map(params![book_id], |row| {
                Ok(AuthorRef {
                    id: row.get(0)?,
                    canonical_name: row.get(1)?,
                    last_name: row.get(2)?,
                    first_name: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Run a book query and load each book's authors.
    fn query_books<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Book>> {
        let mut stmt = self.conn.prepare(sql)?;
        let books = stmt
            .query_map(params, Self::row_to_book)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        books
            .into_iter()
            .map(|book| {
                let authors = self.load_authors(book.id)?;
                Ok(book.with_authors(authors))
            })
            .collect()
    }

    fn query_one<P: Params>(&self, sql: &str, params: P) -> Result<Option<Book>> {
        let book = self.conn.query_row(sql, params, Self::row_to_book).optional()?;
        match book {
            Some(book) => {
                let authors = self.load_authors(book.id)?;
                Ok(Some(book.with_authors(authors)))
            }
            None => Ok(None),
        }
    }
}

impl Repository for SqliteBookRepository<'_> {
    type Entity = Book;
    type Draft = NewBook;
    type Id = i64;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        self.query_one(
            &format!("SELECT {BOOK_COLUMNS} FROM books b WHERE b.id = ?1"),
            params![id],
        )
    }

    /// Insert the book and one link row per attached author.
    fn save(&self, draft: &Self::Draft) -> Result<Self::Entity> {
        let created_at = now();
        self.conn.execute(
            "INSERT INTO books (external_id, title, language_code, download_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.external_id,
                draft.title,
                draft.language.code(),
                draft.download_count,
                format_timestamp(&created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        for (position, author) in draft.authors().iter().enumerate() {
            self.conn.execute(
                "INSERT INTO book_authors (book_id, author_id, position) VALUES (?1, ?2, ?3)",
                params![id, author.id, position as i64],
            )?;
        }

        debug!(id, external_id = draft.external_id, authors = draft.authors().len(), "book saved");

        Ok(Book::from_parts(
            id,
            draft.external_id,
            draft.title.clone(),
            draft.language,
            draft.download_count,
            created_at,
        )
        .with_authors(draft.authors().to_vec()))
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn find_by_external_id(&self, external_id: i64) -> Result<Option<Book>> {
        self.query_one(
            &format!("SELECT {BOOK_COLUMNS} FROM books b WHERE b.external_id = ?1"),
            params![external_id],
        )
    }

    fn list_order_by_created_desc(&self) -> Result<Vec<Book>> {
        self.query_books(
            &format!("SELECT {BOOK_COLUMNS} FROM books b ORDER BY b.created_at DESC, b.id DESC"),
            [],
        )
    }

    fn list_by_language(&self, language: Language) -> Result<Vec<Book>> {
        self.query_books(
            &format!(
                "SELECT {BOOK_COLUMNS} FROM books b
                 WHERE b.language_code = ?1
                 ORDER BY b.created_at DESC, b.id DESC"
            ),
            params![language.code()],
        )
    }

    fn list_by_author_order_by_downloads_desc(&self, author_id: i64) -> Result<Vec<Book>> {
        self.query_books(
            &format!(
                "SELECT {BOOK_COLUMNS} FROM books b
                 JOIN book_authors ba ON ba.book_id = b.id
                 WHERE ba.author_id = ?1
                 ORDER BY b.download_count DESC, b.id ASC"
            ),
            params![author_id],
        )
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_by_language(&self) -> Result<Vec<(Language, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT language_code, COUNT(*) FROM books GROUP BY language_code")?;
        let counted = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Language::ALL
            .iter()
            .map(|lang| {
                let count = counted
                    .iter()
                    .find(|(code, _)| code == lang.code())
                    .map(|(_, n)| *n as usize)
                    .unwrap_or(0);
                (*lang, count)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewAuthor;
    use crate::storage::database::open_in_memory;
    use crate::storage::repositories::SqliteAuthorRepository;

    fn new_author(name: &str) -> NewAuthor {
        NewAuthor {
            canonical_name: name.to_string(),
            last_name: None,
            first_name: None,
            birth_year: None,
            death_year: None,
        }
    }

    #[test]
    fn test_save_and_find_with_authors() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let authors = SqliteAuthorRepository::new(&conn);
        let books = SqliteBookRepository::new(&conn);

        let mut first = authors.save(&new_author("Second Listed")).unwrap();
        let mut second = authors.save(&new_author("First Listed")).unwrap();
        let mut draft = NewBook::new(11, "Alice's Adventures in Wonderland", Language::En, 500);
        draft.attach_author(&mut second);
        draft.attach_author(&mut first);

        let saved = books.save(&draft).unwrap();
        let found = books.find_by_external_id(11).unwrap().unwrap();

        assert_eq!(found, saved);
        assert_eq!(books.find_by_id(&saved.id).unwrap(), Some(saved.clone()));
        let names: Vec<_> = found.authors().iter().map(|a| a.canonical_name.as_str()).collect();
        assert_eq!(names, ["First Listed", "Second Listed"]);
        assert!(books.find_by_external_id(12).unwrap().is_none());
    }

    #[test]
    fn test_external_id_is_unique() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let books = SqliteBookRepository::new(&conn);

        books.save(&NewBook::new(1, "One", Language::En, 0)).unwrap();
        let err = books.save(&NewBook::new(1, "Again", Language::Fr, 0)).unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(books.count().unwrap(), 1);
    }

    #[test]
    fn test_list_orders() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let authors = SqliteAuthorRepository::new(&conn);
        let books = SqliteBookRepository::new(&conn);
        let mut author = authors.save(&new_author("Jane Smith")).unwrap();

        for (ext, lang, downloads) in [(1, Language::En, 10), (2, Language::Es, 300), (3, Language::En, 50)] {
            let mut draft = NewBook::new(ext, format!("Book {ext}"), lang, downloads);
            draft.attach_author(&mut author);
            books.save(&draft).unwrap();
        }

        let newest_first: Vec<_> = books
            .list_order_by_created_desc()
            .unwrap()
            .iter()
            .map(|b| b.external_id)
            .collect();
        assert_eq!(newest_first, [3, 2, 1]);

        let english: Vec<_> = books
            .list_by_language(Language::En)
            .unwrap()
            .iter()
            .map(|b| b.external_id)
            .collect();
        assert_eq!(english, [3, 1]);
        assert!(books.list_by_language(Language::Pt).unwrap().is_empty());

        let by_downloads: Vec<_> = books
            .list_by_author_order_by_downloads_desc(author.id)
            .unwrap()
            .iter()
            .map(|b| b.download_count)
            .collect();
        assert_eq!(by_downloads, [300, 50, 10]);
    }

    #[test]
    fn test_count_by_language_includes_empty_codes() {
        let pool = open_in_memory().unwrap();
        let conn = pool.get_connection();
        let books = SqliteBookRepository::new(&conn);
        books.save(&NewBook::new(1, "One", Language::Fr, 0)).unwrap();
        books.save(&NewBook::new(2, "Two", Language::Other, 0)).unwrap();

        let counts = books.count_by_language().unwrap();
        assert_eq!(counts.len(), Language::ALL.len());
        assert!(counts.contains(&(Language::Fr, 1)));
        assert!(counts.contains(&(Language::Other, 1)));
        assert!(counts.contains(&(Language::En, 0)));
    }
}
