use rusqlite::{Connection, OptionalExtension, Params, params};
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Author, BookRef, NewAuthor};
use crate::names::ParsedName;

use super::{Repository, format_timestamp, now, parse_timestamp};

const AUTHOR_COLUMNS: &str =
    "a.id, a.canonical_name, a.last_name, a.first_name, a.birth_year, a.death_year, a.created_at";

pub trait AuthorRepository: Repository<Entity = Author, Draft = NewAuthor, Id = i64> {
    fn find_by_canonical_name(&self, canonical_name: &str) -> Result<Option<Author>>;
    /// Persist backfilled life years. Stored years are never overwritten.
    fn update_life_years(&self, author: &Author) -> Result<()>;
    fn list_order_by_last_name(&self) -> Result<Vec<Author>>;
    fn list_alive_in_year(&self, year: i32) -> Result<Vec<Author>>;
    fn count(&self) -> Result<usize>;
}

pub struct SqliteAuthorRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteAuthorRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn row_to_author(row: &rusqlite::Row) -> rusqlite::Result<Author> {
        let created_at: String = row.get(6)?;
        Ok(Author::from_parts(
            row.get(0)?,
            row.get(1)?,
            ParsedName {
                last_name: row.get(2)?,
                first_name: row.get(3)?,
            },
            row.get(4)?,
            row.get(5)?,
            parse_timestamp(6, &created_at)?,
        ))
    }

    fn load_books(&self, author_id: i64) -> Result<Vec<BookRef>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT b.external_id, b.title, b.download_count
             FROM book_authors ba
             JOIN books b ON b.id = ba.book_id
             WHERE ba.author_id = ?1
             ORDER BY b.download_count DESC, b.id",
        )?;

        let rows = stmt
            .query_map(params![author_id], |row| {
                Ok(BookRef {
                    external_id: row.get(0)?,
                    title: row.get(1)?,
                    download_count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn query_authors<P: Params>(&self, sql: &str, params: P) -> Result<Vec<Author>> {
        let mut stmt = self.conn.prepare(sql)?;
        let authors = stmt
            .query_map(params, Self::row_to_author)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        authors
            .into_iter()
            .map(|author| {
                let books = self.load_books(author.id)?;
                Ok(author.with_books(books))
            })
            .collect()
    }

    fn query_one<P: Params>(&self, sql: &str, params: P) -> Result<Option<Author>> {
        let author = self.conn.query_row(sql, params, Self::row_to_author).optional()?;
        match author {
            Some(author) => {
                let books = self.load_books(author.id)?;
                Ok(Some(author.with_books(books)))
            }
            None => Ok(None),
        }
    }
}

fn warn_if_inverted(name: &str, birth_year: Option<i32>, death_year: Option<i32>) {
    if let (Some(born), Some(died)) = (birth_year, death_year) {
        if died < born {
            warn!(author = name, born, died, "death year precedes birth year");
        }
    }
}

impl Repository for SqliteAuthorRepository<'_> {
    type Entity = Author;
    type Draft = NewAuthor;
    type Id = i64;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        self.query_one(
            &format!("SELECT {AUTHOR_COLUMNS} FROM authors a WHERE a.id = ?1"),
            params![id],
        )
    }

    fn save(&self, draft: &Self::Draft) -> Result<Self::Entity> {
        warn_if_inverted(&draft.canonical_name, draft.birth_year, draft.death_year);

        let created_at = now();
        self.conn.execute(
            "INSERT INTO authors (canonical_name, last_name, first_name, birth_year, death_year, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                draft.canonical_name,
                draft.last_name,
                draft.first_name,
                draft.birth_year,
                draft.death_year,
                format_timestamp(&created_at),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %draft.canonical_name, "author saved");

        Ok(Author::from_parts(
            id,
            draft.canonical_name.clone(),
            ParsedName {
                last_name: draft.last_name.clone(),
                first_name: draft.first_name.clone(),
            },
            draft.birth_year,
            draft.death_year,
            created_at,
        ))
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn find_by_canonical_name(&self, canonical_name: &str) -> Result<Option<Author>> {
        self.query_one(
            &format!("SELECT {AUTHOR_COLUMNS} FROM authors a WHERE a.canonical_name = ?1"),
            params![canonical_name],
        )
    }

    fn update_life_years(&self, author: &Author) -> Result<()> {
        warn_if_inverted(&author.canonical_name, author.birth_year, author.death_year);
        self.conn.execute(
            "UPDATE authors
             SET birth_year = COALESCE(birth_year, ?1),
                 death_year = COALESCE(death_year, ?2)
             WHERE id = ?3",
            params![author.birth_year, author.death_year, author.id],
        )?;
        Ok(())
    }

    fn list_order_by_last_name(&self) -> Result<Vec<Author>> {
        self.query_authors(
            &format!("SELECT {AUTHOR_COLUMNS} FROM authors a ORDER BY a.last_name ASC, a.id ASC"),
            [],
        )
    }

    fn list_alive_in_year(&self, year: i32) -> Result<Vec<Author>> {
        self.query_authors(
            &format!(
                "SELECT {AUTHOR_COLUMNS} FROM authors a
                 WHERE a.birth_year IS NOT NULL
                   AND a.birth_year <= ?1
                   AND (a.death_year IS NULL OR a.death_year >= ?1)
                 ORDER BY a.last_name ASC, a.id ASC"
            ),
            params![year],
        )
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
