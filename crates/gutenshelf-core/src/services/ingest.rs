use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogBook, CatalogClient};
use crate::error::{GutenshelfError, Result};
use crate::models::{Book, NewBook};
use crate::storage::database::Database;
use crate::storage::repositories::{BookRepository, Repository, SqliteAuthorRepository, SqliteBookRepository};

use super::AuthorResolver;

/// What [`BookIngestor::ingest_detailed`] did with the top catalog hit.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Created(Book),
    AlreadyCataloged(Book),
}

impl IngestOutcome {
    pub fn book(&self) -> &Book {
        match self {
            Self::Created(book) | Self::AlreadyCataloged(book) => book,
        }
    }

    pub fn into_book(self) -> Book {
        match self {
            Self::Created(book) | Self::AlreadyCataloged(book) => book,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Looks a title up in the catalog and stores the best match with its authors.
pub struct BookIngestor<'a, C: CatalogClient + ?Sized> {
    db: &'a Database,
    catalog: &'a C,
}

impl<'a, C: CatalogClient + ?Sized> BookIngestor<'a, C> {
    pub fn new(db: &'a Database, catalog: &'a C) -> Self {
        Self { db, catalog }
    }

    /// Ingest the first catalog result for `title_query`.
    ///
    /// Calling this again for a book already on record returns the stored row
    /// untouched.
    pub async fn ingest(&self, title_query: &str) -> Result<Book> {
        Ok(self.ingest_detailed(title_query).await?.into_book())
    }

    pub async fn ingest_detailed(&self, title_query: &str) -> Result<IngestOutcome> {
        let query = title_query.trim();
        if query.is_empty() {
            return Err(GutenshelfError::Validation(
                "title query must not be blank".to_string(),
            ));
        }

        let page = self.catalog.search(query).await?;
        debug!(query, count = page.count, returned = page.results.len(), "catalog search finished");

        let Some(found) = page.results.into_iter().next() else {
            return Err(GutenshelfError::NotFound(query.to_string()));
        };

        match self.db.write(|conn| store(conn, &found)) {
            Err(err) if err.is_unique_violation() => {
                warn!(external_id = found.external_id, "book appeared concurrently, reloading");
                match self.db.find_book_by_external_id(found.external_id)? {
                    Some(existing) => Ok(IngestOutcome::AlreadyCataloged(existing)),
                    None => Err(err),
                }
            }
            other => other,
        }
    }
}

/// Check-then-create. Runs inside the caller's transaction.
fn store(conn: &Connection, found: &CatalogBook) -> Result<IngestOutcome> {
    let books = SqliteBookRepository::new(conn);
    if let Some(existing) = books.find_by_external_id(found.external_id)? {
        debug!(id = existing.id, external_id = existing.external_id, "book already cataloged");
        return Ok(IngestOutcome::AlreadyCataloged(existing));
    }

    let authors = SqliteAuthorRepository::new(conn);
    let resolver = AuthorResolver::new(&authors);
    let mut draft = NewBook::from_catalog(found);

    for descriptor in &found.authors {
        if descriptor.name.trim().is_empty() {
            warn!(external_id = found.external_id, "skipping author with blank name");
            continue;
        }
        let mut author = resolver.resolve(descriptor)?;
        draft.attach_author(&mut author);
    }

    let book = books.save(&draft)?;
    info!(
        id = book.id,
        external_id = book.external_id,
        title = %book.title,
        language = %book.language,
        "book cataloged"
    );
    Ok(IngestOutcome::Created(book))
}
