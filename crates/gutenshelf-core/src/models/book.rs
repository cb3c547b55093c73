use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Author, AuthorRef, Language};
use crate::catalog::CatalogBook;

/// A persisted book. One row per catalog id, never updated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub external_id: i64,
    pub title: String,
    pub language: Language,
    pub download_count: u32,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    authors: Vec<AuthorRef>,
}

impl Book {
    pub(crate) fn from_parts(
        id: i64,
        external_id: i64,
        title: String,
        language: Language,
        download_count: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            external_id,
            title,
            language,
            download_count,
            created_at,
            authors: Vec::new(),
        }
    }

    /// Attach authors loaded alongside this book, in catalog order.
    pub(crate) fn with_authors(mut self, authors: Vec<AuthorRef>) -> Self {
        self.authors = authors;
        self
    }

    pub fn authors(&self) -> &[AuthorRef] {
        &self.authors
    }

    pub fn to_ref(&self) -> BookRef {
        BookRef {
            external_id: self.external_id,
            title: self.title.clone(),
            download_count: self.download_count,
        }
    }
}

/// Book as seen from one of its authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRef {
    pub external_id: i64,
    pub title: String,
    pub download_count: u32,
}

/// A book being assembled during ingestion, before it reaches the store.
///
/// This is the aggregate root for the book/author link: the only way to add an
/// author is [`NewBook::attach_author`], which updates both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub external_id: i64,
    pub title: String,
    pub language: Language,
    pub download_count: u32,
    authors: Vec<AuthorRef>,
}

impl NewBook {
    pub fn new(external_id: i64, title: impl Into<String>, language: Language, download_count: u32) -> Self {
        Self {
            external_id,
            title: title.into(),
            language,
            download_count,
            authors: Vec::new(),
        }
    }

    /// Build from a catalog hit. Missing download counts become zero.
    pub fn from_catalog(found: &CatalogBook) -> Self {
        Self::new(
            found.external_id,
            found.title.clone(),
            Language::classify(&found.languages),
            found.download_count.unwrap_or(0),
        )
    }

    /// Link an author to this book. Attaching the same author twice is a no-op.
    pub fn attach_author(&mut self, author: &mut Author) {
        if self.authors.iter().any(|a| a.id == author.id) {
            return;
        }
        self.authors.push(author.to_ref());
        author.link_book(self.to_ref());
    }

    pub fn authors(&self) -> &[AuthorRef] {
        &self.authors
    }

    pub fn to_ref(&self) -> BookRef {
        BookRef {
            external_id: self.external_id,
            title: self.title.clone(),
            download_count: self.download_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AuthorDescriptor;
    use crate::models::author::sample_author;

    #[test]
    fn test_from_catalog_defaults() {
        let found = CatalogBook {
            external_id: 84,
            title: "Frankenstein".into(),
            authors: vec![AuthorDescriptor::new("Mary Shelley")],
            languages: vec!["de".into(), "fr".into()],
            download_count: None,
        };
        let book = NewBook::from_catalog(&found);
        assert_eq!(book.external_id, 84);
        assert_eq!(book.language, Language::Fr);
        assert_eq!(book.download_count, 0);
        // descriptors are resolved separately, never copied in
        assert!(book.authors().is_empty());
    }

    #[test]
    fn test_attach_author_links_both_sides() {
        let mut book = NewBook::new(1, "Test Book", Language::En, 1000);
        let mut author = sample_author("Jane Smith", Some(1980), None);

        book.attach_author(&mut author);

        assert_eq!(book.authors().len(), 1);
        assert_eq!(book.authors()[0].canonical_name, "Jane Smith");
        assert_eq!(author.books().len(), 1);
        assert_eq!(author.books()[0].external_id, 1);
    }

    #[test]
    fn test_attach_author_is_idempotent() {
        let mut book = NewBook::new(1, "Test Book", Language::En, 1000);
        let mut author = sample_author("Jane Smith", None, None);

        book.attach_author(&mut author);
        book.attach_author(&mut author);

        assert_eq!(book.authors().len(), 1);
        assert_eq!(author.books().len(), 1);
    }

    #[test]
    fn test_language_serializes_as_code() {
        let json = serde_json::to_string(&Language::Pt).unwrap();
        assert_eq!(json, "\"pt\"");
    }
}
