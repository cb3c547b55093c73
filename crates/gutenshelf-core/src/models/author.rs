use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BookRef;
use crate::names::ParsedName;

/// A persisted author, keyed by the exact name the catalog reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub canonical_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death_year: Option<i32>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    books: Vec<BookRef>,
}

impl Author {
    pub(crate) fn from_parts(
        id: i64,
        canonical_name: String,
        name: ParsedName,
        birth_year: Option<i32>,
        death_year: Option<i32>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            canonical_name,
            last_name: name.last_name,
            first_name: name.first_name,
            birth_year,
            death_year,
            created_at,
            books: Vec::new(),
        }
    }

    /// Attach books loaded alongside this author.
    pub(crate) fn with_books(mut self, books: Vec<BookRef>) -> Self {
        self.books = books;
        self
    }

    pub fn books(&self) -> &[BookRef] {
        &self.books
    }

    /// Only [`crate::NewBook::attach_author`] links books, so both sides move together.
    pub(crate) fn link_book(&mut self, book: BookRef) {
        if !self.books.iter().any(|b| b.external_id == book.external_id) {
            self.books.push(book);
        }
    }

    /// Fill in missing life years. Years already on record are never replaced.
    ///
    /// Returns true when anything changed.
    pub fn backfill_life_years(&mut self, birth_year: Option<i32>, death_year: Option<i32>) -> bool {
        let mut changed = false;
        if self.birth_year.is_none() && birth_year.is_some() {
            self.birth_year = birth_year;
            changed = true;
        }
        if self.death_year.is_none() && death_year.is_some() {
            self.death_year = death_year;
            changed = true;
        }
        changed
    }

    pub fn is_alive_in(&self, year: i32) -> bool {
        match self.birth_year {
            None => false,
            Some(born) if born > year => false,
            Some(_) => self.death_year.is_none_or(|died| died >= year),
        }
    }

    /// "Last, First" when both parts are known.
    pub fn display_name(&self) -> String {
        format_name(&self.canonical_name, self.last_name.as_deref(), self.first_name.as_deref())
    }

    pub fn birth_label(&self) -> String {
        self.birth_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    pub fn death_label(&self) -> String {
        self.death_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "living / unknown".to_string())
    }

    pub fn to_ref(&self) -> AuthorRef {
        AuthorRef {
            id: self.id,
            canonical_name: self.canonical_name.clone(),
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
        }
    }
}

/// An author not yet written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub canonical_name: String,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// Author as seen from one of their books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: i64,
    pub canonical_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl AuthorRef {
    pub fn display_name(&self) -> String {
        format_name(&self.canonical_name, self.last_name.as_deref(), self.first_name.as_deref())
    }
}

fn format_name(canonical: &str, last: Option<&str>, first: Option<&str>) -> String {
    match (last, first) {
        (Some(last), Some(first)) => format!("{last}, {first}"),
        (Some(last), None) => last.to_string(),
        (None, Some(first)) => first.to_string(),
        (None, None) => canonical.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn sample_author(name: &str, birth: Option<i32>, death: Option<i32>) -> Author {
    Author::from_parts(
        1,
        name.to_string(),
        crate::names::parse_author_name(name),
        birth,
        death,
        Utc::now(),
    )
}
