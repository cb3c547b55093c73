//! Interface to the external bibliographic catalog.
//!
//! The core never talks HTTP itself. A client (see `gutenshelf-catalog`) turns
//! a free-text query into a [`CatalogPage`] of structured results.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Transport or malformed-response failure reported by a catalog client.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CatalogServiceError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl CatalogServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One author as described by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDescriptor {
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub death_year: Option<i32>,
}

impl AuthorDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn born(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    pub fn died(mut self, year: i32) -> Self {
        self.death_year = Some(year);
        self
    }
}

/// One search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogBook {
    pub external_id: i64,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<AuthorDescriptor>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub download_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub count: u64,
    #[serde(default)]
    pub results: Vec<CatalogBook>,
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Search the catalog by free text. Results are in the catalog's own order.
    async fn search(&self, query: &str) -> Result<CatalogPage, CatalogServiceError>;
}
