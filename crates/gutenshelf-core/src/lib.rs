pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod names;
pub mod services;
pub mod storage;

pub use catalog::{AuthorDescriptor, CatalogBook, CatalogClient, CatalogPage, CatalogServiceError};
pub use config::{AppConfig, CatalogConfig, CoreConfig};
pub use error::{ExitCode, GutenshelfError, Result};
pub use models::*;
pub use names::{ParsedName, parse_author_name};

pub use services::{AuthorResolver, BookIngestor, CatalogQueryService, DEFAULT_TOP_BOOKS, IngestOutcome};

pub use storage::database::{ConnectionPool, Database, open_database, open_in_memory};

pub use storage::repositories::{
    AuthorRepository, BookRepository, Repository, SqliteAuthorRepository, SqliteBookRepository,
};

pub use storage::queries::CatalogStatsQuery;
