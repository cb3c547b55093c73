//! Catalog operations built on the store and the catalog client.

mod author_resolver;
mod ingest;
mod query;

pub use author_resolver::AuthorResolver;
pub use ingest::{BookIngestor, IngestOutcome};
pub use query::{CatalogQueryService, DEFAULT_TOP_BOOKS};
