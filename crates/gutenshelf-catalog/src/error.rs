use gutenshelf_core::CatalogServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GutendexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error from {url}: HTTP {status}: {body}")]
    Api { url: String, status: u16, body: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<GutendexError> for CatalogServiceError {
    fn from(err: GutendexError) -> Self {
        CatalogServiceError::with_source(format!("gutendex lookup failed: {err}"), err)
    }
}

pub type Result<T> = std::result::Result<T, GutendexError>;
