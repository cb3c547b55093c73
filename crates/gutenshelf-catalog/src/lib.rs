//! gutenshelf catalog: the Gutendex HTTP client behind `CatalogClient`.

pub mod error;
pub mod gutendex;
pub mod http;

pub use error::{GutendexError, Result};
pub use gutendex::GutendexSource;
