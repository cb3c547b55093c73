use thiserror::Error;

use crate::catalog::CatalogServiceError;

/// All errors that can occur in gutenshelf-core.
#[derive(Debug, Error)]
pub enum GutenshelfError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No catalog results for: {0}")]
    NotFound(String),

    #[error("Catalog service error: {0}")]
    CatalogService(#[from] CatalogServiceError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl GutenshelfError {
    /// True when the store rejected a write because of a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Persistence(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::NotFound(_) => ExitCode::NotFound,
            Self::Validation(_) => ExitCode::InvalidArgs,
            Self::CatalogService(_) => ExitCode::NetworkError,
            Self::Io(_) => ExitCode::FileSystemError,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Exit codes used by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    NotFound = 2,
    InvalidArgs = 3,
    FileSystemError = 4,
    NetworkError = 6,
}

pub type Result<T> = std::result::Result<T, GutenshelfError>;
