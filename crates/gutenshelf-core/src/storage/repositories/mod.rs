mod author_repository;
mod book_repository;

pub use author_repository::{AuthorRepository, SqliteAuthorRepository};
pub use book_repository::{BookRepository, SqliteBookRepository};

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::types::Type;

use crate::error::Result;

pub trait Repository {
    type Entity;
    /// What `save` accepts: an entity that has no row yet.
    type Draft;
    type Id;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn save(&self, draft: &Self::Draft) -> Result<Self::Entity>;
}

/// Creation time at the precision the store keeps.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339, so text order matches time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_roundtrip_and_order() {
        let early = now();
        let late = early + chrono::Duration::microseconds(1500);
        let (a, b) = (format_timestamp(&early), format_timestamp(&late));
        assert!(a < b);
        assert_eq!(a.len(), b.len());
        assert_eq!(parse_timestamp(0, &a).unwrap(), early);
    }

    #[test]
    fn test_bad_timestamp_is_conversion_error() {
        let err = parse_timestamp(5, "yesterday").unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(5, Type::Text, _)));
    }
}
