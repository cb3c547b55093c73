use serde::{Deserialize, Serialize};

use super::Language;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_books: usize,
    pub total_authors: usize,
    /// Every language code, including those with zero books.
    pub books_by_language: Vec<(Language, usize)>,
}

impl CatalogStats {
    pub fn books_in(&self, language: Language) -> usize {
        self.books_by_language
            .iter()
            .find(|(lang, _)| *lang == language)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}
