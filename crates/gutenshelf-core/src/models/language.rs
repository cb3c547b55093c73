use serde::{Deserialize, Serialize};

/// Codes a book can be filed under. Everything else is filed as `other`.
pub const SUPPORTED_LANGUAGES: [&str; 4] = ["en", "es", "fr", "pt"];

const OTHER_CODE: &str = "other";
const UNKNOWN_LANGUAGE: &str = "unknown language";

const LANGUAGE_NAMES: [(&str, &str); 5] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("pt", "Portuguese"),
    (OTHER_CODE, "other language"),
];

/// Classified language of a cataloged book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
    Fr,
    Pt,
    #[default]
    Other,
}

impl Language {
    pub const ALL: [Language; 5] = [Self::En, Self::Es, Self::Fr, Self::Pt, Self::Other];

    /// Pick the first supported code from the catalog's candidate list.
    ///
    /// An empty iterator yields [`Language::Other`]. A missing list can be
    /// passed by flattening it, e.g. `languages.into_iter().flatten()` on an
    /// `Option<Vec<String>>`.
    pub fn classify<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        candidates
            .into_iter()
            .find_map(|code| Self::from_supported_code(code.as_ref()))
            .unwrap_or(Self::Other)
    }

    fn from_supported_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            "fr" => Some(Self::Fr),
            "pt" => Some(Self::Pt),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::Pt => "pt",
            Self::Other => OTHER_CODE,
        }
    }

    pub fn display_name(self) -> &'static str {
        display_name(self.code())
    }

    /// `other` is a valid stored language but cannot be filtered on.
    pub fn is_supported(self) -> bool {
        self != Self::Other
    }
}

/// Human label for a stored language code.
pub fn display_name(code: &str) -> &'static str {
    LANGUAGE_NAMES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            OTHER_CODE => Ok(Self::Other),
            code => Self::from_supported_code(code).ok_or_else(|| format!("Invalid language code: {s}")),
        }
    }
}
