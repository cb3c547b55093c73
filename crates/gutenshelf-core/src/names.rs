//! Splitting raw author strings into name parts.

/// Best-effort split of a catalog author string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
}

/// Guess `(last, first)` from a whitespace-separated name.
///
/// The final token is taken as the surname and everything before it as the
/// given name. Punctuation is kept as-is, so a "Surname, Given" string comes
/// back with the parts swapped and the comma still attached.
pub fn parse_author_name(full_name: &str) -> ParsedName {
    let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
    let Some(last) = tokens.pop() else {
        return ParsedName::default();
    };

    ParsedName {
        last_name: Some(last.to_string()),
        first_name: (!tokens.is_empty()).then(|| tokens.join(" ")),
    }
}
