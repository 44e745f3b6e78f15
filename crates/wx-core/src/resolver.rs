//! Location Resolver
//!
//! Finds the first word in a message that names a known region or place.

use std::sync::LazyLock;

use regex::Regex;

use crate::directory::LocationDirectory;
use crate::text::capitalize;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("word pattern is valid"));

/// Resolves free text against a [`LocationDirectory`]
#[derive(Debug, Clone, Copy)]
pub struct LocationResolver<'a> {
    directory: &'a LocationDirectory,
}

impl<'a> LocationResolver<'a> {
    pub fn new(directory: &'a LocationDirectory) -> Self {
        Self { directory }
    }

    /// First token (capitalized) that is a region or place name
    ///
    /// Each token is checked as a region first, then as a place in any
    /// region. Only single-word names can match.
    pub fn resolve(&self, text: &str) -> Option<String> {
        WORD_RE
            .find_iter(text)
            .map(|m| capitalize(m.as_str()))
            .find(|word| self.directory.is_region(word) || self.directory.is_place(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> Option<String> {
        let dir = LocationDirectory::us_states();
        LocationResolver::new(&dir).resolve(text)
    }

    #[test]
    fn test_resolves_place() {
        assert_eq!(resolve("I love Chicago today").as_deref(), Some("Chicago"));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(resolve("no place mentioned here"), None);
        assert_eq!(resolve(""), None);
    }

    #[test]
    fn test_resolves_region() {
        assert_eq!(resolve("how hot is it in texas").as_deref(), Some("Texas"));
    }

    #[test]
    fn test_case_insensitive_and_capitalized() {
        assert_eq!(resolve("weather in DENVER please").as_deref(), Some("Denver"));
    }

    #[test]
    fn test_first_token_wins() {
        assert_eq!(
            resolve("flying from Boston to Seattle").as_deref(),
            Some("Boston")
        );
    }

    #[test]
    fn test_tokens_split_on_punctuation_and_markers() {
        assert_eq!(resolve("weather* in chicago*?").as_deref(), Some("Chicago"));
        assert_eq!(resolve("(miami),tampa").as_deref(), Some("Miami"));
    }

    #[test]
    fn test_multi_word_names_do_not_match() {
        assert_eq!(resolve("Los Angeles"), None);
    }
}
