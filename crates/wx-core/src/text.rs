//! Text Normalizer
//!
//! Lower-cases and tokenizes free text and corrects likely misspellings
//! against a frequency-ranked dictionary (edit distance 1, then 2).

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::directory::LocationDirectory;

/// Built-in word list, most frequent first
const WORD_LIST: &str = include_str!("../data/words.txt");

/// Marker appended to a corrected token in the normalized text
pub const CORRECTION_MARKER: char = '*';

/// Words longer than this only get the distance-1 pass
const MAX_DEEP_EDIT_LEN: usize = 12;

/// Unknown tokens per message that get a correction attempt
pub const MAX_CORRECTION_ATTEMPTS: usize = 32;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// A single token that was replaced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
}

/// Result of normalizing a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Normalized {
    pub original: String,
    pub corrected: String,
    pub corrections: Vec<Correction>,
}

/// Frequency-based spelling corrector
#[derive(Debug, Clone, Default)]
pub struct SpellChecker {
    frequencies: HashMap<String, u64>,
}

impl SpellChecker {
    /// Dictionary from the built-in word list
    pub fn new() -> Self {
        let words: Vec<&str> = WORD_LIST
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(str::split_whitespace)
            .collect();
        Self::from_ranked_words(words)
    }

    /// Built-in word list plus every word of the location directory
    ///
    /// Directory words get the lowest frequency so that common words still
    /// win ties, while misspelled place names have something to land on.
    pub fn with_directory(directory: &LocationDirectory) -> Self {
        let mut checker = Self::new();
        for name in directory.names() {
            for word in name.split(|c: char| !c.is_ascii_alphabetic()) {
                checker.add_word(word, 1);
            }
        }
        checker
    }

    /// Build from words ordered most frequent first
    pub fn from_ranked_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<S> = words.into_iter().collect();
        let total = words.len() as u64;
        let mut checker = Self::default();
        for (rank, word) in words.iter().enumerate() {
            checker.add_word(word.as_ref(), total - rank as u64 + 1);
        }
        checker
    }

    /// Add a word, keeping the higher count when it already exists
    pub fn add_word(&mut self, word: &str, count: u64) {
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return;
        }
        let entry = self.frequencies.entry(word.to_ascii_lowercase()).or_insert(0);
        *entry = (*entry).max(count);
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Case-insensitive dictionary membership
    pub fn is_known(&self, word: &str) -> bool {
        self.frequencies.contains_key(&word.to_ascii_lowercase())
    }

    fn frequency(&self, word: &str) -> u64 {
        self.frequencies.get(word).copied().unwrap_or(0)
    }

    /// Most probable spelling of `word` (lower-cased)
    ///
    /// Returns `None` when no candidate within two edits is known.
    pub fn correction(&self, word: &str) -> Option<String> {
        let word = word.to_ascii_lowercase();
        if self.frequencies.contains_key(&word) {
            return Some(word);
        }

        let first = edits1(&word);
        if let Some(best) = self.best_known(first.iter().map(String::as_str)) {
            return Some(best);
        }

        if word.len() > MAX_DEEP_EDIT_LEN {
            return None;
        }

        // Distance 2: scan length-compatible dictionary words instead of
        // expanding every double edit.
        let len = word.len();
        let second = self
            .frequencies
            .keys()
            .filter(|known| known.len().abs_diff(len) <= 2)
            .filter(|known| osa_distance(word.as_bytes(), known.as_bytes()) <= 2)
            .map(String::as_str);
        self.best_known(second)
    }

    /// Highest-frequency known candidate; alphabetical order breaks ties
    fn best_known<'a>(&self, candidates: impl Iterator<Item = &'a str>) -> Option<String> {
        candidates
            .filter(|c| self.frequencies.contains_key(*c))
            .max_by(|a, b| {
                self.frequency(a)
                    .cmp(&self.frequency(b))
                    .then_with(|| b.cmp(a))
            })
            .map(str::to_string)
    }

    /// Normalize free text token by token
    ///
    /// Leading and trailing punctuation of each token is preserved. Corrected
    /// words are rendered lower-case with [`CORRECTION_MARKER`] appended;
    /// unknown words without a candidate pass through unchanged, as does
    /// every unknown word after the first [`MAX_CORRECTION_ATTEMPTS`].
    pub fn normalize(&self, text: &str) -> Normalized {
        let mut tokens = Vec::new();
        let mut corrections = Vec::new();
        let mut attempts = 0;

        for token in text.split_whitespace() {
            let (prefix, core, suffix) = split_token(token);

            let corrected = if core.is_empty() || !core.chars().all(|c| c.is_ascii_alphabetic()) {
                None
            } else if self.is_known(core) || attempts >= MAX_CORRECTION_ATTEMPTS {
                None
            } else {
                attempts += 1;
                self.correction(core)
                    .filter(|c| !c.eq_ignore_ascii_case(core))
            };

            match corrected {
                Some(word) => {
                    tokens.push(format!("{prefix}{word}{CORRECTION_MARKER}{suffix}"));
                    corrections.push(Correction {
                        original: core.to_string(),
                        corrected: word,
                    });
                }
                None => tokens.push(token.to_string()),
            }
        }

        if !corrections.is_empty() {
            debug!("Corrected {} token(s): {:?}", corrections.len(), corrections);
        }

        Normalized {
            original: text.to_string(),
            corrected: tokens.join(" "),
            corrections,
        }
    }
}

/// Capitalize a word: first letter upper-case, the rest lower-case
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Split a token into leading punctuation, core, trailing punctuation
fn split_token(token: &str) -> (&str, &str, &str) {
    let start = token
        .find(|c: char| !c.is_ascii_punctuation())
        .unwrap_or(token.len());
    let end = token
        .rfind(|c: char| !c.is_ascii_punctuation())
        .map(|i| i + token[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(start)
        .max(start);
    (&token[..start], &token[start..end], &token[end..])
}

/// All strings one edit away (delete, transpose, replace, insert)
fn edits1(word: &str) -> Vec<String> {
    let bytes = word.as_bytes();
    let n = bytes.len();
    let mut out = Vec::with_capacity(54 * n + 25);

    for i in 0..=n {
        let (left, right) = bytes.split_at(i);

        if !right.is_empty() {
            // delete
            out.push(join(left, &[], &right[1..]));
        }
        if right.len() > 1 {
            // transpose
            out.push(join(left, &[right[1], right[0]], &right[2..]));
        }
        for &c in ALPHABET {
            if !right.is_empty() && right[0] != c {
                // replace
                out.push(join(left, &[c], &right[1..]));
            }
            // insert
            out.push(join(left, &[c], right));
        }
    }

    out
}

/// Optimal string alignment distance (edits plus adjacent transpositions)
fn osa_distance(a: &[u8], b: &[u8]) -> usize {
    let (n, m) = (a.len(), b.len());
    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in d[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1)
                .min(d[i][j - 1] + 1)
                .min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }

    d[n][m]
}

fn join(left: &[u8], middle: &[u8], right: &[u8]) -> String {
    let mut s = String::with_capacity(left.len() + middle.len() + right.len());
    s.extend(left.iter().chain(middle).chain(right).map(|&b| b as char));
    s
}
