//! Suggestion Service (location autocomplete)

use serde::Serialize;

use crate::directory::LocationDirectory;

/// Maximum number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 10;

/// An autocomplete entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Suggestion {
    State { name: String },
    City { name: String, state: String },
}

impl Suggestion {
    pub fn name(&self) -> &str {
        match self {
            Suggestion::State { name } | Suggestion::City { name, .. } => name,
        }
    }
}

/// Regions and places whose name contains `query` (case-insensitive)
///
/// Directory order: each region, then its places. An empty query matches
/// everything. The query is not trimmed. At most [`MAX_SUGGESTIONS`] entries.
pub fn suggest(directory: &LocationDirectory, query: &str) -> Vec<Suggestion> {
    suggest_n(directory, query, MAX_SUGGESTIONS)
}

fn suggest_n(directory: &LocationDirectory, query: &str, limit: usize) -> Vec<Suggestion> {
    let needle = query.to_lowercase();
    let needle = needle.as_str();

    directory
        .regions()
        .flat_map(move |region| {
            let state = contains_ci(&region.name, needle).then(|| Suggestion::State {
                name: region.name.clone(),
            });
            let cities = region
                .places
                .iter()
                .filter(move |place| contains_ci(place, needle))
                .map(move |place| Suggestion::City {
                    name: place.clone(),
                    state: region.name.clone(),
                });
            state.into_iter().chain(cities)
        })
        .take(limit)
        .collect()
}

fn contains_ci(name: &str, lowered_needle: &str) -> bool {
    name.to_lowercase().contains(lowered_needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> LocationDirectory {
        LocationDirectory::us_states()
    }

    #[test]
    fn test_empty_query_returns_first_ten_entries() {
        let got = suggest(&dir(), "");
        assert_eq!(got.len(), 10);
        assert_eq!(got[0], Suggestion::State { name: "Alabama".into() });
        assert_eq!(
            got[1],
            Suggestion::City { name: "Birmingham".into(), state: "Alabama".into() }
        );
        assert_eq!(got[5], Suggestion::State { name: "Alaska".into() });
        assert_eq!(got[9], Suggestion::City { name: "Sitka".into(), state: "Alaska".into() });
    }

    #[test]
    fn test_results_contain_query() {
        for q in ["an", "SAN", "o", "ville", "new", " ", "new "] {
            let got = suggest(&dir(), q);
            assert!(got.len() <= MAX_SUGGESTIONS);
            for s in &got {
                assert!(
                    s.name().to_lowercase().contains(&q.to_lowercase()),
                    "{} does not contain {}",
                    s.name(),
                    q
                );
            }
        }
    }

    #[test]
    fn test_region_before_its_places() {
        let got = suggest(&dir(), "york");
        assert_eq!(
            got,
            vec![
                Suggestion::State { name: "New York".into() },
                Suggestion::City { name: "New York City".into(), state: "New York".into() },
            ]
        );
    }

    #[test]
    fn test_duplicate_place_names_keep_their_state() {
        let got = suggest(&dir(), "portland");
        assert_eq!(
            got,
            vec![
                Suggestion::City { name: "Portland".into(), state: "Maine".into() },
                Suggestion::City { name: "Portland".into(), state: "Oregon".into() },
            ]
        );
    }

    #[test]
    fn test_whitespace_is_part_of_the_query() {
        let got = suggest(&dir(), " ");
        assert!(!got.is_empty());
        assert!(got.iter().all(|s| s.name().contains(' ')));
        assert_eq!(got[0], Suggestion::City { name: "Little Rock".into(), state: "Arkansas".into() });

        let got = suggest(&dir(), "new ");
        assert!(got.iter().all(|s| s.name().to_lowercase().contains("new ")));
        assert!(got.iter().all(|s| s.name() != "Newark"));
        assert_eq!(got[0], Suggestion::City { name: "New Haven".into(), state: "Connecticut".into() });
    }

    #[test]
    fn test_no_match() {
        assert!(suggest(&dir(), "zzz").is_empty());
    }

    #[test]
    fn test_serialization_shape() {
        let state = serde_json::to_value(Suggestion::State { name: "Ohio".into() }).unwrap();
        assert_eq!(state, serde_json::json!({"type": "state", "name": "Ohio"}));

        let city = serde_json::to_value(Suggestion::City {
            name: "Toledo".into(),
            state: "Ohio".into(),
        })
        .unwrap();
        assert_eq!(
            city,
            serde_json::json!({"type": "city", "name": "Toledo", "state": "Ohio"})
        );
    }
}
