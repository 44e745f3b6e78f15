//! Weather Lookup: stored-data read path

use tracing::debug;

use crate::error::Result;
use crate::store::WeatherStore;

use super::types::{WeatherDocument, WeatherSnapshot};

/// Split `"City"` / `"City, Region[, Country]"` on commas
///
/// Only the second part is used as the region. Both parts are trimmed; an
/// empty region counts as absent.
pub fn parse_location(location: &str) -> (&str, Option<&str>) {
    let mut parts = location.split(',');
    let city = parts.next().unwrap_or_default().trim();
    let region = parts.next().map(str::trim).filter(|r| !r.is_empty());
    (city, region)
}

/// Most recent stored observation for `location`
pub fn lookup(store: &WeatherStore, location: &str) -> Result<Option<WeatherSnapshot>> {
    let (city, region) = parse_location(location);
    debug!("Weather lookup: city={} region={:?}", city, region);

    let Some(raw) = store.find_latest(city, region)? else {
        return Ok(None);
    };

    let document: WeatherDocument = serde_json::from_value(raw)?;
    Ok(Some(WeatherSnapshot::from(&document)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::types::fixtures;

    #[test]
    fn test_parse_location() {
        assert_eq!(parse_location("Chicago"), ("Chicago", None));
        assert_eq!(parse_location("Chicago, Illinois"), ("Chicago", Some("Illinois")));
        assert_eq!(parse_location(" Chicago ,"), ("Chicago", None));
        assert_eq!(parse_location("a, b, c"), ("a", Some("b")));
        assert_eq!(
            parse_location("Chicago, Illinois, United States of America"),
            ("Chicago", Some("Illinois"))
        );
    }

    #[test]
    fn test_lookup_returns_derived_fields() -> Result<()> {
        let store = WeatherStore::in_memory()?;
        store.insert(&fixtures::chicago())?;

        let snapshot = lookup(&store, "Chicago, Illinois")?.unwrap();
        assert_eq!(
            snapshot,
            WeatherSnapshot {
                timestamp: 1718900000,
                temperature: 27.2,
                humidity: 62,
                location: "Chicago, Illinois, United States of America".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_lookup_ignores_country_part() -> Result<()> {
        let store = WeatherStore::in_memory()?;
        store.insert(&fixtures::chicago())?;

        // City doesn't match; the region part alone finds the record
        let snapshot = lookup(&store, "Nowhere, Illinois, United States of America")?.unwrap();
        assert_eq!(snapshot.location, "Chicago, Illinois, United States of America");
        Ok(())
    }

    #[test]
    fn test_lookup_empty_store() -> Result<()> {
        let store = WeatherStore::in_memory()?;
        assert!(lookup(&store, "Chicago, Illinois")?.is_none());
        Ok(())
    }
}
