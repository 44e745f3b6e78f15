//! Weather Gateway
//!
//! Calls weatherapi.com `current.json` for a single location and persists
//! every successful response verbatim.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;
use crate::directory::LocationDirectory;
use crate::error::{Error, Result};
use crate::store::WeatherStore;

use super::types::WeatherDocument;

/// A fetched observation: the raw provider document and its typed view
#[derive(Debug, Clone)]
pub struct FetchedWeather {
    pub raw: JsonValue,
    pub document: WeatherDocument,
}

/// HTTP client for the weather provider
#[derive(Clone)]
pub struct WeatherGateway {
    client: Client,
    api_key: String,
    base_url: String,
    directory: Arc<LocationDirectory>,
    store: Arc<WeatherStore>,
}

impl WeatherGateway {
    /// Create a new gateway
    pub fn new(
        config: &WeatherConfig,
        directory: Arc<LocationDirectory>,
        store: Arc<WeatherStore>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            directory,
            store,
        })
    }

    /// Location actually sent to the provider
    ///
    /// A bare region name is replaced by its first listed place.
    pub fn provider_query(&self, location: &str) -> String {
        let location = location.trim();
        match self.directory.first_place(location) {
            Some(place) => {
                debug!("Region {} rewritten to {}", location, place);
                place.to_string()
            }
            None => location.to_string(),
        }
    }

    /// Fetch current weather for `location` and persist it
    ///
    /// A non-200 answer from the provider is logged and yields `Ok(None)`.
    /// Transport, decoding and storage failures are errors. Never retried.
    pub async fn fetch(&self, location: &str) -> Result<Option<FetchedWeather>> {
        let query = self.provider_query(location);
        let url = format!("{}/current.json", self.base_url);

        debug!("Fetching weather for {} from {}", query, url);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query.as_str()), ("aqi", "no")])
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!("Error fetching weather data for {}: {} - {}", query, status, body);
            return Ok(None);
        }

        let raw: JsonValue = response.json().await.map_err(Error::Http)?;
        let document: WeatherDocument = serde_json::from_value(raw.clone()).map_err(|e| {
            Error::WeatherApi(format!("Unexpected response shape for {}: {}", query, e))
        })?;

        let id = self.store.insert(&raw)?;
        info!(
            "Weather data saved for {} (record {}): {}°C",
            document.location.display_name(),
            id,
            document.current.temp_c
        );

        Ok(Some(FetchedWeather { raw, document }))
    }
}
