//! weatherapi.com `current.json` types

use serde::{Deserialize, Serialize};

/// Typed view of a provider document
///
/// Only the fields this service reads are modelled; the raw document is
/// what gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDocument {
    pub location: Location,
    pub current: Current,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    pub localtime_epoch: i64,
    pub localtime: String,
}

impl Location {
    /// "name, region, country"
    pub fn display_name(&self) -> String {
        format!("{}, {}, {}", self.name, self.region, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Current {
    pub last_updated: String,
    pub temp_c: f64,
    pub temp_f: f64,
    pub feelslike_c: f64,
    pub feelslike_f: f64,
    pub humidity: i64,
    pub wind_mph: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub dewpoint_c: f64,
    pub vis_km: f64,
    pub vis_miles: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Condition {
    pub text: String,
    pub icon: String,
    pub code: i64,
}

/// Row returned by the stored-data read path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: i64,
    pub location: String,
}

impl From<&WeatherDocument> for WeatherSnapshot {
    fn from(doc: &WeatherDocument) -> Self {
        Self {
            timestamp: doc.location.localtime_epoch,
            temperature: doc.current.temp_c,
            humidity: doc.current.humidity,
            location: doc.location.display_name(),
        }
    }
}

/// Detailed payload returned after a live fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDetails {
    pub timestamp: i64,
    pub temperature: f64,
    pub humidity: i64,
    pub location: String,
    pub wind_mph: f64,
    pub wind_dir: String,
    pub condition: Condition,
    pub last_updated: String,
    pub pressure_mb: f64,
    pub feelslike_c: f64,
    pub dewpoint_c: f64,
    pub vis_km: f64,
}

impl From<&WeatherDocument> for WeatherDetails {
    fn from(doc: &WeatherDocument) -> Self {
        let current = &doc.current;
        Self {
            timestamp: doc.location.localtime_epoch,
            temperature: current.temp_c,
            humidity: current.humidity,
            location: doc.location.display_name(),
            wind_mph: current.wind_mph,
            wind_dir: current.wind_dir.clone(),
            condition: current.condition.clone(),
            last_updated: current.last_updated.clone(),
            pressure_mb: current.pressure_mb,
            feelslike_c: current.feelslike_c,
            dewpoint_c: current.dewpoint_c,
            vis_km: current.vis_km,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{Value, json};

    /// A trimmed weatherapi.com response
    pub fn chicago() -> Value {
        json!({
            "location": {
                "name": "Chicago",
                "region": "Illinois",
                "country": "United States of America",
                "lat": 41.85,
                "lon": -87.65,
                "tz_id": "America/Chicago",
                "localtime_epoch": 1718900000,
                "localtime": "2024-06-20 11:13"
            },
            "current": {
                "last_updated_epoch": 1718899200,
                "last_updated": "2024-06-20 11:00",
                "temp_c": 27.2,
                "temp_f": 81.0,
                "is_day": 1,
                "condition": {
                    "text": "Partly cloudy",
                    "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
                    "code": 1003
                },
                "wind_mph": 11.9,
                "wind_kph": 19.1,
                "wind_dir": "SSW",
                "pressure_mb": 1016.0,
                "humidity": 62,
                "feelslike_c": 28.9,
                "feelslike_f": 84.1,
                "dewpoint_c": 19.4,
                "vis_km": 16.0,
                "vis_miles": 9.0
            }
        })
    }
}
