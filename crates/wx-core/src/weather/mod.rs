//! Weather provider access and stored-data lookups

mod client;
mod lookup;
pub(crate) mod types;

pub use client::{FetchedWeather, WeatherGateway};
pub use lookup::{lookup, parse_location};
pub use types::*;
