//! wx-api: HTTP API for the weather gateway
//!
//! Exposes stored and live weather data, location autocomplete and the
//! weather chatbot over REST. Built with axum for async HTTP handling.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, build_router, start_server};
