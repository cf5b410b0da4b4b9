//! Retrieval of hourly forecast data: request building, retries, response
//! caching and assembly into an [`crate::HourlySeries`].

pub mod assembly;
pub mod cache;
pub mod client;
pub mod error;
pub mod response;
pub mod retry;
