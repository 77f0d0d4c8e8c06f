//! External service integrations

pub mod geocoding;

pub use geocoding::GeocodingClient;
