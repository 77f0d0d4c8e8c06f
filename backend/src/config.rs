//! Configuration management for the Rubber Carbon Assessment Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with RCA_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::EstimationParams;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Geocoding API configuration
    pub geocoding: GeocodingConfig,

    /// Carbon estimation reference data
    pub estimation: EstimationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Search API endpoint (Nominatim-compatible)
    pub api_endpoint: String,

    /// User agent sent with search requests
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EstimationConfig {
    /// Assumed planting density, trees per rai
    pub trees_per_rai: f64,

    /// Fallback DBH when no field measurement exists, cm
    pub default_dbh_cm: f64,

    /// Fallback NDVI reading
    pub default_ndvi: f64,

    /// Fallback TCARI reading
    pub default_tcari: f64,
}

impl EstimationConfig {
    /// The injected reference dataset the pure estimator consumes
    pub fn params(&self) -> EstimationParams {
        EstimationParams {
            trees_per_rai: self.trees_per_rai,
            default_dbh_cm: self.default_dbh_cm,
            default_ndvi: self.default_ndvi,
            default_tcari: self.default_tcari,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("RCA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("geocoding.api_endpoint", "https://nominatim.openstreetmap.org/search")?
            .set_default("geocoding.user_agent", "rubber-carbon-assessment/0.1")?
            .set_default("estimation.trees_per_rai", shared::TREES_PER_RAI)?
            .set_default("estimation.default_dbh_cm", shared::DEFAULT_DBH_CM)?
            .set_default("estimation.default_ndvi", shared::DEFAULT_NDVI)?
            .set_default("estimation.default_tcari", shared::DEFAULT_TCARI)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (RCA_ prefix)
            .add_source(
                Environment::with_prefix("RCA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}
