//! Application configuration management.
//!
//! Configuration comes from environment variables, deserialized into a typed
//! struct with the `envy` crate. A `.env` file is honored when present.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `DATABASE_MAX_CONNECTIONS` (optional): pool size, defaults to 5
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
}

fn default_port() -> u16 {
    3000
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or any value fails to
    /// parse into its expected type.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Load .env if present; a missing file is fine.
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }
}
