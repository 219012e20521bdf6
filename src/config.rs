//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `DATABASE_NAME` (optional): database to use on that server, defaults to `fastx`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3001
/// - `ADMIN_PASSWORD` (optional): admin secret, defaults to `stk7890`
/// - `LOOKUP_BASE_URL` (optional): base URL of the upstream lookup API
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_database_name")]
    pub database_name: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_admin_password")]
    pub admin_password: String,

    #[serde(default = "default_lookup_base_url")]
    pub lookup_base_url: String,
}

fn default_database_name() -> String {
    "fastx".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3001
}

fn default_admin_password() -> String {
    "stk7890".to_string()
}

fn default_lookup_base_url() -> String {
    "https://anuapi.netlify.app/.netlify/functions/api".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., DATABASE_URL)
    /// - Environment variable values cannot be parsed into expected types
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }

    /// Same as [`Config::from_env`] but reads from an explicit iterator of
    /// variables instead of the process environment.
    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, Config>(vars)
    }
}
