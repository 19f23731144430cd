use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the document steward service.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the retrieval service handling ingestion and vector deletes.
    pub retrieval_service_url: String,
    /// Optional bearer token presented to the retrieval service.
    pub retrieval_service_api_key: Option<String>,
    /// Base URL of the blob store gateway.
    pub blob_store_url: String,
    /// Bucket holding uploaded document bytes.
    pub blob_bucket: String,
    /// Optional API key presented to the blob store gateway.
    pub blob_store_api_key: Option<String>,
    /// Path to the SQLite database backing document records (`:memory:` supported).
    pub record_db_path: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            retrieval_service_url: load_env("RETRIEVAL_SERVICE_URL")?,
            retrieval_service_api_key: load_env_optional("RETRIEVAL_SERVICE_API_KEY"),
            blob_store_url: load_env("BLOB_STORE_URL")?,
            blob_bucket: load_env("BLOB_BUCKET")?,
            blob_store_api_key: load_env_optional("BLOB_STORE_API_KEY"),
            record_db_path: load_env("RECORD_DB_PATH")?,
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        retrieval_service_url = %config.retrieval_service_url,
        blob_store_url = %config.blob_store_url,
        blob_bucket = %config.blob_bucket,
        record_db_path = %config.record_db_path,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
