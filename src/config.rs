use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub moralis: MoralisConfig,
    pub scoring: ScoringConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MoralisConfig {
    pub api_key: String,
    pub base_url: String,
    /// Per-request timeout against the provider, in seconds.
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    /// Overall deadline for one scoring pipeline, in seconds. An unresponsive
    /// upstream must not be able to hang a request forever.
    pub pipeline_deadline_secs: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("moralis.api_key", "")?
            .set_default("moralis.base_url", "https://deep-index.moralis.io/api/v2.2")?
            .set_default("moralis.request_timeout_secs", 15)?
            .set_default("scoring.pipeline_deadline_secs", 120)?
            // Load from config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (AURA__MORALIS__API_KEY, etc.)
            // Double underscore as separator to handle nested keys with underscores
            .add_source(
                Environment::with_prefix("AURA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
