use crate::cli::Cli;
use crate::error::{ConfigError, ConfigResult as Result};
use crate::publish::{DEFAULT_PROPERTY_TYPE, default_notes};
use crate::soap_client::{DEFAULT_ENDPOINT, SoapClientConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub credentials: CredentialsConfig,
    pub network: NetworkConfig,
    pub publish: PublishConfig,
}

/// Login used for HTTP basic auth
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// ECCU SOAP endpoint
    pub endpoint: String,
    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,
}

/// Defaults applied to new requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PublishConfig {
    /// Notes used when a request is published without any
    pub default_notes: String,
    /// Property type used when none is given on the command line
    pub property_type: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            default_notes: default_notes(),
            property_type: DEFAULT_PROPERTY_TYPE.to_string(),
        }
    }
}

impl From<&Config> for SoapClientConfig {
    fn from(config: &Config) -> Self {
        Self {
            endpoint: config.network.endpoint.clone(),
            username: config.credentials.username.clone().unwrap_or_default(),
            password: config.credentials.password.clone().unwrap_or_default(),
            timeout_seconds: config.network.timeout_seconds,
            ..Default::default()
        }
    }
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides(config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                // Try to parse as TOML first, then JSON
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = ["eccu.toml", "eccu.json", ".eccu.toml", ".eccu.json"];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("eccu");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides using the system environment
    pub fn apply_environment_overrides(config: Config) -> Result<Config> {
        Self::apply_environment_overrides_with(&SystemEnvProvider, config)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(username) = env.get("ECCU_USERNAME") {
            config.credentials.username = Some(username);
        }
        if let Some(password) = env.get("ECCU_PASSWORD") {
            config.credentials.password = Some(password);
        }

        if let Some(endpoint) = env.get("ECCU_ENDPOINT") {
            config.network.endpoint = endpoint;
        }
        if let Some(timeout) = env.get("ECCU_TIMEOUT") {
            config.network.timeout_seconds = timeout.parse().map_err(|_| {
                ConfigError::Environment(format!("Invalid ECCU_TIMEOUT value: {}", timeout))
            })?;
        }

        if let Some(notes) = env.get("ECCU_NOTES") {
            config.publish.default_notes = notes;
        }
        if let Some(property_type) = env.get("ECCU_PROPERTY_TYPE") {
            config.publish.property_type = property_type;
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        if let Some(username) = &cli.username {
            config.credentials.username = Some(username.clone());
        }
        if let Some(password) = &cli.password {
            config.credentials.password = Some(password.clone());
        }
        if let Some(endpoint) = &cli.endpoint {
            config.network.endpoint = endpoint.clone();
        }
        if let Some(timeout) = cli.timeout {
            config.network.timeout_seconds = timeout;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        let missing = |value: &Option<String>| value.as_deref().is_none_or(str::is_empty);

        if missing(&config.credentials.username) {
            return Err(ConfigError::Validation(
                "A username is required (config file, ECCU_USERNAME or --username)".to_string(),
            ));
        }
        if missing(&config.credentials.password) {
            return Err(ConfigError::Validation(
                "A password is required (config file, ECCU_PASSWORD or --password)".to_string(),
            ));
        }

        if config.network.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        let endpoint = &config.network.endpoint;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "Endpoint must be an http(s) URL: {}",
                endpoint
            )));
        }

        if config.publish.property_type.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Default property type cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
