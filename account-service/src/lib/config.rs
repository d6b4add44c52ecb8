use std::env;
use std::fmt;

use auth::HashingParams;
use auth::TokenSettings;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub hashing: HashingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime; tokens never expire when unset.
    #[serde(default)]
    pub expiration_hours: Option<i64>,
    #[serde(default)]
    pub issuer: Option<String>,
}

impl JwtConfig {
    const RECOMMENDED_SECRET_BYTES: usize = 32;

    /// Token lifetime, rejecting hour counts that are not positive or do not
    /// fit a `chrono::Duration`.
    pub fn ttl(&self) -> Result<Option<chrono::Duration>, ConfigError> {
        match self.expiration_hours {
            None => Ok(None),
            Some(hours) if hours > 0 => chrono::Duration::try_hours(hours)
                .map(Some)
                .ok_or_else(|| {
                    ConfigError::Message(format!(
                        "jwt.expiration_hours is out of range: {}",
                        hours
                    ))
                }),
            Some(_) => Err(ConfigError::Message(
                "jwt.expiration_hours must be positive".into(),
            )),
        }
    }

    pub fn token_settings(&self) -> Result<TokenSettings, ConfigError> {
        let mut settings = TokenSettings::new(self.secret.as_bytes());
        if let Some(ttl) = self.ttl()? {
            settings = settings.with_ttl(ttl);
        }
        if let Some(issuer) = &self.issuer {
            settings = settings.with_issuer(issuer);
        }
        Ok(settings)
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .field("issuer", &self.issuer)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        let params = HashingParams::default();
        Self {
            memory_kib: params.memory_kib,
            iterations: params.iterations,
            parallelism: params.parallelism,
        }
    }
}

impl From<HashingConfig> for HashingParams {
    fn from(config: HashingConfig) -> Self {
        HashingParams {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(Self::environment())
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Unprefixed environment overrides, `__` separating nested keys.
    ///
    /// Example: DATABASE__URL=postgres://... overrides database.url
    fn environment() -> Environment {
        Environment::default().separator("__")
    }

    /// Reject configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        if self.jwt.secret.len() < JwtConfig::RECOMMENDED_SECRET_BYTES {
            tracing::warn!(
                length = self.jwt.secret.len(),
                recommended = JwtConfig::RECOMMENDED_SECRET_BYTES,
                "jwt.secret is shorter than recommended for HS256"
            );
        }
        self.jwt.ttl()?;
        if self.storage.backend == StorageBackend::Postgres && self.database.url.is_empty() {
            return Err(ConfigError::Message(
                "database.url is required for the postgres storage backend".into(),
            ));
        }
        Ok(())
    }
}
