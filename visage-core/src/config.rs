use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Default per-session upload cap in bytes (~1.91 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 2_000_000;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct VisageConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "visage".to_string(),
            password: "visage".to_string(),
            name: "visage".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EncoderConfig {
    pub base_url: String,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://face-encoding:8000".to_string(),
            endpoint: "v1/selfie".to_string(),
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl VisageConfig {
    /// Load configuration from an optional TOML file, `VISAGE__*` environment
    /// variables, and the deployment's legacy variable names (`DB_HOST`,
    /// `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`, `MAX_FILE_SIZE`).
    /// The legacy names win over the file and prefixed variables.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("VISAGE").separator("__"))
            .set_override_option("database.host", std::env::var("DB_HOST").ok())?
            .set_override_option("database.port", std::env::var("DB_PORT").ok())?
            .set_override_option("database.user", std::env::var("DB_USER").ok())?
            .set_override_option("database.password", std::env::var("DB_PASSWORD").ok())?
            .set_override_option("database.name", std::env::var("DB_NAME").ok())?
            .set_override_option("upload.max_file_size", std::env::var("MAX_FILE_SIZE").ok())?
            .build()?;
        s.try_deserialize()
    }
}
