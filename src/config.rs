use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Placeholder written to new config files. [`Config::validate`] refuses it.
pub const DEFAULT_SECRET_KEY: &str = "change-me-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub auth: AuthConfig,

    pub email: EmailConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Emit logs as JSON lines instead of the human readable format.
    pub json_logs: bool,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/storefront.db".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign every token.
    pub secret_key: String,

    /// One of HS256, HS384, HS512.
    pub algorithm: String,

    /// Lifetime of access tokens. 0 issues tokens without an expiry.
    pub access_token_expire_minutes: u64,

    pub verification_token_expire_minutes: u64,

    pub reset_token_expire_minutes: u64,

    /// Public base URL used to build the links placed in emails.
    pub app_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 45,
            verification_token_expire_minutes: 24 * 60,
            reset_token_expire_minutes: 15,
            app_url: "http://127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// When false, outgoing mail is written to the log instead of SMTP.
    pub enabled: bool,

    pub host: String,

    /// Implicit TLS port (default: 465)
    pub port: u16,

    pub username: String,

    pub password: String,

    pub from_address: String,

    pub from_name: String,

    pub timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: String::new(),
            port: 465,
            username: String::new(),
            password: String::new(),
            from_address: "admin@ecommerce.com".to_string(),
            from_name: "E-commerce".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 19456 = 19MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 19 * 1024,
            argon2_time_cost: 2,
            argon2_parallelism: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "storefront".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            security: SecurityConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    /// Loads `.env`, the first config file found, then applies `APP_*` overrides.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            info!("Loaded environment from: {}", path.display());
        }

        let mut config = Self::load_file()?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("DATABASE_URL") {
            self.general.database_path = v;
        }
        if let Some(v) = lookup("APP_SECRET_KEY") {
            self.auth.secret_key = v;
        }
        if let Some(v) = lookup("APP_ALGORITHM") {
            self.auth.algorithm = v;
        }
        if let Some(v) = lookup("APP_ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.auth.access_token_expire_minutes = v
                .parse()
                .context("APP_ACCESS_TOKEN_EXPIRE_MINUTES must be a whole number")?;
        }
        if let Some(v) = lookup("APP_URL") {
            self.auth.app_url = v;
        }
        if let Some(v) = lookup("APP_EMAIL_HOST") {
            self.email.host = v;
            self.email.enabled = true;
        }
        if let Some(v) = lookup("APP_EMAIL_PORT") {
            self.email.port = v.parse().context("APP_EMAIL_PORT must be a port number")?;
        }
        if let Some(v) = lookup("APP_EMAIL_USERNAME") {
            self.email.username = v;
        }
        if let Some(v) = lookup("APP_EMAIL_PASSWORD") {
            self.email.password = v;
        }
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("storefront").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".storefront").join("config.toml"));
        }

        paths
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    /// Writes a default `config.toml` to the working directory unless one exists.
    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.secret_key.is_empty() {
            anyhow::bail!("auth.secret_key cannot be empty");
        }

        if self.auth.secret_key == DEFAULT_SECRET_KEY {
            anyhow::bail!("auth.secret_key is still the placeholder; set APP_SECRET_KEY");
        }

        if !matches!(self.auth.algorithm.as_str(), "HS256" | "HS384" | "HS512") {
            anyhow::bail!(
                "auth.algorithm must be one of HS256, HS384, HS512 (got '{}')",
                self.auth.algorithm
            );
        }

        if self.auth.verification_token_expire_minutes == 0
            || self.auth.reset_token_expire_minutes == 0
        {
            anyhow::bail!("Verification and reset token lifetimes must be > 0");
        }

        let app_url = url::Url::parse(&self.auth.app_url)
            .map_err(|e| anyhow::anyhow!("auth.app_url is not a valid URL: {e}"))?;
        if !matches!(app_url.scheme(), "http" | "https") {
            anyhow::bail!("auth.app_url must use http or https");
        }

        if self.email.enabled && self.email.host.is_empty() {
            anyhow::bail!("email.host cannot be empty when email is enabled");
        }

        Ok(())
    }
}
