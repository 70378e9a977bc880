use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment. Drives the upload size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
}

impl FromStr for AppEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(AppEnv::Production),
            "development" | "dev" | "test" => Ok(AppEnv::Development),
            other => Err(ConfigError::InvalidAppEnv(other.to_string())),
        }
    }
}

/// Upload rate limiter settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window: Duration,
    pub block_duration: Duration,
}

impl Default for RateLimitConfig {
    /// 20 uploads per hour, 15 minute block.
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 20,
            window: Duration::from_secs(60 * 60),
            block_duration: Duration::from_secs(15 * 60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Files of this size or larger are rejected.
    pub max_bytes: u64,
    pub upload_dir: String,
    pub public_base_url: String,
}

impl UploadConfig {
    pub const PRODUCTION_MAX_BYTES: u64 = 5 * 1024 * 1024;
    pub const DEVELOPMENT_MAX_BYTES: u64 = 10 * 1024 * 1024;

    pub fn default_max_bytes(app_env: AppEnv) -> u64 {
        match app_env {
            AppEnv::Production => Self::PRODUCTION_MAX_BYTES,
            AppEnv::Development => Self::DEVELOPMENT_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub app_env: AppEnv,
    pub upload: UploadConfig,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env: AppEnv = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()?;

        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if app_env == AppEnv::Production => return Err(ConfigError::MissingJwtSecret),
            Err(_) => {
                tracing::warn!("JWT_SECRET is not set; using an insecure development secret.");
                "dev-secret".to_string()
            }
        };

        let max_bytes = match env::var("UPLOAD_MAX_BYTES") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidNumber("UPLOAD_MAX_BYTES"))?,
            Err(_) => UploadConfig::default_max_bytes(app_env),
        };

        let upload = UploadConfig {
            max_bytes,
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
        };

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            enabled: parse_env_or("RATE_LIMIT_ENABLED", defaults.enabled)?,
            max_requests: parse_env_or("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests)?,
            window: Duration::from_secs(parse_env_or(
                "RATE_LIMIT_WINDOW_SECS",
                defaults.window.as_secs(),
            )?),
            block_duration: Duration::from_secs(parse_env_or(
                "RATE_LIMIT_BLOCK_SECS",
                defaults.block_duration.as_secs(),
            )?),
        };

        if !rate_limit.enabled {
            tracing::warn!("Upload rate limiting is disabled (RATE_LIMIT_ENABLED=false).");
        }

        Ok(Self {
            server_port,
            database_url,
            jwt_secret,
            app_env,
            upload,
            rate_limit,
        })
    }
}

fn parse_env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber(key)),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("DATABASE_URL environment variable is required")]
    MissingDatabaseUrl,
    #[error("JWT_SECRET environment variable is required in production")]
    MissingJwtSecret,
    #[error("Invalid APP_ENV value: {0}")]
    InvalidAppEnv(String),
    #[error("Invalid value for {0}")]
    InvalidNumber(&'static str),
}
