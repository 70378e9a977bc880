pub mod app_config;
pub mod database;

pub use app_config::{AppConfig, AppEnv, ConfigError, RateLimitConfig, UploadConfig};
pub use database::{establish_connection, sync_schema};
