use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::domain::file::storage::FileStorage;
use crate::global::rate_limit::UploadRateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub storage: Arc<dyn FileStorage>,
    pub rate_limiter: Arc<UploadRateLimiter>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, storage: Arc<dyn FileStorage>) -> Self {
        let rate_limiter = Arc::new(UploadRateLimiter::new(config.rate_limit.clone()));
        Self {
            db,
            config,
            storage,
            rate_limiter,
        }
    }
}
