use std::sync::OnceLock;
use std::time::{Duration, Instant};

use sea_orm::DatabaseConnection;
use tracing::warn;

use super::dto::{CheckResult, HealthChecks, HealthState, HealthStatus};

const DB_PING_TIMEOUT: Duration = Duration::from_secs(5);

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Records process start; later calls are no-ops.
pub fn init_start_time() {
    START_TIME.get_or_init(Instant::now);
}

fn uptime_secs() -> u64 {
    START_TIME.get().map_or(0, |start| start.elapsed().as_secs())
}

pub async fn check_health(db: &DatabaseConnection) -> HealthStatus {
    let database = check_database(db).await;

    let status = if database.status {
        HealthState::Healthy
    } else {
        HealthState::Unhealthy
    };

    HealthStatus {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime_secs(),
        checks: HealthChecks { database },
    }
}

async fn check_database(db: &DatabaseConnection) -> CheckResult {
    let started = Instant::now();

    match tokio::time::timeout(DB_PING_TIMEOUT, db.ping()).await {
        Ok(Ok(())) => CheckResult::success(started.elapsed().as_millis() as u64),
        Ok(Err(e)) => {
            warn!(error = %e, "Database health check failed");
            CheckResult::failure(started.elapsed().as_millis() as u64, e.to_string())
        }
        Err(_) => {
            warn!("Database health check timed out");
            CheckResult::timeout(DB_PING_TIMEOUT.as_millis() as u64)
        }
    }
}
