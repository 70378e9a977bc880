use axum::{extract::State, http::StatusCode, Json};

use super::dto::{HealthState, HealthStatus};
use super::service::check_health;
use crate::state::AppState;

/// Health check
///
/// Version, uptime and a database ping. Returns 503 when the database is unreachable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Servidor saudável", body = HealthStatus),
        (status = 503, description = "Banco de dados indisponível", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let status = check_health(&state.db).await;
    let code = if status.status == HealthState::Healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}
