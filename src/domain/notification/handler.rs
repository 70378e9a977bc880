use axum::{
    extract::{Path, State},
    Json,
};

use super::dto::NotificationResponse;
use super::service::NotificationService;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

/// Active (non-archived) notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Lista de notificações", body = [NotificationResponse]),
        (status = 401, description = "Não autenticado", body = ErrorResponse)
    ),
    tag = "Notification"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<NotificationResponse>>>, AppError> {
    let user_id = user.user_id()?;
    let result = NotificationService::list_active(&state, user_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{notification_id}/read",
    params(("notification_id" = i64, Path, description = "ID da notificação")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Notificação marcada como lida"),
        (status = 403, description = "Notificação de outro usuário", body = ErrorResponse),
        (status = 404, description = "Notificação não encontrada", body = ErrorResponse)
    ),
    tag = "Notification"
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    user: AuthUser,
    Path(notification_id): Path<i64>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    let user_id = user.user_id()?;
    NotificationService::mark_read(&state, user_id, notification_id).await?;

    Ok(Json(BaseResponse::empty("Notificação marcada como lida.")))
}
