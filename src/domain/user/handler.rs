use axum::{extract::State, Json};

use super::dto::UserResponse;
use super::service::UserService;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Usuário autenticado", body = UserResponse),
        (status = 401, description = "Não autenticado", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<UserResponse>>, AppError> {
    let user_id = user.user_id()?;
    let result = UserService::get_me(&state, user_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
