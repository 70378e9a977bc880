use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    Json,
};
use validator::Validate;

use super::dto::{ProfessionalRequest, ProfessionalResponse};
use super::service::ProfessionalService;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

#[utoipa::path(
    post,
    path = "/api/v1/professionals",
    request_body = ProfessionalRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profissional criado", body = ProfessionalResponse),
        (status = 400, description = "Dados inválidos", body = ErrorResponse),
        (status = 401, description = "Não autenticado", body = ErrorResponse)
    ),
    tag = "Professional"
)]
pub async fn create_professional(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<ProfessionalRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<ProfessionalResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let user_id = user.user_id()?;

    let result = ProfessionalService::create_professional(&state, user_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Profissional cadastrado com sucesso.",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/professionals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profissionais do usuário", body = [ProfessionalResponse]),
        (status = 401, description = "Não autenticado", body = ErrorResponse)
    ),
    tag = "Professional"
)]
pub async fn list_professionals(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<ProfessionalResponse>>>, AppError> {
    let user_id = user.user_id()?;
    let result = ProfessionalService::list_professionals(&state, user_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    put,
    path = "/api/v1/professionals/{professional_id}",
    params(("professional_id" = i64, Path, description = "ID do profissional")),
    request_body = ProfessionalRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profissional atualizado", body = ProfessionalResponse),
        (status = 403, description = "Profissional de outro usuário", body = ErrorResponse),
        (status = 404, description = "Profissional não encontrado", body = ErrorResponse)
    ),
    tag = "Professional"
)]
pub async fn update_professional(
    State(state): State<AppState>,
    user: AuthUser,
    Path(professional_id): Path<i64>,
    payload: Result<Json<ProfessionalRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<ProfessionalResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let user_id = user.user_id()?;

    let result =
        ProfessionalService::update_professional(&state, user_id, professional_id, req).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/professionals/{professional_id}",
    params(("professional_id" = i64, Path, description = "ID do profissional")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profissional excluído"),
        (status = 404, description = "Profissional não encontrado", body = ErrorResponse),
        (status = 409, description = "Profissional com eventos vinculados", body = ErrorResponse)
    ),
    tag = "Professional"
)]
pub async fn delete_professional(
    State(state): State<AppState>,
    user: AuthUser,
    Path(professional_id): Path<i64>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    let user_id = user.user_id()?;
    ProfessionalService::delete_professional(&state, user_id, professional_id).await?;

    Ok(Json(BaseResponse::empty("Profissional excluído com sucesso.")))
}
