use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    Json,
};
use validator::Validate;

use super::dto::{CreateReportRequest, ReportResponse};
use super::service::ReportService;
use crate::domain::user::entity::user::UserRole;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

/// Send a report (EMISSOR)
///
/// Assigns a protocol `OS-<YYYY>-<NNNNNN>` and notifies the receiver.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = CreateReportRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Laudo enviado", body = ReportResponse),
        (status = 400, description = "Dados inválidos ou destinatário não é paciente", body = ErrorResponse),
        (status = 403, description = "Perfil sem permissão", body = ErrorResponse),
        (status = 404, description = "Destinatário não encontrado", body = ErrorResponse)
    ),
    tag = "Report"
)]
pub async fn send_report(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<ReportResponse>>, AppError> {
    let Json(req) = payload?;
    user.require_role(&[UserRole::Emissor])?;
    req.validate()?;
    let user_id = user.user_id()?;

    let result = ReportService::send_report(&state, user_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Laudo enviado com sucesso.",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/received",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Laudos recebidos", body = [ReportResponse]),
        (status = 403, description = "Perfil sem permissão", body = ErrorResponse)
    ),
    tag = "Report"
)]
pub async fn list_received_reports(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<ReportResponse>>>, AppError> {
    user.require_role(&[UserRole::Receptor])?;
    let user_id = user.user_id()?;

    let result = ReportService::list_received(&state, user_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/sent",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Laudos enviados", body = [ReportResponse]),
        (status = 403, description = "Perfil sem permissão", body = ErrorResponse)
    ),
    tag = "Report"
)]
pub async fn list_sent_reports(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<ReportResponse>>>, AppError> {
    user.require_role(&[UserRole::Emissor])?;
    let user_id = user.user_id()?;

    let result = ReportService::list_sent(&state, user_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/reports/{report_id}/view",
    params(("report_id" = i64, Path, description = "ID do laudo")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Laudo marcado como visualizado", body = ReportResponse),
        (status = 403, description = "Não é o destinatário", body = ErrorResponse),
        (status = 404, description = "Laudo não encontrado", body = ErrorResponse)
    ),
    tag = "Report"
)]
pub async fn mark_report_viewed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(report_id): Path<i64>,
) -> Result<Json<BaseResponse<ReportResponse>>, AppError> {
    let user_id = user.user_id()?;
    let result = ReportService::mark_viewed(&state, user_id, report_id).await?;

    Ok(Json(BaseResponse::success(result)))
}
