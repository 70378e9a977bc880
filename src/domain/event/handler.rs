use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use super::dto::{DeleteEventQuery, DeleteEventResponse, EventRequest, EventResponse, ListEventsQuery};
use super::orphan::FileDisposition;
use super::service::EventService;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

/// Create an event
///
/// Rejected with `EVENT_OVERLAP` when the professional already has an event
/// intersecting `[startTime, endTime)` on the same date.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = EventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Evento criado", body = EventResponse),
        (status = 400, description = "Dados inválidos ou sobreposição de horário", body = ErrorResponse),
        (status = 401, description = "Não autenticado", body = ErrorResponse),
        (status = 403, description = "Profissional de outro usuário", body = ErrorResponse),
        (status = 404, description = "Profissional não encontrado", body = ErrorResponse)
    ),
    tag = "Event"
)]
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<EventResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let user_id = user.user_id()?;

    let result = EventService::create_event(&state, user_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Evento criado com sucesso.",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(ListEventsQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Eventos do usuário", body = [EventResponse]),
        (status = 400, description = "Data inválida", body = ErrorResponse),
        (status = 401, description = "Não autenticado", body = ErrorResponse)
    ),
    tag = "Event"
)]
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ListEventsQuery>, QueryRejection>,
) -> Result<Json<BaseResponse<Vec<EventResponse>>>, AppError> {
    let Query(query) = query?;
    let user_id = user.user_id()?;
    let result = EventService::list_events(&state, user_id, query.date).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    get,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = i64, Path, description = "ID do evento")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Evento com arquivos", body = EventResponse),
        (status = 403, description = "Evento de outro usuário", body = ErrorResponse),
        (status = 404, description = "Evento não encontrado", body = ErrorResponse)
    ),
    tag = "Event"
)]
pub async fn get_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<BaseResponse<EventResponse>>, AppError> {
    let user_id = user.user_id()?;
    let result = EventService::get_event(&state, user_id, event_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    put,
    path = "/api/v1/events/{event_id}",
    params(("event_id" = i64, Path, description = "ID do evento")),
    request_body = EventRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Evento atualizado", body = EventResponse),
        (status = 400, description = "Dados inválidos ou sobreposição de horário", body = ErrorResponse),
        (status = 403, description = "Evento de outro usuário", body = ErrorResponse),
        (status = 404, description = "Evento não encontrado", body = ErrorResponse)
    ),
    tag = "Event"
)]
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<i64>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<EventResponse>>, AppError> {
    let Json(req) = payload?;
    req.validate()?;
    let user_id = user.user_id()?;

    let result = EventService::update_event(&state, user_id, event_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Evento atualizado com sucesso.",
    )))
}

/// Delete an event
///
/// With `deleteFiles=true` attached files are removed; otherwise (default) they
/// are kept as orphans that can be re-attached later.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{event_id}",
    params(
        ("event_id" = i64, Path, description = "ID do evento"),
        DeleteEventQuery
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Evento excluído", body = DeleteEventResponse),
        (status = 403, description = "Evento de outro usuário", body = ErrorResponse),
        (status = 404, description = "Evento não encontrado", body = ErrorResponse)
    ),
    tag = "Event"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<i64>,
    query: Result<Query<DeleteEventQuery>, QueryRejection>,
) -> Result<Json<BaseResponse<DeleteEventResponse>>, AppError> {
    let Query(query) = query?;
    let user_id = user.user_id()?;
    let disposition = FileDisposition::from_delete_flag(query.delete_files.unwrap_or(false));

    let result = EventService::delete_event(&state, user_id, event_id, disposition).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Evento excluído com sucesso.",
    )))
}
