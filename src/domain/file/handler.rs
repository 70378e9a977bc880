use axum::{
    extract::rejection::JsonRejection,
    extract::{Multipart, Path, State},
    Json,
};
use tracing::debug;

use super::dto::{AttachFileRequest, FileInfoResponse};
use super::entity::file_info::FileSlot;
use super::service::{FileService, UploadInput};
use super::upload::UploadKind;
use crate::state::AppState;
use crate::utils::auth::AuthUser;
use crate::utils::error::AppError;
use crate::utils::BaseResponse;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload a file
///
/// Multipart fields: `file` (required), `eventId`, `slot` (default `other`),
/// `kind` (`image` or `attachment`, default `attachment`). Limited per client IP.
#[utoipa::path(
    post,
    path = "/api/v1/files",
    request_body(content = UploadFileForm, content_type = "multipart/form-data"),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Arquivo enviado", body = FileInfoResponse),
        (status = 400, description = "Arquivo vazio ou tipo não permitido", body = ErrorResponse),
        (status = 401, description = "Não autenticado", body = ErrorResponse),
        (status = 404, description = "Evento não encontrado", body = ErrorResponse),
        (status = 413, description = "Arquivo muito grande", body = ErrorResponse),
        (status = 429, description = "Limite de envios excedido", body = ErrorResponse)
    ),
    tag = "File"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Json<BaseResponse<FileInfoResponse>>, AppError> {
    let user_id = user.user_id()?;
    let input = read_upload_form(multipart).await?;

    let result = FileService::upload_file(&state, user_id, input).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Arquivo enviado com sucesso.",
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/files/orphaned",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Arquivos órfãos do usuário", body = [FileInfoResponse]),
        (status = 401, description = "Não autenticado", body = ErrorResponse)
    ),
    tag = "File"
)]
pub async fn list_orphaned_files(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<BaseResponse<Vec<FileInfoResponse>>>, AppError> {
    let user_id = user.user_id()?;
    let result = FileService::list_orphaned(&state, user_id).await?;

    Ok(Json(BaseResponse::success(result)))
}

#[utoipa::path(
    post,
    path = "/api/v1/files/{file_id}/attach",
    params(("file_id" = i64, Path, description = "ID do arquivo")),
    request_body = AttachFileRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Arquivo vinculado ao evento", body = FileInfoResponse),
        (status = 400, description = "Arquivo não é órfão", body = ErrorResponse),
        (status = 404, description = "Arquivo ou evento não encontrado", body = ErrorResponse),
        (status = 409, description = "Categoria já ocupada no evento", body = ErrorResponse)
    ),
    tag = "File"
)]
pub async fn attach_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(file_id): Path<i64>,
    payload: Result<Json<AttachFileRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<FileInfoResponse>>, AppError> {
    let Json(req) = payload?;
    let user_id = user.user_id()?;
    let result = FileService::attach_file(&state, user_id, file_id, req).await?;

    Ok(Json(BaseResponse::success_with_message(
        result,
        "Arquivo vinculado ao evento.",
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/files/{file_id}",
    params(("file_id" = i64, Path, description = "ID do arquivo")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Arquivo excluído"),
        (status = 403, description = "Arquivo de outro usuário", body = ErrorResponse),
        (status = 404, description = "Arquivo não encontrado", body = ErrorResponse)
    ),
    tag = "File"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    user: AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    let user_id = user.user_id()?;
    FileService::delete_file(&state, user_id, file_id).await?;

    Ok(Json(BaseResponse::empty("Arquivo excluído com sucesso.")))
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadInput, AppError> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut event_id = None;
    let mut slot = FileSlot::Other;
    let mut kind = UploadKind::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let bytes = field.bytes().await?;
                file = Some((original_name, content_type, bytes.to_vec()));
            }
            "eventId" => {
                let raw = field.text().await?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    event_id = Some(raw.parse::<i64>().map_err(|_| {
                        AppError::ValidationError(format!("eventId inválido: {}", raw))
                    })?);
                }
            }
            "slot" => {
                slot = field
                    .text()
                    .await?
                    .parse::<FileSlot>()
                    .map_err(AppError::ValidationError)?;
            }
            "kind" => {
                kind = field
                    .text()
                    .await?
                    .parse::<UploadKind>()
                    .map_err(AppError::ValidationError)?;
            }
            other => {
                debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let (original_name, content_type, bytes) = file.ok_or_else(|| {
        AppError::ValidationError("Nenhum arquivo enviado (campo 'file').".to_string())
    })?;

    Ok(UploadInput {
        original_name,
        content_type,
        bytes,
        event_id,
        slot,
        kind,
    })
}
