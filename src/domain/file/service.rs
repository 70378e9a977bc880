use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::dto::{AttachFileRequest, FileInfoResponse};
use super::entity::file_info::{self, FileSlot};
use super::storage::{remove_best_effort, StoredFile};
use super::upload::{self, UploadError, UploadKind, UploadValidator};
use crate::domain::event::service::EventService;
use crate::state::AppState;
use crate::utils::error::AppError;

const MAX_DISPLAY_NAME_CHARS: usize = 255;
const FALLBACK_DISPLAY_NAME: &str = "arquivo";

/// A file received from the client, before validation.
#[derive(Debug)]
pub struct UploadInput {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub event_id: Option<i64>,
    pub slot: FileSlot,
    pub kind: UploadKind,
}

pub struct FileService;

impl FileService {
    /// Validates, stores and records an upload. When the upload targets an
    /// event slot that is already filled, the previous file is replaced.
    pub async fn upload_file(
        state: &AppState,
        user_id: i64,
        input: UploadInput,
    ) -> Result<FileInfoResponse, AppError> {
        // 1. Size and type
        let size = input.bytes.len() as u64;
        let validator = UploadValidator::from_config(&state.config.upload);
        if let Err(e) = validator.validate(size, &input.content_type, input.kind) {
            upload::record_rejection(rejection_reason(&e));
            warn!(
                user_id = user_id,
                size = size,
                mime_type = %input.content_type,
                error = %e,
                "Upload rejected"
            );
            return Err(e.into());
        }

        // 2. Fail fast on a foreign or missing event before writing any bytes
        if let Some(event_id) = input.event_id {
            EventService::find_owned(&state.db, user_id, event_id, false).await?;
        }

        // 3. Bytes
        let stored = state
            .storage
            .save(&input.original_name, &input.bytes)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 4. Row; the stored object is removed again if this fails
        let (model, replaced) = match Self::record_upload(state, user_id, &input, &stored, size).await
        {
            Ok(result) => result,
            Err(e) => {
                remove_best_effort(state.storage.as_ref(), &stored.url).await;
                return Err(e);
            }
        };

        if let Some(previous) = replaced {
            remove_best_effort(state.storage.as_ref(), &previous.url).await;
        }

        upload::record_stored_bytes(size);

        info!(
            user_id = user_id,
            file_id = model.file_id,
            event_id = ?model.event_id,
            slot = ?model.slot,
            size = size,
            "File uploaded"
        );

        Ok(model.into())
    }

    pub async fn list_orphaned(
        state: &AppState,
        user_id: i64,
    ) -> Result<Vec<FileInfoResponse>, AppError> {
        let models = file_info::Entity::find()
            .filter(file_info::Column::UserId.eq(user_id))
            .filter(file_info::Column::IsOrphaned.eq(true))
            .order_by_desc(file_info::Column::UploadedAt)
            .order_by_desc(file_info::Column::FileId)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(models.into_iter().map(FileInfoResponse::from).collect())
    }

    /// Re-attaches an orphaned file to an owned event.
    pub async fn attach_file(
        state: &AppState,
        user_id: i64,
        file_id: i64,
        req: AttachFileRequest,
    ) -> Result<FileInfoResponse, AppError> {
        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let file = Self::find_owned(&txn, user_id, file_id, true).await?;
        if !file.is_orphaned || file.event_id.is_some() {
            return Err(AppError::BadRequest(
                "Somente arquivos órfãos podem ser vinculados a um evento.".to_string(),
            ));
        }

        let event = EventService::find_owned(&txn, user_id, req.event_id, true).await?;
        let slot = req.slot.unwrap_or(file.slot);

        if Self::find_in_slot(&txn, event.event_id, slot).await?.is_some() {
            return Err(AppError::Conflict(
                "Já existe um arquivo nesta categoria para o evento.".to_string(),
            ));
        }

        let mut active: file_info::ActiveModel = file.into();
        active.event_id = Set(Some(event.event_id));
        active.professional_id = Set(Some(event.professional_id));
        active.slot = Set(slot);
        active.is_orphaned = Set(false);
        active.orphaned_reason = Set(None);

        let model = active
            .update(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = user_id,
            file_id = file_id,
            event_id = event.event_id,
            "Orphaned file attached"
        );

        Ok(model.into())
    }

    /// Deletes the row, then the stored bytes (best-effort).
    pub async fn delete_file(state: &AppState, user_id: i64, file_id: i64) -> Result<(), AppError> {
        let file = Self::find_owned(&state.db, user_id, file_id, false).await?;

        file_info::Entity::delete_by_id(file.file_id)
            .exec(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        remove_best_effort(state.storage.as_ref(), &file.url).await;

        info!(user_id = user_id, file_id = file_id, "File deleted");

        Ok(())
    }

    pub async fn find_owned<C>(
        conn: &C,
        user_id: i64,
        file_id: i64,
        lock: bool,
    ) -> Result<file_info::Model, AppError>
    where
        C: ConnectionTrait,
    {
        let mut query = file_info::Entity::find_by_id(file_id);
        if lock {
            query = query.lock_exclusive();
        }

        let file = query
            .one(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Arquivo não encontrado.".to_string()))?;

        if file.user_id != user_id {
            return Err(AppError::Forbidden(
                "Você não tem permissão para acessar este arquivo.".to_string(),
            ));
        }

        Ok(file)
    }

    async fn find_in_slot<C>(
        conn: &C,
        event_id: i64,
        slot: FileSlot,
    ) -> Result<Option<file_info::Model>, AppError>
    where
        C: ConnectionTrait,
    {
        file_info::Entity::find()
            .filter(file_info::Column::EventId.eq(event_id))
            .filter(file_info::Column::Slot.eq(slot))
            .one(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Inserts the new row, deleting whatever occupied the same event slot.
    /// Returns the inserted row and the replaced one, if any.
    async fn record_upload(
        state: &AppState,
        user_id: i64,
        input: &UploadInput,
        stored: &StoredFile,
        size: u64,
    ) -> Result<(file_info::Model, Option<file_info::Model>), AppError> {
        let txn: DatabaseTransaction = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let (professional_id, replaced) = match input.event_id {
            Some(event_id) => {
                let event = EventService::find_owned(&txn, user_id, event_id, true).await?;
                let previous = Self::find_in_slot(&txn, event_id, input.slot).await?;
                if let Some(previous) = &previous {
                    file_info::Entity::delete_by_id(previous.file_id)
                        .exec(&txn)
                        .await
                        .map_err(|e| AppError::InternalError(e.to_string()))?;
                }
                (Some(event.professional_id), previous)
            }
            None => (None, None),
        };

        let model = file_info::ActiveModel {
            user_id: Set(user_id),
            slot: Set(input.slot),
            name: Set(display_name(&input.original_name)),
            url: Set(stored.url.clone()),
            mime_type: Set(upload::essence(&input.content_type)),
            size_bytes: Set(size as i64),
            uploaded_at: Set(Utc::now().naive_utc()),
            expires_at: Set(None),
            professional_id: Set(professional_id),
            event_id: Set(input.event_id),
            is_orphaned: Set(false),
            orphaned_reason: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok((model, replaced))
    }
}

fn rejection_reason(err: &UploadError) -> &'static str {
    match err {
        UploadError::Empty => "empty",
        UploadError::TooLarge { .. } => "too_large",
        UploadError::UnsupportedType { .. } => "unsupported_type",
    }
}

/// Last path component of the client-supplied name, trimmed and bounded.
fn display_name(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() {
        return FALLBACK_DISPLAY_NAME.to_string();
    }

    base.chars().take(MAX_DISPLAY_NAME_CHARS).collect()
}
