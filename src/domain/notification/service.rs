use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use super::dto::NotificationResponse;
use super::entity::notification;
use super::payload::NotificationPayload;
use crate::state::AppState;
use crate::utils::error::AppError;

pub struct NotificationService;

impl NotificationService {
    /// Inserts a notification. Takes any connection so callers can run it inside
    /// their own transaction.
    pub async fn notify<C>(
        conn: &C,
        user_id: i64,
        payload: NotificationPayload,
    ) -> Result<notification::Model, AppError>
    where
        C: ConnectionTrait,
    {
        let json = serde_json::to_value(&payload)
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let model = notification::ActiveModel {
            user_id: Set(user_id),
            event_id: Set(payload.event_id()),
            message: Set(payload.message()),
            payload: Set(json),
            is_read: Set(false),
            is_archived: Set(false),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        model
            .insert(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Archives every active notification tied to `event_id`.
    pub async fn archive_for_event<C>(conn: &C, event_id: i64) -> Result<u64, AppError>
    where
        C: ConnectionTrait,
    {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::IsArchived, Expr::value(true))
            .filter(notification::Column::EventId.eq(event_id))
            .filter(notification::Column::IsArchived.eq(false))
            .exec(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        debug!(
            event_id = event_id,
            archived = result.rows_affected,
            "Event notifications archived"
        );

        Ok(result.rows_affected)
    }

    pub async fn list_active(
        state: &AppState,
        user_id: i64,
    ) -> Result<Vec<NotificationResponse>, AppError> {
        let models = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::IsArchived.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::NotificationId)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        models.into_iter().map(NotificationResponse::try_from).collect()
    }

    pub async fn mark_read(
        state: &AppState,
        user_id: i64,
        notification_id: i64,
    ) -> Result<(), AppError> {
        let model = notification::Entity::find_by_id(notification_id)
            .one(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Notificação não encontrada.".to_string()))?;

        if model.user_id != user_id {
            return Err(AppError::Forbidden(
                "Esta notificação pertence a outro usuário.".to_string(),
            ));
        }

        if model.is_read {
            return Ok(());
        }

        let mut active: notification::ActiveModel = model.into();
        active.is_read = Set(true);
        active
            .update(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(())
    }
}
