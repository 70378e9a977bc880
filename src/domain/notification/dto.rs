use serde::Serialize;
use utoipa::ToSchema;

use super::entity::notification;
use super::payload::NotificationPayload;
use crate::utils::error::AppError;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification_id: i64,
    pub message: String,
    #[schema(value_type = Object)]
    pub payload: NotificationPayload,
    pub is_read: bool,
    pub created_at: String,
}

impl TryFrom<notification::Model> for NotificationResponse {
    type Error = AppError;

    fn try_from(model: notification::Model) -> Result<Self, Self::Error> {
        let payload: NotificationPayload = serde_json::from_value(model.payload).map_err(|e| {
            AppError::InternalError(format!(
                "Malformed payload on notification {}: {}",
                model.notification_id, e
            ))
        })?;

        Ok(Self {
            notification_id: model.notification_id,
            message: model.message,
            payload,
            is_read: model.is_read,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        })
    }
}
