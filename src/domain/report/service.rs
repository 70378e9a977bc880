use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use tracing::info;

use super::dto::{CreateReportRequest, ReportResponse};
use super::entity::report::{self, ReportStatus};
use super::protocol;
use crate::domain::notification::{NotificationPayload, NotificationService};
use crate::domain::user::entity::user::{self, UserRole};
use crate::state::AppState;
use crate::utils::error::AppError;

pub struct ReportService;

impl ReportService {
    /// Issues a report to a RECEPTOR, assigning the next protocol of the year and
    /// notifying the receiver in the same transaction.
    pub async fn send_report(
        state: &AppState,
        sender_id: i64,
        req: CreateReportRequest,
    ) -> Result<ReportResponse, AppError> {
        let receiver_email = req.receiver_email.trim().to_ascii_lowercase();

        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 1. Receiver
        let receiver = user::Entity::find()
            .filter(user::Column::Email.eq(receiver_email))
            .one(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Destinatário não encontrado.".to_string()))?;

        if receiver.role != UserRole::Receptor {
            return Err(AppError::BadRequest(
                "O destinatário do laudo deve ser um paciente (RECEPTOR).".to_string(),
            ));
        }

        // 2. Protocol (sequences grow with report_id; text order breaks past six digits)
        let now = Utc::now().naive_utc();
        let year = now.year();
        let last = report::Entity::find()
            .filter(report::Column::Protocol.starts_with(protocol::year_prefix(year)))
            .order_by_desc(report::Column::ReportId)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        let sequence = protocol::next_sequence(last.as_ref().map(|r| r.protocol.as_str()), year);

        // 3. Report
        let model = report::ActiveModel {
            protocol: Set(protocol::format_protocol(year, sequence)),
            title: Set(req.title.trim().to_string()),
            file_url: Set(req.file_url),
            sender_id: Set(sender_id),
            receiver_id: Set(receiver.user_id),
            status: Set(ReportStatus::Sent),
            created_at: Set(now),
            viewed_at: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 4. Notification
        NotificationService::notify(
            &txn,
            receiver.user_id,
            NotificationPayload::ReportReceived {
                report_id: model.report_id,
                protocol: model.protocol.clone(),
                title: model.title.clone(),
            },
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            sender_id = sender_id,
            receiver_id = model.receiver_id,
            report_id = model.report_id,
            protocol = %model.protocol,
            "Report sent"
        );

        Ok(model.into())
    }

    pub async fn list_received(
        state: &AppState,
        receiver_id: i64,
    ) -> Result<Vec<ReportResponse>, AppError> {
        let models = report::Entity::find()
            .filter(report::Column::ReceiverId.eq(receiver_id))
            .order_by_desc(report::Column::CreatedAt)
            .order_by_desc(report::Column::ReportId)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(models.into_iter().map(ReportResponse::from).collect())
    }

    pub async fn list_sent(state: &AppState, sender_id: i64) -> Result<Vec<ReportResponse>, AppError> {
        let models = report::Entity::find()
            .filter(report::Column::SenderId.eq(sender_id))
            .order_by_desc(report::Column::CreatedAt)
            .order_by_desc(report::Column::ReportId)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(models.into_iter().map(ReportResponse::from).collect())
    }

    /// SENT -> VIEWED. Only the receiver may do this; other states are left as they are.
    pub async fn mark_viewed(
        state: &AppState,
        user_id: i64,
        report_id: i64,
    ) -> Result<ReportResponse, AppError> {
        let model = report::Entity::find_by_id(report_id)
            .one(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Laudo não encontrado.".to_string()))?;

        if model.receiver_id != user_id {
            return Err(AppError::Forbidden(
                "Somente o destinatário pode visualizar este laudo.".to_string(),
            ));
        }

        if model.status != ReportStatus::Sent {
            return Ok(model.into());
        }

        let mut active: report::ActiveModel = model.into();
        active.status = Set(ReportStatus::Viewed);
        active.viewed_at = Set(Some(Utc::now().naive_utc()));

        let model = active
            .update(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(user_id = user_id, report_id = report_id, "Report viewed");

        Ok(model.into())
    }
}
