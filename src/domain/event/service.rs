use std::collections::HashMap;

use chrono::{Local, NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::dto::{DeleteEventResponse, EventRequest, EventResponse};
use super::entity::health_event;
use super::orphan::{orphaned_reason, FileDisposition};
use super::schedule::{self, TimeRange, DATE_FORMAT};
use crate::domain::file::entity::file_info;
use crate::domain::file::storage::remove_best_effort;
use crate::domain::notification::{NotificationPayload, NotificationService};
use crate::domain::professional::service::ProfessionalService;
use crate::state::AppState;
use crate::utils::error::AppError;

pub struct EventService;

impl EventService {
    pub async fn create_event(
        state: &AppState,
        user_id: i64,
        req: EventRequest,
    ) -> Result<EventResponse, AppError> {
        let (date, range) = req.schedule()?;
        let (title, description) = req.normalized_text();

        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 1. Lock the professional row; concurrent writes for the same professional queue here
        ProfessionalService::find_owned(&txn, user_id, req.professional_id, true).await?;

        // 2. Overlap check
        Self::ensure_available(&txn, req.professional_id, date, &range, None).await?;

        // 3. Insert
        let now = Utc::now().naive_utc();
        let event = health_event::ActiveModel {
            title: Set(title),
            description: Set(description),
            date: Set(date),
            start_time: Set(range.start()),
            end_time: Set(range.end()),
            event_type: Set(req.event_type.clone()),
            user_id: Set(user_id),
            professional_id: Set(req.professional_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        // 4. Notification
        NotificationService::notify(&txn, user_id, Self::scheduled_payload(&event)).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = user_id,
            event_id = event.event_id,
            professional_id = event.professional_id,
            date = %event.date,
            "Event created"
        );

        Ok(EventResponse::new(event, Vec::new()))
    }

    pub async fn list_events(
        state: &AppState,
        user_id: i64,
        date: Option<String>,
    ) -> Result<Vec<EventResponse>, AppError> {
        let mut query = health_event::Entity::find().filter(health_event::Column::UserId.eq(user_id));

        if let Some(raw) = date.as_deref() {
            let date = schedule::parse_date(raw)?;
            query = query.filter(health_event::Column::Date.eq(date));
        }

        let events = query
            .order_by_asc(health_event::Column::Date)
            .order_by_asc(health_event::Column::StartTime)
            .order_by_asc(health_event::Column::EventId)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if events.is_empty() {
            return Ok(Vec::new());
        }

        let event_ids: Vec<i64> = events.iter().map(|e| e.event_id).collect();
        let files = file_info::Entity::find()
            .filter(file_info::Column::EventId.is_in(event_ids))
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let mut files_by_event: HashMap<i64, Vec<file_info::Model>> = HashMap::new();
        for file in files {
            if let Some(event_id) = file.event_id {
                files_by_event.entry(event_id).or_default().push(file);
            }
        }

        Ok(events
            .into_iter()
            .map(|event| {
                let files = files_by_event.remove(&event.event_id).unwrap_or_default();
                EventResponse::new(event, files)
            })
            .collect())
    }

    pub async fn get_event(
        state: &AppState,
        user_id: i64,
        event_id: i64,
    ) -> Result<EventResponse, AppError> {
        let event = Self::find_owned(&state.db, user_id, event_id, false).await?;
        let files = Self::files_of(&state.db, event_id).await?;

        Ok(EventResponse::new(event, files))
    }

    pub async fn update_event(
        state: &AppState,
        user_id: i64,
        event_id: i64,
        req: EventRequest,
    ) -> Result<EventResponse, AppError> {
        let (date, range) = req.schedule()?;
        let (title, description) = req.normalized_text();

        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let existing = Self::find_owned(&txn, user_id, event_id, true).await?;
        let previous_professional_id = existing.professional_id;

        ProfessionalService::find_owned(&txn, user_id, req.professional_id, true).await?;
        Self::ensure_available(&txn, req.professional_id, date, &range, Some(event_id)).await?;

        let mut active: health_event::ActiveModel = existing.into();
        active.title = Set(title);
        active.description = Set(description);
        active.date = Set(date);
        active.start_time = Set(range.start());
        active.end_time = Set(range.end());
        active.event_type = Set(req.event_type.clone());
        active.professional_id = Set(req.professional_id);
        active.updated_at = Set(Utc::now().naive_utc());

        let event = active
            .update(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        // Attached files follow the event's professional
        if previous_professional_id != event.professional_id {
            file_info::Entity::update_many()
                .col_expr(
                    file_info::Column::ProfessionalId,
                    Expr::value(event.professional_id),
                )
                .filter(file_info::Column::EventId.eq(event_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::InternalError(e.to_string()))?;
        }

        NotificationService::archive_for_event(&txn, event_id).await?;
        NotificationService::notify(&txn, user_id, Self::scheduled_payload(&event)).await?;

        let files = Self::files_of(&txn, event_id).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = user_id,
            event_id = event_id,
            professional_id = event.professional_id,
            date = %event.date,
            "Event updated"
        );

        Ok(EventResponse::new(event, files))
    }

    /// Deletes an event. Attached files are either orphaned or deleted, all in
    /// one transaction; stored bytes are removed only after commit.
    pub async fn delete_event(
        state: &AppState,
        user_id: i64,
        event_id: i64,
        disposition: FileDisposition,
    ) -> Result<DeleteEventResponse, AppError> {
        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        let event = Self::find_owned(&txn, user_id, event_id, true).await?;
        let files = Self::files_of(&txn, event_id).await?;
        let file_ids: Vec<i64> = files.iter().map(|f| f.file_id).collect();

        match disposition {
            FileDisposition::Preserve => {
                let reason = orphaned_reason(&event.title, Self::today());
                file_info::Entity::update_many()
                    .col_expr(file_info::Column::IsOrphaned, Expr::value(true))
                    .col_expr(file_info::Column::OrphanedReason, Expr::value(reason))
                    .col_expr(file_info::Column::ProfessionalId, Expr::value(Option::<i64>::None))
                    .col_expr(file_info::Column::EventId, Expr::value(Option::<i64>::None))
                    .filter(file_info::Column::EventId.eq(event_id))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?;
            }
            FileDisposition::Delete => {
                file_info::Entity::delete_many()
                    .filter(file_info::Column::EventId.eq(event_id))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::InternalError(e.to_string()))?;
            }
        }

        NotificationService::archive_for_event(&txn, event_id).await?;

        health_event::Entity::delete_by_id(event_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = user_id,
            event_id = event_id,
            file_count = file_ids.len(),
            disposition = ?disposition,
            "Event deleted"
        );

        let response = match disposition {
            FileDisposition::Preserve => DeleteEventResponse {
                event_id,
                deleted_file_ids: Vec::new(),
                orphaned_file_ids: file_ids,
            },
            FileDisposition::Delete => {
                for file in &files {
                    remove_best_effort(state.storage.as_ref(), &file.url).await;
                }
                DeleteEventResponse {
                    event_id,
                    deleted_file_ids: file_ids,
                    orphaned_file_ids: Vec::new(),
                }
            }
        };

        Ok(response)
    }

    /// Loads an event owned by `user_id`: 404 if absent, 403 if someone else's.
    pub async fn find_owned<C>(
        conn: &C,
        user_id: i64,
        event_id: i64,
        lock: bool,
    ) -> Result<health_event::Model, AppError>
    where
        C: ConnectionTrait,
    {
        let mut query = health_event::Entity::find_by_id(event_id);
        if lock {
            query = query.lock_exclusive();
        }

        let event = query
            .one(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Evento não encontrado.".to_string()))?;

        if event.user_id != user_id {
            return Err(AppError::Forbidden(
                "Você não tem permissão para acessar este evento.".to_string(),
            ));
        }

        Ok(event)
    }

    pub async fn files_of<C>(conn: &C, event_id: i64) -> Result<Vec<file_info::Model>, AppError>
    where
        C: ConnectionTrait,
    {
        file_info::Entity::find()
            .filter(file_info::Column::EventId.eq(event_id))
            .all(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))
    }

    /// Fails with `AppError::Overlap` when the professional already has an
    /// event intersecting `range` on `date`.
    async fn ensure_available<C>(
        conn: &C,
        professional_id: i64,
        date: NaiveDate,
        range: &TimeRange,
        exclude_event_id: Option<i64>,
    ) -> Result<(), AppError>
    where
        C: ConnectionTrait,
    {
        let same_day = health_event::Entity::find()
            .filter(health_event::Column::ProfessionalId.eq(professional_id))
            .filter(health_event::Column::Date.eq(date))
            .order_by_asc(health_event::Column::StartTime)
            .all(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        schedule::ensure_no_overlap(range, &same_day, exclude_event_id).map_err(|e| {
            warn!(
                professional_id = professional_id,
                date = %date,
                start = %schedule::format_time(range.start()),
                end = %schedule::format_time(range.end()),
                "Event rejected: schedule overlap"
            );
            AppError::from(e)
        })
    }

    fn scheduled_payload(event: &health_event::Model) -> NotificationPayload {
        NotificationPayload::EventScheduled {
            event_id: event.event_id,
            title: event.title.clone(),
            date: event.date.format(DATE_FORMAT).to_string(),
            start_time: schedule::format_time(event.start_time),
        }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}
