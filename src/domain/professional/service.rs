use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use super::dto::{ProfessionalRequest, ProfessionalResponse};
use super::entity::professional;
use crate::domain::event::entity::health_event;
use crate::domain::file::entity::file_info;
use crate::state::AppState;
use crate::utils::error::AppError;

pub struct ProfessionalService;

impl ProfessionalService {
    pub async fn create_professional(
        state: &AppState,
        user_id: i64,
        req: ProfessionalRequest,
    ) -> Result<ProfessionalResponse, AppError> {
        let now = Utc::now().naive_utc();
        let model = professional::ActiveModel {
            user_id: Set(user_id),
            name: Set(req.name.trim().to_string()),
            specialty: Set(req.specialty.trim().to_string()),
            contact: Set(normalize_contact(req.contact)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = user_id,
            professional_id = model.professional_id,
            "Professional created"
        );

        Ok(model.into())
    }

    pub async fn list_professionals(
        state: &AppState,
        user_id: i64,
    ) -> Result<Vec<ProfessionalResponse>, AppError> {
        let models = professional::Entity::find()
            .filter(professional::Column::UserId.eq(user_id))
            .order_by_asc(professional::Column::Name)
            .all(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(models.into_iter().map(ProfessionalResponse::from).collect())
    }

    pub async fn update_professional(
        state: &AppState,
        user_id: i64,
        professional_id: i64,
        req: ProfessionalRequest,
    ) -> Result<ProfessionalResponse, AppError> {
        let existing = Self::find_owned(&state.db, user_id, professional_id, false).await?;

        let mut active: professional::ActiveModel = existing.into();
        active.name = Set(req.name.trim().to_string());
        active.specialty = Set(req.specialty.trim().to_string());
        active.contact = Set(normalize_contact(req.contact));
        active.updated_at = Set(Utc::now().naive_utc());

        let model = active
            .update(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Ok(model.into())
    }

    /// Refuses while events still reference the professional; file references
    /// are cleared in the same transaction as the delete.
    pub async fn delete_professional(
        state: &AppState,
        user_id: i64,
        professional_id: i64,
    ) -> Result<(), AppError> {
        let txn = state
            .db
            .begin()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        Self::find_owned(&txn, user_id, professional_id, true).await?;

        let event_count = health_event::Entity::find()
            .filter(health_event::Column::ProfessionalId.eq(professional_id))
            .count(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        if event_count > 0 {
            warn!(
                professional_id = professional_id,
                event_count = event_count,
                "Professional still referenced by events"
            );
            return Err(AppError::Conflict(format!(
                "Este profissional possui {} evento(s) vinculado(s). Exclua ou altere os eventos antes.",
                event_count
            )));
        }

        file_info::Entity::update_many()
            .col_expr(file_info::Column::ProfessionalId, Expr::value(Option::<i64>::None))
            .filter(file_info::Column::ProfessionalId.eq(professional_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        professional::Entity::delete_by_id(professional_id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?;

        info!(
            user_id = user_id,
            professional_id = professional_id,
            "Professional deleted"
        );

        Ok(())
    }

    /// Loads a professional owned by `user_id`: 404 if absent, 403 if someone else's.
    /// With `lock`, the row is selected `FOR UPDATE`.
    pub async fn find_owned<C>(
        conn: &C,
        user_id: i64,
        professional_id: i64,
        lock: bool,
    ) -> Result<professional::Model, AppError>
    where
        C: ConnectionTrait,
    {
        let mut query = professional::Entity::find_by_id(professional_id);
        if lock {
            query = query.lock_exclusive();
        }

        let model = query
            .one(conn)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            .ok_or_else(|| AppError::NotFound("Profissional não encontrado.".to_string()))?;

        if model.user_id != user_id {
            return Err(AppError::Forbidden(
                "Este profissional pertence a outro usuário.".to_string(),
            ));
        }

        Ok(model)
    }
}

fn normalize_contact(contact: Option<String>) -> Option<String> {
    contact
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_contact_should_be_stored_as_none() {
        assert_eq!(normalize_contact(Some("   ".to_string())), None);
        assert_eq!(normalize_contact(None), None);
        assert_eq!(
            normalize_contact(Some(" ana@clinica.com ".to_string())),
            Some("ana@clinica.com".to_string())
        );
    }
}
