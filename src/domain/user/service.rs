use sea_orm::EntityTrait;

use super::dto::UserResponse;
use super::entity::user;
use crate::state::AppState;
use crate::utils::error::AppError;

pub struct UserService;

impl UserService {
    pub async fn get_me(state: &AppState, user_id: i64) -> Result<UserResponse, AppError> {
        let model = user::Entity::find_by_id(user_id)
            .one(&state.db)
            .await
            .map_err(|e| AppError::InternalError(e.to_string()))?
            // Token is valid but the account is gone
            .ok_or_else(|| AppError::Unauthorized("Usuário não encontrado.".to_string()))?;

        Ok(model.into())
    }
}
