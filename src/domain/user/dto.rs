use serde::Serialize;
use utoipa::ToSchema;

use super::entity::user::{self, UserRole};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            user_id: model.user_id,
            email: model.email,
            name: model.name,
            role: model.role,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}
