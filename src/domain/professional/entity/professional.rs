use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "professional")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub professional_id: i64,
    pub user_id: i64,
    pub name: String,
    pub specialty: String,
    pub contact: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::user::entity::user::Entity",
        from = "Column::UserId",
        to = "crate::domain::user::entity::user::Column::UserId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "crate::domain::event::entity::health_event::Entity")]
    HealthEvent,
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::domain::event::entity::health_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
