use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Patient, receives reports
    #[sea_orm(string_value = "RECEPTOR")]
    Receptor,
    /// Laboratory or clinic, issues reports
    #[sea_orm(string_value = "EMISSOR")]
    Emissor,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i64,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::domain::professional::entity::professional::Entity")]
    Professional,
    #[sea_orm(has_many = "crate::domain::event::entity::health_event::Entity")]
    HealthEvent,
}

impl Related<crate::domain::professional::entity::professional::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professional.def()
    }
}

impl Related<crate::domain::event::entity::health_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
