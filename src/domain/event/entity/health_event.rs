use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    #[sea_orm(string_value = "CONSULTA")]
    Consulta,
    #[sea_orm(string_value = "EXAME")]
    Exame,
    #[sea_orm(string_value = "PROCEDIMENTO")]
    Procedimento,
    #[sea_orm(string_value = "MEDICACAO")]
    Medicacao,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "health_event")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: Date,
    /// Inclusive
    pub start_time: Time,
    /// Exclusive
    pub end_time: Time,
    pub event_type: EventType,
    pub user_id: i64,
    pub professional_id: i64,
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
    #[sea_orm(
        belongs_to = "crate::domain::professional::entity::professional::Entity",
        from = "Column::ProfessionalId",
        to = "crate::domain::professional::entity::professional::Column::ProfessionalId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Professional,
    #[sea_orm(has_many = "crate::domain::file::entity::file_info::Entity")]
    FileInfo,
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<crate::domain::professional::entity::professional::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professional.def()
    }
}

impl Related<crate::domain::file::entity::file_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FileInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
