use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Logical attachment category, unique within an event.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum FileSlot {
    #[sea_orm(string_value = "result")]
    #[serde(rename = "result")]
    ExamResult,
    #[sea_orm(string_value = "request")]
    Request,
    #[sea_orm(string_value = "exam")]
    Exam,
    #[sea_orm(string_value = "prescription")]
    Prescription,
    #[sea_orm(string_value = "certificate")]
    Certificate,
    #[sea_orm(string_value = "other")]
    Other,
}

impl std::str::FromStr for FileSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "result" => Ok(FileSlot::ExamResult),
            "request" => Ok(FileSlot::Request),
            "exam" => Ok(FileSlot::Exam),
            "prescription" => Ok(FileSlot::Prescription),
            "certificate" => Ok(FileSlot::Certificate),
            "other" => Ok(FileSlot::Other),
            other => Err(format!("Categoria de arquivo desconhecida: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_info")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub file_id: i64,
    pub user_id: i64,
    pub slot: FileSlot,
    pub name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_at: DateTime,
    pub expires_at: Option<DateTime>,
    pub professional_id: Option<i64>,
    pub event_id: Option<i64>,
    pub is_orphaned: bool,
    pub orphaned_reason: Option<String>,
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
        on_delete = "SetNull"
    )]
    Professional,
    #[sea_orm(
        belongs_to = "crate::domain::event::entity::health_event::Entity",
        from = "Column::EventId",
        to = "crate::domain::event::entity::health_event::Column::EventId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    HealthEvent,
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

impl Related<crate::domain::event::entity::health_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthEvent.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
