use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::professional;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalRequest {
    #[validate(
        length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."),
        custom(function = "crate::global::validator::validate_not_blank", message = "O nome não pode ficar em branco.")
    )]
    pub name: String,

    #[validate(
        length(min = 1, max = 100, message = "A especialidade deve ter entre 1 e 100 caracteres."),
        custom(function = "crate::global::validator::validate_not_blank", message = "A especialidade não pode ficar em branco.")
    )]
    pub specialty: String,

    #[validate(length(max = 100, message = "O contato não pode exceder 100 caracteres."))]
    pub contact: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalResponse {
    pub professional_id: i64,
    pub name: String,
    pub specialty: String,
    pub contact: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<professional::Model> for ProfessionalResponse {
    fn from(model: professional::Model) -> Self {
        Self {
            professional_id: model.professional_id,
            name: model.name,
            specialty: model.specialty,
            contact: model.contact,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            updated_at: model.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}
