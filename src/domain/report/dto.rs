use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::entity::report::{self, ReportStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    #[validate(
        length(min = 1, max = 200, message = "O título deve ter entre 1 e 200 caracteres."),
        custom(function = "crate::global::validator::validate_not_blank", message = "O título não pode ficar em branco.")
    )]
    pub title: String,

    /// E-mail of the receiving patient (RECEPTOR).
    #[validate(email(message = "E-mail do destinatário inválido."))]
    pub receiver_email: String,

    #[validate(url(message = "URL do arquivo inválida."))]
    pub file_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report_id: i64,
    pub protocol: String,
    pub title: String,
    pub file_url: Option<String>,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub status: ReportStatus,
    pub created_at: String,
    pub viewed_at: Option<String>,
}

impl From<report::Model> for ReportResponse {
    fn from(model: report::Model) -> Self {
        Self {
            report_id: model.report_id,
            protocol: model.protocol,
            title: model.title,
            file_url: model.file_url,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            status: model.status,
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            viewed_at: model
                .viewed_at
                .map(|at| at.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}
