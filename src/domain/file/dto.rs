use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::entity::file_info::{self, FileSlot};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileInfoResponse {
    pub file_id: i64,
    pub slot: FileSlot,
    pub name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_at: String,
    pub expires_at: Option<String>,
    pub event_id: Option<i64>,
    pub professional_id: Option<i64>,
    pub is_orphaned: bool,
    pub orphaned_reason: Option<String>,
}

impl From<file_info::Model> for FileInfoResponse {
    fn from(model: file_info::Model) -> Self {
        Self {
            file_id: model.file_id,
            slot: model.slot,
            name: model.name,
            url: model.url,
            mime_type: model.mime_type,
            size_bytes: model.size_bytes,
            uploaded_at: model.uploaded_at.format(DATETIME_FORMAT).to_string(),
            expires_at: model
                .expires_at
                .map(|at| at.format(DATETIME_FORMAT).to_string()),
            event_id: model.event_id,
            professional_id: model.professional_id,
            is_orphaned: model.is_orphaned,
            orphaned_reason: model.orphaned_reason,
        }
    }
}

/// Orders an event's files by slot, then by id.
pub fn ordered_files(mut files: Vec<file_info::Model>) -> Vec<FileInfoResponse> {
    files.sort_by_key(|file| (file.slot, file.file_id));
    files.into_iter().map(FileInfoResponse::from).collect()
}

/// Multipart form accepted by `POST /api/v1/files` (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[allow(dead_code)]
pub struct UploadFileForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Event to attach the file to.
    pub event_id: Option<i64>,
    /// Defaults to `other`.
    pub slot: Option<FileSlot>,
    /// `image` or `attachment` (default).
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachFileRequest {
    pub event_id: i64,
    /// Keeps the file's current slot when omitted.
    pub slot: Option<FileSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn file(file_id: i64, slot: FileSlot) -> file_info::Model {
        let uploaded_at = NaiveDate::from_ymd_opt(2025, 10, 27)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap();
        file_info::Model {
            file_id,
            user_id: 1,
            slot,
            name: format!("arquivo-{}.pdf", file_id),
            url: format!("http://localhost:8080/uploads/{}.pdf", file_id),
            mime_type: "application/pdf".to_string(),
            size_bytes: 1024,
            uploaded_at,
            expires_at: None,
            professional_id: Some(1),
            event_id: Some(1),
            is_orphaned: false,
            orphaned_reason: None,
        }
    }

    #[test]
    fn files_should_be_ordered_by_slot_then_id() {
        // Arrange
        let files = vec![
            file(7, FileSlot::Other),
            file(5, FileSlot::Request),
            file(3, FileSlot::ExamResult),
            file(2, FileSlot::Other),
        ];

        // Act
        let ordered = ordered_files(files);

        // Assert
        let ids: Vec<i64> = ordered.iter().map(|f| f.file_id).collect();
        assert_eq!(ids, vec![3, 5, 2, 7]);
    }

    #[test]
    fn response_should_serialize_slot_in_lowercase() {
        let response = FileInfoResponse::from(file(1, FileSlot::ExamResult));

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["slot"], "result");
        assert_eq!(json["uploadedAt"], "2025-10-27T09:15:00");
        assert_eq!(json["isOrphaned"], false);
    }
}
