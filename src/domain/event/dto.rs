use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::entity::health_event::{self, EventType};
use super::schedule::{self, ScheduleError, TimeRange, DATE_FORMAT};
use crate::domain::file::dto::{ordered_files, FileInfoResponse};
use crate::domain::file::entity::file_info;

/// Body of both create (`POST`) and full update (`PUT`).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[validate(
        length(min = 1, max = 200, message = "O título deve ter entre 1 e 200 caracteres."),
        custom(function = "crate::global::validator::validate_not_blank", message = "O título não pode ficar em branco.")
    )]
    pub title: String,

    #[validate(length(max = 2000, message = "A descrição não pode exceder 2000 caracteres."))]
    pub description: Option<String>,

    /// `YYYY-MM-DD`
    #[schema(example = "2025-10-27")]
    pub date: String,

    /// `HH:MM`
    #[schema(example = "09:00")]
    pub start_time: String,

    /// `HH:MM`, strictly after `startTime`
    #[schema(example = "10:00")]
    pub end_time: String,

    pub event_type: EventType,

    #[validate(range(min = 1, message = "Profissional inválido."))]
    pub professional_id: i64,
}

impl EventRequest {
    /// Parses the date and the `[start, end)` range.
    pub fn schedule(&self) -> Result<(NaiveDate, TimeRange), ScheduleError> {
        let date = schedule::parse_date(&self.date)?;
        let range = TimeRange::parse(&self.start_time, &self.end_time)?;
        Ok((date, range))
    }

    /// Trimmed title and description, with a blank description treated as absent.
    pub fn normalized_text(&self) -> (String, Option<String>) {
        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        (self.title.trim().to_string(), description)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    /// Only events on this date (`YYYY-MM-DD`).
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeleteEventQuery {
    /// `true` deletes attached files; otherwise they are kept as orphans.
    pub delete_files: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub event_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub event_type: EventType,
    pub professional_id: i64,
    pub files: Vec<FileInfoResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl EventResponse {
    pub fn new(model: health_event::Model, files: Vec<file_info::Model>) -> Self {
        Self {
            event_id: model.event_id,
            title: model.title,
            description: model.description,
            date: model.date.format(DATE_FORMAT).to_string(),
            start_time: schedule::format_time(model.start_time),
            end_time: schedule::format_time(model.end_time),
            event_type: model.event_type,
            professional_id: model.professional_id,
            files: ordered_files(files),
            created_at: model.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            updated_at: model.updated_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEventResponse {
    pub event_id: i64,
    /// Files whose rows were removed (`deleteFiles=true`).
    pub deleted_file_ids: Vec<i64>,
    /// Files kept as orphans (`deleteFiles=false`).
    pub orphaned_file_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: &str) -> EventRequest {
        EventRequest {
            title: "  Consulta cardiologista ".to_string(),
            description: Some("   ".to_string()),
            date: "2025-10-27".to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            event_type: EventType::Consulta,
            professional_id: 1,
        }
    }

    #[test]
    fn schedule_should_parse_date_and_range() {
        let (date, range) = request("09:00", "10:00").schedule().unwrap();

        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 10, 27).unwrap());
        assert_eq!(schedule::format_time(range.start()), "09:00");
        assert_eq!(schedule::format_time(range.end()), "10:00");
    }

    #[test]
    fn schedule_should_reject_end_before_start() {
        let result = request("10:00", "09:00").schedule();

        assert_eq!(result.unwrap_err(), ScheduleError::EmptyRange);
    }

    #[test]
    fn schedule_should_reject_malformed_time() {
        let result = request("9h", "10:00").schedule();

        assert!(matches!(result, Err(ScheduleError::InvalidTime(_))));
    }

    #[test]
    fn validate_should_reject_whitespace_only_title() {
        let mut req = request("09:00", "10:00");
        req.title = "   ".to_string();

        let errors = req.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("title"));
    }

    #[test]
    fn validate_should_accept_padded_title() {
        assert!(request("09:00", "10:00").validate().is_ok());
    }

    #[test]
    fn normalized_text_should_trim_and_drop_blank_description() {
        let (title, description) = request("09:00", "10:00").normalized_text();

        assert_eq!(title, "Consulta cardiologista");
        assert_eq!(description, None);
    }

    #[test]
    fn empty_title_should_fail_validation() {
        let mut req = request("09:00", "10:00");
        req.title = String::new();

        assert!(req.validate().is_err());
    }

    #[test]
    fn delete_query_should_read_camel_case_flag() {
        let query: DeleteEventQuery = serde_json::from_value(serde_json::json!({
            "deleteFiles": true
        }))
        .unwrap();

        assert_eq!(query.delete_files, Some(true));
    }
}
