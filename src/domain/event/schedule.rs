//! Scheduling rules for health events.
//!
//! Times are wall-clock `HH:MM` on the event's date and form half-open
//! intervals `[start, end)`: two events overlap iff
//! `start_a < end_b && end_a > start_b`. Back-to-back events do not overlap.

use chrono::{NaiveDate, NaiveTime};

use super::entity::health_event;
use crate::utils::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Data inválida: {0}. Use o formato AAAA-MM-DD.")]
    InvalidDate(String),
    #[error("Horário inválido: {0}. Use o formato HH:MM.")]
    InvalidTime(String),
    #[error("O horário de término deve ser posterior ao horário de início.")]
    EmptyRange,
    #[error(
        "Conflito de horário (sobreposição) com o evento \"{title}\" das {start} às {end} para este profissional."
    )]
    Overlap {
        event_id: i64,
        title: String,
        start: String,
        end: String,
    },
}

impl From<ScheduleError> for AppError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::Overlap { .. } => AppError::Overlap(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}

/// Half-open time interval within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ScheduleError> {
        if end <= start {
            return Err(ScheduleError::EmptyRange);
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ScheduleError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate(raw.to_string()))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Returns the first event in `existing` whose interval intersects `candidate`.
///
/// `existing` must already be narrowed to one professional and one date.
/// `exclude_event_id` skips the event being updated.
pub fn find_conflict<'a, I>(
    candidate: &TimeRange,
    existing: I,
    exclude_event_id: Option<i64>,
) -> Option<&'a health_event::Model>
where
    I: IntoIterator<Item = &'a health_event::Model>,
{
    existing
        .into_iter()
        .filter(|event| Some(event.event_id) != exclude_event_id)
        .find(|event| {
            // Rows with an inverted range cannot come from this service; compare them as stored.
            let range = TimeRange {
                start: event.start_time,
                end: event.end_time,
            };
            candidate.overlaps(&range)
        })
}

/// Fails with `ScheduleError::Overlap` if `candidate` collides with any of `existing`.
pub fn ensure_no_overlap<'a, I>(
    candidate: &TimeRange,
    existing: I,
    exclude_event_id: Option<i64>,
) -> Result<(), ScheduleError>
where
    I: IntoIterator<Item = &'a health_event::Model>,
{
    match find_conflict(candidate, existing, exclude_event_id) {
        Some(conflict) => Err(ScheduleError::Overlap {
            event_id: conflict.event_id,
            title: conflict.title.clone(),
            start: format_time(conflict.start_time),
            end: format_time(conflict.end_time),
        }),
        None => Ok(()),
    }
}
