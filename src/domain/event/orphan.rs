use chrono::NaiveDate;

/// What happens to an event's files when the event is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileDisposition {
    /// Detach and flag as orphaned.
    #[default]
    Preserve,
    /// Delete the rows, then the stored bytes.
    Delete,
}

impl FileDisposition {
    pub fn from_delete_flag(delete_files: bool) -> Self {
        if delete_files {
            FileDisposition::Delete
        } else {
            FileDisposition::Preserve
        }
    }
}

/// Reason stored on files detached from a deleted event.
pub fn orphaned_reason(event_title: &str, deleted_on: NaiveDate) -> String {
    format!(
        "Evento \"{}\" excluído em {}",
        event_title,
        deleted_on.format("%d/%m/%Y")
    )
}
