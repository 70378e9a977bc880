use serde::{Deserialize, Serialize};

/// Typed body of a notification. Stored as JSON; the `type` tag is validated on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationPayload {
    #[serde(rename_all = "camelCase")]
    EventScheduled {
        event_id: i64,
        title: String,
        date: String,
        start_time: String,
    },
    #[serde(rename_all = "camelCase")]
    ReportReceived {
        report_id: i64,
        protocol: String,
        title: String,
    },
}

impl NotificationPayload {
    pub fn message(&self) -> String {
        match self {
            NotificationPayload::EventScheduled {
                title,
                date,
                start_time,
                ..
            } => format!("Evento \"{}\" agendado para {} às {}.", title, date, start_time),
            NotificationPayload::ReportReceived {
                protocol, title, ..
            } => format!("Novo laudo recebido: {} (protocolo {}).", title, protocol),
        }
    }

    pub fn event_id(&self) -> Option<i64> {
        match self {
            NotificationPayload::EventScheduled { event_id, .. } => Some(*event_id),
            NotificationPayload::ReportReceived { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_should_serialize_with_type_tag_and_camel_case_fields() {
        let payload = NotificationPayload::ReportReceived {
            report_id: 9,
            protocol: "OS-2025-000009".to_string(),
            title: "Hemograma".to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["type"], "REPORT_RECEIVED");
        assert_eq!(json["reportId"], 9);
        assert_eq!(json["protocol"], "OS-2025-000009");
    }

    #[test]
    fn unknown_type_should_fail_to_deserialize() {
        let json = serde_json::json!({ "type": "SOMETHING_ELSE", "eventId": 1 });

        assert!(serde_json::from_value::<NotificationPayload>(json).is_err());
    }

    #[test]
    fn event_payload_should_expose_event_id_and_message() {
        let payload = NotificationPayload::EventScheduled {
            event_id: 3,
            title: "Consulta cardiologista".to_string(),
            date: "2025-10-27".to_string(),
            start_time: "09:00".to_string(),
        };

        assert_eq!(payload.event_id(), Some(3));
        assert!(payload.message().contains("Consulta cardiologista"));
    }
}
