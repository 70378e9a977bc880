use axum::{
    extract::multipart::MultipartError,
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};
use validator::ValidationErrors;

use super::response::ErrorResponse;

/// Message returned for every 500. The underlying cause is only logged.
pub const INTERNAL_ERROR_MESSAGE: &str = "Erro interno do servidor. Tente novamente mais tarde.";

/// Application-wide error type, translated to status + JSON envelope at the handler boundary.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    ValidationError(String),
    JsonParseFailed(String),
    /// Scheduling conflict for the same professional and date.
    Overlap(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    RateLimited {
        message: String,
        retry_after_secs: u64,
    },
    InternalError(String),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::ValidationError(msg) => msg.clone(),
            AppError::JsonParseFailed(msg) => format!("Formato de requisição inválido: {}", msg),
            AppError::Overlap(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::RateLimited { message, .. } => message.clone(),
            AppError::InternalError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn error_code(&self) -> String {
        match self {
            AppError::BadRequest(_) => "COMMON400",
            AppError::ValidationError(_) => "COMMON400",
            AppError::JsonParseFailed(_) => "COMMON400",
            AppError::Overlap(_) => "EVENT_OVERLAP",
            AppError::Unauthorized(_) => "AUTH401",
            AppError::Forbidden(_) => "COMMON403",
            AppError::NotFound(_) => "COMMON404",
            AppError::Conflict(_) => "COMMON409",
            AppError::PayloadTooLarge(_) => "FILE413",
            AppError::RateLimited { .. } => "RATE_LIMIT",
            AppError::InternalError(_) => "COMMON500",
        }
        .to_string()
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::JsonParseFailed(_) => StatusCode::BAD_REQUEST,
            AppError::Overlap(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InternalError(detail) => write!(f, "internal error: {}", detail),
            other => write!(f, "[{}] {}", other.error_code(), other.message()),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.message();

        match &self {
            AppError::InternalError(detail) => {
                error!(detail = %detail, "Internal Server Error");
            }
            AppError::RateLimited {
                retry_after_secs, ..
            } => {
                warn!(retry_after_secs = retry_after_secs, "Rate limit exceeded");
            }
            _ => {
                warn!("Error [{}]: {}", error_code, message);
            }
        }

        let retry_after = match &self {
            AppError::RateLimited {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            _ => None,
        };

        let error_response = ErrorResponse::new(error_code, message);
        let mut response = (status, Json(error_response)).into_response();

        if let Some(secs) = retry_after {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }

        response
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonParseFailed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(format!("Parâmetros de consulta inválidos: {}", rejection.body_text()))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        // Surface the first field message as-is
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Dados de entrada inválidos.".to_string());
        AppError::ValidationError(message)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Arquivo excede o tamanho máximo permitido.".to_string())
        } else {
            AppError::BadRequest(format!("Falha ao ler o formulário multipart: {}", err.body_text()))
        }
    }
}
