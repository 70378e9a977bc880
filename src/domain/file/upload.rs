//! Upload gatekeeping: size ceiling and MIME allow-lists.

use crate::config::UploadConfig;
use crate::utils::error::AppError;

pub const IMAGE_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
pub const ATTACHMENT_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadKind {
    /// General uploads (avatars, pictures)
    Image,
    /// Files attached to a health event; PDFs allowed
    #[default]
    Attachment,
}

impl UploadKind {
    pub fn allowed_mime_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Image => IMAGE_MIME_TYPES,
            UploadKind::Attachment => ATTACHMENT_MIME_TYPES,
        }
    }
}

impl std::str::FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" => Ok(UploadKind::Image),
            "attachment" => Ok(UploadKind::Attachment),
            other => Err(format!("Tipo de envio desconhecido: {}", other)),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("Arquivo vazio.")]
    Empty,
    #[error("Arquivo muito grande ({size} bytes). O limite é de {max} bytes.")]
    TooLarge { size: u64, max: u64 },
    #[error("Tipo de arquivo não permitido: {mime}. Tipos aceitos: {allowed}.")]
    UnsupportedType { mime: String, allowed: String },
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            other => AppError::ValidationError(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    max_bytes: u64,
}

impl UploadValidator {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(config.max_bytes)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Rejects empty files, files with `size >= max_bytes`, and MIME types outside
    /// the allow-list for `kind`.
    pub fn validate(&self, size: u64, mime_type: &str, kind: UploadKind) -> Result<(), UploadError> {
        if size == 0 {
            return Err(UploadError::Empty);
        }
        if size >= self.max_bytes {
            return Err(UploadError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }

        let essence = essence(mime_type);
        let allowed = kind.allowed_mime_types();
        if !allowed.contains(&essence.as_str()) {
            return Err(UploadError::UnsupportedType {
                mime: essence,
                allowed: allowed.join(", "),
            });
        }

        Ok(())
    }
}

/// `Image/PNG; charset=binary` -> `image/png`
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Cumulative byte counter for accepted uploads.
pub fn record_stored_bytes(bytes: u64) {
    metrics::counter!("upload_bytes_total").increment(bytes);
}

pub fn record_rejection(reason: &'static str) {
    metrics::counter!("upload_rejected_total", "reason" => reason).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 5 * 1024 * 1024;

    #[test]
    fn size_equal_to_max_should_be_rejected() {
        let validator = UploadValidator::new(MAX);

        let result = validator.validate(MAX, "image/png", UploadKind::Image);

        assert_eq!(result, Err(UploadError::TooLarge { size: MAX, max: MAX }));
    }

    #[test]
    fn size_one_byte_under_max_should_be_accepted() {
        let validator = UploadValidator::new(MAX);

        assert!(validator
            .validate(MAX - 1, "image/png", UploadKind::Image)
            .is_ok());
    }

    #[test]
    fn empty_file_should_be_rejected() {
        let validator = UploadValidator::new(MAX);

        assert_eq!(
            validator.validate(0, "image/png", UploadKind::Image),
            Err(UploadError::Empty)
        );
    }

    #[test]
    fn all_general_image_types_should_be_accepted() {
        let validator = UploadValidator::new(MAX);

        for mime in ["image/jpeg", "image/png", "image/gif", "image/webp"] {
            assert!(validator.validate(10, mime, UploadKind::Image).is_ok(), "{}", mime);
        }
    }

    #[test]
    fn pdf_should_only_be_accepted_as_attachment() {
        let validator = UploadValidator::new(MAX);

        assert!(matches!(
            validator.validate(10, "application/pdf", UploadKind::Image),
            Err(UploadError::UnsupportedType { .. })
        ));
        assert!(validator
            .validate(10, "application/pdf", UploadKind::Attachment)
            .is_ok());
    }

    #[test]
    fn mime_parameters_and_case_should_be_ignored() {
        let validator = UploadValidator::new(MAX);

        assert!(validator
            .validate(10, "Image/PNG; charset=binary", UploadKind::Image)
            .is_ok());
    }

    #[test]
    fn executable_should_be_rejected_with_descriptive_message() {
        let validator = UploadValidator::new(MAX);

        let err = validator
            .validate(10, "application/x-msdownload", UploadKind::Attachment)
            .unwrap_err();

        assert!(err.to_string().contains("application/x-msdownload"));
        assert!(err.to_string().contains("image/png"));
    }

    #[test]
    fn too_large_should_map_to_payload_too_large() {
        let err: AppError = UploadError::TooLarge { size: 10, max: 5 }.into();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn kind_should_parse_from_form_value() {
        assert_eq!("image".parse::<UploadKind>().unwrap(), UploadKind::Image);
        assert_eq!(
            " Attachment ".parse::<UploadKind>().unwrap(),
            UploadKind::Attachment
        );
        assert!("video".parse::<UploadKind>().is_err());
    }
}
