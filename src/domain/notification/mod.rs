pub mod dto;
pub mod entity;
pub mod handler;
pub mod payload;
pub mod service;

pub use payload::NotificationPayload;
pub use service::NotificationService;
