pub mod event;
pub mod file;
pub mod health;
pub mod notification;
pub mod professional;
pub mod report;
pub mod user;
