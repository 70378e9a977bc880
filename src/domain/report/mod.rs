pub mod dto;
pub mod entity;
pub mod handler;
pub mod protocol;
pub mod service;
