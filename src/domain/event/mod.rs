pub mod dto;
pub mod entity;
pub mod handler;
pub mod orphan;
pub mod schedule;
pub mod service;
