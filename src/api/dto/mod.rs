//! Data Transfer Objects for REST request/response serialization.

pub mod event_dto;
pub mod health_dto;

pub use event_dto::*;
pub use health_dto::*;
