//! # HTTP API Layer
//!
//! REST endpoints over the core services: OTP challenge flow, registration,
//! login, profile mutation and the authenticated read side. Handlers stay
//! thin; they decode DTOs, call one core service and map the result onto
//! the shared response envelope.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::AppState;
