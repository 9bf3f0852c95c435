//! Cross-cutting request concerns.

pub mod auth;
pub mod cors;
