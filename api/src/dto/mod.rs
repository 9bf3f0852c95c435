//! Request and response DTOs for the REST surface.

pub mod auth;
pub mod identity;

pub use auth::*;
pub use identity::*;
