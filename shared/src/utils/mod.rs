//! Utility functions shared across server modules

pub mod phone;
pub mod validation;
