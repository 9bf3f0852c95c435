//! SMS gateway integrations for OTP challenges.

pub mod afro_message;

pub use afro_message::{AfroMessageClient, AfroMessageConfig};
