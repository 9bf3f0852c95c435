//! Identity repository: transactional persistence of users and role profiles.

mod memory;
mod r#trait;


pub use memory::{InMemoryIdentityRepository, InMemoryTx};
pub use r#trait::{IdentityRepository, UniquenessProbe};
