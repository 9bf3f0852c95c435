//! MySQL persistence: connection pooling and the identity repository.

pub mod connection;
pub mod mysql;

pub use connection::DatabasePool;
pub use mysql::MySqlIdentityRepository;
