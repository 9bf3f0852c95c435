//! Redis-backed caching: connection management and the verification token
//! store.

pub mod redis_client;
pub mod token_store;

pub use redis_client::RedisClient;
pub use token_store::RedisTokenStore;

pub use sd_shared::config::cache::CacheConfig;
