//! Cache module for Redis-backed persistence
//!
//! Provides a Redis client with connection retry and the handful of key
//! operations the session store needs.

pub mod redis_client;


pub use redis_client::RedisClient;

// Re-export commonly used types
pub use otp_shared::config::CacheConfig;
