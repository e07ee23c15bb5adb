//! Database layer - connection pool, schema bootstrap and repositories

pub mod pool;
pub mod repos;
pub mod schema;

pub use pool::{Database, PoolConfig};
pub use repos::*;
