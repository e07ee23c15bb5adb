//! stockdesk-server: HTTP API over the investor, company and stock
//! transaction schema.
//!
//! - `db`: connection pool manager, schema bootstrap, repositories
//! - `models`: request payloads and rows, validated at construction
//! - `http`: axum router, error mapping, server lifecycle

pub mod db;
pub mod http;
pub mod models;

pub use db::{Database, DbError, PoolConfig};
pub use http::{build_router, run_server, ServerConfig, ServerError};
