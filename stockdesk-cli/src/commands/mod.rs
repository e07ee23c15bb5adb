//! Command implementations for the stockdesk CLI

pub mod check;
pub mod schema;
pub mod serve;

pub use check::run_check_db;
pub use schema::run_init_schema;
pub use serve::run_serve;
