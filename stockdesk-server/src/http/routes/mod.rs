//! Route handlers organized by resource

pub mod common;
pub mod health;
pub mod investors;
pub mod tables;
pub mod holdings;
pub mod insights;
