//! taskscope library
//!
//! Scoped task retrieval over SQLite: filtering, sorting and pagination
//! across a company and its owning account, plus multi-record archive and
//! soft-delete lifecycles. Exported for the CLI and integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod lifecycle;
pub mod logging;
pub mod query;
pub mod store;
pub mod types;
