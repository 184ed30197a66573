//! Database layer - connection pool, schema, transactions and repositories
//!
//! # Design Principles
//!
//! - Connection pool (default 5 connections)
//! - One transaction per request via `db_task`
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod migrations;
pub mod pool;
pub mod repos;
pub mod tx;

pub use pool::{create_lazy_pool, create_pool};
pub use repos::*;
pub use tx::db_task;
