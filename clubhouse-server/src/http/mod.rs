//! HTTP layer
//!
//! Axum server with:
//! - Server-rendered pages behind a template seam
//! - Flash messages and redirects for every expected exit
//! - Multipart image uploads served back from disk
//! - Request tracing and graceful shutdown

pub mod error;
pub mod flash;
pub mod render;
pub mod routes;
pub mod server;
pub mod upload;

pub use error::{Bounce, PageError};
pub use server::{build_router, run_server, ServerError};
