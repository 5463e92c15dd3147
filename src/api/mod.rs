//! Task REST API.
//!
//! Exposes the [`crate::store::TaskStore`] over HTTP with JSON bodies.

mod server;

pub use server::{ApiServer, ServerHandle, build_router, start_server};
