//! Kanban Board Library
//!
//! This module exports the core components for testing and integration.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod types;
