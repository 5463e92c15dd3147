//! CLI command definitions for kanban-board
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Default server URL used by the board subcommands.
pub const DEFAULT_URL: &str = "http://127.0.0.1:3000";

/// Kanban board task API and board client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long, global = true)]
    pub host: Option<IpAddr>,

    /// Port to listen on (overrides config and PORT)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the task API server (default if no subcommand given)
    Serve,

    /// Print the board of a running server as markdown columns
    Board {
        /// Base URL of the task API
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },

    /// Move a task to another column, as a drag and drop would
    Move {
        /// Base URL of the task API
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,

        /// Task id
        task_id: String,

        /// Target column, e.g. "Fact-Check"
        status: String,
    },
}
