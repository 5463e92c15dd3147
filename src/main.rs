//! Kanban Board
//!
//! Serves the in-memory task API, or acts as a board client against a
//! running server.

use anyhow::{Context, Result, bail};
use clap::Parser;
use kanban_board::api::start_server;
use kanban_board::cli::{Cli, Command};
use kanban_board::client::{Board, HttpTaskApi};
use kanban_board::config::Config;
use kanban_board::format::format_board_markdown;
use kanban_board::logging::{self, LogTarget};
use kanban_board::store::TaskStore;
use kanban_board::types::Status;
use tracing::info;

/// Run the API until Ctrl-C.
async fn serve(config: Config) -> Result<()> {
    // One store per process, owned by the server for its lifetime
    let store = TaskStore::new();
    let handle = start_server(store, config.server.socket_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.server.socket_addr()))?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl-C, shutting down");
    handle.shutdown().await;
    Ok(())
}

/// Fetch and print the board.
async fn print_board(url: &str) -> Result<()> {
    let mut board = Board::new(HttpTaskApi::new(url));
    board.refresh().await?;
    print!("{}", format_board_markdown(&board.columns()));
    Ok(())
}

/// Drag `task_id` onto the `status` column.
async fn move_task(url: &str, task_id: &str, status: &str) -> Result<()> {
    let status: Status = status.parse()?;
    let mut board = Board::new(HttpTaskApi::new(url));
    board.refresh().await?;

    if board.task(task_id).is_none() {
        bail!("Task not found: {}", task_id);
    }

    board.begin_drag(task_id);
    match board.drop_on(status).await? {
        Some(task) => println!("Moved {} to {}", task.id, task.status),
        None => println!("{} is already in {}", task_id, status),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut config = Config::load(cli.config.as_deref())?;

    // CLI flags override file and environment
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Board { url } => print_board(&url).await,
        Command::Move {
            url,
            task_id,
            status,
        } => move_task(&url, &task_id, &status).await,
    }
}
