//! `todo-node`: demo server for the `Todos` remoting API.
//!
//! # Quick start
//!
//! ```sh
//! # Default port, in-memory list:
//! todo-node
//!
//! # Custom bind address and docs path:
//! REMOTING_BIND=127.0.0.1:8080 REMOTING_DOCS_PATH=/docs/{apiName} todo-node
//! ```
//!
//! # Environment variables
//!
//! See [`remoting_server::ServerConfig::from_env`] for the full list.

use std::process::ExitCode;
use std::sync::Arc;

use remoting_server::ServerConfig;
use todo_node::{build_app, MemoryStore, TodoStore};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todo_node=info,remoting_server=debug,tower_http=debug".into()
            }),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    tracing::info!("storage: in-memory (data will not survive restart)");
    let store: Arc<dyn TodoStore> = Arc::new(MemoryStore::new());
    let app = build_app(store, &config)?;

    tracing::info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;

    axum::serve(listener, app).await?;
    Ok(())
}
