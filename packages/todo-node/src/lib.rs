//! Public surface for the `todo-node` crate.
//!
//! Exposes the store and the service builder so that external crates (e.g.
//! the conformance suite) can spin up an in-process server without spawning
//! a subprocess.

pub mod service;
pub mod storage;

use std::sync::Arc;

use axum::Router;
use remoting_server::{build_router, ServerConfig, StartupError};

pub use service::todo_service;
pub use storage::{memory::MemoryStore, StoreError, TodoStore};

/// Build the complete application router around `store`.
pub fn build_app(store: Arc<dyn TodoStore>, config: &ServerConfig) -> Result<Router, StartupError> {
    let service = todo_service(store)?;
    build_router(vec![service], config)
}
