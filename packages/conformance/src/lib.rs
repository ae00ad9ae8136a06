//! Shared helpers for the remoting conformance test suite.
//!
//! Provides [`spawn_node`], which binds a `TcpListener` on an ephemeral port,
//! serves the `Todos` API backed by a [`MemoryStore`], and returns both the
//! local URL and the store so tests can seed or inspect data without going
//! through HTTP.

use std::sync::Arc;

use remoting_client::RemoteClient;
use remoting_server::ServerConfig;
use todo_node::{build_app, MemoryStore, TodoStore};

/// Start an ephemeral in-process server and return `(base_url, store)`.
///
/// The server runs in a background `tokio` task bound to an OS-assigned port
/// on `127.0.0.1`, e.g. `http://127.0.0.1:51234`.
///
/// # Panics
///
/// Panics if the listener cannot be bound or the app fails to build.
pub async fn spawn_node() -> (String, Arc<MemoryStore>) {
    spawn_node_with(MemoryStore::new()).await
}

/// Like [`spawn_node`], with a pre-populated store.
pub async fn spawn_node_with(store: MemoryStore) -> (String, Arc<MemoryStore>) {
    spawn_node_configured(store, ServerConfig::default()).await
}

/// Like [`spawn_node_with`], serving documentation from `docs_path`.
pub async fn spawn_node_with_docs(docs_path: &str) -> (String, Arc<MemoryStore>) {
    let config = ServerConfig {
        docs_path: docs_path.to_string(),
        ..ServerConfig::default()
    };
    spawn_node_configured(MemoryStore::new(), config).await
}

async fn spawn_node_configured(
    store: MemoryStore,
    config: ServerConfig,
) -> (String, Arc<MemoryStore>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("get local addr");
    let base_url = format!("http://{addr}");

    let store = Arc::new(store);
    let config = ServerConfig {
        bind_addr: addr,
        ..config
    };
    let app = build_app(Arc::clone(&store) as Arc<dyn TodoStore>, &config)
        .expect("build Todos app");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("conformance server error");
    });

    (base_url, store)
}

/// A typed `Todos` client pointed at `base_url`.
pub fn todo_client(base_url: &str) -> RemoteClient {
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("build HTTP client");
    RemoteClient::with_http(http, base_url, todo_api::contract().expect("Todos contract"))
}
