//! Server half of the remoting system.
//!
//! Binds handler functions to a declared [`ApiContract`](remoting::ApiContract),
//! dispatches `POST /api/{api}/{operation}` calls to them, and serves the
//! generated documentation.
//!
//! ```rust,ignore
//! let service = Service::new(contract, handlers)?.with_docs(docs);
//! let app = build_router(vec![service], &ServerConfig::from_env()?)?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod router;

pub use config::{ConfigError, ServerConfig};
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, HandlerError, StartupError};
pub use handlers::{Handlers, Invoke, InvokeError};
pub use router::{build_router, AppState, Service};
