//! Client proxy for contract-first remoting APIs.
//!
//! [`RemoteClient`] is built from the same [`ApiContract`] the server serves.
//! For each declared [`Operation`] it hands out a [`Callable`] whose
//! [`invoke`](Callable::invoke) serialises the argument, issues one
//! `POST /api/{api}/{operation}` and deserialises the result.
//!
//! ```rust,ignore
//! let client = RemoteClient::new("http://127.0.0.1:3000", todo_api::contract()?);
//! let add = client.proxy(ADD_TODO)?;
//! let item = add.invoke(Item::new("x", "buy milk")).await?;
//! ```
//!
//! The proxy performs no retries and sets no timeout of its own; configure
//! those on the [`reqwest::Client`] passed to [`RemoteClient::with_http`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use remoting::{
    route::expand_docs_path, ApiContract, ApiDocument, Describe, ErrorResponse, Operation,
};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::debug;

/// Default documentation path template, matching the server default.
pub const DEFAULT_DOCS_PATH: &str = "/api/{apiName}/docs";

// ---------------------------------------------------------------------------
// ClientError
// ---------------------------------------------------------------------------

/// Errors surfaced to the caller of a remote operation.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status and an error envelope.
    #[error("remote error ({status}, {code}): {message}")]
    Remote {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body did not match the operation's result type.
    #[error("could not decode the result of {operation}: {source}")]
    Decode {
        operation: String,
        source: serde_json::Error,
    },

    /// The argument could not be serialised.
    #[error("could not encode the argument of {operation}: {source}")]
    Encode {
        operation: String,
        source: serde_json::Error,
    },

    /// The operation handle is not declared by the client's contract.
    #[error("operation {operation:?} is not declared by API {api:?}")]
    UnknownOperation { api: String, operation: String },

    /// The handle's argument or result type differs from the declaration.
    #[error("operation {operation:?} does not match the shapes API {api:?} declares")]
    Mismatch { api: String, operation: String },
}

impl ClientError {
    /// The server-supplied message, for [`ClientError::Remote`].
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            ClientError::Remote { message, .. } => Some(message),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RemoteClient
// ---------------------------------------------------------------------------

/// Caller-side view of one remote API.
///
/// Cheap to clone: the HTTP client and the contract are both shared.
#[derive(Clone)]
pub struct RemoteClient {
    http: Client,
    base_url: String,
    docs_path: String,
    contract: Arc<ApiContract>,
}

impl RemoteClient {
    /// Create a client for `contract` served at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>, contract: ApiContract) -> Self {
        Self::with_http(Client::new(), base_url, contract)
    }

    /// Like [`RemoteClient::new`], with a pre-configured `reqwest::Client`
    /// (timeouts, proxies, TLS).
    pub fn with_http(http: Client, base_url: impl Into<String>, contract: ApiContract) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            docs_path: DEFAULT_DOCS_PATH.to_string(),
            contract: Arc::new(contract),
        }
    }

    /// Override the documentation path template used by [`RemoteClient::fetch_docs`].
    pub fn with_docs_path(mut self, template: impl Into<String>) -> Self {
        self.docs_path = template.into();
        self
    }

    pub fn contract(&self) -> &ApiContract {
        &self.contract
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A typed callable for `op`.
    ///
    /// Fails if the contract does not declare `op`, or declares it with
    /// different argument or result shapes.
    pub fn proxy<I, O>(&self, op: Operation<I, O>) -> Result<Callable<I, O>, ClientError>
    where
        I: Describe,
        O: Describe,
    {
        let api = self.contract.api_name();
        let declared = self
            .contract
            .operation(op.name())
            .ok_or_else(|| ClientError::UnknownOperation {
                api: api.to_string(),
                operation: op.name().to_string(),
            })?;
        if *declared != op.descriptor() {
            return Err(ClientError::Mismatch {
                api: api.to_string(),
                operation: op.name().to_string(),
            });
        }
        let route = self.route(op.name())?;
        Ok(Callable {
            client: self.clone(),
            operation: op.name(),
            route,
            sends_body: !declared.input.is_unit(),
            _types: PhantomData,
        })
    }

    /// One-shot call: `proxy(op)?.invoke(argument)`.
    pub async fn call<I, O>(&self, op: Operation<I, O>, argument: I) -> Result<O, ClientError>
    where
        I: Describe + Serialize,
        O: Describe + DeserializeOwned,
    {
        self.proxy(op)?.invoke(argument).await
    }

    /// Untyped call by operation name. `Value::Null` sends an empty body.
    pub async fn call_raw(&self, operation: &str, argument: Value) -> Result<Value, ClientError> {
        let route = self.route(operation)?;
        let body = match argument {
            Value::Null => None,
            other => Some(serde_json::to_vec(&other).map_err(|source| ClientError::Encode {
                operation: operation.to_string(),
                source,
            })?),
        };
        let bytes = self.post(&route, body).await?;
        decode(operation, &bytes)
    }

    /// Read the API's documentation document.
    pub async fn fetch_docs(&self) -> Result<ApiDocument, ClientError> {
        let path = expand_docs_path(&self.docs_path, self.contract.api_name());
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "fetching documentation");
        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(remote_error(status, &bytes));
        }
        decode("docs", &bytes)
    }

    fn route(&self, operation: &str) -> Result<String, ClientError> {
        self.contract
            .route_of(operation)
            .ok_or_else(|| ClientError::UnknownOperation {
                api: self.contract.api_name().to_string(),
                operation: operation.to_string(),
            })
    }

    async fn post(&self, route: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>, ClientError> {
        let url = format!("{}{}", self.base_url, route);
        debug!(%url, "calling remote operation");

        let mut req = self.http.post(&url);
        if let Some(body) = body {
            req = req.header(CONTENT_TYPE, "application/json").body(body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            return Err(remote_error(status, &bytes));
        }
        Ok(bytes.to_vec())
    }
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("base_url", &self.base_url)
            .field("api", &self.contract.api_name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Callable
// ---------------------------------------------------------------------------

/// The caller-side function for one declared operation.
pub struct Callable<I, O> {
    client: RemoteClient,
    operation: &'static str,
    route: String,
    sends_body: bool,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> Callable<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Call the remote operation once.
    ///
    /// Resolves exactly once, to the decoded result or a [`ClientError`].
    pub async fn invoke(&self, argument: I) -> Result<O, ClientError> {
        let body = if self.sends_body {
            Some(
                serde_json::to_vec(&argument).map_err(|source| ClientError::Encode {
                    operation: self.operation.to_string(),
                    source,
                })?,
            )
        } else {
            None
        };
        let bytes = self.client.post(&self.route, body).await?;
        decode(self.operation, &bytes)
    }

    pub fn route(&self) -> &str {
        &self.route
    }
}

impl<I, O> Clone for Callable<I, O> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            operation: self.operation,
            route: self.route.clone(),
            sends_body: self.sends_body,
            _types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for Callable<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("route", &self.route).finish()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn decode<T: DeserializeOwned>(operation: &str, bytes: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(bytes).map_err(|source| ClientError::Decode {
        operation: operation.to_string(),
        source,
    })
}

/// Turn a non-2xx response into [`ClientError::Remote`]. Bodies that are not
/// an error envelope (e.g. from a proxy in between) are passed through as text.
fn remote_error(status: StatusCode, bytes: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorResponse>(bytes) {
        Ok(envelope) => ClientError::Remote {
            status: status.as_u16(),
            code: envelope.code,
            message: envelope.error,
        },
        Err(_) => ClientError::Remote {
            status: status.as_u16(),
            code: String::new(),
            message: String::from_utf8_lossy(bytes).into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_NAMES: Operation<(), Vec<String>> = Operation::new("getNames");
    const ADD_NAME: Operation<String, String> = Operation::new("addName");

    fn client(base: &str) -> RemoteClient {
        let contract = ApiContract::builder("Names")
            .operation(GET_NAMES)
            .operation(ADD_NAME)
            .build()
            .unwrap();
        RemoteClient::new(base, contract)
    }

    #[test]
    fn proxy_routes_follow_the_contract() {
        let c = client("http://localhost:3000/");
        assert_eq!(c.base_url(), "http://localhost:3000");
        assert_eq!(c.proxy(GET_NAMES).unwrap().route(), "/api/Names/getNames");
        assert_eq!(c.proxy(ADD_NAME).unwrap().route(), "/api/Names/addName");
    }

    #[test]
    fn proxy_rejects_undeclared_operation() {
        const RENAME: Operation<String, String> = Operation::new("renameName");
        let err = client("http://localhost").proxy(RENAME).unwrap_err();
        assert!(matches!(err, ClientError::UnknownOperation { .. }));
    }

    #[test]
    fn proxy_rejects_mismatched_types() {
        const ADD_NUMBER: Operation<u32, String> = Operation::new("addName");
        let err = client("http://localhost").proxy(ADD_NUMBER).unwrap_err();
        assert!(matches!(err, ClientError::Mismatch { .. }));
    }

    #[test]
    fn remote_error_reads_envelope() {
        let body = br#"{"error":"item x not found","code":"handler_error"}"#;
        let err = remote_error(StatusCode::INTERNAL_SERVER_ERROR, body);
        assert_eq!(err.remote_message(), Some("item x not found"));
        match err {
            ClientError::Remote { status, code, .. } => {
                assert_eq!(status, 500);
                assert_eq!(code, "handler_error");
            }
            other => panic!("expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn remote_error_passes_through_plain_text() {
        let err = remote_error(StatusCode::BAD_GATEWAY, b"upstream down");
        assert_eq!(err.remote_message(), Some("upstream down"));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}"))
            .call(GET_NAMES, ())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
    }
}
