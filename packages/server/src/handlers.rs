//! Handler bindings: the concrete functions a server supplies for each
//! declared operation.
//!
//! Handlers are plain async closures keyed by an [`Operation`] handle, so the
//! argument and result types are checked by the compiler against the same
//! declaration the client uses:
//!
//! ```rust,ignore
//! let handlers = Handlers::new()
//!     .bind(GET_TODOS, move |()| {
//!         let store = Arc::clone(&store);
//!         async move { Ok::<_, HandlerError>(store.list()) }
//!     });
//! ```
//!
//! Internally each closure is erased behind the [`Invoke`] trait, which takes
//! and returns `serde_json::Value`.

use std::collections::BTreeMap;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use remoting::{Describe, Operation, Shape};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::HandlerError;

/// Failure of one erased invocation, by stage.
#[derive(Debug)]
pub enum InvokeError {
    /// The argument could not be deserialized into the handler's input type.
    Decode(serde_json::Error),
    /// The handler itself reported a failure.
    Handler(HandlerError),
    /// The handler's result could not be serialized.
    Encode(serde_json::Error),
}

/// A type-erased handler.
#[async_trait]
pub trait Invoke: Send + Sync + 'static {
    async fn invoke(&self, input: Value) -> Result<Value, InvokeError>;
}

struct TypedHandler<I, O, F> {
    f: F,
    _types: PhantomData<fn(I) -> O>,
}

#[async_trait]
impl<I, O, F, Fut> Invoke for TypedHandler<I, O, F>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
{
    async fn invoke(&self, input: Value) -> Result<Value, InvokeError> {
        let argument: I = serde_json::from_value(input).map_err(InvokeError::Decode)?;
        let output = (self.f)(argument).await.map_err(InvokeError::Handler)?;
        serde_json::to_value(output).map_err(InvokeError::Encode)
    }
}

/// One bound handler together with the shapes its Rust types describe.
#[derive(Clone)]
pub struct Binding {
    pub input: Shape,
    pub output: Shape,
    pub handler: Arc<dyn Invoke>,
}

/// The set of handler bindings for one API, keyed by operation name.
#[derive(Clone, Default)]
pub struct Handlers {
    bindings: BTreeMap<String, Binding>,
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `f` as the implementation of `op`. Binding the same operation
    /// twice replaces the earlier handler.
    pub fn bind<I, O, F, Fut>(mut self, op: Operation<I, O>, f: F) -> Self
    where
        I: Describe + DeserializeOwned + Send + 'static,
        O: Describe + Serialize + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    {
        let binding = Binding {
            input: I::shape(),
            output: O::shape(),
            handler: Arc::new(TypedHandler {
                f,
                _types: PhantomData,
            }),
        };
        self.bindings.insert(op.name().to_string(), binding);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub(crate) fn into_bindings(self) -> BTreeMap<String, Binding> {
        self.bindings
    }
}
