//! Per-API request dispatch.
//!
//! A call moves through `Received → Resolved → Decoded → Invoked → Encoded`
//! and ends in either a success value or a [`DispatchError`]:
//!
//! | Stage | Failure |
//! |-------|---------|
//! | resolve the path against the contract | [`DispatchError::UnknownRoute`] |
//! | parse JSON, check the input shape, deserialize | [`DispatchError::MalformedPayload`] |
//! | run the bound handler | [`DispatchError::Handler`] |
//! | serialize and check the output shape | [`DispatchError::Handler`] |
//!
//! The dispatcher holds no mutable state. Each call runs its handler in its
//! own task so that a panicking handler fails only that call.

use std::collections::BTreeMap;
use std::sync::Arc;

use remoting::{parse_route, ApiContract, ContractError, OperationDescriptor};
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::DispatchError;
use crate::handlers::{Binding, Handlers, InvokeError};

pub struct Dispatcher {
    contract: ApiContract,
    bindings: BTreeMap<String, Binding>,
}

impl Dispatcher {
    /// Pair a contract with its handlers.
    ///
    /// Every declared operation must have a handler whose argument and result
    /// shapes match the declaration, and every handler must belong to a
    /// declared operation. Anything else is a startup error.
    pub fn new(contract: ApiContract, handlers: Handlers) -> Result<Self, ContractError> {
        contract.validate()?;
        let api = contract.api_name().to_string();

        if let Some(name) = handlers.names().find(|name| !contract.contains(name)) {
            return Err(ContractError::UnboundOperation {
                api,
                operation: name.to_string(),
            });
        }
        let bindings = handlers.into_bindings();

        for op in contract.describe() {
            let binding = bindings
                .get(&op.name)
                .ok_or_else(|| ContractError::MissingHandler {
                    api: api.clone(),
                    operation: op.name.clone(),
                })?;
            if binding.input != op.input || binding.output != op.output {
                return Err(ContractError::BindingMismatch {
                    api: api.clone(),
                    operation: op.name.clone(),
                });
            }
        }

        Ok(Self { contract, bindings })
    }

    pub fn contract(&self) -> &ApiContract {
        &self.contract
    }

    pub fn api_name(&self) -> &str {
        self.contract.api_name()
    }

    /// Match `path` against this API's routes.
    pub fn resolve(&self, path: &str) -> Result<&OperationDescriptor, DispatchError> {
        parse_route(path)
            .filter(|(api, _)| *api == self.contract.api_name())
            .and_then(|(_, operation)| self.contract.operation(operation))
            .ok_or_else(|| DispatchError::UnknownRoute(path.to_string()))
    }

    /// Run one call end to end and return the encoded result.
    pub async fn dispatch(&self, path: &str, payload: &[u8]) -> Result<Value, DispatchError> {
        trace!(path, bytes = payload.len(), "received");
        let op = self.resolve(path)?;
        debug!(api = self.api_name(), operation = %op.name, "resolved");

        let input = decode(op, payload)?;
        trace!(operation = %op.name, "decoded");

        let binding = self
            .bindings
            .get(&op.name)
            .ok_or_else(|| DispatchError::Handler(format!("no handler for {}", op.name)))?;
        let handler = Arc::clone(&binding.handler);
        let outcome = tokio::spawn(async move { handler.invoke(input).await }).await;

        let output = match outcome {
            Ok(Ok(value)) => value,
            Ok(Err(InvokeError::Decode(e))) => {
                return Err(DispatchError::MalformedPayload {
                    operation: op.name.clone(),
                    reason: e.to_string(),
                })
            }
            Ok(Err(InvokeError::Handler(e))) => {
                warn!(operation = %op.name, error = %e, "handler reported failure");
                return Err(DispatchError::Handler(e.message().to_string()));
            }
            Ok(Err(InvokeError::Encode(e))) => {
                warn!(operation = %op.name, error = %e, "handler result could not be encoded");
                return Err(DispatchError::Handler(format!("failed to encode result: {e}")));
            }
            Err(join) => {
                warn!(operation = %op.name, error = %join, "handler task failed");
                return Err(DispatchError::Handler(format!(
                    "handler for {} failed unexpectedly",
                    op.name
                )));
            }
        };
        trace!(operation = %op.name, "invoked");

        if let Err(mismatch) = op.output.check(&output) {
            warn!(operation = %op.name, %mismatch, "handler result does not fit output shape");
            return Err(DispatchError::Handler(format!(
                "result of {} does not match its declared shape: {mismatch}",
                op.name
            )));
        }
        trace!(operation = %op.name, "encoded");
        Ok(output)
    }
}

/// Parse and shape-check a raw payload. An empty body is JSON `null`.
fn decode(op: &OperationDescriptor, payload: &[u8]) -> Result<Value, DispatchError> {
    let malformed = |reason: String| DispatchError::MalformedPayload {
        operation: op.name.clone(),
        reason,
    };

    let value = if payload.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(payload).map_err(|e| malformed(e.to_string()))?
    };
    op.input.check(&value).map_err(|e| malformed(e.to_string()))?;
    Ok(value)
}
