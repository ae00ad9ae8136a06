//! API contracts and the registry that validates them.
//!
//! An [`ApiContract`] is the single declaration that drives everything else:
//! route derivation, server-side dispatch, the client proxy and the
//! documentation model all read the same ordered list of
//! [`OperationDescriptor`]s. Contracts are immutable once registered.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::operation::Operation;
use crate::route::{build_route, validate_identifier, RouteError};
use crate::shape::{Describe, Shape};

// ---------------------------------------------------------------------------
// ContractError
// ---------------------------------------------------------------------------

/// Errors detected while declaring, registering or binding a contract.
///
/// All of these are startup-time failures: a process must not start serving
/// with an inconsistent contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("operation {operation:?} is declared more than once in API {api:?}")]
    DuplicateOperation { api: String, operation: String },

    #[error("API {0:?} is already registered")]
    DuplicateApi(String),

    #[error(transparent)]
    InvalidIdentifier(#[from] RouteError),

    #[error("no handler bound for operation {operation:?} of API {api:?}")]
    MissingHandler { api: String, operation: String },

    #[error("handler bound for {operation:?}, which API {api:?} does not declare")]
    UnboundOperation { api: String, operation: String },

    #[error("handler for {operation:?} does not match the shapes API {api:?} declares")]
    BindingMismatch { api: String, operation: String },

    #[error("route {0} collides with a documentation path")]
    RouteCollision(String),
}

// ---------------------------------------------------------------------------
// OperationDescriptor
// ---------------------------------------------------------------------------

/// Declared name and input/output shape of one remote-callable function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub input: Shape,
    pub output: Shape,
}

impl OperationDescriptor {
    pub fn new(name: impl Into<String>, input: Shape, output: Shape) -> Self {
        Self {
            name: name.into(),
            input,
            output,
        }
    }
}

// ---------------------------------------------------------------------------
// ApiContract
// ---------------------------------------------------------------------------

/// The declared set of remote operations for one logical API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiContract {
    api_name: String,
    operations: Vec<OperationDescriptor>,
}

impl ApiContract {
    /// Build a contract from already-constructed descriptors.
    ///
    /// Nothing is checked here; see [`ApiContract::validate`].
    pub fn new(api_name: impl Into<String>, operations: Vec<OperationDescriptor>) -> Self {
        Self {
            api_name: api_name.into(),
            operations,
        }
    }

    /// Start a contract declared from typed [`Operation`] handles.
    pub fn builder(api_name: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            contract: Self::new(api_name, Vec::new()),
        }
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    /// Operation descriptors in declaration order.
    pub fn describe(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDescriptor> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operation(name).is_some()
    }

    /// Wire path of a declared operation, or `None` if it is not declared.
    pub fn route_of(&self, name: &str) -> Option<String> {
        self.operation(name)
            .and_then(|op| build_route(&self.api_name, &op.name).ok())
    }

    /// Check identifiers and operation-name uniqueness.
    pub fn validate(&self) -> Result<(), ContractError> {
        validate_identifier(&self.api_name)?;
        let mut seen = HashSet::new();
        for op in &self.operations {
            validate_identifier(&op.name)?;
            if !seen.insert(op.name.as_str()) {
                return Err(ContractError::DuplicateOperation {
                    api: self.api_name.clone(),
                    operation: op.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Fluent builder returned by [`ApiContract::builder`].
#[derive(Debug)]
pub struct ContractBuilder {
    contract: ApiContract,
}

impl ContractBuilder {
    pub fn operation<I: Describe, O: Describe>(mut self, op: Operation<I, O>) -> Self {
        self.contract.operations.push(op.descriptor());
        self
    }

    /// Finish the declaration, validating it.
    pub fn build(self) -> Result<ApiContract, ContractError> {
        self.contract.validate()?;
        Ok(self.contract)
    }
}

// ---------------------------------------------------------------------------
// ContractRegistry
// ---------------------------------------------------------------------------

/// Holds every validated contract known to a process, keyed by API name.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    contracts: BTreeMap<String, ApiContract>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store `contract`.
    ///
    /// Fails with [`ContractError::DuplicateOperation`] when two descriptors
    /// share a name and with [`ContractError::DuplicateApi`] when a contract
    /// with the same API name is already registered.
    pub fn register(&mut self, contract: ApiContract) -> Result<(), ContractError> {
        contract.validate()?;
        if self.contracts.contains_key(contract.api_name()) {
            return Err(ContractError::DuplicateApi(contract.api_name().to_string()));
        }
        self.contracts
            .insert(contract.api_name().to_string(), contract);
        Ok(())
    }

    /// Ordered operation descriptors of a registered API.
    pub fn describe(&self, api_name: &str) -> Option<&[OperationDescriptor]> {
        self.contracts.get(api_name).map(ApiContract::describe)
    }

    pub fn get(&self, api_name: &str) -> Option<&ApiContract> {
        self.contracts.get(api_name)
    }

    pub fn contracts(&self) -> impl Iterator<Item = &ApiContract> {
        self.contracts.values()
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_TODOS: Operation<(), Vec<String>> = Operation::new("getTodos");
    const ADD_TODO: Operation<String, String> = Operation::new("addTodo");

    #[test]
    fn builder_keeps_declaration_order() {
        let contract = ApiContract::builder("Todos")
            .operation(GET_TODOS)
            .operation(ADD_TODO)
            .build()
            .unwrap();
        let names: Vec<_> = contract.describe().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["getTodos", "addTodo"]);
        assert_eq!(contract.describe()[0].input, Shape::Unit);
        assert_eq!(contract.describe()[0].output, Shape::list(Shape::String));
    }

    #[test]
    fn duplicate_operation_is_rejected() {
        let err = ApiContract::builder("Todos")
            .operation(GET_TODOS)
            .operation(GET_TODOS)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ContractError::DuplicateOperation {
                api: "Todos".into(),
                operation: "getTodos".into()
            }
        );
    }

    #[test]
    fn registry_rejects_duplicate_operation() {
        let contract = ApiContract::new(
            "Todos",
            vec![GET_TODOS.descriptor(), GET_TODOS.descriptor()],
        );
        let mut registry = ContractRegistry::new();
        assert!(matches!(
            registry.register(contract),
            Err(ContractError::DuplicateOperation { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_rejects_duplicate_api() {
        let mut registry = ContractRegistry::new();
        registry
            .register(ApiContract::new("Todos", vec![GET_TODOS.descriptor()]))
            .unwrap();
        let err = registry
            .register(ApiContract::new("Todos", vec![ADD_TODO.descriptor()]))
            .unwrap_err();
        assert_eq!(err, ContractError::DuplicateApi("Todos".into()));
        assert_eq!(registry.describe("Todos").unwrap().len(), 1);
    }

    #[test]
    fn registry_lists_contracts_by_name() {
        let mut registry = ContractRegistry::new();
        registry.register(ApiContract::new("Users", vec![ADD_TODO.descriptor()])).unwrap();
        registry.register(ApiContract::new("Todos", vec![GET_TODOS.descriptor()])).unwrap();
        let names: Vec<_> = registry.contracts().map(ApiContract::api_name).collect();
        assert_eq!(names, ["Todos", "Users"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        let err = ApiContract::new("To/dos", vec![]).validate().unwrap_err();
        assert!(matches!(err, ContractError::InvalidIdentifier(_)));

        let bad = OperationDescriptor::new("get/todos", Shape::Unit, Shape::Unit);
        assert!(ApiContract::new("Todos", vec![bad]).validate().is_err());

        let mut registry = ContractRegistry::new();
        for api in [":Names", "{x}", "T\u{f6}dos"] {
            assert!(matches!(
                registry.register(ApiContract::new(api, vec![GET_TODOS.descriptor()])),
                Err(ContractError::InvalidIdentifier(RouteError::InvalidIdentifier(_)))
            ));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn route_of_declared_operation() {
        let contract = ApiContract::builder("Todos").operation(ADD_TODO).build().unwrap();
        assert_eq!(contract.route_of("addTodo").as_deref(), Some("/api/Todos/addTodo"));
        assert_eq!(contract.route_of("getTodos"), None);
    }
}
