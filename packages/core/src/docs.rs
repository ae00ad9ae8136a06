//! Documentation model for an API contract.
//!
//! [`generate`] walks a contract and produces one [`DocSection`] per declared
//! operation, merging in whatever human-readable [`DocEntry`] the implementer
//! attached. Undocumented operations still appear, with an empty alias and
//! description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::contract::ApiContract;
use crate::operation::Operation;
use crate::route::build_route;
use crate::shape::Shape;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocsError {
    #[error("documentation supplied for {operation:?}, which API {api:?} does not declare")]
    UnknownOperation { api: String, operation: String },
}

/// Human-readable metadata for one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocEntry {
    pub alias: String,
    pub description: String,
    /// Sample arguments, shown verbatim by documentation viewers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

/// The generated document served by the documentation endpoint.
///
/// # Example
///
/// ```json
/// {
///   "api": "Todos",
///   "operations": [
///     {
///       "operation": "addTodo",
///       "route": "/api/Todos/addTodo",
///       "alias": "Add todo",
///       "description": "Appends an item to the list and returns it.",
///       "input": { "kind": "record", "name": "Item", "fields": [ ... ] },
///       "output": { "kind": "record", "name": "Item", "fields": [ ... ] }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub api: String,
    pub operations: Vec<DocSection>,
}

impl ApiDocument {
    pub fn section(&self, operation: &str) -> Option<&DocSection> {
        self.operations.iter().find(|s| s.operation == operation)
    }
}

/// One operation's entry in an [`ApiDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocSection {
    pub operation: String,
    pub route: String,
    pub alias: String,
    pub description: String,
    pub input: Shape,
    pub output: Shape,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
}

/// Produce the documentation for `contract`.
///
/// Every declared operation yields exactly one section, in declaration order.
/// An entry keyed by a name the contract does not declare is an error.
pub fn generate(
    contract: &ApiContract,
    entries: &BTreeMap<String, DocEntry>,
) -> Result<ApiDocument, DocsError> {
    if let Some(unknown) = entries.keys().find(|name| !contract.contains(name)) {
        return Err(DocsError::UnknownOperation {
            api: contract.api_name().to_string(),
            operation: unknown.clone(),
        });
    }

    let operations = contract
        .describe()
        .iter()
        .map(|op| {
            let entry = entries.get(&op.name).cloned().unwrap_or_default();
            DocSection {
                operation: op.name.clone(),
                // Contracts are validated before they get here; an invalid
                // identifier just produces an empty route.
                route: build_route(contract.api_name(), &op.name).unwrap_or_default(),
                alias: entry.alias,
                description: entry.description,
                input: op.input.clone(),
                output: op.output.clone(),
                examples: entry.examples,
            }
        })
        .collect();

    Ok(ApiDocument {
        api: contract.api_name().to_string(),
        operations,
    })
}

/// Typed builder for documentation entries.
///
/// ```rust,ignore
/// let docs = Documentation::new()
///     .route(ADD_TODO, "Add todo", "Appends an item and returns it.")
///     .example(ADD_TODO, json!({ "id": "x", "description": "buy milk" }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Documentation {
    entries: BTreeMap<String, DocEntry>,
}

impl Documentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<I, O>(
        mut self,
        op: Operation<I, O>,
        alias: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let entry = self.entries.entry(op.name().to_string()).or_default();
        entry.alias = alias.into();
        entry.description = description.into();
        self
    }

    pub fn example<I, O>(mut self, op: Operation<I, O>, argument: Value) -> Self {
        self.entries
            .entry(op.name().to_string())
            .or_default()
            .examples
            .push(argument);
        self
    }

    pub fn entries(&self) -> &BTreeMap<String, DocEntry> {
        &self.entries
    }

    pub fn generate(&self, contract: &ApiContract) -> Result<ApiDocument, DocsError> {
        generate(contract, &self.entries)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const GET_TODOS: Operation<(), Vec<String>> = Operation::new("getTodos");
    const ADD_TODO: Operation<String, String> = Operation::new("addTodo");
    const DELETE_TODO: Operation<String, Vec<String>> = Operation::new("deleteTodo");

    fn contract() -> ApiContract {
        ApiContract::builder("Todos")
            .operation(GET_TODOS)
            .operation(ADD_TODO)
            .operation(DELETE_TODO)
            .build()
            .unwrap()
    }

    #[test]
    fn undocumented_operation_gets_empty_section() {
        let docs = Documentation::new()
            .route(GET_TODOS, "Get todos", "Lists every item.")
            .route(DELETE_TODO, "Delete todo", "Removes an item by id.");
        let doc = docs.generate(&contract()).unwrap();

        assert_eq!(doc.operations.len(), 3);
        let add = doc.section("addTodo").unwrap();
        assert_eq!(add.alias, "");
        assert_eq!(add.description, "");
        assert_eq!(doc.section("getTodos").unwrap().alias, "Get todos");
    }

    #[test]
    fn sections_follow_declaration_order() {
        let doc = generate(&contract(), &BTreeMap::new()).unwrap();
        let names: Vec<_> = doc.operations.iter().map(|s| s.operation.as_str()).collect();
        assert_eq!(names, ["getTodos", "addTodo", "deleteTodo"]);
        assert_eq!(doc.operations[1].route, "/api/Todos/addTodo");
    }

    #[test]
    fn unknown_operation_entry_is_an_error() {
        let mut entries = BTreeMap::new();
        entries.insert("renameTodo".to_string(), DocEntry::default());
        let err = generate(&contract(), &entries).unwrap_err();
        assert_eq!(
            err,
            DocsError::UnknownOperation {
                api: "Todos".into(),
                operation: "renameTodo".into()
            }
        );
    }

    #[test]
    fn examples_are_carried_through() {
        let docs = Documentation::new().example(ADD_TODO, json!("buy milk"));
        let doc = docs.generate(&contract()).unwrap();
        assert_eq!(doc.section("addTodo").unwrap().examples, vec![json!("buy milk")]);
        assert_eq!(doc.section("addTodo").unwrap().alias, "");
    }
}
