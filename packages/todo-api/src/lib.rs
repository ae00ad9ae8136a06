//! The `Todos` API contract, shared by the `todo-node` server and every client.
//!
//! # Operations
//!
//! | Path | Type | Behaviour |
//! |------|------|-----------|
//! | `/api/Todos/getTodos` | `() → [Item]` | every item, in insertion order |
//! | `/api/Todos/addTodo` | [`Item`] `→` [`Item`] | appends and returns the item |
//! | `/api/Todos/deleteTodo` | `id → [Item]` | removes the item, returns the remaining list |
//! | `/api/Todos/toggleCompleted` | `id → Item` | flips `completed`, returns the item |
//! | `/api/Todos/clearCompleted` | `() → [Item]` | drops completed items, returns the rest |

pub mod item;

use remoting::{ApiContract, ContractError, Documentation, Operation};
use serde_json::json;

pub use item::Item;

pub const API_NAME: &str = "Todos";

pub const GET_TODOS: Operation<(), Vec<Item>> = Operation::new("getTodos");
pub const ADD_TODO: Operation<Item, Item> = Operation::new("addTodo");
pub const DELETE_TODO: Operation<String, Vec<Item>> = Operation::new("deleteTodo");
pub const TOGGLE_COMPLETED: Operation<String, Item> = Operation::new("toggleCompleted");
pub const CLEAR_COMPLETED: Operation<(), Vec<Item>> = Operation::new("clearCompleted");

/// The declared `Todos` contract.
pub fn contract() -> Result<ApiContract, ContractError> {
    ApiContract::builder(API_NAME)
        .operation(GET_TODOS)
        .operation(ADD_TODO)
        .operation(DELETE_TODO)
        .operation(TOGGLE_COMPLETED)
        .operation(CLEAR_COMPLETED)
        .build()
}

/// Human-readable documentation for the `Todos` operations.
pub fn documentation() -> Documentation {
    Documentation::new()
        .route(GET_TODOS, "Get todos", "Returns every item in insertion order.")
        .route(
            ADD_TODO,
            "Add todo",
            "Appends an item to the list and returns it unchanged. \
             Fails if the id is taken or the description is empty.",
        )
        .example(ADD_TODO, json!({ "id": "x", "description": "buy milk" }))
        .route(
            DELETE_TODO,
            "Delete todo",
            "Removes the item with the given id and returns the remaining items. \
             Fails if no such item exists.",
        )
        .example(DELETE_TODO, json!("x"))
        .route(
            TOGGLE_COMPLETED,
            "Toggle completed",
            "Flips the completed flag of one item and returns it.",
        )
}
