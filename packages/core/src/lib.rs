//! Contract-first remote procedure calls over HTTP.
//!
//! This crate holds the pure, I/O-free half of the system: the declaration
//! of an API, the routes derived from it, the documentation model and the
//! error envelope that travels on the wire. The `remoting-server` and
//! `remoting-client` crates are both built against the same
//! [`ApiContract`], which keeps operation names, argument shapes and paths
//! in lock-step on both sides.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`shape`] | Explicit [`Shape`] descriptors and the [`Describe`] trait |
//! | [`operation`] | Typed [`Operation`] handles |
//! | [`contract`] | [`ApiContract`], [`ContractRegistry`], [`ContractError`] |
//! | [`route`] | [`build_route`] / [`parse_route`] |
//! | [`docs`] | [`Documentation`] entries and the generated [`ApiDocument`] |
//! | [`wire`] | [`ErrorResponse`] envelope and error codes |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use remoting::{ApiContract, Operation};
//!
//! pub const GET_TODOS: Operation<(), Vec<Item>> = Operation::new("getTodos");
//! pub const ADD_TODO: Operation<Item, Item> = Operation::new("addTodo");
//!
//! let contract = ApiContract::builder("Todos")
//!     .operation(GET_TODOS)
//!     .operation(ADD_TODO)
//!     .build()?;
//!
//! assert_eq!(contract.route_of("addTodo").unwrap(), "/api/Todos/addTodo");
//! ```

pub mod contract;
pub mod docs;
pub mod operation;
pub mod route;
pub mod shape;
pub mod wire;

pub use contract::{ApiContract, ContractBuilder, ContractError, ContractRegistry, OperationDescriptor};
pub use docs::{generate, ApiDocument, DocEntry, DocSection, DocsError, Documentation};
pub use operation::Operation;
pub use route::{build_route, parse_route, validate_identifier, validate_path, RouteError};
pub use shape::{Describe, Field, Shape, ShapeMismatch};
pub use wire::{codes, ErrorResponse};
