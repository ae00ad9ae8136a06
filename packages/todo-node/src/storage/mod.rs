//! Storage abstraction for the todo list.
//!
//! The [`TodoStore`] trait is the only thing the `Todos` handlers see.
//! [`MemoryStore`] is the sole implementation; data is lost on restart.
//!
//! [`MemoryStore`]: memory::MemoryStore

pub mod memory;

use async_trait::async_trait;
use remoting_server::HandlerError;
use todo_api::Item;

/// Errors that store operations can return.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No item with this id exists.
    #[error("item {0} not found")]
    NotFound(String),

    /// An item with this id already exists.
    #[error("item {0} already exists")]
    Duplicate(String),

    /// The item failed validation.
    #[error("invalid item: {0}")]
    Invalid(String),
}

impl From<StoreError> for HandlerError {
    fn from(e: StoreError) -> Self {
        HandlerError::new(e.to_string())
    }
}

/// The persistence contract behind the `Todos` API.
///
/// Every method either applies its change completely or returns an error
/// and leaves the list untouched.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// Every item, in insertion order.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    /// Append `item`. Rejects empty descriptions and duplicate ids.
    async fn add(&self, item: Item) -> Result<Item, StoreError>;

    /// Remove the item with `id` and return the remaining items.
    async fn delete(&self, id: &str) -> Result<Vec<Item>, StoreError>;

    /// Flip `completed` on the item with `id` and return it.
    async fn toggle(&self, id: &str) -> Result<Item, StoreError>;

    /// Drop all completed items and return the rest.
    async fn clear_completed(&self) -> Result<Vec<Item>, StoreError>;
}
