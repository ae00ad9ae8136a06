//! In-memory store.
//!
//! Items live in a `Vec` behind a [`RwLock`], which keeps insertion order and
//! makes each mutation atomic with respect to concurrent calls.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use todo_api::Item;

use super::{StoreError, TodoStore};

/// Thread-safe, in-memory implementation of [`TodoStore`].
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `items`.
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    // Every mutation is a single Vec operation, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Item>> {
        self.items.read().unwrap_or_else(|p| p.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Item>> {
        self.items.write().unwrap_or_else(|p| p.into_inner())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.read().clone())
    }

    async fn add(&self, item: Item) -> Result<Item, StoreError> {
        if item.id.trim().is_empty() {
            return Err(StoreError::Invalid("id must not be empty".into()));
        }
        if item.description.trim().is_empty() {
            return Err(StoreError::Invalid("description must not be empty".into()));
        }
        let mut items = self.write();
        if items.iter().any(|i| i.id == item.id) {
            return Err(StoreError::Duplicate(item.id));
        }
        items.push(item.clone());
        Ok(item)
    }

    async fn delete(&self, id: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = self.write();
        let pos = items
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        items.remove(pos);
        Ok(items.clone())
    }

    async fn toggle(&self, id: &str) -> Result<Item, StoreError> {
        let mut items = self.write();
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        item.completed = !item.completed;
        Ok(item.clone())
    }

    async fn clear_completed(&self) -> Result<Vec<Item>, StoreError> {
        let mut items = self.write();
        items.retain(|i| !i.completed);
        Ok(items.clone())
    }
}
