//! Typed operation handles.

use std::fmt;
use std::marker::PhantomData;

use crate::contract::OperationDescriptor;
use crate::shape::Describe;

/// A typed handle naming one remote operation with argument type `I` and
/// result type `O`.
///
/// Handles are `const`-constructible, so an API is usually declared as a set
/// of constants that both the server and the client import:
///
/// ```rust,ignore
/// pub const GET_TODOS: Operation<(), Vec<Item>> = Operation::new("getTodos");
/// pub const ADD_TODO: Operation<Item, Item> = Operation::new("addTodo");
/// ```
///
/// The same handle declares the operation in a contract, binds the server
/// handler, produces the client callable and attaches documentation.
pub struct Operation<I, O> {
    name: &'static str,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> Operation<I, O> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _types: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<I: Describe, O: Describe> Operation<I, O> {
    /// The untyped descriptor stored in an [`ApiContract`](crate::ApiContract).
    pub fn descriptor(&self) -> OperationDescriptor {
        OperationDescriptor::new(self.name, I::shape(), O::shape())
    }
}

// Manual impls: the derives would add `I: Clone` / `O: Clone` bounds.
impl<I, O> Clone for Operation<I, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, O> Copy for Operation<I, O> {}

impl<I, O> fmt::Debug for Operation<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Operation").field(&self.name).finish()
    }
}
