//! Binds the `Todos` contract to a [`TodoStore`].

use std::sync::Arc;

use remoting_server::{HandlerError, Handlers, Service};
use todo_api::{Item, ADD_TODO, CLEAR_COMPLETED, DELETE_TODO, GET_TODOS, TOGGLE_COMPLETED};

use crate::storage::TodoStore;

/// Build the `Todos` service: contract, handlers and documentation.
pub fn todo_service(store: Arc<dyn TodoStore>) -> Result<Service, remoting::ContractError> {
    let handlers = Handlers::new()
        .bind(GET_TODOS, {
            let store = Arc::clone(&store);
            move |()| {
                let store = Arc::clone(&store);
                async move { store.list().await.map_err(HandlerError::from) }
            }
        })
        .bind(ADD_TODO, {
            let store = Arc::clone(&store);
            move |item: Item| {
                let store = Arc::clone(&store);
                async move { store.add(item).await.map_err(HandlerError::from) }
            }
        })
        .bind(DELETE_TODO, {
            let store = Arc::clone(&store);
            move |id: String| {
                let store = Arc::clone(&store);
                async move { store.delete(&id).await.map_err(HandlerError::from) }
            }
        })
        .bind(TOGGLE_COMPLETED, {
            let store = Arc::clone(&store);
            move |id: String| {
                let store = Arc::clone(&store);
                async move { store.toggle(&id).await.map_err(HandlerError::from) }
            }
        })
        .bind(CLEAR_COMPLETED, move |()| {
            let store = Arc::clone(&store);
            async move { store.clear_completed().await.map_err(HandlerError::from) }
        });

    Ok(Service::new(todo_api::contract()?, handlers)?.with_docs(todo_api::documentation()))
}

#[cfg(test)]
mod tests {
    use remoting_server::{build_router, ServerConfig};

    use super::*;
    use crate::storage::memory::MemoryStore;

    #[test]
    fn every_operation_is_bound() {
        let service = todo_service(Arc::new(MemoryStore::new())).unwrap();
        assert_eq!(service.contract().describe().len(), 5);
        assert!(build_router(vec![service], &ServerConfig::default()).is_ok());
    }
}
