use scheduler_core::EventStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: EventStore,
}

impl AppState {
    pub fn new(store: EventStore) -> Self {
        AppState { store }
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }
}
