// Adapters layer: concrete implementations for external systems (storage, document store, http client).

pub mod api_client;
pub mod document_store;
pub mod storage;

pub use api_client::{ClientOutcome, VehicleClient};
pub use document_store::{DocumentStore, MemoryStore};
pub use storage::LocalStorage;
