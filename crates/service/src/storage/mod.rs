//! Storage abstractions for service layer
//!
//! The whole listing document is read and written in one piece. Callers that
//! need read-modify-write must serialize it themselves (see
//! `property::service::PropertyService`).

use async_trait::async_trait;
use models::Document;

use crate::errors::ServiceError;

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;

/// Trait abstraction for document persistence.
/// Implementations can be file-backed or in-memory.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn load(&self) -> Result<Document, ServiceError>;
    async fn save(&self, document: &Document) -> Result<(), ServiceError>;
}
