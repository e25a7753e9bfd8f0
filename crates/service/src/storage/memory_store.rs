use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use models::Document;
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// In-memory document store for tests and throwaway runs.
#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Document>,
    simulate_write_error: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self { document: RwLock::new(document), simulate_write_error: AtomicBool::new(false) }
    }

    /// Make every subsequent `save` fail with an I/O error.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load(&self) -> Result<Document, ServiceError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &Document) -> Result<(), ServiceError> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(ServiceError::Io("simulated write failure".into()));
        }
        *self.document.write().await = document.clone();
        Ok(())
    }
}
