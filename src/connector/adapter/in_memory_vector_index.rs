use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::VectorIndex;
use crate::domain::{DomainError, VectorItem};

pub struct InMemoryVectorIndex {
    items: Arc<Mutex<HashMap<String, VectorItem>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, items: &[VectorItem]) -> Result<usize, DomainError> {
        let mut store = self.items.lock().await;

        for item in items {
            store.insert(item.id.clone(), item.clone());
        }

        debug!("Upserted {} vector items in memory", items.len());
        Ok(items.len())
    }

    async fn get(&self, id: &str) -> Result<Option<VectorItem>, DomainError> {
        let store = self.items.lock().await;
        Ok(store.get(id).cloned())
    }

    async fn count(&self) -> Result<u64, DomainError> {
        let store = self.items.lock().await;
        Ok(store.len() as u64)
    }
}
