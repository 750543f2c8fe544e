use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::{GraphClient, GraphSession};
use crate::domain::{DomainError, GraphNode, GraphWrite, GraphWriteSummary};

type NodeMap = Arc<Mutex<HashMap<String, GraphNode>>>;

/// Property-graph store kept in process memory. Nodes are keyed by `id`;
/// the label is a property of the node, not part of the key.
pub struct InMemoryGraphStore {
    nodes: NodeMap,
    open_sessions: Arc<AtomicUsize>,
    sessions_opened: Arc<AtomicUsize>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(Mutex::new(HashMap::new())),
            open_sessions: Arc::new(AtomicUsize::new(0)),
            sessions_opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn node(&self, id: &str) -> Option<GraphNode> {
        self.nodes.lock().await.get(id).cloned()
    }

    pub async fn node_count(&self) -> usize {
        self.nodes.lock().await.len()
    }

    /// Sessions opened and not yet closed or dropped.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphClient for InMemoryGraphStore {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, DomainError> {
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InMemoryGraphSession {
            nodes: Arc::clone(&self.nodes),
            _slot: SessionSlot(Arc::clone(&self.open_sessions)),
        }))
    }
}

/// Decrements the open-session counter however the session ends.
struct SessionSlot(Arc<AtomicUsize>);

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct InMemoryGraphSession {
    nodes: NodeMap,
    _slot: SessionSlot,
}

#[async_trait]
impl GraphSession for InMemoryGraphSession {
    async fn execute(&mut self, write: &GraphWrite) -> Result<GraphWriteSummary, DomainError> {
        let node = GraphNode {
            label: write.label().to_string(),
            id: write.key().to_string(),
            properties: write.properties().clone(),
        };

        let previous = self.nodes.lock().await.insert(node.id.clone(), node);

        debug!("Merged {} node {} in memory", write.label(), write.key());
        Ok(GraphWriteSummary {
            nodes_created: u64::from(previous.is_none()),
            properties_set: write.properties().len() as u64,
        })
    }

    async fn node_exists(&mut self, label: &str, id: &str) -> Result<bool, DomainError> {
        let nodes = self.nodes.lock().await;
        Ok(nodes.get(id).is_some_and(|node| node.label == label))
    }

    async fn count_nodes(&mut self, label: Option<&str>) -> Result<u64, DomainError> {
        let nodes = self.nodes.lock().await;
        Ok(nodes
            .values()
            .filter(|node| label.map_or(true, |l| node.label == l))
            .count() as u64)
    }

    async fn close(self: Box<Self>) -> Result<(), DomainError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_merge_replaces_properties_wholesale() {
        let store = InMemoryGraphStore::new();

        let mut session = store.open_session().await.unwrap();
        session
            .execute(
                &GraphWrite::merge_node("Concept", "c1")
                    .set("title", "Travel")
                    .set("community", "x"),
            )
            .await
            .unwrap();
        let summary = session
            .execute(&GraphWrite::merge_node("Concept", "c1").set("title", "Trips"))
            .await
            .unwrap();
        session.close().await.unwrap();

        let node = store.node("c1").await.unwrap();
        assert_eq!(summary.nodes_created, 0);
        assert_eq!(node.property_str("title"), Some("Trips"));
        assert!(node.properties.get("community").is_none());
        assert_eq!(store.node_count().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_released_on_close_and_drop() {
        let store = InMemoryGraphStore::new();

        let closed = store.open_session().await.unwrap();
        let dropped = store.open_session().await.unwrap();
        assert_eq!(store.open_sessions(), 2);

        closed.close().await.unwrap();
        drop(dropped);

        assert_eq!(store.open_sessions(), 0);
        assert_eq!(store.sessions_opened(), 2);
    }
}
