use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{EntityType, RelationalRow};

/// A parameterized merge-on-key node upsert.
///
/// Executing it must create the node when the key is absent and otherwise
/// replace every listed property, never merging with what was stored before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphWrite {
    label: String,
    key: String,
    properties: BTreeMap<String, Value>,
}

impl GraphWrite {
    pub fn merge_node(label: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            key: key.into(),
            properties: BTreeMap::new(),
        }
    }

    /// The generic node shape shared by all entity types: merge on `id`,
    /// then set the seven universal fields.
    pub fn entity_node(row: &RelationalRow) -> Self {
        Self::merge_node(row.entity_type.as_str(), row.id.clone())
            .set("user_id", row.user_id.clone())
            .set("title", row.title.clone())
            .set("content", row.content.clone())
            .set("type", row.subtype.clone())
            .set("status", row.status.clone())
            .set("created_at", row.created_at)
            .set("updated_at", row.updated_at)
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn properties(&self) -> &BTreeMap<String, Value> {
        &self.properties
    }

    /// Cypher text for the statement; parameters are `$id` plus one per property.
    pub fn cypher(&self) -> String {
        let assignments: Vec<String> = self
            .properties
            .keys()
            .map(|name| format!("n.{name} = ${name}"))
            .collect();

        if assignments.is_empty() {
            format!("MERGE (n:`{}` {{id: $id}})", self.label)
        } else {
            format!(
                "MERGE (n:`{}` {{id: $id}}) SET {}",
                self.label,
                assignments.join(", ")
            )
        }
    }

    pub fn parameters(&self) -> BTreeMap<String, Value> {
        let mut params = self.properties.clone();
        params.insert("id".to_string(), Value::String(self.key.clone()));
        params
    }
}

/// Outcome of a single statement run inside a graph session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphWriteSummary {
    pub nodes_created: u64,
    pub properties_set: u64,
}

/// A node as held by a graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub label: String,
    pub id: String,
    pub properties: BTreeMap<String, Value>,
}

impl GraphNode {
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

/// The narrow projection kept by the vector-search store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorItem {
    pub id: String,
    pub user_id: String,
    pub entity_type: String,
    pub content: String,
    pub title: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    pub status: String,
}

impl From<&RelationalRow> for VectorItem {
    fn from(row: &RelationalRow) -> Self {
        Self {
            id: row.id.clone(),
            user_id: row.user_id.clone(),
            entity_type: row.entity_type.as_str().to_string(),
            content: row.content.clone(),
            title: row.title.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            status: row.status.clone(),
        }
    }
}

pub const FOLLOW_UP_JOB: &str = "entity-follow-up";

/// Payload of the follow-up job enqueued after a successful relational write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPayload {
    pub entity_id: String,
    pub entity_type: EntityType,
    pub user_id: String,
}

impl From<&RelationalRow> for JobPayload {
    fn from(row: &RelationalRow) -> Self {
        Self {
            entity_id: row.id.clone(),
            entity_type: row.entity_type,
            user_id: row.user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
}
