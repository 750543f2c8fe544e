use serde::{Deserialize, Serialize};

use super::{EntityType, Metadata};
use crate::domain::DomainError;

/// Variant-specific optional attributes. Each entity variant reads the subset
/// relevant to its relational shape; see [`super::EntityRecord::project`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityAttributes {
    pub community_id: Option<String>,
    pub importance_score: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub source_memory_unit_ids: Vec<String>,
    pub source_concept_ids: Vec<String>,
    pub metadata: Metadata,
    pub cycle_id: Option<String>,
    /// Provenance tag, e.g. the ingestion channel that produced the entity.
    pub source: Option<String>,
    pub delta_value: Option<f64>,
    pub merged_into_id: Option<String>,
}

/// The universal attribute set shared by every entity variant.
///
/// `id` and `created_at` are normally left empty by callers and assigned by
/// the relational store on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedEntity {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "user")]
    pub user_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub subtype: String,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, alias = "created")]
    pub created_at: Option<i64>,
    #[serde(default, alias = "updated")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub attributes: EntityAttributes,
}

fn default_status() -> String {
    "active".to_string()
}

impl StandardizedEntity {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            title: title.into(),
            content: content.into(),
            subtype: String::new(),
            status: default_status(),
            created_at: None,
            updated_at: None,
            attributes: EntityAttributes::default(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = subtype.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn with_attributes(mut self, attributes: EntityAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Identifier used in log lines and error descriptions before one is assigned.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<unassigned>")
    }

    /// Boundary checks run before any store is touched.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::invalid_input("user_id must not be empty"));
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() || id.chars().any(char::is_whitespace) {
                return Err(DomainError::invalid_input(format!(
                    "identifier {:?} must be non-empty and contain no whitespace",
                    id
                )));
            }
        }

        let attrs = &self.attributes;
        for (name, value) in [
            ("importance_score", attrs.importance_score),
            ("sentiment_score", attrs.sentiment_score),
            ("delta_value", attrs.delta_value),
        ] {
            if matches!(value, Some(v) if !v.is_finite()) {
                return Err(DomainError::invalid_input(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        attrs.metadata.validate()
    }
}

/// One entry of a batch: the entity type as supplied by the caller, which is
/// only resolved to an [`EntityType`] inside the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityWriteRequest {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub data: StandardizedEntity,
}

impl EntityWriteRequest {
    pub fn new(entity_type: impl Into<String>, data: StandardizedEntity) -> Self {
        Self {
            entity_type: entity_type.into(),
            data,
        }
    }

    pub fn typed(entity_type: EntityType, data: StandardizedEntity) -> Self {
        Self::new(entity_type.as_str(), data)
    }
}
