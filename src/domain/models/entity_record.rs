use serde::{Deserialize, Serialize};

use super::{EntityType, Metadata, StandardizedEntity};

/// Universal columns every relational shape carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCore {
    pub id: Option<String>,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub subtype: String,
    pub status: String,
    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub core: RecordCore,
    pub community_id: Option<String>,
    pub importance_score: Option<f64>,
    pub merged_into_id: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryUnitRecord {
    pub core: RecordCore,
    pub importance_score: Option<f64>,
    pub sentiment_score: Option<f64>,
    pub source: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedArtifactRecord {
    pub core: RecordCore,
    pub cycle_id: Option<String>,
    pub source_memory_unit_ids: Vec<String>,
    pub source_concept_ids: Vec<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProactivePromptRecord {
    pub core: RecordCore,
    pub cycle_id: Option<String>,
    pub source_concept_ids: Vec<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    pub core: RecordCore,
    pub member_concept_ids: Vec<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEventRecord {
    pub core: RecordCore,
    pub cycle_id: Option<String>,
    pub source: Option<String>,
    pub delta_value: Option<f64>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedConceptRecord {
    pub core: RecordCore,
    pub merged_into_id: Option<String>,
    pub source_concept_ids: Vec<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategicRelationshipRecord {
    pub core: RecordCore,
    pub concept_ids: Vec<String>,
    pub strength: Option<f64>,
    pub metadata: Metadata,
}

/// The relational shape of an entity, one variant per [`EntityType`].
///
/// Adding an entity type means adding a variant here, which in turn makes
/// every relational adapter's `match` fail to compile until it handles it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityRecord {
    Concept(ConceptRecord),
    MemoryUnit(MemoryUnitRecord),
    DerivedArtifact(DerivedArtifactRecord),
    ProactivePrompt(ProactivePromptRecord),
    Community(CommunityRecord),
    GrowthEvent(GrowthEventRecord),
    MergedConcept(MergedConceptRecord),
    StrategicRelationship(StrategicRelationshipRecord),
}

impl EntityRecord {
    /// Keeps only the attributes relevant to `entity_type`'s relational shape.
    pub fn project(entity_type: EntityType, entity: StandardizedEntity) -> Self {
        let attrs = entity.attributes;
        let core = RecordCore {
            id: entity.id,
            user_id: entity.user_id,
            title: entity.title,
            content: entity.content,
            subtype: entity.subtype,
            status: entity.status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        };

        match entity_type {
            EntityType::Concept => EntityRecord::Concept(ConceptRecord {
                core,
                community_id: attrs.community_id,
                importance_score: attrs.importance_score,
                merged_into_id: attrs.merged_into_id,
                metadata: attrs.metadata,
            }),
            EntityType::MemoryUnit => EntityRecord::MemoryUnit(MemoryUnitRecord {
                core,
                importance_score: attrs.importance_score,
                sentiment_score: attrs.sentiment_score,
                source: attrs.source,
                metadata: attrs.metadata,
            }),
            EntityType::DerivedArtifact => EntityRecord::DerivedArtifact(DerivedArtifactRecord {
                core,
                cycle_id: attrs.cycle_id,
                source_memory_unit_ids: attrs.source_memory_unit_ids,
                source_concept_ids: attrs.source_concept_ids,
                metadata: attrs.metadata,
            }),
            EntityType::ProactivePrompt => EntityRecord::ProactivePrompt(ProactivePromptRecord {
                core,
                cycle_id: attrs.cycle_id,
                source_concept_ids: attrs.source_concept_ids,
                metadata: attrs.metadata,
            }),
            EntityType::Community => EntityRecord::Community(CommunityRecord {
                core,
                member_concept_ids: attrs.source_concept_ids,
                metadata: attrs.metadata,
            }),
            EntityType::GrowthEvent => EntityRecord::GrowthEvent(GrowthEventRecord {
                core,
                cycle_id: attrs.cycle_id,
                source: attrs.source,
                delta_value: attrs.delta_value,
                metadata: attrs.metadata,
            }),
            EntityType::MergedConcept => EntityRecord::MergedConcept(MergedConceptRecord {
                core,
                merged_into_id: attrs.merged_into_id,
                source_concept_ids: attrs.source_concept_ids,
                metadata: attrs.metadata,
            }),
            EntityType::StrategicRelationship => {
                EntityRecord::StrategicRelationship(StrategicRelationshipRecord {
                    core,
                    concept_ids: attrs.source_concept_ids,
                    strength: attrs.importance_score,
                    metadata: attrs.metadata,
                })
            }
        }
    }

    pub fn entity_type(&self) -> EntityType {
        match self {
            EntityRecord::Concept(_) => EntityType::Concept,
            EntityRecord::MemoryUnit(_) => EntityType::MemoryUnit,
            EntityRecord::DerivedArtifact(_) => EntityType::DerivedArtifact,
            EntityRecord::ProactivePrompt(_) => EntityType::ProactivePrompt,
            EntityRecord::Community(_) => EntityType::Community,
            EntityRecord::GrowthEvent(_) => EntityType::GrowthEvent,
            EntityRecord::MergedConcept(_) => EntityType::MergedConcept,
            EntityRecord::StrategicRelationship(_) => EntityType::StrategicRelationship,
        }
    }

    pub fn core(&self) -> &RecordCore {
        match self {
            EntityRecord::Concept(r) => &r.core,
            EntityRecord::MemoryUnit(r) => &r.core,
            EntityRecord::DerivedArtifact(r) => &r.core,
            EntityRecord::ProactivePrompt(r) => &r.core,
            EntityRecord::Community(r) => &r.core,
            EntityRecord::GrowthEvent(r) => &r.core,
            EntityRecord::MergedConcept(r) => &r.core,
            EntityRecord::StrategicRelationship(r) => &r.core,
        }
    }
}

/// What the relational store returns for a created row: the universal fields
/// with the identifier and creation timestamp filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationalRow {
    pub id: String,
    pub entity_type: EntityType,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub subtype: String,
    pub status: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl RelationalRow {
    /// Combines a record's universal fields with the store-assigned values.
    pub fn assigned(record: &EntityRecord, id: String, created_at: i64) -> Self {
        let core = record.core();
        Self {
            id,
            entity_type: record.entity_type(),
            user_id: core.user_id.clone(),
            title: core.title.clone(),
            content: core.content.clone(),
            subtype: core.subtype.clone(),
            status: core.status.clone(),
            created_at,
            updated_at: core.updated_at,
        }
    }
}
