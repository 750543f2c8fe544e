use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// The closed set of entity variants the fan-out pipeline knows how to persist.
///
/// The variant name doubles as the graph label and the vector `entity_type`
/// field, so renaming a variant changes what is written to those stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityType {
    Concept,
    MemoryUnit,
    DerivedArtifact,
    ProactivePrompt,
    Community,
    GrowthEvent,
    MergedConcept,
    StrategicRelationship,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::Concept,
        EntityType::MemoryUnit,
        EntityType::DerivedArtifact,
        EntityType::ProactivePrompt,
        EntityType::Community,
        EntityType::GrowthEvent,
        EntityType::MergedConcept,
        EntityType::StrategicRelationship,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Concept => "Concept",
            EntityType::MemoryUnit => "MemoryUnit",
            EntityType::DerivedArtifact => "DerivedArtifact",
            EntityType::ProactivePrompt => "ProactivePrompt",
            EntityType::Community => "Community",
            EntityType::GrowthEvent => "GrowthEvent",
            EntityType::MergedConcept => "MergedConcept",
            EntityType::StrategicRelationship => "StrategicRelationship",
        }
    }

    /// Accepts the variant name in any case, with or without underscores
    /// (`MemoryUnit`, `memoryunit`, `memory_unit`).
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "concept" => Ok(EntityType::Concept),
            "memoryunit" => Ok(EntityType::MemoryUnit),
            "derivedartifact" => Ok(EntityType::DerivedArtifact),
            "proactiveprompt" => Ok(EntityType::ProactivePrompt),
            "community" => Ok(EntityType::Community),
            "growthevent" => Ok(EntityType::GrowthEvent),
            "mergedconcept" => Ok(EntityType::MergedConcept),
            "strategicrelationship" => Ok(EntityType::StrategicRelationship),
            _ => Err(DomainError::unsupported_entity_type(s)),
        }
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
