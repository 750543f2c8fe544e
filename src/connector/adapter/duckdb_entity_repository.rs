use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use duckdb::{params, Connection, ToSql};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::application::EntityRepository;
use crate::domain::{
    current_timestamp, DomainError, EntityRecord, EntityType, RecordCore, RelationalRow,
};

const CORE_COLUMNS: [&str; 8] = [
    "id",
    "user_id",
    "title",
    "content",
    "subtype",
    "status",
    "created_at",
    "updated_at",
];

/// Relational system of record on DuckDB: one table per entity variant plus
/// an `entity_registry` table enforcing identifier uniqueness across variants.
pub struct DuckdbEntityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DuckdbEntityRepository {
    pub fn new(db_path: &Path) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path)
            .map_err(|e| DomainError::storage(format!("Failed to open DuckDB database: {}", e)))?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self, DomainError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DomainError::storage(format!("Failed to open DuckDB in-memory DB: {}", e))
        })?;
        Self::initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Returns a clone of the shared connection Arc so the graph, vector and
    /// job adapters can live in the same DuckDB file.
    pub fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    fn table_name(entity_type: EntityType) -> &'static str {
        match entity_type {
            EntityType::Concept => "concepts",
            EntityType::MemoryUnit => "memory_units",
            EntityType::DerivedArtifact => "derived_artifacts",
            EntityType::ProactivePrompt => "proactive_prompts",
            EntityType::Community => "communities",
            EntityType::GrowthEvent => "growth_events",
            EntityType::MergedConcept => "merged_concepts",
            EntityType::StrategicRelationship => "strategic_relationships",
        }
    }

    fn initialize_schema(conn: &Connection) -> Result<(), DomainError> {
        let variant_columns = [
            (
                EntityType::Concept,
                "community_id TEXT, importance_score DOUBLE, merged_into_id TEXT, metadata TEXT",
            ),
            (
                EntityType::MemoryUnit,
                "importance_score DOUBLE, sentiment_score DOUBLE, source TEXT, metadata TEXT",
            ),
            (
                EntityType::DerivedArtifact,
                "cycle_id TEXT, source_memory_unit_ids TEXT, source_concept_ids TEXT, metadata TEXT",
            ),
            (
                EntityType::ProactivePrompt,
                "cycle_id TEXT, source_concept_ids TEXT, metadata TEXT",
            ),
            (EntityType::Community, "member_concept_ids TEXT, metadata TEXT"),
            (
                EntityType::GrowthEvent,
                "cycle_id TEXT, source TEXT, delta_value DOUBLE, metadata TEXT",
            ),
            (
                EntityType::MergedConcept,
                "merged_into_id TEXT, source_concept_ids TEXT, metadata TEXT",
            ),
            (
                EntityType::StrategicRelationship,
                "concept_ids TEXT, strength DOUBLE, metadata TEXT",
            ),
        ];

        let mut ddl = String::from(
            r#"
            CREATE TABLE IF NOT EXISTS entity_registry (
                id TEXT PRIMARY KEY,
                entity_type TEXT NOT NULL
            );
            "#,
        );
        for (entity_type, columns) in variant_columns {
            let table = Self::table_name(entity_type);
            ddl.push_str(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {table} (
                    id TEXT PRIMARY KEY,
                    user_id TEXT NOT NULL,
                    title TEXT NOT NULL,
                    content TEXT NOT NULL,
                    subtype TEXT NOT NULL,
                    status TEXT NOT NULL,
                    created_at BIGINT NOT NULL,
                    updated_at BIGINT,
                    {columns}
                );
                CREATE INDEX IF NOT EXISTS idx_{table}_user ON {table}(user_id);
                "#
            ));
        }

        conn.execute_batch(&ddl)
            .map_err(|e| DomainError::storage(format!("Failed to initialize schema: {}", e)))?;

        debug!("DuckDB entity schema initialized");
        Ok(())
    }

    fn id_list(ids: &[String]) -> Result<String, DomainError> {
        serde_json::to_string(ids)
            .map_err(|e| DomainError::internal(format!("Failed to encode id list: {}", e)))
    }

    /// Claims the identifier for one variant; fails if any variant holds it.
    fn register(conn: &Connection, id: &str, entity_type: EntityType) -> Result<(), DomainError> {
        let existing: Option<String> = match conn.query_row(
            "SELECT entity_type FROM entity_registry WHERE id = ?1",
            params![id],
            |row| row.get(0),
        ) {
            Ok(entity_type) => Some(entity_type),
            Err(duckdb::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                return Err(DomainError::storage(format!(
                    "Failed to check entity registry: {}",
                    e
                )))
            }
        };

        if let Some(owner) = existing {
            return Err(DomainError::already_exists(format!(
                "id {} is already used by a {}",
                id, owner
            )));
        }

        conn.execute(
            "INSERT INTO entity_registry (id, entity_type) VALUES (?1, ?2)",
            params![id, entity_type.as_str()],
        )
        .map_err(|e| DomainError::storage(format!("Failed to register entity id: {}", e)))?;
        Ok(())
    }

    fn insert_row(
        conn: &Connection,
        table: &str,
        id: &String,
        created_at: i64,
        core: &RecordCore,
        columns: &[&str],
        values: &[&dyn ToSql],
    ) -> Result<(), DomainError> {
        let names: Vec<&str> = CORE_COLUMNS.iter().chain(columns.iter()).copied().collect();
        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            names.join(", "),
            placeholders
        );

        let mut bound: Vec<&dyn ToSql> = params![
            *id,
            core.user_id,
            core.title,
            core.content,
            core.subtype,
            core.status,
            created_at,
            core.updated_at,
        ]
        .to_vec();
        bound.extend_from_slice(values);

        conn.execute(&sql, bound.as_slice())
            .map_err(|e| DomainError::storage(format!("Failed to insert into {}: {}", table, e)))?;
        Ok(())
    }

    fn create_variant(
        conn: &Connection,
        record: &EntityRecord,
        id: &String,
        created_at: i64,
    ) -> Result<(), DomainError> {
        match record {
            EntityRecord::Concept(r) => {
                let metadata = r.metadata.to_json_string()?;
                Self::insert_row(
                    conn,
                    "concepts",
                    id,
                    created_at,
                    &r.core,
                    &["community_id", "importance_score", "merged_into_id", "metadata"],
                    params![r.community_id, r.importance_score, r.merged_into_id, metadata],
                )
            }
            EntityRecord::MemoryUnit(r) => {
                let metadata = r.metadata.to_json_string()?;
                Self::insert_row(
                    conn,
                    "memory_units",
                    id,
                    created_at,
                    &r.core,
                    &["importance_score", "sentiment_score", "source", "metadata"],
                    params![r.importance_score, r.sentiment_score, r.source, metadata],
                )
            }
            EntityRecord::DerivedArtifact(r) => {
                let metadata = r.metadata.to_json_string()?;
                let memory_units = Self::id_list(&r.source_memory_unit_ids)?;
                let concepts = Self::id_list(&r.source_concept_ids)?;
                Self::insert_row(
                    conn,
                    "derived_artifacts",
                    id,
                    created_at,
                    &r.core,
                    &["cycle_id", "source_memory_unit_ids", "source_concept_ids", "metadata"],
                    params![r.cycle_id, memory_units, concepts, metadata],
                )
            }
            EntityRecord::ProactivePrompt(r) => {
                let metadata = r.metadata.to_json_string()?;
                let concepts = Self::id_list(&r.source_concept_ids)?;
                Self::insert_row(
                    conn,
                    "proactive_prompts",
                    id,
                    created_at,
                    &r.core,
                    &["cycle_id", "source_concept_ids", "metadata"],
                    params![r.cycle_id, concepts, metadata],
                )
            }
            EntityRecord::Community(r) => {
                let metadata = r.metadata.to_json_string()?;
                let members = Self::id_list(&r.member_concept_ids)?;
                Self::insert_row(
                    conn,
                    "communities",
                    id,
                    created_at,
                    &r.core,
                    &["member_concept_ids", "metadata"],
                    params![members, metadata],
                )
            }
            EntityRecord::GrowthEvent(r) => {
                let metadata = r.metadata.to_json_string()?;
                Self::insert_row(
                    conn,
                    "growth_events",
                    id,
                    created_at,
                    &r.core,
                    &["cycle_id", "source", "delta_value", "metadata"],
                    params![r.cycle_id, r.source, r.delta_value, metadata],
                )
            }
            EntityRecord::MergedConcept(r) => {
                let metadata = r.metadata.to_json_string()?;
                let concepts = Self::id_list(&r.source_concept_ids)?;
                Self::insert_row(
                    conn,
                    "merged_concepts",
                    id,
                    created_at,
                    &r.core,
                    &["merged_into_id", "source_concept_ids", "metadata"],
                    params![r.merged_into_id, concepts, metadata],
                )
            }
            EntityRecord::StrategicRelationship(r) => {
                let metadata = r.metadata.to_json_string()?;
                let concepts = Self::id_list(&r.concept_ids)?;
                Self::insert_row(
                    conn,
                    "strategic_relationships",
                    id,
                    created_at,
                    &r.core,
                    &["concept_ids", "strength", "metadata"],
                    params![concepts, r.strength, metadata],
                )
            }
        }
    }

    fn select_core(entity_type: EntityType, filter: &str) -> String {
        format!(
            "SELECT {} FROM {} {} ORDER BY created_at, id",
            CORE_COLUMNS.join(", "),
            Self::table_name(entity_type),
            filter
        )
    }

    fn row_to_relational(
        entity_type: EntityType,
        row: &duckdb::Row<'_>,
    ) -> duckdb::Result<RelationalRow> {
        Ok(RelationalRow {
            id: row.get(0)?,
            entity_type,
            user_id: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
            subtype: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

#[async_trait]
impl EntityRepository for DuckdbEntityRepository {
    async fn create(&self, record: &EntityRecord) -> Result<RelationalRow, DomainError> {
        let core = record.core();
        let entity_type = record.entity_type();
        let id = core
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let created_at = core.created_at.unwrap_or_else(current_timestamp);

        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Self::register(&tx, &id, entity_type)?;
        Self::create_variant(&tx, record, &id, created_at)?;

        tx.commit()
            .map_err(|e| DomainError::storage(format!("Failed to commit: {}", e)))?;

        debug!("Created {} {} in DuckDB", entity_type, id);
        Ok(RelationalRow::assigned(record, id, created_at))
    }

    async fn find_by_id(
        &self,
        entity_type: EntityType,
        id: &str,
    ) -> Result<Option<RelationalRow>, DomainError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(&Self::select_core(entity_type, "WHERE id = ?1"))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        match stmt.query_row(params![id], |row| Self::row_to_relational(entity_type, row)) {
            Ok(row) => Ok(Some(row)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(DomainError::storage(format!(
                "Failed to query {}: {}",
                entity_type, e
            ))),
        }
    }

    async fn list(
        &self,
        entity_type: EntityType,
        user_id: Option<&str>,
    ) -> Result<Vec<RelationalRow>, DomainError> {
        let conn = self.conn.lock().await;
        let filter = if user_id.is_some() {
            "WHERE user_id = ?1"
        } else {
            ""
        };
        let mut stmt = conn
            .prepare(&Self::select_core(entity_type, filter))
            .map_err(|e| DomainError::storage(format!("Failed to prepare statement: {}", e)))?;

        let mapper = |row: &duckdb::Row<'_>| Self::row_to_relational(entity_type, row);
        let rows = match user_id {
            Some(user) => stmt.query_map(params![user], mapper),
            None => stmt.query_map([], mapper),
        }
        .map_err(|e| DomainError::storage(format!("Failed to query {}: {}", entity_type, e)))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(
                row.map_err(|e| DomainError::storage(format!("Failed to read row: {}", e)))?,
            );
        }
        Ok(result)
    }

    async fn count(&self, entity_type: EntityType) -> Result<u64, DomainError> {
        let conn = self.conn.lock().await;
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", Self::table_name(entity_type)),
                [],
                |row| row.get(0),
            )
            .map_err(|e| DomainError::storage(format!("Failed to count {}: {}", entity_type, e)))?;
        Ok(count as u64)
    }
}
