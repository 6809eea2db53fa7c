//! The query engine: a closed set of derived views over the store, plus
//! the bounded ad-hoc query channel. Reads go through the pooled read
//! connections and only ever see committed state.

pub mod heuristics;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use typetrace_core::config::CollectorConfig;
use typetrace_core::errors::QueryError;
use typetrace_storage::queries::{adhoc, entities, literals, observations, shapes, stats};
use typetrace_storage::Database;

use heuristics::AnnotationKind;

/// Pagination envelope carried by every paginated response.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Page {
    pub offset: u32,
    pub limit: u32,
    pub total: i64,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl Page {
    fn new(offset: u32, limit: u32, total: i64, returned: usize) -> Self {
        Self {
            offset,
            limit,
            total,
            has_more: i64::from(offset) + (returned as i64) < total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_entities: i64,
    pub total_observations: i64,
    pub total_value_rows: i64,
    pub distinct_files: i64,
    pub type_distribution: Vec<TypeCount>,
}

#[derive(Debug, Serialize)]
pub struct TypeCount {
    pub value_type: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct EntityDto {
    pub id: i64,
    pub filename: String,
    pub source_offset: i64,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub line_number: Option<i64>,
    pub column_number: Option<i64>,
    pub observation_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
}

impl From<entities::EntityRow> for EntityDto {
    fn from(row: entities::EntityRow) -> Self {
        Self {
            id: row.id,
            filename: row.filename,
            source_offset: row.source_offset,
            entity_name: row.entity_name,
            entity_type: row.entity_type,
            line_number: row.line_number,
            column_number: row.column_number,
            observation_count: row.observation_count,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntityWithValuesDto {
    #[serde(flatten)]
    pub entity: EntityDto,
    pub value_count: i64,
}

#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
    pub entities: Vec<EntityWithValuesDto>,
    pub pagination: Page,
}

#[derive(Debug, Serialize)]
pub struct CallDto {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub filename: String,
    pub line_number: Option<i64>,
    pub value_type: String,
    pub literal_value: Option<String>,
    pub context: String,
    pub observation_count: i64,
    pub last_seen: i64,
}

#[derive(Debug, Serialize)]
pub struct CallsResponse {
    pub calls: Vec<CallDto>,
    pub pagination: Page,
}

#[derive(Debug, Serialize)]
pub struct ObservationDto {
    pub value_type: String,
    pub literal_value: Option<String>,
    pub value_hash: String,
    pub context: String,
    pub observation_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
}

#[derive(Debug, Serialize)]
pub struct LocationEntity {
    #[serde(flatten)]
    pub entity: EntityDto,
    pub values: Vec<ObservationDto>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub filename: String,
    pub line_number: i64,
    pub column_number: Option<i64>,
    pub entities: Vec<LocationEntity>,
}

#[derive(Debug, Serialize)]
pub struct EnumCandidateDto {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub filename: String,
    pub line_number: Option<i64>,
    pub total_observations: i64,
    pub distinct_strings: i64,
    pub values: Vec<String>,
    pub suggested_name: String,
}

#[derive(Debug, Serialize)]
pub struct EnumsResponse {
    pub candidates: Vec<EnumCandidateDto>,
    pub pagination: Page,
}

#[derive(Debug, Serialize)]
pub struct ShapeDto {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub filename: String,
    pub shape_signature: String,
    pub observation_count: i64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub type_declaration: String,
}

#[derive(Debug, Serialize)]
pub struct ShapesResponse {
    pub shapes: Vec<ShapeDto>,
    pub pagination: Page,
}

#[derive(Debug, Serialize)]
pub struct AnnotationDto {
    pub entity_id: i64,
    pub entity_name: Option<String>,
    pub entity_type: Option<String>,
    pub filename: String,
    pub line_number: Option<i64>,
    pub kind: AnnotationKind,
    pub value_types: Vec<String>,
    pub total_observations: i64,
}

#[derive(Debug, Serialize)]
pub struct AnnotationsResponse {
    pub annotations: Vec<AnnotationDto>,
    pub pagination: Page,
}

/// Read-only analytical surface over one database.
pub struct QueryEngine {
    db: Arc<Database>,
    default_page: u32,
    max_page: u32,
}

impl QueryEngine {
    pub fn new(db: Arc<Database>, config: &CollectorConfig) -> Self {
        Self { db, default_page: config.default_page_size, max_page: config.max_page_size }
    }

    fn clamp_limit(&self, limit: Option<u32>, default: u32) -> u32 {
        limit.unwrap_or(default).clamp(1, self.max_page)
    }

    /// Aggregate counts: entities, observations, files, type distribution.
    pub fn stats(&self) -> Result<StatsResponse, QueryError> {
        let stats = self.db.with_reader(stats::store_stats)?;
        Ok(StatsResponse {
            total_entities: stats.total_entities,
            total_observations: stats.total_observations,
            total_value_rows: stats.distinct_value_rows,
            distinct_files: stats.distinct_files,
            type_distribution: stats
                .type_distribution
                .into_iter()
                .map(|(value_type, count)| TypeCount { value_type, count })
                .collect(),
        })
    }

    /// One row per entity with its value count, last-seen first.
    pub fn entities(
        &self,
        filename: Option<&str>,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<EntitiesResponse, QueryError> {
        let offset = offset.unwrap_or(0);
        let limit = self.clamp_limit(limit, 100);
        let (rows, total) = self.db.with_reader(|conn| {
            let rows = entities::list_entities(conn, filename, offset, limit)?;
            let total = entities::count_entities(conn, filename)?;
            Ok((rows, total))
        })?;
        let returned = rows.len();
        Ok(EntitiesResponse {
            entities: rows
                .into_iter()
                .map(|row| EntityWithValuesDto {
                    entity: row.entity.into(),
                    value_count: row.value_count,
                })
                .collect(),
            pagination: Page::new(offset, limit, total, returned),
        })
    }

    /// One row per `(entity, value_type, literal_value)` by recency.
    pub fn calls(
        &self,
        filepath: Option<&str>,
        function_name: Option<&str>,
        offset: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<CallsResponse, QueryError> {
        let offset = offset.unwrap_or(0);
        let limit = self.clamp_limit(page_size, self.default_page);
        let (rows, total) = self.db.with_reader(|conn| {
            let rows =
                observations::list_calls(conn, filepath, function_name, offset, limit)?;
            let total = observations::count_calls(conn, filepath, function_name)?;
            Ok((rows, total))
        })?;
        let returned = rows.len();
        Ok(CallsResponse {
            calls: rows
                .into_iter()
                .map(|row| CallDto {
                    entity_id: row.entity_id,
                    entity_name: row.entity_name,
                    entity_type: row.entity_type,
                    filename: row.filename,
                    line_number: row.line_number,
                    value_type: row.value_type,
                    literal_value: row.literal_value,
                    context: row.context,
                    observation_count: row.observation_count,
                    last_seen: row.last_seen,
                })
                .collect(),
            pagination: Page::new(offset, limit, total, returned),
        })
    }

    /// All entities at a source location, each with its observed values.
    pub fn location(
        &self,
        filename: Option<&str>,
        line_number: Option<i64>,
        column_number: Option<i64>,
    ) -> Result<LocationResponse, QueryError> {
        let filename =
            filename.ok_or(QueryError::MissingParameter { name: "filename" })?;
        let line_number =
            line_number.ok_or(QueryError::MissingParameter { name: "line_number" })?;

        let entities_with_values = self.db.with_reader(|conn| {
            let rows = entities::find_by_location(conn, filename, line_number, column_number)?;
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                let values = observations::list_for_entity(conn, row.id)?;
                out.push((row, values));
            }
            Ok(out)
        })?;

        Ok(LocationResponse {
            filename: filename.to_string(),
            line_number,
            column_number,
            entities: entities_with_values
                .into_iter()
                .map(|(row, values)| LocationEntity {
                    entity: row.into(),
                    values: values
                        .into_iter()
                        .map(|v| ObservationDto {
                            value_type: v.value_type,
                            literal_value: v.literal_value,
                            value_hash: v.value_hash,
                            context: v.context,
                            observation_count: v.observation_count,
                            first_seen: v.first_seen,
                            last_seen: v.last_seen,
                        })
                        .collect(),
                })
                .collect(),
        })
    }

    /// Entities whose string observations cleared the enum thresholds,
    /// each with a suggested enum name.
    pub fn enums(
        &self,
        min_observations: Option<i64>,
        min_unique_strings: Option<i64>,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<EnumsResponse, QueryError> {
        let min_observations = min_observations.unwrap_or(3).max(1);
        let min_unique = min_unique_strings.unwrap_or(2).max(2);
        let max_unique = 20;
        let offset = offset.unwrap_or(0);
        let limit = self.clamp_limit(limit, self.default_page);

        let (rows, total) = self.db.with_reader(|conn| {
            let rows = literals::enum_candidates(
                conn, min_observations, min_unique, max_unique, offset, limit,
            )?;
            let total = literals::count_enum_candidates(conn, min_observations, min_unique, max_unique)?;
            Ok((rows, total))
        })?;
        let returned = rows.len();
        Ok(EnumsResponse {
            candidates: rows
                .into_iter()
                .map(|row| {
                    let suggested_name =
                        heuristics::suggest_enum_name(&row.filename, &row.values);
                    EnumCandidateDto {
                        entity_id: row.entity_id,
                        entity_name: row.entity_name,
                        filename: row.filename,
                        line_number: row.line_number,
                        total_observations: row.total_observations,
                        distinct_strings: row.distinct_strings,
                        values: row.values,
                        suggested_name,
                    }
                })
                .collect(),
            pagination: Page::new(offset, limit, total, returned),
        })
    }

    /// Recurring object shapes with synthetic type declarations.
    pub fn shapes(
        &self,
        min_observations: Option<i64>,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<ShapesResponse, QueryError> {
        let min_observations = min_observations.unwrap_or(3).max(1);
        let offset = offset.unwrap_or(0);
        let limit = self.clamp_limit(limit, self.default_page);

        let (rows, total) = self.db.with_reader(|conn| {
            let rows = shapes::list_shapes(conn, min_observations, offset, limit)?;
            let total = shapes::count_shapes(conn, min_observations)?;
            Ok((rows, total))
        })?;
        let returned = rows.len();
        Ok(ShapesResponse {
            shapes: rows
                .into_iter()
                .map(|row| {
                    let type_declaration = heuristics::synthesize_interface(
                        row.entity_name.as_deref(),
                        &row.shape_signature,
                    );
                    ShapeDto {
                        entity_id: row.entity_id,
                        entity_name: row.entity_name,
                        filename: row.filename,
                        shape_signature: row.shape_signature,
                        observation_count: row.observation_count,
                        first_seen: row.first_seen,
                        last_seen: row.last_seen,
                        type_declaration,
                    }
                })
                .collect(),
            pagination: Page::new(offset, limit, total, returned),
        })
    }

    /// Entities classified and ranked by annotation recommendation.
    pub fn annotations(
        &self,
        offset: Option<u32>,
        limit: Option<u32>,
    ) -> Result<AnnotationsResponse, QueryError> {
        let offset = offset.unwrap_or(0);
        let limit = self.clamp_limit(limit, self.default_page);

        let rollups = self.db.with_reader(observations::annotation_rollups)?;
        let mut annotated: Vec<AnnotationDto> = rollups
            .into_iter()
            .map(|rollup| {
                let kind = heuristics::classify(&rollup);
                AnnotationDto {
                    entity_id: rollup.entity_id,
                    entity_name: rollup.entity_name,
                    entity_type: rollup.entity_type,
                    filename: rollup.filename,
                    line_number: rollup.line_number,
                    kind,
                    value_types: rollup.value_types,
                    total_observations: rollup.total_observations,
                }
            })
            .collect();
        annotated.sort_by(|a, b| {
            a.kind
                .rank()
                .cmp(&b.kind.rank())
                .then(b.total_observations.cmp(&a.total_observations))
                .then(a.entity_id.cmp(&b.entity_id))
        });

        let total = annotated.len() as i64;
        let page: Vec<AnnotationDto> = annotated
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        let returned = page.len();
        Ok(AnnotationsResponse {
            annotations: page,
            pagination: Page::new(offset, limit, total, returned),
        })
    }

    /// One ad-hoc statement with parameter binding. Multi-statement input
    /// is rejected by the store driver.
    pub fn adhoc(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>, QueryError> {
        if sql.trim().is_empty() {
            return Err(QueryError::MissingParameter { name: "query" });
        }
        let rows = self
            .db
            .with_writer(|conn| adhoc::run_query(conn, sql, params))
            .map_err(|e| QueryError::Invalid { reason: e.to_string() })?;
        Ok(rows.into_iter().map(Value::Object).collect())
    }
}
