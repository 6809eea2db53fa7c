//! Batch ingest pipeline.
//!
//! One batch = one immediate transaction through the serialized writer.
//! Partial failure aborts the whole batch; replaying an identical batch
//! increments counters without creating rows.

pub mod classify;
pub mod filters;

use rusqlite::Transaction;
use serde_json::Value;
use typetrace_core::errors::IngestError;
use typetrace_core::model::{BatchRecord, ObservationMetadata, ValueKind};
use typetrace_storage::connection::writer::with_immediate_transaction;
use typetrace_storage::queries::{entities, hof, literals, observations, shapes};
use typetrace_storage::{now_ts, Database};

/// What one batch did to the store.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct IngestSummary {
    pub records: usize,
    pub values: usize,
}

/// Decode a raw JSON body into batch records. Anything that is not a JSON
/// array of tuple/keyed records is a `MalformedBatch`.
pub fn parse_batch(body: &Value) -> Result<Vec<BatchRecord>, IngestError> {
    if !body.is_array() {
        return Err(IngestError::MalformedBatch {
            reason: "body is not a JSON array".to_string(),
        });
    }
    serde_json::from_value(body.clone())
        .map_err(|e| IngestError::MalformedBatch { reason: e.to_string() })
}

/// Apply one batch transactionally. Returns what was written.
pub fn ingest_batch(db: &Database, batch: Vec<BatchRecord>) -> Result<IngestSummary, IngestError> {
    if batch.is_empty() {
        return Ok(IngestSummary::default());
    }
    let now = now_ts();
    let summary = db.with_writer(|conn| {
        with_immediate_transaction(conn, |tx| {
            let mut summary = IngestSummary::default();
            for record in &batch {
                apply_record(tx, record, now, &mut summary)?;
            }
            Ok(summary)
        })
    })?;
    tracing::debug!(records = summary.records, values = summary.values, "batch ingested");
    Ok(summary)
}

fn apply_record(
    tx: &Transaction<'_>,
    record: &BatchRecord,
    now: i64,
    summary: &mut IngestSummary,
) -> Result<(), typetrace_core::errors::StorageError> {
    let (filename, offset, values, metadata) = record.clone().into_parts();

    let entity_id = entities::upsert_entity(tx, &filename, offset as i64, now)?;
    summary.records += 1;

    if metadata.function_name.is_some()
        || metadata.line_number.is_some()
        || metadata.column_number.is_some()
    {
        entities::update_entity_metadata(
            tx,
            entity_id,
            classify::derive_entity_name(&metadata).as_deref(),
            metadata.context.as_deref(),
            metadata.line_number.map(i64::from),
            metadata.column_number.map(i64::from),
        )?;
    }

    if let (Some(callee_name), Some(callee_arg_index)) =
        (metadata.callee_name.as_deref(), metadata.callee_arg_index)
    {
        hof::upsert_relationship(tx, entity_id, callee_name, i64::from(callee_arg_index), now)?;
    }

    for entry in &values {
        apply_value(tx, entity_id, &entry.0, &metadata, now)?;
        summary.values += 1;
    }
    Ok(())
}

fn apply_value(
    tx: &Transaction<'_>,
    entity_id: i64,
    value: &Value,
    metadata: &ObservationMetadata,
    now: i64,
) -> Result<(), typetrace_core::errors::StorageError> {
    let kind = ValueKind::of_surrogate(value);
    let literal = classify::capped_literal(value);
    let hash = classify::value_hash(&literal);
    let context = classify::enriched_context(metadata);

    observations::upsert_observation(tx, entity_id, kind.label(), &literal, &hash, &context, now)?;

    if kind == ValueKind::String {
        if let Some(s) = value.as_str() {
            if filters::is_enum_candidate(s) {
                literals::upsert_literal(tx, entity_id, s, &context, now)?;
            }
        }
    }

    if kind == ValueKind::Object {
        if let Some(object) = value.as_object() {
            if let Some(signature) = filters::shape_signature(object) {
                shapes::upsert_shape(tx, entity_id, &signature, now)?;
            }
        }
    }
    Ok(())
}
