//! V001: Initial schema — the five observation tables.
//! entities, value_observations, string_literals, object_shapes,
//! hof_relationships.

pub const MIGRATION_SQL: &str = r#"
-- Entities: one row per instrumented program point.
-- (filename, source_offset) is the natural key; counters and last_seen
-- advance on every repeated ingest. Rows are never deleted by the core.
CREATE TABLE IF NOT EXISTS entities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    source_offset INTEGER NOT NULL,
    entity_name TEXT,
    entity_type TEXT,
    line_number INTEGER,
    column_number INTEGER,
    observation_count INTEGER NOT NULL DEFAULT 1,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    UNIQUE(filename, source_offset)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_entities_filename ON entities(filename);
CREATE INDEX IF NOT EXISTS idx_entities_last_seen ON entities(last_seen DESC);
CREATE INDEX IF NOT EXISTS idx_entities_location
    ON entities(filename, line_number);

-- Value observations: concrete runtime values, deduplicated by content
-- hash within (entity, context).
CREATE TABLE IF NOT EXISTS value_observations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id INTEGER NOT NULL REFERENCES entities(id),
    value_type TEXT NOT NULL,
    literal_value TEXT,
    value_hash TEXT NOT NULL,
    context TEXT NOT NULL DEFAULT '',
    observation_count INTEGER NOT NULL DEFAULT 1,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    UNIQUE(entity_id, value_hash, context)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_values_entity_type_hash
    ON value_observations(entity_id, value_type, value_hash);
CREATE INDEX IF NOT EXISTS idx_values_last_seen
    ON value_observations(last_seen DESC);

-- String literals: enum-candidate strings recorded against their entity.
CREATE TABLE IF NOT EXISTS string_literals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id INTEGER NOT NULL REFERENCES entities(id),
    string_value TEXT NOT NULL,
    context TEXT NOT NULL DEFAULT '',
    observation_count INTEGER NOT NULL DEFAULT 1,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    UNIQUE(entity_id, string_value, context)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_literals_entity ON string_literals(entity_id);

-- Object shapes: canonical key-sorted type signatures.
CREATE TABLE IF NOT EXISTS object_shapes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    entity_id INTEGER NOT NULL REFERENCES entities(id),
    shape_signature TEXT NOT NULL,
    observation_count INTEGER NOT NULL DEFAULT 1,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    UNIQUE(entity_id, shape_signature)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_shapes_entity_signature
    ON object_shapes(entity_id, shape_signature);

-- HOF relationships: callback-parameter entity -> enclosing call.
CREATE TABLE IF NOT EXISTS hof_relationships (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    callback_entity_id INTEGER NOT NULL REFERENCES entities(id),
    callee_name TEXT NOT NULL,
    callee_arg_index INTEGER NOT NULL,
    observation_count INTEGER NOT NULL DEFAULT 1,
    first_seen INTEGER NOT NULL,
    last_seen INTEGER NOT NULL,
    UNIQUE(callback_entity_id, callee_name, callee_arg_index)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_hof_callee ON hof_relationships(callee_name);
"#;
