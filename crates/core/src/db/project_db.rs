use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::db::{IngestRunRecord, IngestRunStatus, RelationCounts, StoredFunction, StoredType};
use crate::model::{Function, FunctionId, LocalType, TypeCategory, TypeId};
use crate::services::entities::EntityBatch;
use crate::services::graph::{DependencyGraph, OwnerRef};
use crate::services::ingest::EntitySink;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 3;

/// Error type for project database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// JSON encoding of a structured column failed.
    #[error("JSON column encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A relation edge pointed at an entity that is not part of the batch.
    #[error("Relation references {0}, which is not in the stored batch")]
    UnknownEntity(String),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed project database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Writing one ingest batch (entities + relations) per run, atomically.
/// - Small read helpers used by the CLI and tests.
#[derive(Debug)]
pub struct ProjectDb {
    conn: Connection,
}

impl ProjectDb {
    /// Open (or create) a project database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Sink that writes batches under the given run id.
    pub fn sink_for_run(&self, run_id: i64) -> RunSink<'_> {
        RunSink { db: self, run_id }
    }

    /// Insert an ingest run record and return its row id.
    pub fn insert_ingest_run(&self, record: &IngestRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO ingest_runs (input, input_hash, decoder, status, functions, types, edges, failures, dangling, started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                record.input,
                record.input_hash,
                record.decoder,
                record.status.as_str(),
                record.functions,
                record.types,
                record.edges,
                record.failures,
                record.dangling,
                record.started_at,
                record.finished_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite status, counters and finish time of an existing run.
    ///
    /// Returns the number of rows affected.
    pub fn finish_ingest_run(&self, run_id: i64, record: &IngestRunRecord) -> DbResult<usize> {
        let affected = self.conn.execute(
            r#"
            UPDATE ingest_runs
            SET status = ?1, functions = ?2, types = ?3, edges = ?4, failures = ?5, dangling = ?6, finished_at = ?7
            WHERE id = ?8
            "#,
            params![
                record.status.as_str(),
                record.functions,
                record.types,
                record.edges,
                record.failures,
                record.dangling,
                record.finished_at,
                run_id
            ],
        )?;
        Ok(affected)
    }

    /// List ingest runs (ordered by id) with their row ids.
    pub fn list_ingest_runs(&self) -> DbResult<Vec<(i64, IngestRunRecord)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, input, input_hash, decoder, status, functions, types, edges, failures, dangling, started_at, finished_at
            FROM ingest_runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(4)?;
            let status = status.parse::<IngestRunStatus>().map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into())
            })?;
            Ok((
                row.get(0)?,
                IngestRunRecord {
                    input: row.get(1)?,
                    input_hash: row.get(2)?,
                    decoder: row.get(3)?,
                    status,
                    functions: row.get(5)?,
                    types: row.get(6)?,
                    edges: row.get(7)?,
                    failures: row.get(8)?,
                    dangling: row.get(9)?,
                    started_at: row.get(10)?,
                    finished_at: row.get(11)?,
                },
            ))
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Id of the most recent ingest run, if any.
    pub fn latest_run_id(&self) -> DbResult<Option<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM ingest_runs ORDER BY id DESC LIMIT 1")?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    /// Persist one entity batch (and its graph, if the graph pass succeeded).
    ///
    /// Everything is written in a single transaction; arena ids are remapped
    /// to row ids on the way in.
    pub fn insert_batch(
        &self,
        run_id: i64,
        batch: &EntityBatch,
        graph: Option<&DependencyGraph>,
    ) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let mut type_rows = Vec::with_capacity(batch.type_count());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO local_types (run_id, source_id, name, e_type)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for (_, t) in batch.types() {
                stmt.execute(params![run_id, t.source_id, t.name, t.category.as_str()])?;
                type_rows.push(tx.last_insert_rowid());
            }
        }

        let mut function_rows = Vec::with_capacity(batch.function_count());
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO functions (run_id, source_id, name, owner_name, return_type, args_type, args_name, conv_call)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for (_, f) in batch.functions() {
                stmt.execute(params![
                    run_id,
                    f.source_id,
                    f.name,
                    f.owner_name,
                    serde_json::to_string(&f.return_type)?,
                    serde_json::to_string(&f.arg_types)?,
                    serde_json::to_string(&f.arg_names)?,
                    serde_json::to_string(&f.calling_convention)?,
                ])?;
                function_rows.push(tx.last_insert_rowid());
            }
        }

        if let Some(graph) = graph {
            let type_row = |id: TypeId| {
                type_rows
                    .get(id.index())
                    .copied()
                    .ok_or_else(|| DbError::UnknownEntity(id.to_string()))
            };
            let function_row = |id: FunctionId| {
                function_rows
                    .get(id.index())
                    .copied()
                    .ok_or_else(|| DbError::UnknownEntity(id.to_string()))
            };

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO link_namespace (run_id, id_local_type, namespace) VALUES (?1, ?2, ?3)",
                )?;
                for link in &graph.namespaces {
                    stmt.execute(params![run_id, type_row(link.ty)?, link.namespace])?;
                }
            }
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO link_local_type (run_id, id_parent, id_child) VALUES (?1, ?2, ?3)",
                )?;
                for link in &graph.containment {
                    stmt.execute(params![run_id, type_row(link.parent)?, type_row(link.child)?])?;
                }
            }
            {
                let mut stmt = tx.prepare(
                    r#"
                    INSERT INTO link_function (run_id, owner_name, id_local_type, id_function)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                )?;
                for link in &graph.memberships {
                    let owner_type = match &link.owner {
                        OwnerRef::Type(id) => Some(type_row(*id)?),
                        OwnerRef::Namespace(_) => None,
                    };
                    stmt.execute(params![
                        run_id,
                        link.owner_name,
                        owner_type,
                        function_row(link.function)?
                    ])?;
                }
            }
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO dep_local_type (run_id, id_local_type, id_depend) VALUES (?1, ?2, ?3)",
                )?;
                for dep in &graph.type_dependencies {
                    stmt.execute(params![run_id, type_row(dep.ty)?, type_row(dep.depends_on)?])?;
                }
            }
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO dep_function (run_id, id_function, id_local_type) VALUES (?1, ?2, ?3)",
                )?;
                for dep in &graph.function_dependencies {
                    stmt.execute(params![run_id, function_row(dep.function)?, type_row(dep.ty)?])?;
                }
            }
        }

        tx.commit()?;
        info!(
            run_id,
            types = type_rows.len(),
            functions = function_rows.len(),
            edges = graph.map(DependencyGraph::edge_count).unwrap_or(0),
            "batch persisted"
        );
        Ok(())
    }

    /// Functions stored for a run (ordered by row id).
    pub fn list_functions(&self, run_id: i64) -> DbResult<Vec<StoredFunction>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, run_id, source_id, name, owner_name, return_type, args_type, args_name, conv_call
            FROM functions
            WHERE run_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok(StoredFunction {
                id: row.get(0)?,
                run_id: row.get(1)?,
                function: Function {
                    source_id: row.get(2)?,
                    name: row.get(3)?,
                    owner_name: row.get(4)?,
                    return_type: json_column(row, 5)?,
                    arg_types: json_column(row, 6)?,
                    arg_names: json_column(row, 7)?,
                    calling_convention: json_column(row, 8)?,
                },
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Local types stored for a run (ordered by row id).
    pub fn list_local_types(&self, run_id: i64) -> DbResult<Vec<StoredType>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, run_id, source_id, name, e_type
            FROM local_types
            WHERE run_id = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            let e_type: String = row.get(4)?;
            let category = TypeCategory::parse(&e_type).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    Type::Text,
                    format!("unknown type category '{e_type}'").into(),
                )
            })?;
            Ok(StoredType {
                id: row.get(0)?,
                run_id: row.get(1)?,
                local_type: LocalType { source_id: row.get(2)?, name: row.get(3)?, category },
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Row counts of the five relation tables for a run.
    pub fn relation_counts(&self, run_id: i64) -> DbResult<RelationCounts> {
        let count = |table: &str| -> DbResult<u32> {
            let sql = format!("SELECT COUNT(*) FROM {table} WHERE run_id = ?1");
            Ok(self.conn.query_row(&sql, params![run_id], |row| row.get(0))?)
        };
        Ok(RelationCounts {
            namespaces: count("link_namespace")?,
            containment: count("link_local_type")?,
            memberships: count("link_function")?,
            type_dependencies: count("dep_local_type")?,
            function_dependencies: count("dep_function")?,
        })
    }
}

/// [`EntitySink`] writing into a [`ProjectDb`] under one ingest run.
pub struct RunSink<'a> {
    db: &'a ProjectDb,
    run_id: i64,
}

impl RunSink<'_> {
    pub fn run_id(&self) -> i64 {
        self.run_id
    }
}

impl EntitySink for RunSink<'_> {
    type Error = DbError;

    fn accept(
        &mut self,
        batch: &EntityBatch,
        graph: Option<&DependencyGraph>,
    ) -> Result<(), Self::Error> {
        self.db.insert_batch(self.run_id, batch, graph)
    }
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let body: String = row.get(idx)?;
    serde_json::from_str(&body)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: ingest_runs
/// - 2: local_types, functions
/// - 3: relation tables (link_namespace, link_function, link_local_type,
///   dep_local_type, dep_function)
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let mut current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS ingest_runs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                input       TEXT NOT NULL,
                input_hash  TEXT,
                decoder     TEXT NOT NULL,
                status      TEXT NOT NULL,
                functions   INTEGER NOT NULL DEFAULT 0,
                types       INTEGER NOT NULL DEFAULT 0,
                edges       INTEGER NOT NULL DEFAULT 0,
                failures    INTEGER NOT NULL DEFAULT 0,
                dangling    INTEGER NOT NULL DEFAULT 0,
                started_at  TEXT NOT NULL,
                finished_at TEXT
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
        current_version = 1;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS local_types (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id    INTEGER NOT NULL REFERENCES ingest_runs(id),
                source_id INTEGER NOT NULL,
                name      TEXT NOT NULL,
                e_type    TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS functions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id      INTEGER NOT NULL REFERENCES ingest_runs(id),
                source_id   INTEGER NOT NULL,
                name        TEXT NOT NULL,
                owner_name  TEXT,
                return_type TEXT NOT NULL,
                args_type   TEXT NOT NULL,
                args_name   TEXT NOT NULL,
                conv_call   TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_local_types_run ON local_types(run_id);
            CREATE INDEX IF NOT EXISTS idx_functions_run ON functions(run_id);

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
        current_version = 2;
    }

    if current_version < 3 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS link_namespace (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id        INTEGER NOT NULL,
                id_local_type INTEGER NOT NULL REFERENCES local_types(id),
                namespace     TEXT
            );
            CREATE TABLE IF NOT EXISTS link_function (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id        INTEGER NOT NULL,
                owner_name    TEXT NOT NULL,
                id_local_type INTEGER REFERENCES local_types(id),
                id_function   INTEGER NOT NULL REFERENCES functions(id)
            );
            CREATE TABLE IF NOT EXISTS link_local_type (
                id        INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id    INTEGER NOT NULL,
                id_parent INTEGER NOT NULL REFERENCES local_types(id),
                id_child  INTEGER NOT NULL REFERENCES local_types(id)
            );
            CREATE TABLE IF NOT EXISTS dep_local_type (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id        INTEGER NOT NULL,
                id_local_type INTEGER NOT NULL REFERENCES local_types(id),
                id_depend     INTEGER NOT NULL REFERENCES local_types(id)
            );
            CREATE TABLE IF NOT EXISTS dep_function (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id        INTEGER NOT NULL,
                id_function   INTEGER NOT NULL REFERENCES functions(id),
                id_local_type INTEGER NOT NULL REFERENCES local_types(id)
            );

            PRAGMA user_version = 3;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}
