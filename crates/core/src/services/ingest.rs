use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::db::{DbError, IngestRunRecord, IngestRunStatus, ProjectContext};
use crate::model::RawBatch;
use crate::services::decoders::SymbolDecoder;
use crate::services::entities::{build_entities, EntityBatch};
use crate::services::graph::{
    build_graph, DanglingReference, DependencyGraph, GraphBuild, GraphError,
};

/// Receiver of finalized batches (e.g. the project database).
///
/// Entities handed over are complete and immutable; every edge of `graph`
/// references an entity of `batch`. `graph` is `None` when the graph pass
/// aborted and only the entities are valid.
pub trait EntitySink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn accept(
        &mut self,
        batch: &EntityBatch,
        graph: Option<&DependencyGraph>,
    ) -> Result<(), Self::Error>;
}

/// Both passes applied to one raw batch, nothing persisted.
#[derive(Debug, Clone)]
pub struct ProcessedBatch {
    pub entities: EntityBatch,
    pub graph: Result<GraphBuild, GraphError>,
}

impl ProcessedBatch {
    pub fn graph(&self) -> Option<&DependencyGraph> {
        self.graph.as_ref().ok().map(|b| &b.graph)
    }

    pub fn dangling(&self) -> &[DanglingReference] {
        self.graph.as_ref().map(|b| b.dangling.as_slice()).unwrap_or(&[])
    }

    /// Status an ingest of this batch ends with.
    pub fn status(&self) -> IngestRunStatus {
        match &self.graph {
            Err(_) => IngestRunStatus::Failed,
            Ok(build) if build.dangling.is_empty() && self.entities.failures().is_empty() => {
                IngestRunStatus::Succeeded
            }
            Ok(_) => IngestRunStatus::Partial,
        }
    }
}

/// Run the entity pass, then the graph pass over its complete output.
pub fn process_batch<D>(raw: &RawBatch, decoder: &D) -> ProcessedBatch
where
    D: SymbolDecoder + ?Sized,
{
    let entities = build_entities(raw, decoder, decoder);
    let graph = build_graph(&entities);
    ProcessedBatch { entities, graph }
}

/// Where a batch came from, for the run ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestSource {
    pub name: String,
    pub hash: Option<String>,
}

/// Summary of one ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub run_id: i64,
    pub input: String,
    pub decoder: String,
    pub status: IngestRunStatus,
    pub functions: usize,
    pub types: usize,
    pub edges: usize,
    /// Record-level failures (decode/classification), one message each.
    pub failures: Vec<String>,
    pub dangling: Vec<DanglingReference>,
    /// Type names along the containment cycle, if the graph pass aborted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Database error during ingest: {0}")]
    Db(#[from] DbError),
}

/// Ties a project context and a decoder together to process and persist batches.
pub struct IngestRunner<'a> {
    pub ctx: &'a ProjectContext,
    pub decoder: &'a dyn SymbolDecoder,
}

impl<'a> IngestRunner<'a> {
    pub fn run(&self, source: &IngestSource, raw: &RawBatch) -> Result<IngestReport, IngestError> {
        let mut record = IngestRunRecord::started(
            source.name.clone(),
            source.hash.clone(),
            self.decoder.name(),
            Utc::now().to_rfc3339(),
        );
        let run_id = self.ctx.db.insert_ingest_run(&record)?;
        info!(run_id, input = %source.name, records = raw.len(), "ingest started");

        let processed = process_batch(raw, self.decoder);
        let graph = processed.graph();

        let mut sink = self.ctx.db.sink_for_run(run_id);
        if let Err(err) = sink.accept(&processed.entities, graph) {
            record.status = IngestRunStatus::Failed;
            record.finished_at = Some(Utc::now().to_rfc3339());
            // The sink error is what gets returned.
            if let Err(finish_err) = self.ctx.db.finish_ingest_run(run_id, &record) {
                warn!(run_id, error = %finish_err, "failed to mark ingest run as failed");
            }
            return Err(err.into());
        }

        let cycle = match &processed.graph {
            Err(GraphError::ContainmentCycle { names, .. }) => {
                warn!(run_id, "graph not stored: containment cycle");
                Some(names.clone())
            }
            Ok(_) => None,
        };

        record.status = processed.status();
        record.functions = processed.entities.function_count() as u32;
        record.types = processed.entities.type_count() as u32;
        record.edges = graph.map(DependencyGraph::edge_count).unwrap_or(0) as u32;
        record.failures = processed.entities.failures().len() as u32;
        record.dangling = processed.dangling().len() as u32;
        record.finished_at = Some(Utc::now().to_rfc3339());
        self.ctx.db.finish_ingest_run(run_id, &record)?;
        info!(run_id, status = record.status.as_str(), "ingest finished");

        Ok(IngestReport {
            run_id,
            input: source.name.clone(),
            decoder: record.decoder.clone(),
            status: record.status,
            functions: record.functions as usize,
            types: record.types as usize,
            edges: record.edges as usize,
            failures: processed.entities.failures().iter().map(ToString::to_string).collect(),
            dangling: processed.dangling().to_vec(),
            cycle,
        })
    }
}
