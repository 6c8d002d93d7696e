use anyhow::{Context, Result};
use serde::Serialize;
use symgraph_core::db::{IngestRunRecord, ProjectLayout, RelationCounts};

use crate::canonicalize_or_current;
use crate::commands::open_project_db;

#[derive(Debug, Serialize, Clone)]
pub struct IngestRunInfo {
    pub id: i64,
    #[serde(flatten)]
    pub record: IngestRunRecord,
    pub relations: RelationCounts,
}

/// List ingest runs with their stored relation counts.
pub fn list_runs_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (_config, _db_path, db) = open_project_db(&layout)?;
    let mut runs = Vec::new();
    for (id, record) in db.list_ingest_runs().context("Failed to list ingest runs")? {
        let relations = db
            .relation_counts(id)
            .with_context(|| format!("Failed to count relations of run {id}"))?;
        runs.push(IngestRunInfo { id, record, relations });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    println!("Ingest runs:");
    if runs.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for run in &runs {
        let rec = &run.record;
        println!(
            "- #{} {} [{}] decoder={} functions={} types={} relations={} failures={} dangling={} started={}",
            run.id,
            rec.input,
            rec.status.as_str(),
            rec.decoder,
            rec.functions,
            rec.types,
            run.relations.total(),
            rec.failures,
            rec.dangling,
            rec.started_at
        );
    }

    Ok(())
}
