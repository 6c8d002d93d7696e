use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use symgraph_core::db::{IngestRunStatus, ProjectContext};
use symgraph_core::model::RawBatch;
use symgraph_core::services::decoders::default_decoder_registry;
use symgraph_core::services::ingest::{IngestReport, IngestRunner, IngestSource};
use tracing::info;

use crate::commands::select_decoder;
use crate::{canonicalize_or_current, sha256_bytes};

/// On-disk encoding of a raw batch file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Json,
    Yaml,
}

impl BatchFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        match ext.to_ascii_lowercase().as_str() {
            "json" => Ok(BatchFormat::Json),
            "yaml" | "yml" => Ok(BatchFormat::Yaml),
            other => Err(anyhow!(
                "Unsupported batch file extension '{}' for {} (expected json, yaml or yml)",
                other,
                path.display()
            )),
        }
    }
}

/// Parse a raw batch document.
pub fn parse_raw_batch(body: &str, format: BatchFormat) -> Result<RawBatch> {
    let batch = match format {
        BatchFormat::Json => serde_json::from_str(body).context("Failed to parse JSON batch")?,
        BatchFormat::Yaml => serde_yaml::from_str(body).context("Failed to parse YAML batch")?,
    };
    Ok(batch)
}

/// Resolve `file` against the project root unless it is absolute.
fn resolve_input_path(root: &Path, file: &str) -> std::path::PathBuf {
    let input = Path::new(file);
    if input.is_absolute() {
        input.to_path_buf()
    } else {
        root.join(input)
    }
}

/// Process one batch file and persist it as a new ingest run.
pub fn ingest_command(root: &str, file: &str, decoder: Option<String>, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let ctx = ProjectContext::from_root(&root_path)?;

    let decoder_name = ctx.decoder_name(decoder.as_deref());
    let registry = default_decoder_registry();
    let decoder = select_decoder(&registry, &decoder_name)?;

    let input_path = resolve_input_path(&root_path, file);
    if !input_path.exists() {
        return Err(anyhow!("Batch file does not exist: {}", input_path.display()));
    }
    let format = BatchFormat::from_path(&input_path)?;
    let bytes = fs::read(&input_path)
        .with_context(|| format!("Failed to read batch file {}", input_path.display()))?;
    let hash = sha256_bytes(&bytes);
    let body = String::from_utf8(bytes)
        .with_context(|| format!("Batch file is not UTF-8: {}", input_path.display()))?;
    let raw = parse_raw_batch(&body, format)
        .with_context(|| format!("Invalid batch file {}", input_path.display()))?;

    let input_name =
        input_path.file_name().and_then(|os| os.to_str()).unwrap_or(file).to_string();
    let source = IngestSource { name: input_name.clone(), hash: Some(hash) };

    let runner = IngestRunner { ctx: &ctx, decoder };
    let report = runner.run(&source, &raw).context("Ingest failed")?;

    fs::create_dir_all(&ctx.layout.reports_dir).with_context(|| {
        format!("Failed to create reports dir: {}", ctx.layout.reports_dir.display())
    })?;
    let report_path = ctx.layout.report_path(&input_name);
    fs::write(&report_path, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write ingest report {}", report_path.display()))?;
    info!(report = %report_path.display(), "ingest report written");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        println!("  Report: {}", report_path.display());
    }

    if report.status == IngestRunStatus::Failed {
        let cycle = report.cycle.as_ref().map(|names| names.join(" -> ")).unwrap_or_default();
        return Err(anyhow!(
            "Ingest run {} failed: containment cycle {}; relations were not stored",
            report.run_id,
            cycle
        ));
    }

    Ok(())
}

fn print_report(report: &IngestReport) {
    println!("Ingest run #{} ({}):", report.run_id, report.status.as_str());
    println!("  Input: {}", report.input);
    println!("  Decoder: {}", report.decoder);
    println!("  Functions: {}", report.functions);
    println!("  Types: {}", report.types);
    println!("  Relations: {}", report.edges);

    if !report.failures.is_empty() {
        println!("  Skipped records ({}):", report.failures.len());
        for failure in &report.failures {
            println!("    - {}", failure);
        }
    }
    if !report.dangling.is_empty() {
        println!("  Dangling references ({}):", report.dangling.len());
        for dangling in &report.dangling {
            println!("    - {}", dangling);
        }
    }
    if let Some(cycle) = &report.cycle {
        println!("  Containment cycle: {}", cycle.join(" -> "));
    }
}
