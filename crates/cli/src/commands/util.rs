use std::path::Path;

use anyhow::{anyhow, Context, Result};
use symgraph_core::db::{ProjectDb, ProjectLayout};
use symgraph_core::services::decoders::{DecoderRegistry, SymbolDecoder};

/// Resolve the DB path (respecting relative/absolute config) and open a ProjectDb (delegates to core helper).
pub fn open_project_db(
    layout: &ProjectLayout,
) -> Result<(symgraph_core::db::ProjectConfig, std::path::PathBuf, ProjectDb)> {
    symgraph_core::db::open_project_db(layout)
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}

/// Look a decoder up by name, listing the known ones on failure.
pub fn select_decoder<'r>(
    registry: &'r DecoderRegistry,
    name: &str,
) -> Result<&'r dyn SymbolDecoder> {
    registry.get(name).ok_or_else(|| {
        anyhow!("Unknown decoder '{}'. Available: {}", name, registry.names().join(", "))
    })
}

/// The explicit run id, or the latest run when none was given.
///
/// `Ok(None)` means the project has no ingest runs yet.
pub fn resolve_run_id(db: &ProjectDb, run: Option<i64>) -> Result<Option<i64>> {
    match run {
        Some(id) => {
            let known = db
                .list_ingest_runs()
                .context("Failed to list ingest runs")?
                .iter()
                .any(|(run_id, _)| *run_id == id);
            if !known {
                return Err(anyhow!("No ingest run with id {}", id));
            }
            Ok(Some(id))
        }
        None => db.latest_run_id().context("Failed to look up latest ingest run"),
    }
}
