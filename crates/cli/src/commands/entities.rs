use anyhow::{Context, Result};
use symgraph_core::db::{ProjectLayout, StoredFunction};

use crate::canonicalize_or_current;
use crate::commands::{open_project_db, resolve_run_id};

/// List functions stored by an ingest run (latest when `run` is `None`).
pub fn list_functions_command(root: &str, run: Option<i64>, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (_config, _db_path, db) = open_project_db(&layout)?;
    let functions = match resolve_run_id(&db, run)? {
        Some(run_id) => db.list_functions(run_id).context("Failed to list functions")?,
        None => Vec::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&functions)?);
        return Ok(());
    }

    println!("Functions:");
    if functions.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for stored in &functions {
        println!("- {}", signature_line(stored));
    }

    Ok(())
}

/// List local types stored by an ingest run (latest when `run` is `None`).
pub fn list_types_command(root: &str, run: Option<i64>, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (_config, _db_path, db) = open_project_db(&layout)?;
    let types = match resolve_run_id(&db, run)? {
        Some(run_id) => db.list_local_types(run_id).context("Failed to list local types")?,
        None => Vec::new(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&types)?);
        return Ok(());
    }

    println!("Types:");
    if types.is_empty() {
        println!("(none)");
        return Ok(());
    }
    for stored in &types {
        let t = &stored.local_type;
        println!("- {} {} (source id: {})", t.category, t.name, t.source_id);
    }

    Ok(())
}

/// `owner::name(type name, ...) -> ret [cc] (source id: N)`
pub fn signature_line(stored: &StoredFunction) -> String {
    let f = &stored.function;
    let qualified = match &f.owner_name {
        Some(owner) => format!("{owner}::{}", f.name),
        None => f.name.clone(),
    };
    let args = f
        .arg_types
        .iter()
        .zip(&f.arg_names)
        .map(|(ty, name)| format!("{} {}", ty.decl, name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{}({}) -> {} [{}] (source id: {})",
        qualified,
        args,
        f.return_type.decl,
        f.calling_convention.as_str(),
        f.source_id
    )
}
