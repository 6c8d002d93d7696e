use crate::commands::{open_project_db, print_dir_status, select_decoder};
use crate::{canonicalize_or_current, infer_project_name};
use anyhow::{Context, Result};
use serde::Serialize;
use symgraph_core::db::{init_project, IngestRunStatus, ProjectConfig, ProjectLayout};
use symgraph_core::services::decoders::default_decoder_registry;

#[derive(Serialize)]
pub struct ProjectInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub default_decoder: Option<String>,
    pub available_decoders: Vec<String>,
    pub layout: ProjectInfoLayout,
    pub runs: usize,
    pub latest_run: Option<LatestRunInfo>,
}

#[derive(Serialize)]
pub struct ProjectInfoLayout {
    pub meta_dir: String,
    pub inputs_dir: String,
    pub reports_dir: String,
}

#[derive(Serialize)]
pub struct LatestRunInfo {
    pub id: i64,
    pub input: String,
    pub status: IngestRunStatus,
    pub started_at: String,
}

/// Initialize a new project at `root`.
pub fn init_project_command(
    root: &str,
    name: Option<String>,
    default_decoder: Option<String>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    // Derive project name if not provided.
    let project_name = match name {
        Some(n) => n,
        None => infer_project_name(&root_path),
    };

    if let Some(decoder) = default_decoder.as_deref() {
        select_decoder(&default_decoder_registry(), decoder)?;
    }

    let config = ProjectConfig::new(&project_name, layout.db_path_relative_string())
        .with_default_decoder(default_decoder);
    init_project(&layout, &config)?;

    println!("Initialized symgraph project:");
    println!("  Name: {}", project_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.project_config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Inputs dir: {}", layout.inputs_dir.display());
    println!("  Reports dir: {}", layout.reports_dir.display());
    if let Some(decoder) = &config.default_decoder {
        println!("  Default decoder: {}", decoder);
    }

    Ok(())
}

/// Show basic information about an existing project.
pub fn project_info_command(root: &str, json: bool) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = ProjectLayout::new(&root_path);

    let (config, _db_path, db) = open_project_db(&layout)?;
    let runs = db.list_ingest_runs().context("Failed to list ingest runs")?;
    let available_decoders = default_decoder_registry().names();
    let latest_run = runs.last().map(|(id, rec)| LatestRunInfo {
        id: *id,
        input: rec.input.clone(),
        status: rec.status,
        started_at: rec.started_at.clone(),
    });

    if json {
        let snapshot = ProjectInfoSnapshot {
            name: config.name.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.project_config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.db.path.clone(),
            default_decoder: config.default_decoder.clone(),
            available_decoders,
            layout: ProjectInfoLayout {
                meta_dir: layout.meta_dir.display().to_string(),
                inputs_dir: layout.inputs_dir.display().to_string(),
                reports_dir: layout.reports_dir.display().to_string(),
            },
            runs: runs.len(),
            latest_run,
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("symgraph Project Info");
    println!("=====================");
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.project_config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!("Default decoder: {}", config.default_decoder.as_deref().unwrap_or("(none)"));
    println!("Available decoders: {}", available_decoders.join(", "));
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.symgraph)", &layout.meta_dir);
    print_dir_status("Inputs dir", &layout.inputs_dir);
    print_dir_status("Reports dir", &layout.reports_dir);
    println!();

    println!("Ingest runs: {}", runs.len());
    if let Some(latest) = latest_run {
        println!(
            "Latest: #{} {} ({}, started {})",
            latest.id,
            latest.input,
            latest.status.as_str(),
            latest.started_at
        );
    }

    Ok(())
}
