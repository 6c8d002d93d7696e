use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::db::{ProjectConfig, ProjectDb, ProjectLayout};

/// Load the project config JSON from disk for a given layout.
pub fn load_project_config(layout: &ProjectLayout) -> Result<ProjectConfig> {
    let config_json = fs::read_to_string(&layout.project_config_path).with_context(|| {
        format!("Failed to read project config at {}", layout.project_config_path.display())
    })?;
    let config: ProjectConfig =
        serde_json::from_str(&config_json).context("Failed to parse project config JSON")?;
    Ok(config)
}

/// Database path from the config; relative paths are taken from the project root.
pub fn resolve_db_path(layout: &ProjectLayout, config: &ProjectConfig) -> PathBuf {
    let config_db_path = Path::new(&config.db.path);
    if config_db_path.is_absolute() {
        config_db_path.to_path_buf()
    } else {
        layout.root.join(config_db_path)
    }
}

/// Resolve the DB path (respecting relative/absolute config) and open a ProjectDb.
pub fn open_project_db(layout: &ProjectLayout) -> Result<(ProjectConfig, PathBuf, ProjectDb)> {
    let config = load_project_config(layout)?;
    let db_path = resolve_db_path(layout, &config);
    let db = ProjectDb::open(&db_path)
        .with_context(|| format!("Failed to open project database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}

/// Create the project directories, write `config` and initialize the database.
///
/// An existing config is overwritten; an existing database is migrated in place.
pub fn init_project(layout: &ProjectLayout, config: &ProjectConfig) -> Result<()> {
    for dir in [&layout.meta_dir, &layout.inputs_dir, &layout.reports_dir] {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let json = serde_json::to_string_pretty(config)?;
    fs::write(&layout.project_config_path, json).with_context(|| {
        format!("Failed to write project config: {}", layout.project_config_path.display())
    })?;

    let db_path = resolve_db_path(layout, config);
    ProjectDb::open(&db_path).with_context(|| {
        format!("Failed to initialize project database at {}", db_path.display())
    })?;

    Ok(())
}
