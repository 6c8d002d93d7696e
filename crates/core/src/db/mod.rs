//! Project database integration and project layout definitions.
//!
//! This module wraps a SQLite database storing:
//! - Ingest runs (which batch was processed, when, and how it went)
//! - Normalized functions and classified local types per run
//! - The five relation tables linking them
//!
//! Alongside it:
//! - `ProjectConfig` / `DbConfig`: serializable project metadata.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectContext`: layout + config + open database in one value.

mod config;
mod context;
mod layout;
mod models;
mod project_db;
mod util;

pub use config::{DbConfig, ProjectConfig};
pub use context::ProjectContext;
pub use layout::ProjectLayout;
pub use models::{IngestRunRecord, IngestRunStatus, RelationCounts, StoredFunction, StoredType};
pub use project_db::{DbError, DbResult, ProjectDb, RunSink, CURRENT_SCHEMA_VERSION};
pub use util::{init_project, load_project_config, open_project_db, resolve_db_path};
