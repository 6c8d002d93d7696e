use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::{Function, LocalType};

/// Lifecycle status of an ingest run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IngestRunStatus {
    /// Run row created, batch not persisted yet.
    Running,
    /// Every record built and every relation resolved.
    Succeeded,
    /// Some records failed or some references dangled; the rest is stored.
    Partial,
    /// The graph pass aborted (containment cycle); entities only.
    Failed,
}

impl IngestRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestRunStatus::Running => "running",
            IngestRunStatus::Succeeded => "succeeded",
            IngestRunStatus::Partial => "partial",
            IngestRunStatus::Failed => "failed",
        }
    }
}

impl FromStr for IngestRunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(IngestRunStatus::Running),
            "succeeded" => Ok(IngestRunStatus::Succeeded),
            "partial" => Ok(IngestRunStatus::Partial),
            "failed" => Ok(IngestRunStatus::Failed),
            other => Err(format!("unknown ingest run status '{other}'")),
        }
    }
}

/// Bookkeeping row for one processed batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestRunRecord {
    /// Display name of the input (usually the batch file name).
    pub input: String,
    /// SHA-256 of the input bytes, when known.
    pub input_hash: Option<String>,
    pub decoder: String,
    pub status: IngestRunStatus,
    pub functions: u32,
    pub types: u32,
    pub edges: u32,
    pub failures: u32,
    pub dangling: u32,
    pub started_at: String,
    pub finished_at: Option<String>,
}

impl IngestRunRecord {
    /// A fresh `running` record with zeroed counters.
    pub fn started(
        input: impl Into<String>,
        input_hash: Option<String>,
        decoder: impl Into<String>,
        started_at: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            input_hash,
            decoder: decoder.into(),
            status: IngestRunStatus::Running,
            functions: 0,
            types: 0,
            edges: 0,
            failures: 0,
            dangling: 0,
            started_at: started_at.into(),
            finished_at: None,
        }
    }
}

/// A persisted function with its row ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFunction {
    pub id: i64,
    pub run_id: i64,
    #[serde(flatten)]
    pub function: Function,
}

/// A persisted local type with its row ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredType {
    pub id: i64,
    pub run_id: i64,
    #[serde(flatten)]
    pub local_type: LocalType,
}

/// Number of stored rows per relation table for one run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationCounts {
    pub namespaces: u32,
    pub containment: u32,
    pub memberships: u32,
    pub type_dependencies: u32,
    pub function_dependencies: u32,
}

impl RelationCounts {
    pub fn total(&self) -> u32 {
        self.namespaces
            + self.containment
            + self.memberships
            + self.type_dependencies
            + self.function_dependencies
    }
}
