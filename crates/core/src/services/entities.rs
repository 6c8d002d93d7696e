//! Entity pass: turn raw records into immutable `Function` / `LocalType`
//! entities, index them by name and remember the relation hints each record
//! carried for the graph pass.

use std::collections::{BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{
    align_argument_names, classify_declaration, normalize_name, ClassificationError,
    SCOPE_SEPARATOR,
};
use crate::model::{
    EntityRef, Function, FunctionId, LocalType, RawBatch, RawFunctionRecord, RawTypeRecord,
    TypeId,
};
use crate::services::decoders::{DecodeError, FieldNameDecoder, TypeDecoder};

/// Per-record failure. The record is left out of the batch; others continue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Failed to decode function {raw_name:?} (source id {source_id}): {source}")]
    Decode {
        source_id: i64,
        raw_name: String,
        #[source]
        source: DecodeError,
    },
    #[error("Failed to classify type {name:?} (source id {source_id}): {source}")]
    Classification {
        source_id: i64,
        name: String,
        #[source]
        source: ClassificationError,
    },
}

/// Unresolved relation carried by a record, resolved by the graph pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hint", rename_all = "snake_case")]
pub enum RelationHint {
    /// Enclosing namespace of a type (`None` = global).
    Namespace { ty: TypeId, namespace: Option<String> },
    /// `child` is lexically nested in the type named `parent`.
    ContainedIn { child: TypeId, parent: String },
    /// `function` is declared in the scope named `owner`.
    Owner { function: FunctionId, owner: String },
    /// `ty` references the type named `target` through a member.
    TypeReference { ty: TypeId, target: String },
    /// `function` references the type named `target` in its signature.
    FunctionReference { function: FunctionId, target: String },
}

impl RelationHint {
    pub fn source(&self) -> EntityRef {
        match self {
            RelationHint::Namespace { ty, .. }
            | RelationHint::ContainedIn { child: ty, .. }
            | RelationHint::TypeReference { ty, .. } => EntityRef::Type(*ty),
            RelationHint::Owner { function, .. }
            | RelationHint::FunctionReference { function, .. } => EntityRef::Function(*function),
        }
    }
}

/// Output of the entity pass.
///
/// Entities sit in arenas indexed by their id. The batch is complete once
/// returned from [`build_entities`]; the graph pass only borrows it.
#[derive(Debug, Clone, Default)]
pub struct EntityBatch {
    functions: Vec<Function>,
    types: Vec<LocalType>,
    type_index: HashMap<String, TypeId>,
    namespaces: BTreeSet<String>,
    hints: Vec<RelationHint>,
    failures: Vec<RecordError>,
}

impl EntityBatch {
    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions.iter().enumerate().map(|(idx, f)| (FunctionId(idx as u32), f))
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &LocalType)> {
        self.types.iter().enumerate().map(|(idx, t)| (TypeId(idx as u32), t))
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    pub fn local_type(&self, id: TypeId) -> Option<&LocalType> {
        self.types.get(id.index())
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Look a type up by bare, namespace-qualified or containment-qualified
    /// name (`Outer::Inner`, `ns::Outer::Inner`).
    pub fn lookup_type(&self, name: &str) -> Option<TypeId> {
        self.type_index.get(name).copied()
    }

    /// Whether `name` is the namespace of at least one type in the batch.
    pub fn is_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(String::as_str)
    }

    pub fn hints(&self) -> &[RelationHint] {
        &self.hints
    }

    pub fn failures(&self) -> &[RecordError] {
        &self.failures
    }

    /// Human-readable label for diagnostics.
    pub fn label(&self, entity: EntityRef) -> String {
        match entity {
            EntityRef::Function(id) => match self.function(id) {
                Some(f) => match &f.owner_name {
                    Some(owner) => format!("{owner}{SCOPE_SEPARATOR}{}", f.name),
                    None => f.name.clone(),
                },
                None => id.to_string(),
            },
            EntityRef::Type(id) => {
                self.local_type(id).map(|t| t.name.clone()).unwrap_or_else(|| id.to_string())
            }
        }
    }

    fn push_type(&mut self, record: &RawTypeRecord, local_type: LocalType) -> TypeId {
        let id = TypeId(self.types.len() as u32);

        let mut keys = vec![local_type.name.clone()];
        if let Some(ns) = record.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            keys.push(format!("{ns}{SCOPE_SEPARATOR}{}", local_type.name));
            self.namespaces.insert(ns.to_string());
        }
        for key in keys {
            self.index_name(key, id);
        }

        self.hints.push(RelationHint::Namespace {
            ty: id,
            namespace: record.namespace.clone().filter(|ns| !ns.is_empty()),
        });
        if let Some(parent) = record.parent.as_deref().filter(|p| !p.is_empty()) {
            self.hints.push(RelationHint::ContainedIn { child: id, parent: parent.to_string() });
        }
        for target in &record.references {
            self.hints.push(RelationHint::TypeReference { ty: id, target: target.clone() });
        }

        self.types.push(local_type);
        id
    }

    /// Register `key` for `id`; an existing entry for another type wins.
    /// Returns whether the index changed.
    fn index_name(&mut self, key: String, id: TypeId) -> bool {
        match self.type_index.get(&key) {
            Some(existing) if *existing == id => false,
            Some(existing) => {
                warn!(name = %key, kept = %existing, duplicate = %id, "duplicate type name");
                false
            }
            None => {
                self.type_index.insert(key, id);
                true
            }
        }
    }

    /// Index nested types under their containment-qualified names
    /// (`Outer::Inner`, plus `ns::Outer::Inner` when a namespace applies).
    ///
    /// Parents are resolved through the index as it grows, so a parent named
    /// by its own qualified name is picked up on a later round.
    fn index_nested_types(&mut self) {
        let mut namespaces: HashMap<TypeId, String> = HashMap::new();
        for hint in &self.hints {
            if let RelationHint::Namespace { ty, namespace: Some(ns) } = hint {
                namespaces.insert(*ty, ns.clone());
            }
        }

        let mut tried: HashSet<(String, TypeId)> = HashSet::new();
        loop {
            let mut parents: HashMap<TypeId, TypeId> = HashMap::new();
            for hint in &self.hints {
                if let RelationHint::ContainedIn { child, parent } = hint {
                    if let Some(parent) = self.lookup_type(parent) {
                        parents.insert(*child, parent);
                    }
                }
            }

            let mut keys = Vec::new();
            for idx in 0..self.types.len() {
                let child = TypeId(idx as u32);
                let mut scopes = vec![self.types[idx].name.as_str()];
                let mut visited = HashSet::from([child]);
                let mut outermost = child;
                while let Some(&parent) = parents.get(&outermost) {
                    // Cycles are reported by the graph pass.
                    if !visited.insert(parent) {
                        break;
                    }
                    scopes.push(self.types[parent.index()].name.as_str());
                    outermost = parent;
                }
                if scopes.len() < 2 {
                    continue;
                }
                scopes.reverse();
                let qualified = scopes.join(SCOPE_SEPARATOR);
                let namespace = namespaces.get(&child).or_else(|| namespaces.get(&outermost));
                if let Some(ns) = namespace {
                    keys.push((format!("{ns}{SCOPE_SEPARATOR}{qualified}"), child));
                }
                keys.push((qualified, child));
            }

            let mut changed = false;
            for (key, id) in keys {
                if tried.insert((key.clone(), id)) {
                    changed |= self.index_name(key, id);
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn push_function(&mut self, record: &RawFunctionRecord, function: Function) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);

        // `::f` names the global scope; nothing to link.
        if let Some(owner) = function.owner_name.as_deref().filter(|o| !o.is_empty()) {
            self.hints.push(RelationHint::Owner { function: id, owner: owner.to_string() });
        }
        for target in &record.references {
            self.hints
                .push(RelationHint::FunctionReference { function: id, target: target.clone() });
        }

        self.functions.push(function);
        id
    }
}

/// Build a `Function` from one raw record.
pub fn build_function<T, F>(
    record: &RawFunctionRecord,
    type_decoder: &T,
    field_decoder: &F,
) -> Result<Function, RecordError>
where
    T: TypeDecoder + ?Sized,
    F: FieldNameDecoder + ?Sized,
{
    let decode_failed = |source| RecordError::Decode {
        source_id: record.source_id,
        raw_name: record.raw_name.clone(),
        source,
    };

    let normalized = normalize_name(&record.raw_name);
    let names = field_decoder.decode_names(&record.field_blob).map_err(decode_failed)?;
    let signature = type_decoder.decode_type(&record.type_blob).map_err(decode_failed)?;
    let arg_names = align_argument_names(&signature.arg_types, names);

    Ok(Function {
        source_id: record.source_id,
        name: normalized.name,
        owner_name: normalized.owner,
        return_type: signature.return_type,
        arg_types: signature.arg_types,
        arg_names,
        calling_convention: signature.calling_convention,
    })
}

/// Build a `LocalType` from one raw record.
pub fn build_local_type(record: &RawTypeRecord) -> Result<LocalType, RecordError> {
    let category =
        classify_declaration(&record.declaration).map_err(|source| RecordError::Classification {
            source_id: record.source_id,
            name: record.name.clone(),
            source,
        })?;
    Ok(LocalType { source_id: record.source_id, name: record.name.clone(), category })
}

/// Entity pass over a whole batch.
///
/// Records are built in parallel; ids are assigned afterwards in input order
/// (types first, then functions) so the result is deterministic.
pub fn build_entities<T, F>(batch: &RawBatch, type_decoder: &T, field_decoder: &F) -> EntityBatch
where
    T: TypeDecoder + ?Sized,
    F: FieldNameDecoder + ?Sized,
{
    let built_types: Vec<Result<LocalType, RecordError>> =
        batch.types.par_iter().map(build_local_type).collect();
    let built_functions: Vec<Result<Function, RecordError>> = batch
        .functions
        .par_iter()
        .map(|record| build_function(record, type_decoder, field_decoder))
        .collect();

    let mut out = EntityBatch::default();

    for (record, built) in batch.types.iter().zip(built_types) {
        match built {
            Ok(local_type) => {
                let id = out.push_type(record, local_type);
                debug!(%id, name = %record.name, "type built");
            }
            Err(err) => {
                warn!(source_id = record.source_id, error = %err, "type record skipped");
                out.failures.push(err);
            }
        }
    }

    out.index_nested_types();

    for (record, built) in batch.functions.iter().zip(built_functions) {
        match built {
            Ok(function) => {
                let id = out.push_function(record, function);
                debug!(%id, raw_name = %record.raw_name, "function built");
            }
            Err(err) => {
                warn!(source_id = record.source_id, error = %err, "function record skipped");
                out.failures.push(err);
            }
        }
    }

    info!(
        types = out.types.len(),
        functions = out.functions.len(),
        failures = out.failures.len(),
        hints = out.hints.len(),
        "entity pass finished"
    );
    out
}
