//! Graph pass: resolve relation hints from an [`EntityBatch`] into the five
//! relation sets and validate them.
//!
//! Unresolved names do not stop the pass; they are collected and reported
//! together. A containment cycle does stop it.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{EntityRef, FunctionId, TypeId};
use crate::services::entities::{EntityBatch, RelationHint};

/// The five relation kinds of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Namespace,
    Containment,
    FunctionMembership,
    TypeDependency,
    FunctionDependency,
}

impl RelationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Namespace => "namespace",
            RelationKind::Containment => "containment",
            RelationKind::FunctionMembership => "function-membership",
            RelationKind::TypeDependency => "type-dependency",
            RelationKind::FunctionDependency => "function-dependency",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type → enclosing namespace (`None` = global scope).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceLink {
    pub ty: TypeId,
    pub namespace: Option<String>,
}

/// `parent` lexically contains `child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainmentLink {
    pub parent: TypeId,
    pub child: TypeId,
}

/// What a function's owner scope resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OwnerRef {
    Type(TypeId),
    Namespace(String),
}

/// Function declared inside the scope `owner_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipLink {
    pub owner_name: String,
    pub owner: OwnerRef,
    pub function: FunctionId,
}

/// `ty` references `depends_on` through a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeDependency {
    pub ty: TypeId,
    pub depends_on: TypeId,
}

/// `function` references `ty` in its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionDependency {
    pub function: FunctionId,
    pub ty: TypeId,
}

/// Finalized relation sets. Every id refers to an entity of the batch the
/// graph was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    pub namespaces: Vec<NamespaceLink>,
    pub containment: Vec<ContainmentLink>,
    pub memberships: Vec<MembershipLink>,
    pub type_dependencies: Vec<TypeDependency>,
    pub function_dependencies: Vec<FunctionDependency>,
}

impl DependencyGraph {
    pub fn edge_count(&self) -> usize {
        self.namespaces.len()
            + self.containment.len()
            + self.memberships.len()
            + self.type_dependencies.len()
            + self.function_dependencies.len()
    }

    /// Direct children of `parent`.
    pub fn children_of(&self, parent: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.containment.iter().filter(move |l| l.parent == parent).map(|l| l.child)
    }

    /// Types `ty` depends on.
    pub fn dependencies_of(&self, ty: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.type_dependencies.iter().filter(move |d| d.ty == ty).map(|d| d.depends_on)
    }

    /// Functions whose owner scope resolved to `ty`.
    pub fn members_of(&self, ty: TypeId) -> impl Iterator<Item = FunctionId> + '_ {
        self.memberships
            .iter()
            .filter(move |m| m.owner == OwnerRef::Type(ty))
            .map(|m| m.function)
    }
}

/// A hint whose target name matched no entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Dangling {relation} reference from {from} to unknown name {target:?}")]
pub struct DanglingReference {
    pub relation: RelationKind,
    pub from: EntityRef,
    pub target: String,
}

/// Result of a graph pass that did not abort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphBuild {
    pub graph: DependencyGraph,
    pub dangling: Vec<DanglingReference>,
}

impl GraphBuild {
    pub fn is_complete(&self) -> bool {
        self.dangling.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Containment cycle: {}", names.join(" -> "))]
    ContainmentCycle { path: Vec<TypeId>, names: Vec<String> },
}

/// Resolve a type name exactly: bare, namespace-qualified or
/// containment-qualified. A scope that names nothing is not guessed at.
fn resolve_type(batch: &EntityBatch, name: &str) -> Option<TypeId> {
    batch.lookup_type(name)
}

fn resolve_owner(batch: &EntityBatch, owner: &str) -> Option<OwnerRef> {
    if let Some(id) = resolve_type(batch, owner) {
        return Some(OwnerRef::Type(id));
    }
    batch.is_namespace(owner).then(|| OwnerRef::Namespace(owner.to_string()))
}

fn push_unique<T: Clone + Eq + Hash>(seen: &mut HashSet<T>, out: &mut Vec<T>, edge: T) {
    if seen.insert(edge.clone()) {
        out.push(edge);
    }
}

/// Graph pass over a completed entity batch.
pub fn build_graph(batch: &EntityBatch) -> Result<GraphBuild, GraphError> {
    let mut graph = DependencyGraph::default();
    let mut dangling = Vec::new();

    let mut seen_containment = HashSet::new();
    let mut seen_membership = HashSet::new();
    let mut seen_type_deps = HashSet::new();
    let mut seen_fn_deps = HashSet::new();

    let mut dangle = |relation, from, target: &str| {
        dangling.push(DanglingReference { relation, from, target: target.to_string() });
    };

    for hint in batch.hints() {
        match hint {
            RelationHint::Namespace { ty, namespace } => {
                graph.namespaces.push(NamespaceLink { ty: *ty, namespace: namespace.clone() });
            }
            RelationHint::ContainedIn { child, parent } => match resolve_type(batch, parent) {
                Some(parent) => push_unique(
                    &mut seen_containment,
                    &mut graph.containment,
                    ContainmentLink { parent, child: *child },
                ),
                None => dangle(RelationKind::Containment, hint.source(), parent.as_str()),
            },
            RelationHint::Owner { function, owner } => match resolve_owner(batch, owner) {
                Some(resolved) => push_unique(
                    &mut seen_membership,
                    &mut graph.memberships,
                    MembershipLink {
                        owner_name: owner.clone(),
                        owner: resolved,
                        function: *function,
                    },
                ),
                None => dangle(RelationKind::FunctionMembership, hint.source(), owner.as_str()),
            },
            RelationHint::TypeReference { ty, target } => match resolve_type(batch, target) {
                Some(depends_on) => push_unique(
                    &mut seen_type_deps,
                    &mut graph.type_dependencies,
                    TypeDependency { ty: *ty, depends_on },
                ),
                None => dangle(RelationKind::TypeDependency, hint.source(), target.as_str()),
            },
            RelationHint::FunctionReference { function, target } => {
                match resolve_type(batch, target) {
                    Some(ty) => push_unique(
                        &mut seen_fn_deps,
                        &mut graph.function_dependencies,
                        FunctionDependency { function: *function, ty },
                    ),
                    None => {
                        dangle(RelationKind::FunctionDependency, hint.source(), target.as_str())
                    }
                }
            }
        }
    }

    if let Some(path) = find_containment_cycle(&graph.containment) {
        let names = path.iter().map(|id| batch.label(EntityRef::Type(*id))).collect::<Vec<_>>();
        warn!(cycle = %names.join(" -> "), "containment cycle detected");
        return Err(GraphError::ContainmentCycle { path, names });
    }

    for d in &dangling {
        debug!(
            relation = %d.relation,
            from = %batch.label(d.from),
            target = %d.target,
            "dangling reference"
        );
    }
    if !dangling.is_empty() {
        warn!(count = dangling.len(), "graph built with dangling references");
    }
    info!(edges = graph.edge_count(), dangling = dangling.len(), "graph pass finished");

    Ok(GraphBuild { graph, dangling })
}

/// Depth-first search for a cycle in a containment edge set.
///
/// Returns the cycle as a closed path (`[a, b, a]`), or `None` if the set is
/// acyclic. Node order is deterministic.
pub fn find_containment_cycle(edges: &[ContainmentLink]) -> Option<Vec<TypeId>> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Active,
        Done,
    }

    let mut adjacency: BTreeMap<TypeId, Vec<TypeId>> = BTreeMap::new();
    for edge in edges {
        adjacency.entry(edge.parent).or_default().push(edge.child);
        adjacency.entry(edge.child).or_default();
    }

    let mut marks: BTreeMap<TypeId, Mark> = BTreeMap::new();
    for &start in adjacency.keys() {
        if marks.contains_key(&start) {
            continue;
        }

        // (node, index of next child to visit)
        let mut stack: Vec<(TypeId, usize)> = vec![(start, 0)];
        marks.insert(start, Mark::Active);

        while let Some((node, next)) = stack.last().copied() {
            let children = &adjacency[&node];
            if next == children.len() {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            }
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            let child = children[next];
            match marks.get(&child) {
                Some(Mark::Active) => {
                    let from = stack.iter().position(|(n, _)| *n == child).unwrap_or(0);
                    let mut path: Vec<TypeId> = stack[from..].iter().map(|(n, _)| *n).collect();
                    path.push(child);
                    return Some(path);
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(child, Mark::Active);
                    stack.push((child, 0));
                }
            }
        }
    }

    None
}
