use serde::{Deserialize, Serialize};

use crate::analysis::delimiter::last_balanced_pair;

/// Scope separator between owner scope and leaf name.
pub const SCOPE_SEPARATOR: &str = "::";

/// Number of trailing `(...)` groups stripped from a raw name.
///
/// Decorated names may carry a calling-convention group in front of the
/// argument list, so at most two groups are removed. The count is fixed.
pub const PARAM_LIST_PASSES: usize = 2;

/// A raw qualified name split into its leaf and owning scope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedName {
    pub name: String,
    pub owner: Option<String>,
}

impl NormalizedName {
    /// Rebuild the qualified form (`owner::name`, or `name` for free symbols).
    pub fn qualified(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{owner}{SCOPE_SEPARATOR}{}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Normalize a decorated qualified name.
///
/// `NS::Outer<T>::method<int>(int,float)` becomes leaf `method` with owner
/// `NS::Outer<T>`. Malformed input never fails; it degrades to a best-effort
/// split.
pub fn normalize_name(raw: &str) -> NormalizedName {
    if raw.is_empty() {
        return NormalizedName::default();
    }

    let mut name = raw;

    for _ in 0..PARAM_LIST_PASSES {
        if let Some((start, _)) = last_balanced_pair(name, '(', ')') {
            name = &name[..start];
        }
    }

    // A template suffix only counts when it closes the name.
    if let Some((start, end)) = last_balanced_pair(name, '<', '>') {
        if end + 1 == name.len() {
            name = &name[..start];
        }
    }

    match name.rfind(SCOPE_SEPARATOR) {
        Some(pos) => NormalizedName {
            name: name[pos + SCOPE_SEPARATOR.len()..].to_string(),
            owner: Some(name[..pos].to_string()),
        },
        None => NormalizedName { name: name.to_string(), owner: None },
    }
}
