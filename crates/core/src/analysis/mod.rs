//! Pure string-level analysis of raw symbol metadata.
//!
//! Nothing in here allocates entities or touches the graph:
//! - `delimiter`: balanced bracket matching scanned from the end of a string
//! - `name`: decorated name normalization into (leaf, owner scope)
//! - `args`: argument name/type alignment
//! - `classify`: type declaration categorization

pub mod args;
pub mod classify;
pub mod delimiter;
pub mod name;

pub use args::align_argument_names;
pub use classify::{classify_declaration, ClassificationError, CATEGORY_KEYWORDS};
pub use delimiter::last_balanced_pair;
pub use name::{normalize_name, NormalizedName, PARAM_LIST_PASSES, SCOPE_SEPARATOR};
