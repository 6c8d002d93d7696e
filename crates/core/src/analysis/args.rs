/// Prefix for names synthesized for unnamed arguments.
pub const SYNTHETIC_ARG_PREFIX: &str = "arg_";

/// Reconcile decoded argument names with decoded argument types.
///
/// When the decoder produced fewer names than types, `arg_0`, `arg_1`, ... are
/// appended until both lists have the same length. Surplus names are kept
/// as-is. `types` is only used for its length.
pub fn align_argument_names<T>(types: &[T], mut names: Vec<String>) -> Vec<String> {
    let missing = types.len().saturating_sub(names.len());
    names.extend((0..missing).map(|k| format!("{SYNTHETIC_ARG_PREFIX}{k}")));
    names
}
