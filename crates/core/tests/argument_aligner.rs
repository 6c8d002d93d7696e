use symgraph_core::analysis::align_argument_names;

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn pads_missing_names_with_synthetic_ones() {
    let types = ["int", "float", "char*"];
    let out = align_argument_names(&types, names(&["x"]));
    assert_eq!(out, names(&["x", "arg_0", "arg_1"]));
}

#[test]
fn synthesizes_all_names_when_none_decoded() {
    let types = ["int", "int"];
    assert_eq!(align_argument_names(&types, Vec::new()), names(&["arg_0", "arg_1"]));
}

#[test]
fn equal_lengths_are_untouched() {
    let types = ["int", "float"];
    assert_eq!(align_argument_names(&types, names(&["a", "b"])), names(&["a", "b"]));
}

#[test]
fn surplus_names_are_kept() {
    let types = ["int"];
    assert_eq!(align_argument_names(&types, names(&["a", "b"])), names(&["a", "b"]));
}

#[test]
fn no_types_no_names() {
    let types: [&str; 0] = [];
    assert!(align_argument_names(&types, Vec::new()).is_empty());
}
