use symgraph_core::analysis::last_balanced_pair;

#[test]
fn returns_none_on_empty_input() {
    assert_eq!(last_balanced_pair("", '(', ')'), None);
}

#[test]
fn returns_none_without_closing_delimiter() {
    assert_eq!(last_balanced_pair("func(int", '(', ')'), None);
    assert_eq!(last_balanced_pair("plain_name", '<', '>'), None);
}

#[test]
fn returns_none_when_close_is_unmatched() {
    assert_eq!(last_balanced_pair("int)", '(', ')'), None);
    assert_eq!(last_balanced_pair("a)b)", '(', ')'), None);
}

#[test]
fn finds_simple_trailing_pair() {
    let text = "foo(int,float)";
    assert_eq!(last_balanced_pair(text, '(', ')'), Some((3, 13)));
}

#[test]
fn finds_outer_pair_with_nesting() {
    let text = "f(a(b)c)";
    assert_eq!(last_balanced_pair(text, '(', ')'), Some((1, 7)));
}

#[test]
fn picks_last_of_several_groups() {
    let text = "method(__cdecl)(int)";
    let (start, end) = last_balanced_pair(text, '(', ')').expect("pair");
    assert_eq!(&text[start..=end], "(int)");
}

#[test]
fn matches_nested_templates() {
    let text = "Outer<Map<int,Vec<char>>>";
    let (start, end) = last_balanced_pair(text, '<', '>').expect("pair");
    assert_eq!(start, 5);
    assert_eq!(end, text.len() - 1);
}

#[test]
fn handles_multibyte_text_around_delimiters() {
    let text = "größe(ä)";
    let (start, end) = last_balanced_pair(text, '(', ')').expect("pair");
    assert_eq!(&text[start..=end], "(ä)");
}
