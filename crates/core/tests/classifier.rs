use symgraph_core::analysis::{classify_declaration, ClassificationError};
use symgraph_core::model::TypeCategory;

#[test]
fn const_struct_is_struct() {
    assert_eq!(classify_declaration("const struct Foo"), Ok(TypeCategory::Struct));
    assert_eq!(classify_declaration("const struct _mon_block_fld"), Ok(TypeCategory::Struct));
}

#[test]
fn each_keyword_maps_to_its_category() {
    assert_eq!(classify_declaration("union Value"), Ok(TypeCategory::Union));
    assert_eq!(classify_declaration("enum Color"), Ok(TypeCategory::Enum));
    assert_eq!(classify_declaration("typedef int MyInt"), Ok(TypeCategory::Typedef));
    assert_eq!(classify_declaration("class Widget"), Ok(TypeCategory::Class));
}

#[test]
fn first_keyword_in_table_order_wins() {
    // Both "struct" and "typedef" occur; struct comes first in the table.
    assert_eq!(classify_declaration("typedef struct Foo Foo_t"), Ok(TypeCategory::Struct));
    assert_eq!(classify_declaration("enum class Mode"), Ok(TypeCategory::Enum));
}

#[test]
fn keywords_match_as_plain_substrings() {
    assert_eq!(classify_declaration("classic_t"), Ok(TypeCategory::Class));
}

#[test]
fn unknown_declaration_is_an_error() {
    let err = classify_declaration("int x").expect_err("no keyword");
    assert_eq!(err, ClassificationError { declaration: "int x".to_string() });
    assert!(err.to_string().contains("int x"));
}

#[test]
fn const_alone_is_an_error() {
    assert!(classify_declaration("const int").is_err());
    assert!(classify_declaration("").is_err());
}
