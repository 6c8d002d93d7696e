use symgraph_core::model::{
    EntityRef, FunctionId, RawBatch, RawFunctionRecord, RawTypeRecord, TypeCategory, TypeId,
};
use symgraph_core::services::decoders::JsonDecoder;
use symgraph_core::services::entities::{build_entities, build_function, RecordError, RelationHint};

fn function(
    source_id: i64,
    raw_name: &str,
    type_blob: &str,
    field_blob: &str,
) -> RawFunctionRecord {
    RawFunctionRecord {
        source_id,
        raw_name: raw_name.to_string(),
        type_blob: type_blob.to_string(),
        field_blob: field_blob.to_string(),
        references: Vec::new(),
    }
}

fn local_type(source_id: i64, name: &str, declaration: &str) -> RawTypeRecord {
    RawTypeRecord {
        source_id,
        name: name.to_string(),
        declaration: declaration.to_string(),
        namespace: None,
        parent: None,
        references: Vec::new(),
    }
}

#[test]
fn method_record_becomes_normalized_function() {
    let record = function(
        7,
        "NS::Outer::method<int>(int,float)",
        r#"{"args": ["int", "float"], "ret": "void", "cc": "__thiscall"}"#,
        r#"["x"]"#,
    );

    let f = build_function(&record, &JsonDecoder, &JsonDecoder).expect("build");
    assert_eq!(f.source_id, 7);
    assert_eq!(f.name, "method");
    assert_eq!(f.owner_name.as_deref(), Some("NS::Outer"));
    assert_eq!(f.arg_types.len(), 2);
    assert_eq!(f.arg_names, vec!["x".to_string(), "arg_0".to_string()]);
    assert_eq!(f.return_type.decl, "void");
    assert_eq!(f.calling_convention.as_str(), "__thiscall");
    assert_eq!(f.to_string(), "NS::Outer::method : 7");
}

#[test]
fn ids_follow_input_order_types_first() {
    let raw = RawBatch {
        functions: vec![
            function(10, "first()", r#"{"args": []}"#, ""),
            function(11, "second()", r#"{"args": []}"#, ""),
        ],
        types: vec![local_type(1, "A", "struct A"), local_type(2, "B", "union B")],
    };

    let batch = build_entities(&raw, &JsonDecoder, &JsonDecoder);
    let types: Vec<_> = batch.types().map(|(id, t)| (id, t.name.clone(), t.category)).collect();
    assert_eq!(
        types,
        vec![
            (TypeId(0), "A".to_string(), TypeCategory::Struct),
            (TypeId(1), "B".to_string(), TypeCategory::Union)
        ]
    );
    let functions: Vec<_> = batch.functions().map(|(id, f)| (id, f.name.clone())).collect();
    assert_eq!(
        functions,
        vec![(FunctionId(0), "first".to_string()), (FunctionId(1), "second".to_string())]
    );
    assert!(batch.failures().is_empty());
}

#[test]
fn failing_records_are_skipped_and_kept_as_failures() {
    let raw = RawBatch {
        functions: vec![
            function(20, "ok()", r#"{"args": ["int"]}"#, ""),
            function(21, "bad()", "not json", ""),
            function(22, "bad_names()", r#"{"args": []}"#, "{"),
        ],
        types: vec![local_type(1, "Good", "class Good"), local_type(2, "x", "int x")],
    };

    let batch = build_entities(&raw, &JsonDecoder, &JsonDecoder);
    assert_eq!(batch.function_count(), 1);
    assert_eq!(batch.type_count(), 1);
    assert_eq!(batch.function(FunctionId(0)).map(|f| f.source_id), Some(20));

    let failed: Vec<i64> = batch.failures().iter().map(|e| match e { RecordError::Decode { source_id, .. } | RecordError::Classification { source_id, .. } => *source_id }).collect();
    assert_eq!(failed, vec![2, 21, 22]);
    assert!(matches!(batch.failures()[0], RecordError::Classification { .. }));
    assert!(matches!(batch.failures()[1], RecordError::Decode { .. }));
    assert!(batch.lookup_type("x").is_none());
}

#[test]
fn types_are_indexed_by_bare_and_namespace_qualified_name() {
    let mut outer = local_type(1, "Outer", "class Outer");
    outer.namespace = Some("NS".to_string());
    let raw = RawBatch { functions: Vec::new(), types: vec![outer] };

    let batch = build_entities(&raw, &JsonDecoder, &JsonDecoder);
    assert_eq!(batch.lookup_type("Outer"), Some(TypeId(0)));
    assert_eq!(batch.lookup_type("NS::Outer"), Some(TypeId(0)));
    assert!(batch.is_namespace("NS"));
    assert_eq!(batch.namespaces().collect::<Vec<_>>(), vec!["NS"]);
}

#[test]
fn duplicate_type_names_keep_the_first_entity() {
    let raw = RawBatch {
        functions: Vec::new(),
        types: vec![local_type(1, "Dup", "struct Dup"), local_type(2, "Dup", "enum Dup")],
    };

    let batch = build_entities(&raw, &JsonDecoder, &JsonDecoder);
    assert_eq!(batch.type_count(), 2);
    assert_eq!(batch.lookup_type("Dup"), Some(TypeId(0)));
    assert_eq!(batch.local_type(TypeId(1)).map(|t| t.category), Some(TypeCategory::Enum));
}

#[test]
fn records_carry_relation_hints() {
    let mut inner = local_type(2, "Inner", "struct Inner");
    inner.parent = Some("Outer".to_string());
    inner.references = vec!["Payload".to_string()];
    let mut method = function(30, "Outer::run(Inner*)", r#"{"args": ["Inner *"]}"#, r#"["it"]"#);
    method.references = vec!["Inner".to_string()];

    let raw = RawBatch {
        functions: vec![method],
        types: vec![local_type(1, "Outer", "class Outer"), inner],
    };
    let batch = build_entities(&raw, &JsonDecoder, &JsonDecoder);

    let hints = batch.hints();
    assert!(hints.contains(&RelationHint::Namespace { ty: TypeId(0), namespace: None }));
    assert!(hints.contains(&RelationHint::ContainedIn {
        child: TypeId(1),
        parent: "Outer".to_string()
    }));
    assert!(hints.contains(&RelationHint::TypeReference {
        ty: TypeId(1),
        target: "Payload".to_string()
    }));
    assert!(hints.contains(&RelationHint::Owner {
        function: FunctionId(0),
        owner: "Outer".to_string()
    }));
    let reference = RelationHint::FunctionReference {
        function: FunctionId(0),
        target: "Inner".to_string(),
    };
    assert!(hints.contains(&reference));
    assert_eq!(reference.source(), EntityRef::Function(FunctionId(0)));
    assert_eq!(batch.label(EntityRef::Function(FunctionId(0))), "Outer::run");
    assert_eq!(batch.label(EntityRef::Type(TypeId(1))), "Inner");
}

#[test]
fn empty_batch_builds_nothing() {
    let batch = build_entities(&RawBatch::default(), &JsonDecoder, &JsonDecoder);
    assert_eq!(batch.function_count(), 0);
    assert_eq!(batch.type_count(), 0);
    assert!(batch.hints().is_empty());
    assert!(batch.failures().is_empty());
}
