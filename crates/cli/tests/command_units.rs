use std::path::Path;

use symgraph::commands::{
    classify_command, ingest_command, init_project_command, list_functions_command,
    list_runs_command, list_types_command, normalize_command, parse_raw_batch,
    project_info_command, resolve_run_id, select_decoder, BatchFormat,
};
use symgraph_core::db::{ProjectContext, ProjectLayout};
use symgraph_core::services::decoders::{default_decoder_registry, SymbolDecoder};
use tempfile::tempdir;

#[test]
fn batch_format_follows_extension() {
    assert_eq!(BatchFormat::from_path(Path::new("a.json")).unwrap(), BatchFormat::Json);
    assert_eq!(BatchFormat::from_path(Path::new("a.YAML")).unwrap(), BatchFormat::Yaml);
    assert_eq!(BatchFormat::from_path(Path::new("a.yml")).unwrap(), BatchFormat::Yaml);
    let err = BatchFormat::from_path(Path::new("a.txt")).unwrap_err();
    assert!(err.to_string().contains("Unsupported batch file extension 'txt'"));
}

#[test]
fn raw_batch_parses_from_yaml_and_json() {
    let yaml = "functions:\n  - source_id: 1\n    raw_name: f()\n    type_blob: '{}'\n";
    let batch = parse_raw_batch(yaml, BatchFormat::Yaml).unwrap();
    assert_eq!(batch.functions.len(), 1);
    assert!(batch.types.is_empty());
    assert!(batch.functions[0].field_blob.is_empty());

    let json = r#"{"types": [{"source_id": 5, "name": "T", "declaration": "enum T"}]}"#;
    let batch = parse_raw_batch(json, BatchFormat::Json).unwrap();
    assert_eq!(batch.types[0].name, "T");
    assert_eq!(batch.types[0].namespace, None);

    let err = parse_raw_batch("{", BatchFormat::Json).unwrap_err();
    assert!(err.to_string().contains("Failed to parse JSON batch"));
}

#[test]
fn list_commands_error_when_config_missing() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    let err = list_functions_command(&root, None, false).unwrap_err();
    assert!(err.to_string().contains("Failed to read project config"), "unexpected error: {err}");
    assert!(list_types_command(&root, None, true).is_err());
    assert!(list_runs_command(&root, false).is_err());
}

#[test]
fn list_commands_succeed_on_fresh_project() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("Fresh".into()), None).unwrap();

    list_functions_command(&root, None, false).unwrap();
    list_types_command(&root, None, true).unwrap();
    list_runs_command(&root, true).unwrap();
    project_info_command(&root, false).unwrap();
    project_info_command(&root, true).unwrap();
}

#[test]
fn explicit_unknown_run_is_an_error() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("Runs".into()), None).unwrap();

    let err = list_functions_command(&root, Some(42), false).unwrap_err();
    assert!(err.to_string().contains("No ingest run with id 42"));

    let ctx = ProjectContext::from_root(&root).unwrap();
    assert_eq!(resolve_run_id(&ctx.db, None).unwrap(), None);
}

#[test]
fn init_project_validates_default_decoder() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    let err = init_project_command(&root, None, Some("nope".into())).unwrap_err();
    assert!(err.to_string().contains("Unknown decoder 'nope'"));

    init_project_command(&root, None, Some("json".into())).unwrap();
    let ctx = ProjectContext::from_root(&root).unwrap();
    assert_eq!(ctx.config.default_decoder.as_deref(), Some("json"));
    assert_eq!(ctx.decoder_name(None), "json");
}

#[test]
fn project_name_defaults_to_root_directory_name() {
    let temp = tempdir().unwrap();
    let root_path = temp.path().join("my-symbols");
    let root = root_path.to_string_lossy().to_string();
    init_project_command(&root, None, None).unwrap();

    let ctx = ProjectContext::from_root(&root_path).unwrap();
    assert_eq!(ctx.config.name, "my-symbols");
}

#[test]
fn ingest_errors_on_missing_or_unreadable_input() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("Inputs".into()), None).unwrap();

    let err = ingest_command(&root, "nope.yaml", None, false).unwrap_err();
    assert!(err.to_string().contains("Batch file does not exist"));

    let layout = ProjectLayout::new(&root);
    std::fs::write(layout.inputs_dir.join("bad.json"), "[1, 2").unwrap();
    let err = ingest_command(&root, "inputs/bad.json", None, false).unwrap_err();
    assert!(err.to_string().contains("Invalid batch file"), "unexpected error: {err}");

    // Nothing was recorded for rejected inputs.
    let ctx = ProjectContext::from_root(&root).unwrap();
    assert!(ctx.db.list_ingest_runs().unwrap().is_empty());
}

#[test]
fn ingest_then_list_by_run_id() {
    let temp = tempdir().unwrap();
    let root = temp.path().to_string_lossy().to_string();
    init_project_command(&root, Some("ById".into()), None).unwrap();
    let batch = r#"{"functions": [{"source_id": 1, "raw_name": "A::f(int)", "type_blob": "{\"args\": [\"int\"]}"}],
                   "types": [{"source_id": 2, "name": "A", "declaration": "class A"}]}"#;
    std::fs::write(temp.path().join("one.json"), batch).unwrap();

    ingest_command(&root, "one.json", Some("json".into()), false).unwrap();

    let ctx = ProjectContext::from_root(&root).unwrap();
    let run_id = resolve_run_id(&ctx.db, None).unwrap().expect("latest run");
    list_functions_command(&root, Some(run_id), true).unwrap();
    list_types_command(&root, Some(run_id), false).unwrap();
    assert_eq!(ctx.db.relation_counts(run_id).unwrap().memberships, 1);
    assert!(ctx.layout.report_path("one.json").is_file());
}

#[test]
fn symbol_commands() {
    normalize_command(&["NS::f(int)".to_string()], false).unwrap();
    normalize_command(&["g()".to_string()], true).unwrap();
    classify_command("typedef int MyInt").unwrap();
    assert!(classify_command("int x").is_err());
}

#[test]
fn select_decoder_lists_known_names() {
    let registry = default_decoder_registry();
    assert_eq!(select_decoder(&registry, "json").unwrap().name(), "json");
    let err = select_decoder(&registry, "x").err().expect("unknown decoder");
    assert_eq!(err.to_string(), "Unknown decoder 'x'. Available: json");
}
