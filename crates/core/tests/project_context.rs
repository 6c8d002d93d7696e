use std::path::Path;

use symgraph_core::db::{
    init_project, load_project_config, ProjectConfig, ProjectContext, ProjectLayout,
};

#[test]
fn layout_paths_are_derived_from_root() {
    let layout = ProjectLayout::new("/work/proj");
    assert!(layout.meta_dir.ends_with(".symgraph"));
    assert!(layout.project_config_path.ends_with(".symgraph/project.json"));
    assert!(layout.db_path.ends_with(".symgraph/project.db"));
    assert!(layout.inputs_dir.ends_with("inputs"));
    assert!(layout.reports_dir.ends_with("reports"));
    assert_eq!(
        Path::new(&layout.db_path_relative_string()),
        Path::new(".symgraph").join("project.db")
    );
    assert!(layout.report_path("batch.yaml").ends_with("reports/batch.yaml.ingest.json"));
}

#[test]
fn project_context_loads_config_and_db() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    std::fs::create_dir_all(&layout.meta_dir).unwrap();

    let config = ProjectConfig::new("CtxProject", layout.db_path_relative_string());
    std::fs::write(&layout.project_config_path, serde_json::to_string_pretty(&config).unwrap())
        .unwrap();

    let ctx = ProjectContext::from_root(temp.path()).expect("context");
    assert_eq!(ctx.config.name, "CtxProject");
    assert!(ctx.db_path.is_file());

    // DB should be initialized and usable.
    assert!(ctx.db.list_ingest_runs().expect("list runs").is_empty());
}

#[test]
fn init_project_creates_directories_config_and_db() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    let config = ProjectConfig::new("Fresh", layout.db_path_relative_string())
        .with_default_decoder(Some("json".to_string()));

    init_project(&layout, &config).expect("init");
    assert!(layout.inputs_dir.is_dir());
    assert!(layout.reports_dir.is_dir());
    assert!(layout.db_path.is_file());

    let loaded = load_project_config(&layout).expect("load config");
    assert_eq!(loaded.name, "Fresh");
    assert_eq!(loaded.default_decoder.as_deref(), Some("json"));
}

#[test]
fn decoder_name_prefers_override_then_config_then_json() {
    let temp = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    init_project(&layout, &ProjectConfig::new("Dec", layout.db_path_relative_string()))
        .expect("init");

    let mut ctx = ProjectContext::from_root(temp.path()).expect("context");
    assert_eq!(ctx.decoder_name(None), "json");
    ctx.config.default_decoder = Some("custom".to_string());
    assert_eq!(ctx.decoder_name(None), "custom");
    assert_eq!(ctx.decoder_name(Some("other")), "other");
}

#[test]
fn missing_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let err = ProjectContext::from_root(temp.path()).expect_err("no project");
    assert!(err.to_string().contains("Failed to read project config"));
}

#[test]
fn absolute_db_path_in_config_is_respected() {
    let temp = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(temp.path());
    let db_path = elsewhere.path().join("shared.db");
    let config = ProjectConfig::new("Abs", db_path.to_string_lossy().to_string());

    init_project(&layout, &config).expect("init");
    assert!(db_path.is_file());
    assert!(!layout.db_path.exists());

    let ctx = ProjectContext::from_root(temp.path()).expect("context");
    assert_eq!(ctx.db_path, db_path);
}
