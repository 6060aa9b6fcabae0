//! `generate` against a scripted model, written into a temp directory

use scaffold_cli::{context, generate, RESULT_FILE, SETUP_FILE};
use scaffold_core::{GenerationOptions, PipelineConfig, StageId};
use scaffold_test_utils::{blog_spec, ScriptedModel, UNPARSABLE};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_spec(dir: &Path) -> PathBuf {
    let path = dir.join("blog.json");
    std::fs::write(&path, serde_json::to_string_pretty(&blog_spec()).unwrap()).unwrap();
    path
}

#[tokio::test]
async fn successful_run_writes_project_tree() {
    let tmp = TempDir::new().unwrap();
    let spec = write_spec(tmp.path());
    let out = tmp.path().join("blog-api");

    let generated = generate(
        ScriptedModel::blog(),
        PipelineConfig::default(),
        &spec,
        &out,
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert!(generated.result.success);
    assert_eq!(generated.written.files.len(), 8);
    for file in &generated.result.files {
        let on_disk = std::fs::read_to_string(file.path().to_path_under(&out)).unwrap();
        assert_eq!(on_disk, file.content());
    }
    assert!(out.join("src/models/user.js").is_file());
    assert!(out.join("src/routes/posts.js").is_file());

    let setup = std::fs::read_to_string(out.join(SETUP_FILE)).unwrap();
    assert!(setup.contains("npm install"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(RESULT_FILE)).unwrap()).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["digest"].is_string());

    let summary = generated.to_string();
    assert!(summary.starts_with("generated 8 files"));
}

#[tokio::test]
async fn failed_run_writes_only_the_result() {
    let tmp = TempDir::new().unwrap();
    let spec = write_spec(tmp.path());
    let out = tmp.path().join("out");
    let model = ScriptedModel::blog().with_response(StageId::Services, UNPARSABLE);

    let generated = generate(
        model,
        PipelineConfig::default(),
        &spec,
        &out,
        &GenerationOptions::default(),
    )
    .await
    .unwrap();

    assert!(!generated.result.success);
    assert!(generated.written.files.is_empty());
    assert!(!out.join(SETUP_FILE).exists());
    assert!(!out.join("src").exists());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(RESULT_FILE)).unwrap()).unwrap();
    assert_eq!(json["failed_stage"], "Services");
    assert!(generated
        .to_string()
        .starts_with("generation failed at stage Services"));
}

#[tokio::test]
async fn unreadable_spec_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.yaml");
    let err = generate(
        ScriptedModel::blog(),
        PipelineConfig::default(),
        &missing,
        tmp.path(),
        &GenerationOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("reading spec"));
}

#[test]
fn context_command_renders_yaml_spec() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("blog.yaml");
    std::fs::write(&path, serde_yaml::to_string(&blog_spec()).unwrap()).unwrap();

    let text = context(&path).unwrap();
    assert!(text.starts_with("Project: Blog API"));
    assert!(text.contains("\n\nTables:\n- users: "));
    assert!(text.contains("  POST /posts: Create a post"));
}
