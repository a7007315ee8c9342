use apkmirror_mapper::error::AppError;
use apkmirror_mapper::gemini::DEFAULT_MODEL;
use apkmirror_mapper::{run, Settings};
use mockito::Server;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn completion(text: &str) -> String {
    serde_json::json!({
        "candidates": [ { "content": { "parts": [ { "text": text } ], "role": "model" } } ]
    })
    .to_string()
}

fn write_apps(dir: &Path, apps: &[(&str, &str)]) -> String {
    let mut yaml = String::from("apps:\n");
    for (package, name) in apps {
        yaml.push_str(&format!("  - package: {}\n    name: {}\n", package, name));
    }
    let path = dir.join("apps.yaml");
    fs::write(&path, yaml).expect("write apps.yaml");
    path.to_str().expect("utf-8 path").to_string()
}

fn settings(dir: &TempDir, server: &Server, api_key: Option<&str>, apps: String) -> Settings {
    Settings {
        api_key: api_key.map(str::to_string),
        apps: Some(apps),
        output: dir.path().join("apkmirror_new_mappings.json"),
        model: DEFAULT_MODEL.to_string(),
        base_url: server.url(),
        delay: Duration::ZERO,
        timeout: Duration::from_secs(5),
    }
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).expect("read output")).expect("parse output")
}

#[tokio::test]
async fn test_resolved_app_is_written() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion("whatsapp-inc/whatsapp-messenger"))
        .expect(1)
        .create_async()
        .await;

    let apps = write_apps(dir.path(), &[("com.whatsapp", "WhatsApp")]);
    let settings = settings(&dir, &server, Some("test-key"), apps);
    let results = run(&settings).await.expect("run");

    mock.assert_async().await;
    assert_eq!(results.succeeded.len(), 1);
    assert_eq!(results.succeeded[0].0.package, "com.whatsapp");
    assert_eq!(results.succeeded[0].1, "whatsapp-inc/whatsapp-messenger");
    assert!(results.failed.is_empty());
    assert_eq!(
        read_json(&settings.output),
        serde_json::json!({ "com.whatsapp": "whatsapp-inc/whatsapp-messenger" })
    );
}

#[tokio::test]
async fn test_unknown_answer_lands_in_failed() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_body(completion("UNKNOWN"))
        .create_async()
        .await;

    let apps = write_apps(dir.path(), &[("x.y.z", "Unknown App")]);
    let settings = settings(&dir, &server, Some("test-key"), apps);
    let results = run(&settings).await.expect("run");

    assert!(results.succeeded.is_empty());
    assert_eq!(results.failed.len(), 1);
    assert_eq!(results.failed[0].record.package, "x.y.z");
    assert_eq!(results.failed[0].record.name, "Unknown App");
    assert_eq!(read_json(&settings.output), serde_json::json!({}));
}

#[tokio::test]
async fn test_service_errors_do_not_abort_the_run() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", GENERATE_PATH)
        .with_status(500)
        .with_body("internal")
        .expect(3)
        .create_async()
        .await;

    let apps = write_apps(
        dir.path(),
        &[("com.a", "A"), ("com.b", "B"), ("com.a", "A")],
    );
    let settings = settings(&dir, &server, Some("test-key"), apps);
    let results = run(&settings).await.expect("run");

    assert_eq!(results.total(), 3);
    assert_eq!(results.failed.len(), 3);
    assert!(results.failed[0].reason.contains("500"));
    assert_eq!(read_json(&settings.output), serde_json::json!({}));
}

#[tokio::test]
async fn test_missing_api_key_makes_no_request() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .expect(0)
        .create_async()
        .await;

    let apps = write_apps(dir.path(), &[("com.whatsapp", "WhatsApp")]);
    for key in [None, Some("   ")] {
        let settings = settings(&dir, &server, key, apps.clone());
        let err = run(&settings).await.unwrap_err();
        assert!(matches!(err, AppError::MissingApiKey));
        assert!(!settings.output.exists());
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_previous_output_is_overwritten() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let _m = server
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_body(completion("\"snap-inc/snapchat\"\n"))
        .create_async()
        .await;

    let apps = write_apps(dir.path(), &[("com.snapchat.android", "Snapchat")]);
    let settings = settings(&dir, &server, Some("test-key"), apps);
    fs::write(&settings.output, r#"{"com.old": "old/app"}"#).unwrap();

    run(&settings).await.expect("run");

    assert_eq!(
        read_json(&settings.output),
        serde_json::json!({ "com.snapchat.android": "snap-inc/snapchat" })
    );
}

#[tokio::test]
async fn test_empty_app_list_writes_empty_object() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .expect(0)
        .create_async()
        .await;

    let apps = dir.path().join("apps.yaml");
    fs::write(&apps, "apps: []\n").unwrap();
    let settings = settings(
        &dir,
        &server,
        Some("test-key"),
        apps.to_str().unwrap().to_string(),
    );
    let results = run(&settings).await.expect("run");

    mock.assert_async().await;
    assert_eq!(results.total(), 0);
    assert_eq!(read_json(&settings.output), serde_json::json!({}));
}

#[test]
fn test_api_key_help_explains_the_fix() {
    let help = apkmirror_mapper::api_key_help();
    assert!(help.contains("GEMINI_API_KEY"));
    assert!(help.contains("https://aistudio.google.com/app/apikey"));
    assert!(help.contains("export GEMINI_API_KEY="));
}
