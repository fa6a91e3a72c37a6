use axum::http::StatusCode;
use axum_test::TestServer;
use fbi_installer::core::models::DaemonConfig;
use fbi_installer::daemon::create_router;
use serde_json::json;
use std::path::Path;

fn daemon(data_dir: &Path) -> TestServer {
    let config = DaemonConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        data_dir: data_dir.to_path_buf(),
        base_url: Some("192.168.1.10:8080".to_string()),
    };
    TestServer::new(create_router(config)).unwrap()
}

#[tokio::test]
async fn test_upload_list_download() {
    let dir = tempfile::tempdir().unwrap();
    let server = daemon(dir.path());

    let upload = server
        .post("/api/upload")
        .add_query_param("filename", "Super Game (EUR).cia")
        .bytes(vec![0xC1, 0xA0, 0x00, 0xFF].into())
        .await;
    upload.assert_status_ok();
    upload.assert_json(&json!({"message": "uploaded Super Game (EUR).cia"}));

    server
        .post("/api/upload")
        .add_query_param("filename", "homebrew.3dsx")
        .bytes("3dsx".into())
        .await
        .assert_status_ok();

    let list = server.get("/api/list").await;
    list.assert_status_ok();
    list.assert_json(&json!(["Super Game (EUR).cia", "homebrew.3dsx"]));

    let download = server
        .get("/api/download")
        .add_query_param("name", "Super Game (EUR).cia")
        .await;
    download.assert_status_ok();
    assert_eq!(download.as_bytes().as_ref(), &[0xC1, 0xA0, 0x00, 0xFF]);
}

#[tokio::test]
async fn test_empty_directory_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();

    let list = daemon(dir.path()).get("/api/list").await;

    list.assert_json(&json!([]));
}

#[tokio::test]
async fn test_paths_outside_data_dir_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let server = daemon(dir.path());

    let upload = server
        .post("/api/upload")
        .add_query_param("filename", "../../escape.cia")
        .bytes("x".into())
        .await;
    upload.assert_status(StatusCode::BAD_REQUEST);
    upload.assert_json(&json!({"message": "wrong filepath"}));

    let download = server
        .get("/api/download")
        .add_query_param("name", "../secret.cia")
        .await;
    download.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_accepts_json_and_form() {
    let dir = tempfile::tempdir().unwrap();
    let server = daemon(dir.path());

    // Nothing listens on the console port; the push fails in the background
    server
        .post("/api/send")
        .json(&json!({"address": "127.0.0.1", "name": "game.cia"}))
        .await
        .assert_status_ok();

    server
        .post("/api/send")
        .form(&[("address", "127.0.0.1"), ("name", "game.cia")])
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_send_rejects_malformed_body() {
    let dir = tempfile::tempdir().unwrap();

    let response = daemon(dir.path())
        .post("/api/send")
        .text("{not json")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.text().is_empty());
}
