use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use axum_test::TestServer;
use fbi_installer::core::models::{DevConfig, ProxyRule};
use fbi_installer::infrastructure::DevServer;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
  <body>
    <div id="app"></div>
    <script type="module" src="/src/main.js"></script>
  </body>
</html>
"#;

const MAIN_JS: &str = r#"import "bootstrap/scss/bootstrap.scss";
import App from './App.vue'
import { registerPlugins } from '@/plugins'

const mode = process.env.NODE_ENV;
registerPlugins(App)
"#;

const APP_VUE: &str = r#"<template>
  <main class="container">{{ title }}</main>
</template>

<script>
export default {
  name: 'App',
  data: () => ({ title: 'FBI' }),
}
</script>

<style lang="scss">
$gap: 4px;
.container { padding: $gap; }
</style>
"#;

fn fixture_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src/plugins")).unwrap();
    fs::create_dir_all(root.join("node_modules/bootstrap/scss")).unwrap();
    fs::write(root.join("index.html"), INDEX_HTML).unwrap();
    fs::write(root.join("src/main.js"), MAIN_JS).unwrap();
    fs::write(root.join("src/App.vue"), APP_VUE).unwrap();
    fs::write(root.join("src/plugins/index.js"), "export function registerPlugins(app) {}\n").unwrap();
    fs::write(
        root.join("node_modules/bootstrap/scss/bootstrap.scss"),
        "$primary: #0d6efd;\n.btn-primary { color: $primary; }\n",
    )
    .unwrap();
    dir
}

/// Backend stand-in echoing method, URI and body
async fn spawn_upstream() -> (SocketAddr, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().fallback(move |method: Method, uri: Uri, body: String| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (
                StatusCode::CREATED,
                [("x-upstream", "yes")],
                format!("{} {}|{}", method, uri, body),
            )
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, hits)
}

fn dev_server(root: &Path, upstream: SocketAddr) -> TestServer {
    let mut config = DevConfig::default().with_root(root.to_path_buf());
    config.server.proxy = vec![ProxyRule::new("/api", format!("http://{}", upstream))];

    let server = DevServer::new(config).unwrap();
    TestServer::new(server.router()).unwrap()
}

#[tokio::test]
async fn test_api_requests_are_forwarded_unchanged() {
    let project = fixture_project();
    let (upstream, hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let response = server.get("/api/list").add_query_param("page", "2").await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.text(), "GET /api/list?page=2|");
    assert_eq!(response.header("x-upstream"), "yes");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_method_and_body_are_forwarded() {
    let project = fixture_project();
    let (upstream, _hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let response = server
        .post("/api/send")
        .text(r#"{"address":"10.0.0.2","name":"a.cia"}"#)
        .await;

    assert_eq!(
        response.text(),
        r#"POST /api/send|{"address":"10.0.0.2","name":"a.cia"}"#
    );
}

#[tokio::test]
async fn test_large_upload_is_relayed_intact() {
    let project = fixture_project();
    let (upstream, hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let payload = "c".repeat(1024 * 1024);
    let response = server
        .post("/api/upload")
        .add_query_param("filename", "big.cia")
        .text(payload.clone())
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.text(),
        format!("POST /api/upload?filename=big.cia|{}", payload)
    );
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_other_paths_are_served_locally() {
    let project = fixture_project();
    let (upstream, hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let response = server.get("/foo").await;

    response.assert_status_ok();
    assert!(response.text().contains("<div id=\"app\"></div>"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_entry_module_is_transformed() {
    let project = fixture_project();
    let (upstream, _hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let response = server.get("/src/main.js").await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/javascript");
    let code = response.text();
    assert!(code.contains(r#"import "/node_modules/bootstrap/scss/bootstrap.scss?import";"#));
    assert!(code.contains("import App from '/src/App.vue'"));
    assert!(code.contains("from '/src/plugins/index.js'"));
    assert!(code.contains("const mode = ({}).NODE_ENV;"));
}

#[tokio::test]
async fn test_single_file_component_is_compiled() {
    let project = fixture_project();
    let (upstream, _hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let code = server.get("/src/App.vue").await.text();

    assert!(code.contains("const __sfc__ = {"));
    assert!(code.contains("__sfc__.template = \"<main class=\\\"container\\\">{{ title }}</main>\""));
    assert!(code.contains("padding: 4px"));
    assert!(code.contains("export default __sfc__;"));
}

#[tokio::test]
async fn test_scss_is_compiled() {
    let project = fixture_project();
    let (upstream, _hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let css = server.get("/node_modules/bootstrap/scss/bootstrap.scss").await;
    assert_eq!(css.header("content-type"), "text/css");
    assert!(css.text().contains("#0d6efd"));

    let module = server
        .get("/node_modules/bootstrap/scss/bootstrap.scss")
        .add_query_param("import", "")
        .await;
    assert_eq!(module.header("content-type"), "application/javascript");
    assert!(module.text().contains("document.head.appendChild(el)"));
}

#[tokio::test]
async fn test_unresolvable_import_reports_error() {
    let project = fixture_project();
    fs::write(project.path().join("src/broken.js"), "import x from './missing'\n").unwrap();
    let (upstream, _hits) = spawn_upstream().await;
    let server = dev_server(project.path(), upstream);

    let response = server.get("/src/broken.js").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("./missing"));
}

#[tokio::test]
async fn test_unreachable_backend_is_server_error() {
    let project = fixture_project();
    // Bind then drop to get a port nobody listens on
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let server = dev_server(project.path(), addr);

    let response = server.get("/api/list").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
