use crate::core::models::{DevConfig, TransformKind};
use crate::core::plugin::{PluginContext, PluginManager};
use crate::infrastructure::processors::ScssProcessor;
use crate::infrastructure::{DevProxy, ImportRewriter, ModuleCache, ModuleResolver};
use crate::plugins::{DefinePlugin, VuePlugin};
use crate::utils::{InstallerError, Logger, Result, Timer};
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use colored::*;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx", "vue"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass"];
/// Resolvable, but the browser cannot run them untranspiled
const UNTRANSPILED_EXTENSIONS: &[&str] = &["ts", "tsx", "jsx"];

struct DevServerState {
    config: Arc<DevConfig>,
    resolver: ModuleResolver,
    plugins: PluginManager,
    context: PluginContext,
    scss: Arc<ScssProcessor>,
    proxy: DevProxy,
    cache: ModuleCache,
}

/// Local development server: proxies API prefixes, serves transformed
/// modules and falls back to static files and the SPA entry page.
#[derive(Clone)]
pub struct DevServer {
    state: Arc<DevServerState>,
}

impl DevServer {
    pub fn new(config: DevConfig) -> Result<Self> {
        let config = Arc::new(config);
        let resolver = ModuleResolver::new(&config);
        let scss = Arc::new(ScssProcessor::new(resolver.aliases().clone(), &config.root));

        let mut plugins = PluginManager::new();
        if config.transform_enabled(TransformKind::Vue) {
            plugins.register(Arc::new(VuePlugin::with_scss(scss.clone())));
        }
        plugins.register(Arc::new(DefinePlugin::new(&config.define)));

        Ok(Self {
            state: Arc::new(DevServerState {
                proxy: DevProxy::new(config.server.proxy.clone())?,
                context: PluginContext::new(config.clone()),
                config,
                resolver,
                plugins,
                scss,
                cache: ModuleCache::new(),
            }),
        })
    }

    pub fn config(&self) -> &DevConfig {
        &self.state.config
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.state.plugins.plugin_names()
    }

    pub async fn run(self) -> Result<()> {
        let started = Instant::now();
        let addr = format!("{}:{}", self.config().server.host, self.config().server.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        self.show_banner(started);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;

        Logger::info("Dev server stopped");
        Ok(())
    }

    pub fn router(self) -> Router {
        Router::new()
            .fallback(Self::handle_request)
            .with_state(self)
            .layer(TraceLayer::new_for_http())
    }

    fn show_banner(&self, started: Instant) {
        let config = self.config();
        println!(
            "\n  {} {}  {}",
            "FBI-INSTALLER".bright_cyan().bold(),
            "dev".bright_white(),
            format!("ready in {:.0} ms", started.elapsed().as_secs_f64() * 1000.0).bright_black()
        );
        println!();
        println!(
            "  {}  {}   http://{}:{}/",
            "➜".bright_green(),
            "Local:".bold(),
            config.server.host,
            config.server.port.to_string().bright_cyan()
        );
        for rule in &config.server.proxy {
            println!(
                "  {}  {}   {} → {}",
                "➜".bright_green(),
                "Proxy:".bold(),
                rule.prefix.bright_cyan(),
                rule.target
            );
        }
        println!();
    }

    async fn handle_request(State(server): State<DevServer>, request: Request<Body>) -> Response {
        let path = request.uri().path().to_string();

        if let Some(rule) = server.state.proxy.match_rule(&path) {
            let rule = rule.clone();
            return match server.state.proxy.forward(&rule, request).await {
                Ok(response) => response,
                Err(err) => {
                    Logger::error(&format!("http proxy error: {}", err));
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
                }
            };
        }

        if request.method() != Method::GET && request.method() != Method::HEAD {
            return StatusCode::NOT_FOUND.into_response();
        }

        let Some(file) = server.local_file(&path) else {
            return StatusCode::FORBIDDEN.into_response();
        };
        let as_import = is_import_query(request.uri().query());

        match server.serve_module(&file, as_import).await {
            Ok(Some(response)) => response,
            Ok(None) => server.serve_static(request).await,
            Err(err) => {
                Logger::error(&err.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, err.format_detailed()).into_response()
            }
        }
    }

    /// Map a URL path to a file under root; None for traversal attempts
    fn local_file(&self, url_path: &str) -> Option<PathBuf> {
        let relative = Path::new(url_path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return None;
        }
        Some(self.config().root.join(relative))
    }

    /// Transformed response for scripts, styles and JSON imports; None when
    /// the file is left to the static pipeline.
    async fn serve_module(&self, file: &Path, as_import: bool) -> Result<Option<Response>> {
        if !file.is_file() {
            return Ok(None);
        }

        let extension = file.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        if UNTRANSPILED_EXTENSIONS.contains(&extension) {
            return Err(InstallerError::transform(
                file,
                format!(
                    ".{} modules are not transpiled by the dev server; rename to .js or use a plain <script> block",
                    extension
                ),
            ));
        }

        if SCRIPT_EXTENSIONS.contains(&extension) {
            let code = self.transform_script(file).await?;
            return Ok(Some(javascript(code)));
        }

        if STYLE_EXTENSIONS.contains(&extension) {
            let source = tokio::fs::read_to_string(file).await?;
            let css = if ScssProcessor::is_scss_file(file) {
                self.state.scss.compile(&source, file)?
            } else {
                source
            };

            if as_import {
                return Ok(Some(javascript(style_module(file, &css)?)));
            }
            return Ok(Some(
                ([(header::CONTENT_TYPE, "text/css"), (header::CACHE_CONTROL, "no-cache")], css)
                    .into_response(),
            ));
        }

        if extension == "json" && as_import {
            let source = tokio::fs::read_to_string(file).await?;
            serde_json::from_str::<serde_json::Value>(&source)
                .map_err(|e| InstallerError::transform(file, e.to_string()))?;
            return Ok(Some(javascript(format!("export default {};\n", source.trim()))));
        }

        Ok(None)
    }

    /// Plugins first, then import rewriting. Only the plugin output is
    /// cached; imports are re-resolved on every request so added or removed
    /// files are picked up.
    pub async fn transform_script(&self, file: &Path) -> Result<String> {
        let source = tokio::fs::read_to_string(file).await?;
        let state = &self.state;

        let transformed = match state.cache.get(file, &source) {
            Some(cached) => {
                Logger::debug(&format!("Cache hit: {}", file.display()));
                cached
            }
            None => {
                let _timer = Timer::start(&format!("Transforming {}", file.display()));
                let transformed = state.plugins.transform(source.clone(), file, &state.context)?;
                state.cache.insert(file, &source, transformed.clone());
                transformed
            }
        };

        ImportRewriter::new(&state.resolver, &state.plugins, &state.context).rewrite(&transformed, file)
    }

    async fn serve_static(&self, request: Request<Body>) -> Response {
        let root = &self.config().root;
        let service = ServeDir::new(root)
            .append_index_html_on_directories(true)
            .fallback(ServeFile::new(root.join("index.html")));

        match service.oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        }
    }
}

/// `?import`, `?import=` or `?v=1&import`
fn is_import_query(query: Option<&str>) -> bool {
    query.is_some_and(|query| {
        query
            .split('&')
            .any(|pair| pair.split('=').next() == Some("import"))
    })
}

fn javascript(code: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        code,
    )
        .into_response()
}

/// JS module that injects a stylesheet when imported
fn style_module(file: &Path, css: &str) -> Result<String> {
    Ok(format!(
        "const el = document.createElement('style');\nel.setAttribute('data-file', {});\nel.textContent = {};\ndocument.head.appendChild(el);\nexport default {};\n",
        serde_json::to_string(&file.to_string_lossy())?,
        serde_json::to_string(css)?,
        serde_json::to_string(css)?
    ))
}
