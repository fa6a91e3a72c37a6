use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Source transforms applied by the dev server before a module is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// Single-file `.vue` components
    Vue,
}

/// One reverse-proxy rule of the dev server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRule {
    /// URL path prefix, matched with a plain `starts_with`
    pub prefix: String,
    /// Origin the matching requests are forwarded to
    pub target: String,
}

impl ProxyRule {
    pub fn new(prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            target: target.into(),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_proxy")]
    pub proxy: Vec<ProxyRule>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            proxy: default_proxy(),
        }
    }
}

/// Build/dev-server descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevConfig {
    /// Project root; not part of the descriptor file
    #[serde(skip, default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_transforms")]
    pub transforms: Vec<TransformKind>,
    /// Compile-time find/replace table (expression → replacement source)
    #[serde(default = "default_define")]
    pub define: BTreeMap<String, String>,
    /// Alias → path, relative targets are resolved against `root`
    #[serde(default = "default_alias")]
    pub alias: BTreeMap<String, String>,
    /// Tried in order when an import omits its extension
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_transforms() -> Vec<TransformKind> {
    vec![TransformKind::Vue]
}

fn default_define() -> BTreeMap<String, String> {
    BTreeMap::from([("process.env".to_string(), "{}".to_string())])
}

fn default_alias() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("@".to_string(), "./src".to_string()),
        ("~bootstrap".to_string(), "./node_modules/bootstrap".to_string()),
        // Full build: components carry their template as a string
        ("vue$".to_string(), "./node_modules/vue/dist/vue.esm-browser.js".to_string()),
    ])
}

fn default_extensions() -> Vec<String> {
    [".js", ".json", ".jsx", ".mjs", ".ts", ".tsx", ".vue"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_proxy() -> Vec<ProxyRule> {
    vec![ProxyRule::new("/api", "http://127.0.0.1:8080")]
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            transforms: default_transforms(),
            define: default_define(),
            alias: default_alias(),
            extensions: default_extensions(),
            server: ServerConfig::default(),
        }
    }
}

impl DevConfig {
    pub fn with_root(mut self, root: PathBuf) -> Self {
        self.root = root;
        self
    }

    pub fn transform_enabled(&self, kind: TransformKind) -> bool {
        self.transforms.contains(&kind)
    }
}

/// Settings of the installer daemon
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub listen: SocketAddr,
    /// Absolute directory holding the installable titles
    pub data_dir: PathBuf,
    /// Host (and optional port) advertised to the console instead of the
    /// request's `Host` header
    pub base_url: Option<String>,
}
