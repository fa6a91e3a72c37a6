use crate::app::document::HostDocument;
use crate::app::plugins::{register_plugins, PluginRegistry};
use crate::app::{create_app, Component, MountedApp};
use crate::utils::Result;

/// Element the application is mounted on unless told otherwise
pub const MOUNT_SELECTOR: &str = "#app";

/// Create the application, install its plugins, then mount it. Any failure
/// aborts startup; nothing is mounted unless every plugin installed.
pub fn bootstrap(
    root: Component,
    plugins: &PluginRegistry,
    document: &mut dyn HostDocument,
    selector: &str,
) -> Result<MountedApp> {
    EntryPoint::new(root)
        .with_plugins(plugins.clone())
        .mount_on(selector)
        .start(document)
}

/// Declarative form of the front end's entry module
#[derive(Clone)]
pub struct EntryPoint {
    root: Component,
    imports: Vec<String>,
    plugins: PluginRegistry,
    selector: String,
}

impl EntryPoint {
    pub fn new(root: Component) -> Self {
        Self {
            root,
            imports: Vec::new(),
            plugins: PluginRegistry::new(),
            selector: MOUNT_SELECTOR.to_string(),
        }
    }

    /// The entry shipped with the installer front end
    pub fn installer() -> Self {
        Self::new(Component::from_source("App", "./App.vue"))
            .import("bootstrap/scss/bootstrap.scss")
            .import("bootstrap")
    }

    pub fn import(mut self, specifier: impl Into<String>) -> Self {
        self.imports.push(specifier.into());
        self
    }

    pub fn with_plugins(mut self, plugins: PluginRegistry) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn mount_on(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn root(&self) -> &Component {
        &self.root
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn start(self, document: &mut dyn HostDocument) -> Result<MountedApp> {
        let mut app = create_app(self.root);
        for specifier in self.imports {
            app.import(specifier);
        }

        register_plugins(&mut app, &self.plugins)?;
        app.mount(document, &self.selector)
    }
}
