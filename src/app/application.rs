use crate::app::document::{HostDocument, NodeId, Selector};
use crate::app::plugins::AppPlugin;
use crate::app::Component;
use crate::utils::{InstallerError, Logger, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// One running copy of the UI application
///
/// Created once by [`create_app`], configured by plugins, then consumed by
/// [`Application::mount`]; a mounted instance cannot be mounted again.
#[derive(Debug)]
pub struct Application {
    root: Component,
    installed: Vec<String>,
    imports: Vec<String>,
    provides: BTreeMap<String, Value>,
}

pub fn create_app(root: Component) -> Application {
    Logger::debug(&format!("Creating app for root component {}", root.name));
    Application {
        root,
        installed: Vec::new(),
        imports: Vec::new(),
        provides: BTreeMap::new(),
    }
}

impl Application {
    pub fn root(&self) -> &Component {
        &self.root
    }

    /// Install a plugin; a plugin already installed under the same name is
    /// skipped.
    pub fn use_plugin(&mut self, plugin: &dyn AppPlugin) -> Result<&mut Self> {
        let name = plugin.name().to_string();
        if self.installed.contains(&name) {
            Logger::warn(&format!("Plugin {} has already been applied to target app", name));
            return Ok(self);
        }

        plugin.install(self)?;
        Logger::debug(&format!("Installed plugin {}", name));
        self.installed.push(name);
        Ok(self)
    }

    pub fn installed_plugins(&self) -> &[String] {
        &self.installed
    }

    /// Record a side-effect import of the entry (stylesheets, scripts)
    pub fn import(&mut self, specifier: impl Into<String>) -> &mut Self {
        self.imports.push(specifier.into());
        self
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Make a value available to every component
    pub fn provide(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.provides.insert(key.into(), value);
        self
    }

    pub fn injected(&self, key: &str) -> Option<&Value> {
        self.provides.get(key)
    }

    /// Attach to the element matching `selector`. The document is only
    /// touched once a target has been found.
    pub fn mount(self, document: &mut dyn HostDocument, selector: &str) -> Result<MountedApp> {
        let parsed = Selector::parse(selector)?;
        let node = document
            .query_selector(&parsed)
            .ok_or_else(|| InstallerError::MountTargetMissing(selector.to_string()))?;

        document.attach(node, &self.root.name)?;
        Logger::debug(&format!("Mounted {} on {}", self.root.name, selector));

        Ok(MountedApp {
            app: self,
            selector: selector.to_string(),
            node,
        })
    }
}

/// An application after mount; its lifecycle now belongs to the document
#[derive(Debug)]
pub struct MountedApp {
    app: Application,
    selector: String,
    node: NodeId,
}

impl MountedApp {
    pub fn app(&self) -> &Application {
        &self.app
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}
