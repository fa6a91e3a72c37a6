use crate::app::Application;
use crate::utils::{Logger, Result};
use std::sync::Arc;

/// Cross-cutting setup applied to an application before it is mounted
pub trait AppPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn install(&self, app: &mut Application) -> Result<()>;
}

/// Plugins in their declared installation order
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn AppPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, plugin: Arc<dyn AppPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn register(&mut self, plugin: Arc<dyn AppPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Install every registered plugin in order. The first failure aborts
/// registration and is returned as-is.
pub fn register_plugins(app: &mut Application, registry: &PluginRegistry) -> Result<()> {
    for plugin in &registry.plugins {
        if let Err(err) = app.use_plugin(plugin.as_ref()) {
            Logger::error(&format!("plugin {} failed to install: {}", plugin.name(), err));
            return Err(err);
        }
    }
    Ok(())
}
