// Source plugins for the dev server pipeline

use crate::core::models::DevConfig;
use crate::utils::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Context provided to plugins during execution
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Project root directory
    pub root: PathBuf,
    /// Active descriptor
    pub config: Arc<DevConfig>,
}

impl PluginContext {
    pub fn new(config: Arc<DevConfig>) -> Self {
        Self {
            root: config.root.clone(),
            config,
        }
    }
}

/// Hook into module loading of the dev server
///
/// Plugins run in registration order:
/// - `transform` rewrites the source of a module
/// - `resolve` overrides resolution of an import specifier
pub trait Plugin: Send + Sync {
    /// Unique name for this plugin
    fn name(&self) -> &str;

    /// Transform file content
    ///
    /// Return Some(transformed_code) to replace the content,
    /// or None to leave it unchanged.
    fn transform(
        &self,
        _code: &str,
        _file_path: &Path,
        _context: &PluginContext,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    /// Resolve module imports
    ///
    /// Return Some(resolved_path) to override resolution,
    /// or None to use default resolution.
    fn resolve(
        &self,
        _import: &str,
        _importer: &Path,
        _context: &PluginContext,
    ) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Manages plugin registration and execution
#[derive(Default)]
pub struct PluginManager {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Execute transform hooks for all plugins
    ///
    /// Each plugin receives the output of the previous plugin.
    pub fn transform(
        &self,
        mut code: String,
        file_path: &Path,
        context: &PluginContext,
    ) -> Result<String> {
        for plugin in &self.plugins {
            if let Some(transformed) = plugin.transform(&code, file_path, context)? {
                code = transformed;
            }
        }
        Ok(code)
    }

    /// Returns the first non-None result, or None if no plugin resolved it.
    pub fn resolve(
        &self,
        import: &str,
        importer: &Path,
        context: &PluginContext,
    ) -> Result<Option<PathBuf>> {
        for plugin in &self.plugins {
            if let Some(resolved) = plugin.resolve(import, importer, context)? {
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }
}
