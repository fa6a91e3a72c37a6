use fbi_installer::app::{
    bootstrap, AppPlugin, Application, Component, EntryPoint, HostDocument, PluginRegistry,
    Selector, StaticDocument, MOUNT_SELECTOR,
};
use fbi_installer::utils::{InstallerError, Result};
use serde_json::json;
use std::sync::Arc;

const INDEX_HTML: &str = r#"<html><body><div id="app"></div></body></html>"#;

/// Stand-in for a UI component library
struct ThemePlugin;

impl AppPlugin for ThemePlugin {
    fn name(&self) -> &str {
        "theme"
    }

    fn install(&self, app: &mut Application) -> Result<()> {
        app.provide("theme", json!({"dark": true}));
        Ok(())
    }
}

struct BrokenPlugin;

impl AppPlugin for BrokenPlugin {
    fn name(&self) -> &str {
        "broken"
    }

    fn install(&self, _app: &mut Application) -> Result<()> {
        Err(InstallerError::plugin("broken", "missing peer dependency"))
    }
}

#[test]
fn test_installer_entry_mounts_on_index_html() {
    let mut document = StaticDocument::parse(INDEX_HTML);
    let plugins = PluginRegistry::new().with(Arc::new(ThemePlugin));

    let mounted = EntryPoint::installer()
        .with_plugins(plugins)
        .start(&mut document)
        .unwrap();

    assert_eq!(mounted.selector(), MOUNT_SELECTOR);
    assert_eq!(mounted.app().installed_plugins(), ["theme".to_string()]);
    assert_eq!(mounted.app().injected("theme"), Some(&json!({"dark": true})));
    assert_eq!(
        mounted.app().imports(),
        ["bootstrap/scss/bootstrap.scss".to_string(), "bootstrap".to_string()]
    );
    assert_eq!(document.mounted_app(mounted.node()), Some("App"));
}

#[test]
fn test_missing_mount_target() {
    let mut document = StaticDocument::parse("<html><body><main></main></body></html>");

    let result = bootstrap(
        Component::new("App"),
        &PluginRegistry::new(),
        &mut document,
        MOUNT_SELECTOR,
    );

    assert!(matches!(result, Err(InstallerError::MountTargetMissing(_))));
    assert_eq!(document.mount_count(), 0);
}

#[test]
fn test_plugin_failure_aborts_startup() {
    let mut document = StaticDocument::parse(INDEX_HTML);
    let plugins = PluginRegistry::new()
        .with(Arc::new(ThemePlugin))
        .with(Arc::new(BrokenPlugin));

    let result = bootstrap(Component::new("App"), &plugins, &mut document, "#app");

    assert!(matches!(result, Err(InstallerError::Plugin { .. })));
    let node = document
        .query_selector(&Selector::parse("#app").unwrap())
        .unwrap();
    assert_eq!(document.mounted_app(node), None);
}
