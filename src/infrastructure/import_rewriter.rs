use crate::core::plugin::{PluginContext, PluginManager};
use crate::infrastructure::ModuleResolver;
use crate::utils::script_scanner;
use crate::utils::{Logger, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Component, Path};

/// `import x from '...'`, `import '...'`, `export * from '...'`, `import('...')`
static IMPORT_SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(\bimport\s*(?:[\w$*{}\s,]+?\s*from\s*)?|\bexport\s*[\w$*{}\s,]+?\s*from\s*|\bimport\s*\(\s*)(['"])([^'"\n]+)(['"])"#,
    )
    .unwrap()
});

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx", "vue"];

/// Rewrites import specifiers of a served module to URLs the browser can
/// fetch from the dev server.
pub struct ImportRewriter<'a> {
    resolver: &'a ModuleResolver,
    plugins: &'a PluginManager,
    context: &'a PluginContext,
}

impl<'a> ImportRewriter<'a> {
    pub fn new(resolver: &'a ModuleResolver, plugins: &'a PluginManager, context: &'a PluginContext) -> Self {
        Self {
            resolver,
            plugins,
            context,
        }
    }

    /// Imports inside comments and string literals are left untouched
    pub fn rewrite(&self, code: &str, importer: &Path) -> Result<String> {
        let spans = script_scanner::scan(code);
        let masked = script_scanner::mask_literals(code, &spans);

        let mut output = String::with_capacity(code.len());
        let mut copied = 0;

        for caps in IMPORT_SPECIFIER.captures_iter(&masked) {
            let (Some(statement), Some(quoted)) = (caps.get(0), caps.get(3)) else {
                continue;
            };
            if !script_scanner::in_code(&spans, statement.start()) {
                continue;
            }

            let specifier = &code[quoted.range()];
            if Self::is_url(specifier) {
                continue;
            }

            if let Some(url) = self.url_for(specifier, importer)? {
                output.push_str(&code[copied..quoted.start()]);
                output.push_str(&url);
                copied = quoted.end();
            }
        }

        output.push_str(&code[copied..]);
        Ok(output)
    }

    fn is_url(specifier: &str) -> bool {
        specifier.starts_with("http://")
            || specifier.starts_with("https://")
            || specifier.starts_with("data:")
    }

    fn url_for(&self, specifier: &str, importer: &Path) -> Result<Option<String>> {
        let resolved = match self.plugins.resolve(specifier, importer, self.context)? {
            Some(path) => path,
            None => self.resolver.resolve(specifier, importer)?,
        };

        let Some(url) = Self::to_url(self.resolver.root(), &resolved) else {
            Logger::warn(&format!(
                "{} resolves outside the project root, left as-is",
                specifier
            ));
            return Ok(None);
        };

        let is_script = resolved
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));

        Ok(Some(if is_script { url } else { format!("{}?import", url) }))
    }

    /// Root-relative URL path of a file, or None when it lies outside root
    pub fn to_url(root: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(root).ok()?;
        let mut url = String::new();

        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    url.push('/');
                    url.push_str(&segment.to_string_lossy());
                }
                Component::CurDir => {}
                _ => return None,
            }
        }

        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::DevConfig;
    use crate::utils::InstallerError;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn fixture() -> (tempfile::TempDir, ModuleResolver, PluginContext) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/plugins")).unwrap();
        fs::create_dir_all(root.join("node_modules/vue/dist")).unwrap();
        fs::create_dir_all(root.join("node_modules/bootstrap/scss")).unwrap();
        fs::write(root.join("src/main.js"), "").unwrap();
        fs::write(root.join("src/App.vue"), "").unwrap();
        fs::write(root.join("src/plugins/index.js"), "").unwrap();
        fs::write(root.join("node_modules/vue/dist/vue.esm-browser.js"), "").unwrap();
        fs::write(
            root.join("node_modules/vue/package.json"),
            r#"{"module": "dist/vue.esm-browser.js"}"#,
        )
        .unwrap();
        fs::write(root.join("node_modules/bootstrap/scss/bootstrap.scss"), "").unwrap();

        let config = Arc::new(DevConfig::default().with_root(root.to_path_buf()));
        let resolver = ModuleResolver::new(&config);
        let context = PluginContext::new(config);
        (dir, resolver, context)
    }

    #[test]
    fn test_rewrites_entry_imports() {
        let (dir, resolver, context) = fixture();
        let plugins = PluginManager::new();
        let rewriter = ImportRewriter::new(&resolver, &plugins, &context);

        let code = r#"import "bootstrap/scss/bootstrap.scss";
import App from './App.vue'
import { createApp } from 'vue'
import { registerPlugins } from '@/plugins'
const lazy = () => import("./App.vue");
"#;
        let rewritten = rewriter.rewrite(code, &dir.path().join("src/main.js")).unwrap();

        assert!(rewritten.contains(r#"import "/node_modules/bootstrap/scss/bootstrap.scss?import";"#));
        assert!(rewritten.contains("import App from '/src/App.vue'"));
        assert!(rewritten.contains("import { createApp } from '/node_modules/vue/dist/vue.esm-browser.js'"));
        assert!(rewritten.contains("import { registerPlugins } from '/src/plugins/index.js'"));
        assert!(rewritten.contains(r#"import("/src/App.vue")"#));
    }

    #[test]
    fn test_leaves_urls_alone() {
        let (dir, resolver, context) = fixture();
        let plugins = PluginManager::new();
        let rewriter = ImportRewriter::new(&resolver, &plugins, &context);

        let code = "import x from 'https://cdn.example.com/x.js'";
        assert_eq!(rewriter.rewrite(code, &dir.path().join("src/main.js")).unwrap(), code);
    }

    #[test]
    fn test_unresolved_import_fails() {
        let (dir, resolver, context) = fixture();
        let plugins = PluginManager::new();
        let rewriter = ImportRewriter::new(&resolver, &plugins, &context);

        let err = rewriter
            .rewrite("import x from './nope'", &dir.path().join("src/main.js"))
            .unwrap_err();
        assert!(matches!(err, InstallerError::Resolve { .. }));
    }

    #[test]
    fn test_skips_comments_and_strings() {
        let (dir, resolver, context) = fixture();
        let plugins = PluginManager::new();
        let rewriter = ImportRewriter::new(&resolver, &plugins, &context);

        let code = "// import legacy from './old'\n/* import('./gone') */\nconst s = \"import x from './y'\";\nimport App from './App.vue'\n";
        let rewritten = rewriter.rewrite(code, &dir.path().join("src/main.js")).unwrap();

        assert!(rewritten.starts_with("// import legacy from './old'\n/* import('./gone') */\n"));
        assert!(rewritten.contains("const s = \"import x from './y'\";"));
        assert!(rewritten.contains("import App from '/src/App.vue'"));
    }

    #[test]
    fn test_dynamic_import_in_template_interpolation() {
        let (dir, resolver, context) = fixture();
        let plugins = PluginManager::new();
        let rewriter = ImportRewriter::new(&resolver, &plugins, &context);

        let code = "const t = `${await import('./App.vue')}`;";
        let rewritten = rewriter.rewrite(code, &dir.path().join("src/main.js")).unwrap();

        assert_eq!(rewritten, "const t = `${await import('/src/App.vue')}`;");
    }

    #[test]
    fn test_to_url() {
        let root = PathBuf::from("/project");

        assert_eq!(
            ImportRewriter::to_url(&root, Path::new("/project/src/App.vue")),
            Some("/src/App.vue".to_string())
        );
        assert_eq!(ImportRewriter::to_url(&root, Path::new("/elsewhere/x.js")), None);
    }
}
