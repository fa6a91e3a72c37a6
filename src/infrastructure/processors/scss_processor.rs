use crate::utils::{InstallerError, Logger, PathAliasResolver, Result, Timer};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static AT_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"@(?:import|use|forward)\s+[^;]+;"#).expect("valid regex"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(['"])([^'"]+)['"]"#).expect("valid regex"));

/// SCSS/SASS preprocessor using the grass crate
///
/// Aliased imports (`~bootstrap/scss/...`, `@/styles/...`) are rewritten to
/// absolute paths before compilation; bare package imports are found through
/// the project's `node_modules` load path.
#[derive(Clone)]
pub struct ScssProcessor {
    aliases: PathAliasResolver,
    load_paths: Vec<PathBuf>,
}

impl ScssProcessor {
    pub fn new(aliases: PathAliasResolver, root: &Path) -> Self {
        Self {
            aliases,
            load_paths: vec![root.join("node_modules"), root.to_path_buf()],
        }
    }

    /// Check if a file is SCSS/SASS
    pub fn is_scss_file(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("scss") | Some("sass")
        )
    }

    /// Rewrite aliased specifiers inside `@import`/`@use`/`@forward` rules
    pub fn rewrite_imports(&self, content: &str) -> String {
        AT_RULE
            .replace_all(content, |rule: &regex::Captures| {
                QUOTED
                    .replace_all(&rule[0], |quoted: &regex::Captures| {
                        match self.aliases.resolve(&quoted[2]) {
                            Some(path) => format!("{0}{1}{0}", &quoted[1], path.display()),
                            None => quoted[0].to_string(),
                        }
                    })
                    .into_owned()
            })
            .into_owned()
    }

    /// Compile SCSS/SASS to CSS
    pub fn compile(&self, content: &str, path: &Path) -> Result<String> {
        let _timer = Timer::start(&format!("Compiling SCSS {}", path.display()));

        let syntax = if path.extension().and_then(|s| s.to_str()) == Some("sass") {
            grass::InputSyntax::Sass
        } else {
            grass::InputSyntax::Scss
        };

        let mut options = grass::Options::default()
            .input_syntax(syntax)
            .style(grass::OutputStyle::Expanded);
        if let Some(parent) = path.parent() {
            options = options.load_path(parent);
        }
        for load_path in &self.load_paths {
            options = options.load_path(load_path);
        }

        let source = self.rewrite_imports(content);
        grass::from_string(source, &options).map_err(|e| {
            let message = format!("SCSS compilation failed: {}", e);
            Logger::error(&format!("{} ({})", message, path.display()));
            InstallerError::transform(path, message)
        })
    }
}
