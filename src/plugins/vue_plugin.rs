// Vue Plugin: turns single-file components into plain ES modules

use crate::core::plugin::{Plugin, PluginContext};
use crate::infrastructure::processors::ScssProcessor;
use crate::utils::{InstallerError, Logger, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use std::sync::Arc;

static TEMPLATE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<template(\s[^>]*)?>").unwrap());
static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script(\s[^>]*)?>(.*?)</script>").unwrap());
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<style(\s[^>]*)?>(.*?)</style>").unwrap());
static LANG_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"lang=["']([\w-]+)["']"#).unwrap());
static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*export\s+default\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfcBlock {
    pub content: String,
    pub attrs: String,
}

impl SfcBlock {
    pub fn lang(&self) -> Option<&str> {
        LANG_ATTR
            .captures(&self.attrs)
            .and_then(|caps| caps.get(1))
            .map(|lang| lang.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.split_whitespace().any(|attr| attr == name)
    }
}

/// The top-level blocks of a `.vue` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfcDescriptor {
    pub template: Option<SfcBlock>,
    pub script: Option<SfcBlock>,
    pub styles: Vec<SfcBlock>,
}

impl SfcDescriptor {
    pub fn parse(source: &str, path: &Path) -> Result<Self> {
        let mut descriptor = SfcDescriptor::default();

        // Nested <template> tags are legal inside the root one, so the block
        // runs to the last closing tag
        if let Some(open) = TEMPLATE_OPEN.captures(source) {
            let whole = open.get(0).map_or(0..0, |m| m.range());
            let close = source
                .rfind("</template>")
                .filter(|&close| close >= whole.end)
                .ok_or_else(|| InstallerError::transform(path, "unclosed <template> block"))?;

            descriptor.template = Some(SfcBlock {
                content: source[whole.end..close].to_string(),
                attrs: open.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            });
        }

        let scripts: Vec<SfcBlock> = SCRIPT_BLOCK.captures_iter(source).map(block_from).collect();
        if scripts.len() > 1 {
            return Err(InstallerError::transform(path, "only one <script> block is supported"));
        }
        descriptor.script = scripts.into_iter().next();

        descriptor.styles = STYLE_BLOCK.captures_iter(source).map(block_from).collect();

        Ok(descriptor)
    }
}

fn block_from(caps: regex::Captures) -> SfcBlock {
    SfcBlock {
        attrs: caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
        content: caps.get(2).map_or("", |m| m.as_str()).to_string(),
    }
}

/// Compiles `.vue` files into a module exporting the component options with
/// the template attached as a runtime-compiled string and styles injected on
/// load.
pub struct VuePlugin {
    scss: Option<Arc<ScssProcessor>>,
}

impl VuePlugin {
    pub fn new() -> Self {
        Self { scss: None }
    }

    pub fn with_scss(scss: Arc<ScssProcessor>) -> Self {
        Self { scss: Some(scss) }
    }

    pub fn compile(&self, source: &str, path: &Path, root: &Path) -> Result<String> {
        let descriptor = SfcDescriptor::parse(source, path)?;
        let mut module = String::new();

        match &descriptor.script {
            Some(script) if script.has_attr("setup") => {
                return Err(InstallerError::transform(
                    path,
                    "<script setup> is not supported, use an options-API <script> block",
                ));
            }
            Some(script) if matches!(script.lang(), Some("ts") | Some("tsx")) => {
                return Err(InstallerError::transform(path, "TypeScript <script> blocks are not supported"));
            }
            Some(script) => {
                if !EXPORT_DEFAULT.is_match(&script.content) {
                    return Err(InstallerError::transform(path, "<script> block has no default export"));
                }
                module.push_str(&EXPORT_DEFAULT.replace(script.content.trim_start(), "const __sfc__ = "));
                module.push('\n');
            }
            None => module.push_str("const __sfc__ = {};\n"),
        }

        if let Some(template) = &descriptor.template {
            module.push_str(&format!(
                "__sfc__.template = {};\n",
                serde_json::to_string(template.content.trim())?
            ));
        }

        let display_path = path.strip_prefix(root).unwrap_or(path);
        module.push_str(&format!(
            "__sfc__.__file = {};\n",
            serde_json::to_string(&display_path.to_string_lossy())?
        ));

        for (index, style) in descriptor.styles.iter().enumerate() {
            if style.has_attr("scoped") {
                Logger::warn(&format!("{}: scoped styles are injected globally", display_path.display()));
            }

            let css = match (style.lang(), &self.scss) {
                (Some("scss") | Some("sass"), Some(scss)) => scss.compile(&style.content, path)?,
                (Some(lang @ ("scss" | "sass")), None) => {
                    return Err(InstallerError::transform(path, format!("no {} compiler configured", lang)));
                }
                _ => style.content.clone(),
            };

            module.push_str(&format!(
                "{{\n  const el = document.createElement('style');\n  el.setAttribute('data-vue-file', __sfc__.__file + '?style={}');\n  el.textContent = {};\n  document.head.appendChild(el);\n}}\n",
                index,
                serde_json::to_string(&css)?
            ));
        }

        module.push_str("export default __sfc__;\n");
        Ok(module)
    }
}

impl Default for VuePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for VuePlugin {
    fn name(&self) -> &str {
        "vue-plugin"
    }

    fn transform(
        &self,
        code: &str,
        file_path: &Path,
        context: &PluginContext,
    ) -> Result<Option<String>> {
        if file_path.extension().and_then(|ext| ext.to_str()) != Some("vue") {
            return Ok(None);
        }

        Logger::debug(&format!("🧩 Compiling SFC: {}", file_path.display()));
        self.compile(code, file_path, &context.root).map(Some)
    }
}
