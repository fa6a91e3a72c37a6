// Define Plugin: compile-time replacement of global expressions

use crate::core::plugin::{Plugin, PluginContext};
use crate::utils::script_scanner::{self, SpanKind};
use crate::utils::{Logger, Result};
use std::collections::BTreeMap;
use std::path::Path;

const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx", "vue"];

/// Replaces expressions such as `process.env` with a fixed source snippet in
/// every script module, so code written for Node keeps working in the browser.
pub struct DefinePlugin {
    /// Longest expression first, so `process.env.NODE_ENV` beats `process.env`
    replacements: Vec<(String, String)>,
}

impl DefinePlugin {
    pub fn new(define: &BTreeMap<String, String>) -> Self {
        let mut replacements: Vec<(String, String)> = define
            .iter()
            .map(|(expr, value)| (expr.clone(), Self::format_value(value)))
            .collect();
        replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { replacements }
    }

    /// Object literals are parenthesised so member access stays valid
    fn format_value(value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.starts_with('{') {
            format!("({})", trimmed)
        } else {
            trimmed.to_string()
        }
    }

    /// Apply every replacement outside string literals and comments.
    /// Template literal interpolations count as code.
    pub fn replace_in_code(&self, code: &str) -> String {
        let mut output = String::with_capacity(code.len());

        for span in script_scanner::scan(code) {
            if span.kind == SpanKind::Literal {
                output.push_str(&code[span.range]);
                continue;
            }

            let mut i = span.range.start;
            while i < span.range.end {
                if let Some((expr, value)) = self.match_at(code, i, span.range.end) {
                    output.push_str(value);
                    i += expr.len();
                    continue;
                }

                let ch_len = code[i..].chars().next().map_or(1, char::len_utf8);
                output.push_str(&code[i..i + ch_len]);
                i += ch_len;
            }
        }

        output
    }

    fn match_at(&self, code: &str, at: usize, end: usize) -> Option<(&str, &str)> {
        let before = code[..at].chars().next_back();
        if before.is_some_and(|c| is_ident_char(c) || c == '.') {
            return None;
        }

        self.replacements
            .iter()
            .find(|(expr, _)| {
                at + expr.len() <= end
                    && code[at..].starts_with(expr.as_str())
                    && !code[at + expr.len()..].chars().next().is_some_and(is_ident_char)
            })
            .map(|(expr, value)| (expr.as_str(), value.as_str()))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl Plugin for DefinePlugin {
    fn name(&self) -> &str {
        "define-plugin"
    }

    fn transform(
        &self,
        code: &str,
        file_path: &Path,
        _context: &PluginContext,
    ) -> Result<Option<String>> {
        let is_script = file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext));

        if !is_script || self.replacements.is_empty() {
            return Ok(None);
        }

        let replaced = self.replace_in_code(code);
        if replaced == code {
            return Ok(None);
        }

        Logger::debug(&format!("Applied define replacements to {}", file_path.display()));
        Ok(Some(replaced))
    }
}
