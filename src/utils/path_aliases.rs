use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use crate::utils::Logger;

/// Suffix marking an alias that only matches the bare specifier, e.g. `vue$`
pub const EXACT_ALIAS_SUFFIX: char = '$';

#[derive(Debug, Clone)]
struct Alias {
    name: String,
    target: PathBuf,
    exact: bool,
}

/// Path alias resolver for import path resolution
#[derive(Debug, Clone)]
pub struct PathAliasResolver {
    /// Sorted longest alias first so `~bootstrap` wins over a shorter `~`
    aliases: Vec<Alias>,
}

impl PathAliasResolver {
    /// Create a new path alias resolver; relative targets are anchored at `root`
    pub fn new(aliases: &BTreeMap<String, String>, root: &Path) -> Self {
        let mut resolved: Vec<Alias> = aliases
            .iter()
            .map(|(alias, target)| {
                let (name, exact) = match alias.strip_suffix(EXACT_ALIAS_SUFFIX) {
                    Some(name) if !name.is_empty() => (name, true),
                    _ => (alias.as_str(), false),
                };
                Alias {
                    name: name.to_string(),
                    target: Self::resolve_target(target, root),
                    exact,
                }
            })
            .collect();
        resolved.sort_by(|a, b| b.name.len().cmp(&a.name.len()));

        Logger::debug(&format!("🔗 Initialized PathAliasResolver with {} aliases", resolved.len()));
        for alias in &resolved {
            Logger::debug(&format!("  {} → {}", alias.name, alias.target.display()));
        }

        Self { aliases: resolved }
    }

    /// Resolve an import path using aliases
    /// Returns the resolved path if an alias matches, or None if no alias found
    pub fn resolve(&self, import_path: &str) -> Option<PathBuf> {
        for alias in &self.aliases {
            if import_path == alias.name {
                return Some(alias.target.clone());
            }
            if alias.exact {
                continue;
            }

            // Aliases only match at a path boundary: "@/x" but never "@vue/x"
            if let Some(rest) = import_path
                .strip_prefix(alias.name.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
            {
                let final_path = alias.target.join(rest);
                Logger::resolved(import_path, &final_path);
                return Some(final_path);
            }
        }

        None
    }

    /// Check if an import path matches any alias
    pub fn matches_alias(&self, import_path: &str) -> bool {
        self.resolve(import_path).is_some()
    }

    /// Resolve a target path relative to root
    fn resolve_target(target: &str, root: &Path) -> PathBuf {
        let path = Path::new(target);

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(target.strip_prefix("./").unwrap_or(target))
        }
    }
}
