use crate::core::models::DevConfig;
use crate::utils::{InstallerError, Logger, PathAliasResolver, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The subset of package.json the resolver reads
#[derive(Debug, Clone, Deserialize)]
struct PackageJson {
    #[serde(default)]
    module: Option<String>,
    #[serde(default)]
    main: Option<String>,
}

/// Resolves import specifiers to files on disk
///
/// Order: alias, relative, root-absolute, then bare package lookup through
/// `node_modules`. Each candidate is tried as-is, then with every implicit
/// extension appended in declared order, then as a directory `index`.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    aliases: PathAliasResolver,
    extensions: Vec<String>,
}

impl ModuleResolver {
    pub fn new(config: &DevConfig) -> Self {
        Self {
            root: config.root.clone(),
            aliases: PathAliasResolver::new(&config.alias, &config.root),
            extensions: config.extensions.clone(),
        }
    }

    pub fn aliases(&self) -> &PathAliasResolver {
        &self.aliases
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `specifier` as imported from the file `importer`
    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<PathBuf> {
        let resolved = if let Some(aliased) = self.aliases.resolve(specifier) {
            self.resolve_file_or_directory(&aliased)
        } else if specifier.starts_with("./") || specifier.starts_with("../") {
            importer
                .parent()
                .and_then(|dir| self.resolve_file_or_directory(&dir.join(specifier)))
        } else if let Some(rooted) = specifier.strip_prefix('/') {
            self.resolve_file_or_directory(&self.root.join(rooted))
        } else {
            self.resolve_node_module(specifier, importer)
        };

        match resolved {
            Some(path) => {
                Logger::resolved(specifier, &path);
                Ok(path)
            }
            None => Err(InstallerError::resolve(specifier, importer)),
        }
    }

    /// Try `path` itself, then `path` + each extension in order.
    pub fn resolve_as_file(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        // Appended, not substituted: "jquery.min" + ".js"
        self.extensions.iter().find_map(|ext| {
            let mut candidate = path.as_os_str().to_owned();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            candidate.is_file().then_some(candidate)
        })
    }

    fn resolve_file_or_directory(&self, path: &Path) -> Option<PathBuf> {
        if let Some(file) = self.resolve_as_file(path) {
            return Some(file);
        }

        if !path.is_dir() {
            return None;
        }

        if let Some(entry) = self.package_entry(path) {
            return Some(entry);
        }

        self.resolve_as_file(&path.join("index"))
    }

    /// Entry named by a directory's package.json (`module`, then `main`)
    fn package_entry(&self, dir: &Path) -> Option<PathBuf> {
        let content = std::fs::read_to_string(dir.join("package.json")).ok()?;
        let package: PackageJson = serde_json::from_str(&content).ok()?;

        [package.module, package.main]
            .into_iter()
            .flatten()
            .find_map(|entry| self.resolve_as_file(&dir.join(entry)))
    }

    /// Walk up from the importer looking for `node_modules/<package>`
    fn resolve_node_module(&self, specifier: &str, importer: &Path) -> Option<PathBuf> {
        let (package, subpath) = Self::parse_package_specifier(specifier);
        let mut current = importer.parent();

        while let Some(dir) = current {
            let package_dir = dir.join("node_modules").join(&package);
            if package_dir.is_dir() {
                let candidate = match &subpath {
                    Some(sub) => package_dir.join(sub),
                    None => package_dir.clone(),
                };
                if let Some(found) = self.resolve_file_or_directory(&candidate) {
                    return Some(found);
                }
            }

            if dir == self.root {
                break;
            }
            current = dir.parent();
        }

        None
    }

    /// Split `@scope/pkg/sub` or `pkg/sub` into package name and subpath
    fn parse_package_specifier(specifier: &str) -> (String, Option<String>) {
        let segments = if specifier.starts_with('@') { 2 } else { 1 };
        let mut parts = specifier.splitn(segments + 1, '/');
        let package: Vec<&str> = parts.by_ref().take(segments).collect();
        let subpath = parts.next().filter(|sub| !sub.is_empty()).map(str::to_string);

        (package.join("/"), subpath)
    }

    /// Whether the specifier names an npm package
    pub fn is_bare(&self, specifier: &str) -> bool {
        !specifier.starts_with("./")
            && !specifier.starts_with("../")
            && !specifier.starts_with('/')
            && !self.aliases.matches_alias(specifier)
    }
}
