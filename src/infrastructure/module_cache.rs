use dashmap::DashMap;
use std::path::{Path, PathBuf};

/// Plugin output keyed by path, invalidated by a hash of the module's own
/// source. Import URLs are resolved after the cache; styles a `.vue` module
/// pulls in through `@import` are not tracked.
#[derive(Default)]
pub struct ModuleCache {
    entries: DashMap<PathBuf, (blake3::Hash, String)>,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path, source: &str) -> Option<String> {
        let entry = self.entries.get(path)?;
        let (hash, code) = entry.value();
        (*hash == blake3::hash(source.as_bytes())).then(|| code.clone())
    }

    pub fn insert(&self, path: &Path, source: &str, code: String) {
        self.entries
            .insert(path.to_path_buf(), (blake3::hash(source.as_bytes()), code));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
