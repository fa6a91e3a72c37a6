use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Component, Path, PathBuf};

static INSTALLABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(cia|3dsx|cetk|tik)$").unwrap());

/// Whether FBI can install a file with this name
pub fn is_installable(name: &str) -> bool {
    INSTALLABLE.is_match(name)
}

/// Absolute path of `name` inside `data_dir`, or None when the name is
/// empty or would escape the directory.
pub fn clean_filename(data_dir: &Path, name: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();

    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => relative.push(segment),
            Component::CurDir => {}
            Component::ParentDir => {
                if !relative.pop() {
                    return None;
                }
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        return None;
    }

    Some(data_dir.join(relative))
}

/// Names of the regular files in `data_dir`, sorted
pub async fn list_files(data_dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(data_dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }

    names.sort();
    Ok(names)
}
