use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cannot resolve '{specifier}' from {}", importer.display())]
    Resolve { specifier: String, importer: PathBuf },

    #[error("Transform error in {}: {message}", path.display())]
    Transform { path: PathBuf, message: String },

    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    #[error("Failed to mount app: no element matches selector \"{0}\"")]
    MountTargetMissing(String),

    #[error("Unsupported selector: \"{0}\"")]
    InvalidSelector(String),

    #[error("Proxy error: {0}")]
    Proxy(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl InstallerError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn resolve(specifier: &str, importer: impl Into<PathBuf>) -> Self {
        Self::Resolve {
            specifier: specifier.to_string(),
            importer: importer.into(),
        }
    }

    pub fn transform(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Transform {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a plugin failure attributed to the named plugin
    pub fn plugin(plugin: &str, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.to_string(),
            message: message.into(),
        }
    }

    /// Format error with a leading marker for terminal output
    pub fn format_detailed(&self) -> String {
        match self {
            InstallerError::Resolve { specifier, importer } => format!(
                "❌ Resolve Error: cannot find '{}'\n📁 Imported from: {}",
                specifier,
                importer.display()
            ),
            InstallerError::Transform { path, message } => {
                format!("❌ Transform Error: {}\n📁 File: {}", message, path.display())
            }
            _ => format!("❌ {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;

impl From<regex::Error> for InstallerError {
    fn from(err: regex::Error) -> Self {
        InstallerError::Config(format!("Regex error: {}", err))
    }
}

impl From<serde_json::Error> for InstallerError {
    fn from(err: serde_json::Error) -> Self {
        InstallerError::Config(err.to_string())
    }
}
