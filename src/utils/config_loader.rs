use crate::core::models::DevConfig;
use crate::utils::path_aliases::EXACT_ALIAS_SUFFIX;
use crate::utils::{InstallerError, Logger, Result};
use std::path::{Path, PathBuf};
use url::Url;

pub const CONFIG_FILE: &str = "fbi.config.json";

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file if it exists
    /// Searches for fbi.config.json in the project root
    pub fn load_from_file(root: &Path) -> Result<Option<DevConfig>> {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            Logger::debug(&format!("No {} found, using defaults", CONFIG_FILE));
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path)?;
        let config: DevConfig = serde_json::from_str(&content).map_err(|e| {
            InstallerError::config(format!("Failed to parse {}: {}", CONFIG_FILE, e))
        })?;

        Logger::debug("✅ Config file loaded successfully");
        Ok(Some(config))
    }

    /// Merge file config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(file_config: Option<DevConfig>, root: PathBuf, port: Option<u16>) -> DevConfig {
        let mut config = file_config.unwrap_or_default().with_root(root);

        if let Some(port) = port {
            config.server.port = port;
        }

        config
    }

    /// Load, merge and validate in one step
    pub fn load(root: &Path, port: Option<u16>) -> Result<DevConfig> {
        let file_config = Self::load_from_file(root)?;
        let config = Self::merge_with_cli(file_config, root.to_path_buf(), port);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Reject descriptors the dev server cannot honour
    pub fn validate(config: &DevConfig) -> Result<()> {
        if let Some(target) = config
            .alias
            .iter()
            .find(|(alias, _)| alias.trim_end_matches(EXACT_ALIAS_SUFFIX).is_empty())
            .map(|(_, target)| target)
        {
            return Err(InstallerError::config(format!(
                "alias pointing to '{}' has an empty name",
                target
            )));
        }

        if let Some(ext) = config.extensions.iter().find(|ext| !ext.starts_with('.') || ext.len() < 2) {
            return Err(InstallerError::config(format!(
                "extension '{}' must start with '.'",
                ext
            )));
        }

        if config.server.port == 0 {
            return Err(InstallerError::config("server port must not be 0"));
        }

        for rule in &config.server.proxy {
            if !rule.prefix.starts_with('/') {
                return Err(InstallerError::config(format!(
                    "proxy prefix '{}' must start with '/'",
                    rule.prefix
                )));
            }

            let target = Url::parse(&rule.target).map_err(|e| {
                InstallerError::config(format!("invalid proxy target '{}': {}", rule.target, e))
            })?;
            if !matches!(target.scheme(), "http" | "https") || target.host().is_none() {
                return Err(InstallerError::config(format!(
                    "proxy target '{}' must be an http(s) origin",
                    rule.target
                )));
            }
        }

        Ok(())
    }

    /// Pretty-printed descriptor, used by the `config` command
    pub fn render(config: &DevConfig) -> Result<String> {
        Ok(serde_json::to_string_pretty(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProxyRule;

    #[test]
    fn test_load_from_file_not_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::load_from_file(temp_dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_from_file_valid() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{"extensions": [".ts", ".vue"], "server": {"port": 4000}}"#,
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(temp_dir.path()).unwrap().unwrap();
        assert_eq!(config.extensions, vec![".ts", ".vue"]);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.alias.len(), 3);
    }

    #[test]
    fn test_load_from_file_malformed() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let err = ConfigLoader::load_from_file(temp_dir.path()).unwrap_err();
        assert!(matches!(err, InstallerError::Config(_)));
    }

    #[test]
    fn test_merge_with_cli_override() {
        let mut file_config = DevConfig::default();
        file_config.server.port = 4000;

        let merged = ConfigLoader::merge_with_cli(Some(file_config), PathBuf::from("/project"), Some(5000));

        assert_eq!(merged.server.port, 5000);
        assert_eq!(merged.root, PathBuf::from("/project"));
    }

    #[test]
    fn test_validate_defaults() {
        assert!(ConfigLoader::validate(&DevConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_extension() {
        let mut config = DevConfig::default();
        config.extensions.push("vue".to_string());
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_proxy() {
        let mut config = DevConfig::default();
        config.server.proxy = vec![ProxyRule::new("api", "http://127.0.0.1:8080")];
        assert!(ConfigLoader::validate(&config).is_err());

        config.server.proxy = vec![ProxyRule::new("/api", "127.0.0.1:8080")];
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_names_target_of_empty_alias() {
        let mut config = DevConfig::default();
        config.alias.insert("$".to_string(), "./lib".to_string());

        let err = ConfigLoader::validate(&config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: alias pointing to './lib' has an empty name"
        );
    }

    #[test]
    fn test_render_round_trips_port() {
        let rendered = ConfigLoader::render(&DevConfig::default()).unwrap();
        assert!(rendered.contains("\"port\": 3000"));
        assert!(rendered.contains("~bootstrap"));
    }
}
