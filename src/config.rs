use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration file structure for pipescope.
///
/// Provides defaults for the workspace and API connection so they don't have
/// to be passed on every invocation. Command-line flags and environment
/// variables take precedence over values loaded here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Bitbucket connection defaults
    #[serde(default)]
    pub bitbucket: BitbucketConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BitbucketConfig {
    /// Workspace to report on
    pub workspace: Option<String>,

    /// Bitbucket username
    pub username: Option<String>,

    /// Bitbucket app password
    pub app_password: Option<String>,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Only repositories updated within this many days are reported on
    #[serde(default = "default_updated_within_days")]
    pub updated_within_days: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bitbucket: BitbucketConfig::default(),
        }
    }
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            workspace: None,
            username: None,
            app_password: None,
            base_url: default_base_url(),
            updated_within_days: default_updated_within_days(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.bitbucket.org/2.0/".to_string()
}

fn default_updated_within_days() -> i64 {
    365
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./pipescope.toml
    /// 3. ./pipescope.json
    /// 4. ./pipescope.yaml
    /// 5. ./pipescope.yml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = [
            "pipescope.toml",
            "pipescope.json",
            "pipescope.yaml",
            "pipescope.yml",
        ];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        // No config file found, return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => {
                // Try TOML first, then JSON, then YAML
                toml::from_str(&contents)
                    .or_else(|_| serde_json::from_str(&contents))
                    .or_else(|_| serde_yaml::from_str(&contents))
                    .with_context(|| format!("Failed to parse config file: {}", path.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bitbucket.base_url, "https://api.bitbucket.org/2.0/");
        assert_eq!(config.bitbucket.updated_within_days, 365);
        assert!(config.bitbucket.workspace.is_none());
        assert!(config.bitbucket.username.is_none());
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[bitbucket]
workspace = "acme"
username = "alice"
base-url = "https://bitbucket.example.com/api/2.0/"
updated-within-days = 90
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.bitbucket.workspace, Some("acme".to_string()));
        assert_eq!(config.bitbucket.username, Some("alice".to_string()));
        assert_eq!(
            config.bitbucket.base_url,
            "https://bitbucket.example.com/api/2.0/"
        );
        assert_eq!(config.bitbucket.updated_within_days, 90);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "bitbucket": {
    "workspace": "acme",
    "app-password": "app-pass-123"
  }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.bitbucket.workspace, Some("acme".to_string()));
        assert_eq!(
            config.bitbucket.app_password,
            Some("app-pass-123".to_string())
        );
        // Unset fields keep their defaults
        assert_eq!(config.bitbucket.base_url, "https://api.bitbucket.org/2.0/");
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        let yaml_content = "bitbucket:\n  workspace: acme\n  updated-within-days: 30\n";
        write!(temp_file, "{}", yaml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.bitbucket.workspace, Some("acme".to_string()));
        assert_eq!(config.bitbucket.updated_within_days, 30);
    }

    #[test]
    fn test_load_missing_explicit_path_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("nonexistent.toml");

        let result = Config::load(Some(&missing));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_extension_falls_back_across_formats() {
        let mut temp_file = NamedTempFile::with_suffix(".conf").unwrap();
        write!(temp_file, "[bitbucket]\nworkspace = \"acme\"\n").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.bitbucket.workspace, Some("acme".to_string()));
    }
}
