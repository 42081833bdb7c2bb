//! Tool configuration (optionsgen.toml)
//!
//! Optional per-project file tuning the generator. CLI flags take precedence
//! over file values; everything here has a sensible default.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Fixed filename of the tool configuration
pub const TOOL_CONFIG_FILE: &str = "optionsgen.toml";

/// Errors for tool config operations
#[derive(Debug, thiserror::Error)]
pub enum ToolConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Tool configuration from optionsgen.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Top-level sections removed from the merged document before inference
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Root class name override (default: ServiceOptions)
    pub class_name: Option<String>,

    /// Namespace override (default: derived from the project)
    pub namespace: Option<String>,

    /// Project directory override (default: located by ascending from the
    /// working directory)
    pub project_dir: Option<PathBuf>,
}

impl ToolConfig {
    /// Load the config from `optionsgen.toml` in `dir`, if present
    pub fn load(dir: &Path) -> Result<Self, ToolConfigError> {
        let path = dir.join(TOOL_CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)?;
        Self::parse(&contents)
    }

    /// Parse config from a TOML string
    pub fn parse(s: &str) -> Result<Self, ToolConfigError> {
        let config: ToolConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Project directory override resolved against `base`, the directory the
    /// config file was loaded from.
    ///
    /// A relative `project_dir` in optionsgen.toml means relative to that
    /// file, not to wherever the process happens to run.
    pub fn resolved_project_dir(&self, base: &Path) -> Option<PathBuf> {
        self.project_dir.as_ref().map(|dir| {
            if dir.is_absolute() {
                dir.clone()
            } else {
                base.join(dir)
            }
        })
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ToolConfigError> {
        if let Some(ref name) = self.class_name {
            if !is_identifier(name) {
                return Err(ToolConfigError::ValidationError(format!(
                    "class_name '{}' is not a valid identifier",
                    name
                )));
            }
        }

        if let Some(ref ns) = self.namespace {
            if !ns.split('.').all(is_identifier) {
                return Err(ToolConfigError::ValidationError(format!(
                    "namespace '{}' is not a valid dotted identifier",
                    ns
                )));
            }
        }

        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    let re = IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());
    re.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();

        let config = ToolConfig::load(temp.path()).unwrap();
        assert!(config.exclude.is_empty());
        assert!(config.class_name.is_none());
        assert!(config.namespace.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config = ToolConfig::parse(
            r#"
            exclude = ["Logging", "AllowedHosts"]
            class_name = "AppOptions"
            namespace = "Acme.Billing.Options"
            project_dir = "../BillingService"
            "#,
        )
        .unwrap();

        assert_eq!(config.exclude, ["Logging", "AllowedHosts"]);
        assert_eq!(config.class_name.as_deref(), Some("AppOptions"));
        assert_eq!(config.namespace.as_deref(), Some("Acme.Billing.Options"));
        assert_eq!(config.project_dir, Some(PathBuf::from("../BillingService")));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(TOOL_CONFIG_FILE),
            "exclude = [\"Logging\"]\n",
        )
        .unwrap();

        let config = ToolConfig::load(temp.path()).unwrap();
        assert_eq!(config.exclude, ["Logging"]);
    }

    #[test]
    fn test_relative_project_dir_resolves_against_config_dir() {
        let config = ToolConfig::parse("project_dir = \"../BillingService\"").unwrap();

        let resolved = config.resolved_project_dir(Path::new("/repo/tools")).unwrap();
        assert_eq!(resolved, PathBuf::from("/repo/tools/../BillingService"));
    }

    #[test]
    fn test_absolute_project_dir_passes_through() {
        let config = ToolConfig::parse("project_dir = \"/abs/Svc\"").unwrap();

        let resolved = config.resolved_project_dir(Path::new("/repo/tools")).unwrap();
        assert_eq!(resolved, PathBuf::from("/abs/Svc"));
    }

    #[test]
    fn test_no_project_dir_resolves_to_none() {
        let config = ToolConfig::default();
        assert!(config.resolved_project_dir(Path::new("/repo")).is_none());
    }

    #[test]
    fn test_invalid_class_name_rejected() {
        let result = ToolConfig::parse("class_name = \"2Fast\"");
        assert!(matches!(result, Err(ToolConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        let result = ToolConfig::parse("namespace = \"Acme..Billing\"");
        assert!(matches!(result, Err(ToolConfigError::ValidationError(_))));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let result = ToolConfig::parse("exclude = [unterminated");
        assert!(matches!(result, Err(ToolConfigError::ParseError(_))));
    }
}
