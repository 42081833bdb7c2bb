//! Effective settings document with provenance
//!
//! Loads the base `appsettings.json`, applies every overlay found in the
//! project directory, strips excluded sections, and records where each
//! contributing file came from.

use chrono::{DateTime, Utc};
use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::merge::deep_merge;

/// Fixed filename of the base settings document
pub const BASE_SETTINGS_FILE: &str = "appsettings.json";

/// Glob matching environment overlay files in the project directory
const OVERLAY_PATTERN: &str = "appsettings.*.json";

/// Errors for settings loading and merging
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Base settings file not found: {0}")]
    MissingBase(PathBuf),

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialization failed: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Origin of a contributing settings file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Base,
    Overlay,
}

/// A contributing settings file with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    /// Origin of this source
    pub origin: SettingsOrigin,

    /// File path as loaded
    pub path: String,

    /// SHA-256 digest of raw file bytes
    pub digest: String,
}

/// The merged settings document plus provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveSettings {
    /// When this document was computed
    pub created_at: DateTime<Utc>,

    /// The merged (and section-filtered) document
    pub document: Value,

    /// Contributing files in merge order (base first)
    pub sources: Vec<SettingsSource>,

    /// Top-level sections removed after merging
    pub excluded_sections: Vec<String>,
}

impl EffectiveSettings {
    /// Build the effective settings document.
    ///
    /// The base file is read from `working_dir`; overlays are discovered in
    /// `project_dir` and applied in lexicographic filename order so the merge
    /// result is reproducible across platforms. Excluded sections are removed
    /// from the fully merged document, never from individual layers, so an
    /// overlay may still override keys inside a section that is about to be
    /// dropped.
    ///
    /// A missing base file or malformed JSON anywhere is fatal.
    pub fn build(
        working_dir: &Path,
        project_dir: &Path,
        exclude_sections: &[String],
    ) -> Result<Self, SettingsError> {
        let base_path = working_dir.join(BASE_SETTINGS_FILE);
        if !base_path.is_file() {
            return Err(SettingsError::MissingBase(base_path));
        }

        let mut sources = Vec::new();

        let (mut document, digest) = Self::load_json_file(&base_path)?;
        sources.push(SettingsSource {
            origin: SettingsOrigin::Base,
            path: base_path.to_string_lossy().to_string(),
            digest,
        });

        for overlay_path in Self::overlay_files(project_dir)? {
            let (overlay, digest) = Self::load_json_file(&overlay_path)?;
            document = deep_merge(document, overlay);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Overlay,
                path: overlay_path.to_string_lossy().to_string(),
                digest,
            });
        }

        if let Some(map) = document.as_object_mut() {
            for section in exclude_sections {
                map.shift_remove(section);
            }
        }

        Ok(Self {
            created_at: Utc::now(),
            document,
            sources,
            excluded_sections: exclude_sections.to_vec(),
        })
    }

    /// Overlay files in the project directory, sorted by filename
    fn overlay_files(project_dir: &Path) -> Result<Vec<PathBuf>, SettingsError> {
        let matcher = Self::overlay_matcher();

        let entries = fs::read_dir(project_dir).map_err(|e| SettingsError::IoError {
            path: project_dir.to_path_buf(),
            source: e,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SettingsError::IoError {
                path: project_dir.to_path_buf(),
                source: e,
            })?;
            let name = entry.file_name();
            if matcher.is_match(Path::new(&name)) {
                files.push(entry.path());
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// The pattern is fixed and known-valid
    fn overlay_matcher() -> GlobMatcher {
        Glob::new(OVERLAY_PATTERN).unwrap().compile_matcher()
    }

    /// Load and parse a JSON file, returning the value and digest of raw bytes
    fn load_json_file(path: &Path) -> Result<(Value, String), SettingsError> {
        let bytes = fs::read(path).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let value = serde_json::from_slice(&bytes).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok((value, digest))
    }

    /// Serialize the merged document for schema inference
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// Get a document value by dot-separated path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.document;
        for part in path.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_json(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    #[test]
    fn test_base_only() {
        let temp = TempDir::new().unwrap();
        write_json(temp.path(), "appsettings.json", &json!({"A": 1}));

        let settings = EffectiveSettings::build(temp.path(), temp.path(), &[]).unwrap();

        assert_eq!(settings.document, json!({"A": 1}));
        assert_eq!(settings.sources.len(), 1);
        assert_eq!(settings.sources[0].origin, SettingsOrigin::Base);
        assert_eq!(settings.sources[0].digest.len(), 64);
    }

    #[test]
    fn test_missing_base_is_fatal() {
        let temp = TempDir::new().unwrap();

        let result = EffectiveSettings::build(temp.path(), temp.path(), &[]);
        assert!(matches!(result, Err(SettingsError::MissingBase(_))));
    }

    #[test]
    fn test_malformed_overlay_is_fatal() {
        let temp = TempDir::new().unwrap();
        write_json(temp.path(), "appsettings.json", &json!({}));
        fs::write(temp.path().join("appsettings.Staging.json"), "{ not json").unwrap();

        let result = EffectiveSettings::build(temp.path(), temp.path(), &[]);
        assert!(matches!(result, Err(SettingsError::ParseError { .. })));
    }

    #[test]
    fn test_overlay_overrides_base() {
        let temp = TempDir::new().unwrap();
        write_json(
            temp.path(),
            "appsettings.json",
            &json!({"Logging": {"Level": "Info"}, "Keep": true}),
        );
        write_json(
            temp.path(),
            "appsettings.Production.json",
            &json!({"Logging": {"Level": "Warning"}}),
        );

        let settings = EffectiveSettings::build(temp.path(), temp.path(), &[]).unwrap();

        assert_eq!(settings.get("Logging.Level"), Some(&json!("Warning")));
        assert_eq!(settings.get("Keep"), Some(&json!(true)));
        assert_eq!(settings.sources.len(), 2);
        assert_eq!(settings.sources[1].origin, SettingsOrigin::Overlay);
    }

    #[test]
    fn test_overlays_applied_in_filename_order() {
        let temp = TempDir::new().unwrap();
        write_json(temp.path(), "appsettings.json", &json!({"Value": "base"}));
        write_json(
            temp.path(),
            "appsettings.Development.json",
            &json!({"Value": "development"}),
        );
        write_json(
            temp.path(),
            "appsettings.Production.json",
            &json!({"Value": "production"}),
        );

        let settings = EffectiveSettings::build(temp.path(), temp.path(), &[]).unwrap();

        // Lexicographic order: Development before Production, so Production wins
        assert_eq!(settings.get("Value"), Some(&json!("production")));
        let paths: Vec<&str> = settings.sources.iter().map(|s| s.path.as_str()).collect();
        assert!(paths[1].ends_with("appsettings.Development.json"));
        assert!(paths[2].ends_with("appsettings.Production.json"));
    }

    #[test]
    fn test_base_file_not_matched_as_overlay() {
        let temp = TempDir::new().unwrap();
        let working = temp.path().join("work");
        fs::create_dir_all(&working).unwrap();
        write_json(&working, "appsettings.json", &json!({"A": 1}));

        // Project dir contains its own base file; only the starred variants
        // count as overlays
        write_json(temp.path(), "appsettings.json", &json!({"A": 99}));
        write_json(temp.path(), "appsettings.Local.json", &json!({"B": 2}));

        let settings = EffectiveSettings::build(&working, temp.path(), &[]).unwrap();

        assert_eq!(settings.get("A"), Some(&json!(1)));
        assert_eq!(settings.get("B"), Some(&json!(2)));
        assert_eq!(settings.sources.len(), 2);
    }

    #[test]
    fn test_excluded_sections_removed_after_merge() {
        let temp = TempDir::new().unwrap();
        write_json(
            temp.path(),
            "appsettings.json",
            &json!({"Logging": {"Level": "Info"}, "Databases": {"Orders": {"ConnString": "x"}}}),
        );
        write_json(
            temp.path(),
            "appsettings.Production.json",
            &json!({"Logging": {"Level": "Debug"}}),
        );

        let exclude = vec!["Logging".to_string()];
        let settings = EffectiveSettings::build(temp.path(), temp.path(), &exclude).unwrap();

        assert!(settings.get("Logging").is_none());
        assert_eq!(settings.get("Databases.Orders.ConnString"), Some(&json!("x")));
        assert_eq!(settings.excluded_sections, exclude);
    }

    #[test]
    fn test_excluding_absent_section_is_noop() {
        let temp = TempDir::new().unwrap();
        write_json(temp.path(), "appsettings.json", &json!({"A": 1}));

        let exclude = vec!["Missing".to_string()];
        let settings = EffectiveSettings::build(temp.path(), temp.path(), &exclude).unwrap();

        assert_eq!(settings.document, json!({"A": 1}));
    }

    #[test]
    fn test_to_json_round_trips() {
        let temp = TempDir::new().unwrap();
        write_json(temp.path(), "appsettings.json", &json!({"A": {"B": [1, 2]}}));

        let settings = EffectiveSettings::build(temp.path(), temp.path(), &[]).unwrap();
        let text = settings.to_json().unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, settings.document);
    }
}
