//! Runner configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use jsonc_parser::ParseOptions;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};

use crate::RunnerError;

// Embed the schema
const SCHEMA_JSON: &str = include_str!("../../../schemas/v1/config.json");
static CONFIG_SCHEMA: OnceLock<Validator> = OnceLock::new();

/// Configuration for highlighting passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Number of elements between progress updates.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Keep visiting parents of elements that produced errors.
    #[serde(default)]
    pub force_highlight_parents: bool,

    /// Full pass (true) or incremental pass (false).
    #[serde(default = "default_update_all")]
    pub update_all: bool,

    /// Worker threads; 0 uses all available CPUs.
    #[serde(default)]
    pub threads: usize,

    /// Whether rainbow visitors run.
    #[serde(default)]
    pub rainbow: bool,

    /// Per-visitor switches and options.
    #[serde(default)]
    pub visitors: HashMap<String, VisitorOption>,
}

fn default_chunk_size() -> usize {
    100
}

fn default_update_all() -> bool {
    true
}

/// Configuration for a single visitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VisitorOption {
    /// Visitor is enabled/disabled.
    Enabled(bool),
    /// Visitor is enabled with an options object.
    Options(serde_json::Value),
}

impl VisitorOption {
    pub fn is_enabled(&self) -> bool {
        match self {
            VisitorOption::Enabled(enabled) => *enabled,
            VisitorOption::Options(_) => true,
        }
    }

    /// Gets the visitor options as JSON value.
    pub fn options(&self) -> serde_json::Value {
        match self {
            VisitorOption::Enabled(_) => serde_json::Value::Null,
            VisitorOption::Options(v) => v.clone(),
        }
    }
}

impl RunnerConfig {
    /// File names searched by [`discover`](Self::discover), in priority order.
    pub const CONFIG_FILES: [&'static str; 2] = [".hilite.jsonc", ".hilite.json"];

    pub fn new() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            force_highlight_parents: false,
            update_all: default_update_all(),
            threads: 0,
            rainbow: false,
            visitors: HashMap::new(),
        }
    }

    /// Loads configuration from a `.json` or `.jsonc` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            RunnerError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Looks for a configuration file in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Option<PathBuf> {
        let dir = dir.as_ref();
        Self::CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Parses configuration from JSON (comments and trailing commas allowed)
    /// with schema validation.
    pub fn from_json(json: &str) -> Result<Self, RunnerError> {
        let value = jsonc_parser::parse_to_serde_value(json, &ParseOptions::default())
            .map_err(|e| RunnerError::config(format!("Invalid JSON: {}", e)))?
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));

        let schema = CONFIG_SCHEMA.get_or_init(|| {
            let schema_json: serde_json::Value =
                serde_json::from_str(SCHEMA_JSON).expect("Invalid embedded config schema");
            Validator::new(&schema_json).expect("Invalid config schema compilation")
        });

        if let Err(e) = schema.validate(&value) {
            let error_msg = format!("{} at {}", e, e.instance_path());
            return Err(RunnerError::config(format!(
                "Config validation failed: {}",
                error_msg
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| RunnerError::config(format!("Invalid config: {}", e)))
    }

    /// Returns false only for visitors explicitly switched off.
    pub fn visitor_enabled(&self, id: &str) -> bool {
        self.visitors.get(id).is_none_or(VisitorOption::is_enabled)
    }

    /// Returns the options object configured for a visitor, if any.
    pub fn visitor_options(&self, id: &str) -> Option<serde_json::Value> {
        self.visitors
            .get(id)
            .map(VisitorOption::options)
            .filter(|v| !v.is_null())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_config_defaults() {
        let config = RunnerConfig::new();
        assert_eq!(config.chunk_size, 100);
        assert!(config.update_all);
        assert!(!config.force_highlight_parents);
        assert!(!config.rainbow);
        assert_eq!(config.threads, 0);
    }

    #[test]
    fn test_config_from_jsonc() {
        let json = r#"{
            // progress cadence
            "chunk_size": 8,
            "force_highlight_parents": true,
            "visitors": {
                "todo": { "keywords": ["HACK"] },
                "rainbow": false,
            },
        }"#;

        let config = RunnerConfig::from_json(json).unwrap();
        assert_eq!(config.chunk_size, 8);
        assert!(config.force_highlight_parents);
        assert!(config.update_all);
        assert!(!config.visitor_enabled("rainbow"));
        assert!(config.visitor_enabled("todo"));
        assert!(config.visitor_enabled("unconfigured"));
        assert_eq!(
            config.visitor_options("todo").unwrap()["keywords"][0],
            "HACK"
        );
        assert!(config.visitor_options("rainbow").is_none());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = RunnerConfig::from_json("").unwrap();
        assert_eq!(config.chunk_size, 100);
    }

    #[test]
    fn test_from_file_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RunnerConfig::discover(dir.path()).is_none());

        let path = dir.path().join(".hilite.json");
        fs::write(&path, r#"{ "threads": 2 }"#).unwrap();

        let found = RunnerConfig::discover(dir.path()).unwrap();
        assert_eq!(found, path);
        assert_eq!(RunnerConfig::from_file(&found).unwrap().threads, 2);
    }

    #[test]
    fn test_missing_file() {
        let err = RunnerConfig::from_file("/nonexistent/.hilite.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[rstest]
    #[case::unknown_property(r#"{ "chunks": 3 }"#, "Config validation failed")]
    #[case::zero_chunk_size(r#"{ "chunk_size": 0 }"#, "Config validation failed")]
    #[case::type_mismatch(r#"{ "rainbow": "yes" }"#, "Config validation failed")]
    #[case::bad_visitor_option(r#"{ "visitors": { "todo": "on" } }"#, "Config validation failed")]
    #[case::syntax(r#"{ "threads": "#, "Invalid JSON")]
    fn test_config_validation_errors(#[case] json: &str, #[case] expected_error_part: &str) {
        let result = RunnerConfig::from_json(json);
        assert!(result.is_err(), "Expected error for JSON: {}", json);
        let err = result.unwrap_err();
        assert!(
            err.to_string().contains(expected_error_part),
            "Error message '{}' should contain '{}'",
            err,
            expected_error_part
        );
    }
}
