//! Toolkit configuration.

use crate::error::Result;
use serde::Deserialize;

const DEFAULT_CONTEXT_SEPARATOR: &str = "-";
const DEFAULT_FRAMEWORK_SEPARATOR: &str = "_";
const DEFAULT_INTERNAL_SEPARATOR: &str = ".";
const DEFAULT_DETECT_DUPLICATE_NAMES: bool = true;
const DEFAULT_WORKERS: usize = 4;

/// Configuration shared by every session of one component tree.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Separates the segments of a component id.
    #[serde(default = "default_context_separator")]
    pub context_separator: String,

    /// Marks the start of a run of position-derived segments.
    #[serde(default = "default_framework_separator")]
    pub framework_separator: String,

    /// Separates the indices of an internal id.
    #[serde(default = "default_internal_separator")]
    pub internal_separator: String,

    /// Whether tree walks reject duplicate names within one naming scope.
    #[serde(default = "default_detect_duplicate_names")]
    pub detect_duplicate_names: bool,

    /// Number of worker threads a [`Host`](crate::Host) spawns.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Config {
    /// Parses a TOML document. Missing keys take their default values.
    pub fn from_toml_str(source: &str) -> Result<Config> {
        Ok(toml::from_str(source)?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            context_separator: default_context_separator(),
            framework_separator: default_framework_separator(),
            internal_separator: default_internal_separator(),
            detect_duplicate_names: default_detect_duplicate_names(),
            workers: default_workers(),
        }
    }
}

fn default_context_separator() -> String {
    DEFAULT_CONTEXT_SEPARATOR.to_string()
}

fn default_framework_separator() -> String {
    DEFAULT_FRAMEWORK_SEPARATOR.to_string()
}

fn default_internal_separator() -> String {
    DEFAULT_INTERNAL_SEPARATOR.to_string()
}

fn default_detect_duplicate_names() -> bool {
    DEFAULT_DETECT_DUPLICATE_NAMES
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}
