//! Run configuration, optionally loaded from a `resxify.toml` file.
//!
//! Every field has a default, so an empty file (or no file) reproduces the
//! stock ExHyperV layout:
//!
//! ```toml
//! root = "./"
//! mapping = "translation_map.json"
//! exclude_dirs = [".git", "bin", "obj", ".vs"]
//! code_extensions = ["cs"]
//! markup_extensions = ["xaml"]
//! decode = "replace"
//!
//! [[resources]]
//! path = "./Properties/Resources.resx"
//! field = "EN"
//!
//! [[resources]]
//! path = "./Properties/Resources.zh-CN.resx"
//! field = "CN"
//!
//! [rules]
//! code_reference = "Properties.Resources"
//! format_function = "string.Format"
//! markup_prefix = "properties"
//! markup_class = "Resources"
//! clr_namespace = "ExHyperV.Properties"
//! ```

use std::path::{Path, PathBuf};

use resxify::{DecodeMode, FileKind, ReadOptions, ReplaceRules};
use serde::{Deserialize, Serialize};

/// A resource dictionary and the mapping field its values come from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceTarget {
    pub path: PathBuf,
    pub field: String,
}

impl ResourceTarget {
    pub fn new(path: impl Into<PathBuf>, field: impl Into<String>) -> Self {
        ResourceTarget {
            path: path.into(),
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Directory walked for source files.
    pub root: PathBuf,
    /// JSON mapping file.
    pub mapping: PathBuf,
    /// Dictionaries to sync, default language first.
    pub resources: Vec<ResourceTarget>,
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    pub code_extensions: Vec<String>,
    pub markup_extensions: Vec<String>,
    /// Decode policy for source files. Dictionaries are always read strictly.
    pub decode: DecodeMode,
    pub rules: ReplaceRules,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        MigrationConfig {
            root: PathBuf::from("./"),
            mapping: PathBuf::from("translation_map.json"),
            resources: vec![
                ResourceTarget::new("./Properties/Resources.resx", "EN"),
                ResourceTarget::new("./Properties/Resources.zh-CN.resx", "CN"),
            ],
            exclude_dirs: [".git", "bin", "obj", ".vs"]
                .into_iter()
                .map(String::from)
                .collect(),
            code_extensions: vec!["cs".to_string()],
            markup_extensions: vec!["xaml".to_string()],
            decode: DecodeMode::Replace,
            rules: ReplaceRules::default(),
        }
    }
}

fn normalize_extension(ext: &str) -> &str {
    ext.trim().trim_start_matches('.')
}

impl MigrationConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, String> {
        toml::from_str(s).map_err(|e| format!("Invalid configuration: {}", e))
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load(path: Option<&str>) -> Result<Self, String> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path, e))?;
        Self::from_toml_str(&text).map_err(|e| format!("{} ({})", e, path))
    }

    /// Decides which substitution grammar applies to a file, by extension.
    ///
    /// Only the last extension counts, so `Page.xaml.cs` is a code file.
    pub fn classify(&self, path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?;
        if self
            .code_extensions
            .iter()
            .any(|e| normalize_extension(e) == ext)
        {
            Some(FileKind::Code)
        } else if self
            .markup_extensions
            .iter()
            .any(|e| normalize_extension(e) == ext)
        {
            Some(FileKind::Markup)
        } else {
            None
        }
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    pub fn source_read_options(&self) -> ReadOptions {
        ReadOptions::new().with_decode(self.decode)
    }

    pub fn resource_read_options(&self) -> ReadOptions {
        ReadOptions::new().with_strict(true)
    }
}
