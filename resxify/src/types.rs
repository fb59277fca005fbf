//! Mapping model: the records that drive a migration run.
//!
//! A mapping file is a JSON array of objects such as
//!
//! ```json
//! {
//!     "NewKey": "Msg_VmCreated",
//!     "Original": "\"VM {0} created\"",
//!     "EN": "VM {0} created",
//!     "CN": "虚拟机 {0} 创建成功",
//!     "IsFormat": true,
//!     "Args": ["vmName"]
//! }
//! ```
//!
//! Language value fields are free-form; any field other than the known ones is
//! kept and can be selected by name when syncing a resource dictionary.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashSet},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{error::Error, pattern::placeholder_arity};

/// Format-call arguments of a mapping entry.
///
/// Usually a list of C# expressions; a bare string is accepted and emitted
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Args {
    List(Vec<String>),
    Raw(String),
}

impl Default for Args {
    fn default() -> Self {
        Args::List(Vec::new())
    }
}

impl Args {
    /// Renders the arguments as they appear inside a format call.
    pub fn joined(&self) -> String {
        match self {
            Args::List(args) => args.join(", "),
            Args::Raw(raw) => raw.clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Args::List(args) => args.len(),
            Args::Raw(raw) if raw.trim().is_empty() => 0,
            Args::Raw(raw) => raw.split(',').count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Treats an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One source literal, its replacement key and its localized values.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MappingEntry {
    #[serde(rename = "NewKey", default)]
    pub new_key: Option<String>,

    /// The literal as it appears in source, possibly still quoted.
    #[serde(rename = "Original", default, deserialize_with = "null_as_default")]
    pub original: String,

    #[serde(rename = "IsFormat", default, deserialize_with = "null_as_default")]
    pub is_format: bool,

    #[serde(rename = "Args", default, deserialize_with = "null_as_default")]
    pub args: Args,

    /// Per-language values and any other fields, keyed by field name.
    #[serde(flatten)]
    pub values: BTreeMap<String, serde_json::Value>,
}

impl MappingEntry {
    /// The resource key, if present and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.new_key.as_deref().filter(|k| !k.is_empty())
    }

    /// The original literal after [`normalize_original`].
    pub fn normalized_original(&self) -> String {
        normalize_original(&self.original)
    }

    /// The value stored under a language field, or an empty string.
    ///
    /// Non-string JSON values are rendered with their JSON representation.
    pub fn value_for(&self, field: &str) -> String {
        match self.values.get(field) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Normalizes a mapping `Original` into the text searched for in sources.
///
/// Trims surrounding whitespace, strips one pair of enclosing double quotes
/// and unescapes `\"`. Escaped backslashes are kept as-is since they usually
/// are path separators that appear escaped in the source too.
pub fn normalize_original(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = if trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or("")
    } else {
        trimmed
    };
    unquoted.replace("\\\"", "\"")
}

/// Counts gathered while validating a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingDiagnostics {
    pub total: usize,
    pub missing_key: usize,
    pub empty_original: usize,
    pub duplicate_keys: Vec<String>,
    pub arity_mismatches: Vec<String>,
}

/// The full, read-only list of mapping entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    pub entries: Vec<MappingEntry>,
}

impl Mapping {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Mapping { entries }
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let entries: Vec<MappingEntry> = serde_json::from_reader(reader)?;
        Ok(Mapping { entries })
    }

    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let entries: Vec<MappingEntry> = serde_json::from_str(s)?;
        Ok(Mapping { entries })
    }

    /// Loads a mapping file. A missing or malformed file is an error.
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path)?;
        let mapping = Self::from_reader(BufReader::new(file))?;
        tracing::debug!(entries = mapping.entries.len(), "loaded mapping");
        Ok(mapping)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by normalized original length, longest first.
    ///
    /// The sort is stable, so entries of equal length keep file order.
    pub fn ordered(&self) -> Vec<&MappingEntry> {
        let mut ordered: Vec<&MappingEntry> = self.entries.iter().collect();
        ordered.sort_by_key(|entry| Reverse(entry.normalized_original().chars().count()));
        ordered
    }

    /// Reports entries that will be skipped or are likely to misbehave.
    pub fn diagnose(&self) -> MappingDiagnostics {
        let mut diagnostics = MappingDiagnostics {
            total: self.entries.len(),
            ..Default::default()
        };
        let mut seen = HashSet::new();

        for entry in &self.entries {
            let Some(key) = entry.key() else {
                diagnostics.missing_key += 1;
                continue;
            };
            if !seen.insert(key) {
                diagnostics.duplicate_keys.push(key.to_string());
            }
            let original = entry.normalized_original();
            if original.is_empty() {
                diagnostics.empty_original += 1;
                continue;
            }
            if entry.is_format && entry.args.len() < placeholder_arity(&original) {
                diagnostics.arity_mismatches.push(key.to_string());
            }
        }
        diagnostics
    }
}
