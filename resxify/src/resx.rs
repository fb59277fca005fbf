//! Appends missing entries to `.resx` resource dictionaries.
//!
//! The dictionary is treated as text: key presence is a substring probe for
//! `name="KEY"` and new `<data>` blocks go right before the closing `</root>`.
//! Existing content is never reformatted.

use std::{collections::HashSet, path::Path};

use crate::{
    error::Error,
    escape::escape_markup,
    read_options::{ReadOptions, read_text, write_text},
    types::Mapping,
};

/// Closing marker of a `.resx` document; new entries are inserted before it.
pub const CLOSING_ROOT: &str = "</root>";

/// Result of syncing dictionary text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResxSyncOutcome {
    pub content: String,
    /// Keys appended, in mapping order.
    pub added: Vec<String>,
}

impl ResxSyncOutcome {
    pub fn is_changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// What happened to one dictionary file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResxSyncReport {
    /// The file does not exist; it was skipped.
    Missing,
    /// Every key was already present; the file was not rewritten.
    Unchanged,
    /// These keys were appended (or would have been, on a dry run).
    Added(Vec<String>),
}

impl ResxSyncReport {
    pub fn added_count(&self) -> usize {
        match self {
            ResxSyncReport::Added(keys) => keys.len(),
            _ => 0,
        }
    }
}

/// Renders one `<data>` block for a key and its unescaped value.
pub fn data_block(key: &str, value: &str) -> String {
    format!(
        "  <data name=\"{}\" xml:space=\"preserve\">\n    <value>{}</value>\n  </data>",
        key,
        escape_markup(value)
    )
}

fn key_probe(key: &str) -> String {
    format!("name=\"{}\"", key)
}

/// Adds a block for every keyed entry whose key is not yet in `content`,
/// taking values from the `field` language column.
///
/// Duplicate keys within the mapping are added once. If nothing is missing
/// the content is returned untouched; otherwise the dictionary must contain
/// [`CLOSING_ROOT`].
pub fn sync_resx_content(
    content: &str,
    mapping: &Mapping,
    field: &str,
) -> Result<ResxSyncOutcome, Error> {
    let mut added = Vec::new();
    let mut blocks = Vec::new();
    let mut seen = HashSet::new();

    for entry in &mapping.entries {
        let Some(key) = entry.key() else {
            continue;
        };
        if content.contains(&key_probe(key)) || !seen.insert(key) {
            continue;
        }
        blocks.push(data_block(key, &entry.value_for(field)));
        added.push(key.to_string());
    }

    if blocks.is_empty() {
        return Ok(ResxSyncOutcome {
            content: content.to_string(),
            added,
        });
    }

    let insert_at = content.rfind(CLOSING_ROOT).ok_or_else(|| {
        Error::InvalidResource(format!("no {} marker to insert entries before", CLOSING_ROOT))
    })?;

    let mut new_block = blocks.join("\n");
    new_block.push('\n');

    let mut synced = String::with_capacity(content.len() + new_block.len());
    synced.push_str(&content[..insert_at]);
    synced.push_str(&new_block);
    synced.push_str(&content[insert_at..]);

    Ok(ResxSyncOutcome {
        content: synced,
        added,
    })
}

/// Syncs one dictionary file in place.
///
/// A missing file yields [`ResxSyncReport::Missing`] rather than an error.
/// The file is only rewritten when entries were added and `dry_run` is off.
pub fn sync_resx_file<P: AsRef<Path>>(
    path: P,
    mapping: &Mapping,
    field: &str,
    options: &ReadOptions,
    dry_run: bool,
) -> Result<ResxSyncReport, Error> {
    let path = path.as_ref();
    if !path.is_file() {
        tracing::warn!(path = %path.display(), "resource dictionary not found");
        return Ok(ResxSyncReport::Missing);
    }

    let content = read_text(path, options)?;
    let outcome = sync_resx_content(&content, mapping, field)?;
    if !outcome.is_changed() {
        return Ok(ResxSyncReport::Unchanged);
    }

    if !dry_run {
        write_text(path, &outcome.content)?;
    }
    tracing::debug!(
        path = %path.display(),
        field,
        added = outcome.added.len(),
        dry_run,
        "synced resource dictionary"
    );
    Ok(ResxSyncReport::Added(outcome.added))
}
