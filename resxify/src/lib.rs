#![forbid(unsafe_code)]
//! One-shot localization migration for C#/XAML code trees.
//!
//! Given a mapping of hardcoded literals to resource keys, `resxify` rewrites
//! the literals into resource references and appends the missing keys to the
//! `.resx` dictionaries.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use resxify::{FileKind, Mapping, ReadOptions, ReplaceRules, Replacer, sync_resx_file};
//!
//! let mapping = Mapping::read_from("translation_map.json")?;
//! sync_resx_file("Properties/Resources.resx", &mapping, "EN", &ReadOptions::new(), false)?;
//!
//! let replacer = Replacer::new(&mapping, ReplaceRules::default())?;
//! replacer.process_file("Views/HostPage.xaml.cs", FileKind::Code, &ReadOptions::new(), false)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Everything is plain text processing: literals are located with regular
//! expressions, not with a C# or XAML parser.

pub mod error;
pub mod escape;
pub mod pattern;
pub mod read_options;
pub mod replace;
pub mod resx;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    escape::escape_markup,
    pattern::{code_literal_pattern, template_pattern},
    read_options::{DecodeMode, ReadOptions, read_text},
    replace::{FileKind, ReplaceRules, Replacer, inject_namespace},
    resx::{ResxSyncReport, sync_resx_content, sync_resx_file},
    types::{Args, Mapping, MappingEntry, normalize_original},
};
