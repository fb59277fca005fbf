use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use resxify::{FileKind, Mapping, Replacer, ResxSyncReport, sync_resx_file};

use crate::config::MigrationConfig;
use crate::validation::{validate_config, validate_field_name, validate_file_path};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub files_updated: usize,
    pub files_failed: usize,
    /// Outcome per dictionary, in configuration order. A dictionary that
    /// could not be synced carries the error message.
    pub resources: Vec<(PathBuf, Result<ResxSyncReport, String>)>,
}

impl MigrationSummary {
    pub fn entries_added(&self) -> usize {
        entries_added(&self.resources)
    }

    /// `Resources.resx: 2, Resources.zh-CN.resx: not found`
    pub fn per_dictionary(&self) -> String {
        per_dictionary(&self.resources)
    }
}

fn entries_added(reports: &[(PathBuf, Result<ResxSyncReport, String>)]) -> usize {
    reports
        .iter()
        .filter_map(|(_, r)| r.as_ref().ok())
        .map(ResxSyncReport::added_count)
        .sum()
}

fn per_dictionary(reports: &[(PathBuf, Result<ResxSyncReport, String>)]) -> String {
    reports
        .iter()
        .map(|(path, report)| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            match report {
                Ok(ResxSyncReport::Missing) => format!("{}: not found", name),
                Ok(report) => format!("{}: {}", name, report.added_count()),
                Err(_) => format!("{}: failed", name),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Loads the mapping and logs what will be skipped. Any failure here is fatal.
pub fn load_mapping(path: &Path) -> Result<Mapping, String> {
    validate_file_path(&path.to_string_lossy())
        .map_err(|e| format!("Mapping file not found: {}", e))?;
    let mapping = Mapping::read_from(path)
        .map_err(|e| format!("Failed to load mapping '{}': {}", path.display(), e))?;

    let diagnostics = mapping.diagnose();
    if diagnostics.missing_key > 0 {
        tracing::warn!(count = diagnostics.missing_key, "entries without NewKey are skipped");
    }
    if diagnostics.empty_original > 0 {
        tracing::warn!(count = diagnostics.empty_original, "entries with empty Original are skipped");
    }
    for key in &diagnostics.duplicate_keys {
        tracing::warn!(key = %key, "duplicate NewKey; only the first is added to dictionaries");
    }
    for key in &diagnostics.arity_mismatches {
        tracing::warn!(key = %key, "fewer Args than placeholders");
    }
    Ok(mapping)
}

/// Walks `config.root` and returns every eligible source file in walk order.
///
/// Excluded directory names are pruned at any depth. Ignore files such as
/// `.gitignore` are not honored.
pub fn collect_source_files(config: &MigrationConfig) -> Vec<(PathBuf, FileKind)> {
    let filter_config = config.clone();
    let walker = WalkBuilder::new(&config.root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |dent| {
            let is_dir = dent.file_type().is_some_and(|t| t.is_dir());
            !(is_dir
                && dent
                    .file_name()
                    .to_str()
                    .is_some_and(|name| filter_config.is_excluded_dir(name)))
        })
        .build();

    let mut files = Vec::new();
    for dent in walker {
        let dent = match dent {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !dent.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(kind) = config.classify(dent.path()) {
            files.push((dent.into_path(), kind));
        }
    }
    files
}

/// Appends missing keys to every configured dictionary.
///
/// Missing or broken dictionaries are reported and skipped; every configured
/// dictionary gets an entry in the result.
pub fn sync_resources(
    mapping: &Mapping,
    config: &MigrationConfig,
    dry_run: bool,
) -> Vec<(PathBuf, Result<ResxSyncReport, String>)> {
    let options = config.resource_read_options();
    let mut reports = Vec::new();

    for target in &config.resources {
        let name = target
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| target.path.display().to_string());

        match sync_resx_file(&target.path, mapping, &target.field, &options, dry_run) {
            Ok(ResxSyncReport::Missing) => {
                println!("  [Resx] skipped: {} not found", target.path.display());
                reports.push((target.path.clone(), Ok(ResxSyncReport::Missing)));
            }
            Ok(ResxSyncReport::Unchanged) => {
                println!("  [Resx] {} already up to date", name);
                reports.push((target.path.clone(), Ok(ResxSyncReport::Unchanged)));
            }
            Ok(report) => {
                let verb = if dry_run { "would add" } else { "added" };
                println!(
                    "  [Resx] {} {} entries ({}) to {}",
                    verb,
                    report.added_count(),
                    target.field,
                    name
                );
                reports.push((target.path.clone(), Ok(report)));
            }
            Err(e) => {
                println!("  [Resx] skipped: {}: {}", target.path.display(), e);
                reports.push((target.path.clone(), Err(e.to_string())));
            }
        }
    }
    reports
}

/// Rewrites every eligible file under the root. Per-file failures are
/// reported and do not stop the run.
pub fn replace_sources(
    replacer: &Replacer,
    config: &MigrationConfig,
    dry_run: bool,
) -> (usize, usize) {
    let options = config.source_read_options();
    let mut updated = 0;
    let mut failed = 0;

    for (path, kind) in collect_source_files(config) {
        match replacer.process_file(&path, kind, &options, dry_run) {
            Ok(true) => {
                let marker = if dry_run { "DRY" } else { "OK" };
                println!("  [{}] {}", marker, path.display());
                updated += 1;
            }
            Ok(false) => {}
            Err(e) => {
                println!("  [ERR] {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }
    (updated, failed)
}

/// Run the sync command: only update the resource dictionaries.
pub fn run_sync_command(config: &MigrationConfig, dry_run: bool) -> Result<usize, String> {
    for target in &config.resources {
        validate_field_name(&target.field)?;
    }
    let mapping = load_mapping(&config.mapping)?;

    println!("--- Syncing resource dictionaries ---");
    let reports = sync_resources(&mapping, config, dry_run);
    let added = entries_added(&reports);

    if dry_run {
        println!("Dry-run mode: no files were written");
    }
    println!(
        "✅ Sync complete: {} entries added ({})",
        added,
        per_dictionary(&reports)
    );
    Ok(added)
}

/// Run the migrate command: sync dictionaries, then rewrite sources.
///
/// The mapping is loaded and every pattern compiled before any file is
/// modified, so fatal errors never leave a half-migrated tree.
pub fn run_migrate_command(
    config: &MigrationConfig,
    dry_run: bool,
) -> Result<MigrationSummary, String> {
    validate_config(config)?;
    let mapping = load_mapping(&config.mapping)?;
    let replacer = Replacer::new(&mapping, config.rules.clone())
        .map_err(|e| format!("Failed to prepare replacements: {}", e))?;

    println!("--- Step 1: syncing resource dictionaries ---");
    let resources = sync_resources(&mapping, config, dry_run);

    println!("\n--- Step 2: replacing source literals ---");
    let (files_updated, files_failed) = replace_sources(&replacer, config, dry_run);

    let summary = MigrationSummary {
        files_updated,
        files_failed,
        resources,
    };

    if dry_run {
        println!("\nDry-run mode: no files were written");
    }
    println!(
        "\n✅ Migration complete: {} files updated, {} failed, {} dictionary entries added ({})",
        summary.files_updated,
        summary.files_failed,
        summary.entries_added(),
        summary.per_dictionary()
    );
    Ok(summary)
}
