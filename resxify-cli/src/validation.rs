use std::path::Path;

use crate::config::MigrationConfig;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate directory path exists
pub fn validate_dir_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("Directory does not exist: {}", path));
    }

    if !path_obj.is_dir() {
        return Err(format!("Path is not a directory: {}", path));
    }

    Ok(())
}

/// Validate a mapping field selector such as `EN` or `CN`
pub fn validate_field_name(field: &str) -> Result<(), String> {
    if field.trim().is_empty() {
        return Err("Resource field name cannot be empty".to_string());
    }
    if matches!(field, "NewKey" | "Original" | "IsFormat" | "Args") {
        return Err(format!(
            "Resource field cannot be a reserved mapping field: {}",
            field
        ));
    }
    Ok(())
}

/// Validate a complete run configuration before anything is touched
pub fn validate_config(config: &MigrationConfig) -> Result<(), String> {
    validate_file_path(&config.mapping.to_string_lossy())
        .map_err(|e| format!("Mapping file validation failed: {}", e))?;

    validate_dir_path(&config.root.to_string_lossy())
        .map_err(|e| format!("Source root validation failed: {}", e))?;

    for (i, target) in config.resources.iter().enumerate() {
        validate_field_name(&target.field)
            .map_err(|e| format!("Resource {} validation failed: {}", i + 1, e))?;
    }

    if let Some(ext) = config
        .code_extensions
        .iter()
        .find(|e| config.markup_extensions.contains(e))
    {
        return Err(format!(
            "Extension '{}' is listed as both code and markup",
            ext
        ));
    }

    config.rules.validate().map_err(|e| e.to_string())
}
