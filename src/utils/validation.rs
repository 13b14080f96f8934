use crate::utils::error::{MigrateError, Result};
use regex::Regex;
use std::path::{Component, Path};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 專案內的相對路徑：不可為空、不可為絕對路徑、不可跳出專案根目錄
pub fn validate_relative_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    for component in Path::new(path).components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(MigrateError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: path.to_string(),
                    reason: "Path must not leave the project root".to_string(),
                });
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(MigrateError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: path.to_string(),
                    reason: "Path must be relative to the project root".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_pattern(field_name: &str, pattern: &str) -> Result<()> {
    Regex::new(pattern).map_err(|e| MigrateError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: pattern.to_string(),
        reason: format!("Invalid regular expression: {}", e),
    })?;
    Ok(())
}

pub fn validate_file_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Must be a bare file name".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MigrateError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
