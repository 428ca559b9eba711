//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::path::Path;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "ngl.toml";

/// Loads and validates `ngl.toml` from a project directory.
///
/// A project without the file gets [`ProjectConfig::for_directory`].
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let config_path = project_dir.join(CONFIG_FILE_NAME);
    if !config_path.is_file() {
        return Ok(ProjectConfig::for_directory(project_dir));
    }
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates an `ngl.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that required fields are present and values are consistent.
fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.ionic.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "ionic.cache_capacity must be at least 1".to_string(),
        ));
    }
    if let Some(elements) = config
        .lint
        .rules
        .deny_element
        .as_ref()
        .and_then(|t| t.elements.as_ref())
    {
        if elements.iter().any(|e| e.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "lint.rules.deny-element.elements contains an empty tag name".to_string(),
            ));
        }
    }
    for name in &config.lint.deny {
        if config.lint.allow.contains(name) {
            return Err(ConfigError::ValidationError(format!(
                "rule '{name}' is both denied and allowed"
            )));
        }
    }
    Ok(())
}
