//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use clipgraph::{ClipgraphError, config::AppConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for ClipgraphError {
    fn from(err: ConfigError) -> Self {
        ClipgraphError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (clipgraph/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or holds invalid values
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ClipgraphError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path:% = path.display(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("clipgraph/config.toml");
    if local_config.exists() {
        info!(path:% = local_config.display(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "clipgraph", "clipgraph") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path:% = system_config.display(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path:% = system_config.display(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ClipgraphError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    validate(&config)?;
    Ok(config)
}

/// Rejects values the engines cannot work with.
///
/// NaN fails every check.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let alignment = config.alignment();
    non_negative("alignment.snap_threshold", alignment.snap_threshold())?;
    non_negative(
        "alignment.equal_spacing_threshold",
        alignment.equal_spacing_threshold(),
    )?;
    non_negative("alignment.min_equal_gap", alignment.min_equal_gap())?;

    let layout = config.cycle_layout();
    if layout.max_cycle_len() < 2 {
        return Err(ConfigError::Validation(format!(
            "cycle_layout.max_cycle_len must be at least 2, got {}",
            layout.max_cycle_len()
        )));
    }
    if !(layout.min_radius() > 0.0 && layout.min_radius().is_finite()) {
        return Err(ConfigError::Validation(format!(
            "cycle_layout.min_radius must be positive, got {}",
            layout.min_radius()
        )));
    }
    non_negative("cycle_layout.diagonal_factor", layout.diagonal_factor())?;
    non_negative("cycle_layout.spacing", layout.spacing())?;

    non_negative("tidy.gap", config.tidy().gap())
}

fn non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{name} must be a finite non-negative number, got {value}"
        )))
    }
}
