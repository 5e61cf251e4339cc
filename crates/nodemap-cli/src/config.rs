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

use nodemap::{NodeMapError, config::AppConfig};

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

impl From<ConfigError> for NodeMapError {
    fn from(err: ConfigError) -> Self {
        NodeMapError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (nodemap/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or holds unusable values
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, NodeMapError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("nodemap/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "nodemap", "nodemap") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, NodeMapError> {
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

/// Rejects values the engine cannot work with.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let checks = [
        ("layout.node_height", config.layout().node_height()),
        ("animation.decay_rate", config.animation().decay_rate()),
        ("animation.idle_threshold", config.animation().idle_threshold()),
        (
            "viewport.zoom_scale_multiplier",
            config.viewport().zoom_scale_multiplier(),
        ),
    ];
    for (name, value) in checks {
        if !(value > 0.0) {
            return Err(ConfigError::Validation(format!(
                "{name} must be positive, got {value}"
            )));
        }
    }
    if config.animation().idle_frames() == 0 {
        return Err(ConfigError::Validation(
            "animation.idle_frames must be at least 1".to_string(),
        ));
    }
    Ok(())
}
