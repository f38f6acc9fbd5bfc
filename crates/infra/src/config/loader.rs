//! Configuration loader
//!
//! Loads application configuration from a JSON or TOML file. Every section is
//! optional; missing sections and fields take their defaults.
//!
//! ## File Locations
//! Without an explicit path the loader probes (in order):
//! 1. `./wayfare.{json,toml}` and `./config.{json,toml}` (current directory)
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable
//!
//! When no file is found the built-in defaults are used.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use wayfare_domain::{Config, Result, WayfareError};

use crate::errors::InfraError;

const CONFIG_FILE_NAMES: [&str; 4] = ["wayfare.json", "wayfare.toml", "config.json", "config.toml"];

/// Load and validate configuration.
///
/// # Errors
/// Returns `WayfareError::Config` if an explicit path does not exist, the file
/// cannot be parsed, or the resulting configuration fails validation.
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    let config = match path.or_else(probe_config_paths) {
        Some(path) => load_from_file(&path)?,
        None => {
            debug!("No config file found; using defaults");
            Config::default()
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load configuration from a specific file.
///
/// Format is detected by extension (`.json` or `.toml`). The result is not
/// validated.
///
/// # Errors
/// Returns `WayfareError::Config` if the file is missing, unreadable or
/// invalid.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(WayfareError::Config(format!("Config file not found: {}", path.display())));
    }

    info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| WayfareError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration from string content.
///
/// # Errors
/// Returns `WayfareError::Config` if format is unsupported or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| InfraError::from(e).into()),
        "json" => serde_json::from_str(contents)
            .map_err(|e| WayfareError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(WayfareError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a configuration file.
///
/// Returns the first existing candidate.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    first_existing(&roots)
}

fn first_existing(roots: &[PathBuf]) -> Option<PathBuf> {
    candidates(roots).find(|path| path.exists())
}

fn candidates(roots: &[PathBuf]) -> impl Iterator<Item = PathBuf> + '_ {
    roots.iter().flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
}
