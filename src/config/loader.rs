//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::application::Application;
use crate::config::schema::{ApplicationConfig, RouterConfig};
use crate::config::validation::{validate_application, validate_config, ValidationError};
use crate::routing::pattern::PatternError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Application '{0}' not found")]
    ApplicationNotFound(String),

    #[error("No config directory created in application {}", .0.display())]
    MissingConfigDirectory(PathBuf),

    #[error("Invalid route for handler '{handler}': {source}")]
    Pattern {
        handler: String,
        #[source]
        source: PatternError,
    },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate the router configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RouterConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// List the application directories below `root`, sorted by name.
///
/// Hidden entries (starting with `.`) and plain files are skipped.
pub fn list_applications(root: &Path) -> Result<Vec<String>, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

/// Load the application `name` from `<root>/<name>/config/*.toml`.
pub fn load_application(root: &Path, name: &str) -> Result<Application, ConfigError> {
    let path = root
        .join(name)
        .canonicalize()
        .map_err(|_| ConfigError::ApplicationNotFound(name.to_string()))?;

    let config_dir = path.join("config");
    if !config_dir.is_dir() {
        return Err(ConfigError::MissingConfigDirectory(path));
    }

    let config = read_application_config(&config_dir)?;
    validate_application(&config).map_err(ConfigError::Validation)?;

    Application::from_config(name, path, config)
}

/// Read and merge every `*.toml` file in `dir`, in file-name order.
pub fn read_application_config(dir: &Path) -> Result<ApplicationConfig, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(io_error)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    files.sort();

    let mut merged = toml::Table::new();
    for file in &files {
        let content = fs::read_to_string(file).map_err(|source| ConfigError::Io {
            path: file.clone(),
            source,
        })?;
        let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: file.clone(),
            source,
        })?;
        merge_tables(&mut merged, table);
    }

    toml::Value::Table(merged)
        .try_into()
        .map_err(|source| ConfigError::Parse {
            path: dir.to_path_buf(),
            source,
        })
}

/// Deep merge `overlay` into `base`; tables merge, everything else is replaced.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            base.insert(key, toml::Value::Table(incoming));
        } else {
            base.insert(key, value);
        }
    }
}
