//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings and the leave type catalog from YAML files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{EngineError, EngineResult};
use crate::models::LeaveType;
use crate::store::LeaveTypeCatalog;

use super::types::{EngineSettings, LeaveTypesConfig};

/// Loads and provides access to engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── engine.yaml       # Server, cache and data source settings
/// ├── leave_types.yaml  # Leave type catalog
/// └── snapshot.json     # Data snapshot referenced by engine.yaml
/// ```
///
/// # Example
///
/// ```no_run
/// use leave_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config")?;
/// let annual = loader.get_leave_type("annual")?;
/// println!("{} days of {}", annual.default_days, annual.name);
/// # Ok::<(), leave_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
    settings: EngineSettings,
    leave_types: Vec<LeaveType>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// - `ConfigNotFound` if a required file is missing
    /// - `ConfigParseError` if a file contains invalid YAML, or the leave type
    ///   catalog has duplicate ids or negative default allocations
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;

        let leave_types_path = path.join("leave_types.yaml");
        let catalog = Self::load_yaml::<LeaveTypesConfig>(&leave_types_path)?;
        Self::validate_leave_types(&leave_types_path, &catalog.leave_types)?;

        Ok(Self {
            base_dir: path.to_path_buf(),
            settings,
            leave_types: catalog.leave_types,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate_leave_types(path: &Path, leave_types: &[LeaveType]) -> EngineResult<()> {
        let parse_error = |message: String| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message,
        };

        let mut seen = HashSet::new();
        for leave_type in leave_types {
            if !seen.insert(leave_type.id.as_str()) {
                return Err(parse_error(format!(
                    "duplicate leave type id '{}'",
                    leave_type.id
                )));
            }
            if leave_type.default_days < 0 {
                return Err(parse_error(format!(
                    "leave type '{}' has negative default_days ({})",
                    leave_type.id, leave_type.default_days
                )));
            }
        }
        Ok(())
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns every configured leave type.
    pub fn leave_types(&self) -> &[LeaveType] {
        &self.leave_types
    }

    /// Gets a leave type by its id.
    ///
    /// # Errors
    ///
    /// Returns `LeaveTypeNotFound` if no leave type has that id.
    pub fn get_leave_type(&self, id: &str) -> EngineResult<&LeaveType> {
        LeaveType::find(&self.leave_types, id).ok_or_else(|| EngineError::LeaveTypeNotFound {
            id: id.to_string(),
        })
    }

    /// Resolves the snapshot path against the configuration directory.
    pub fn snapshot_path(&self) -> PathBuf {
        let configured = Path::new(&self.settings.data.snapshot_path);
        if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            self.base_dir.join(configured)
        }
    }
}

#[async_trait]
impl LeaveTypeCatalog for ConfigLoader {
    async fn get_leave_types(&self) -> EngineResult<Vec<LeaveType>> {
        Ok(self.leave_types.clone())
    }
}
