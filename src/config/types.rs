//! Configuration types for the Leave Entitlement Engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::models::LeaveType;
use crate::store::DEFAULT_TTL_SECS;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Socket address to listen on (e.g., "127.0.0.1:8080").
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Leave type cache settings.
///
/// The cache holds one entry, the whole type list, so only its lifetime is
/// configurable.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Seconds a loaded leave type list stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

/// Where the engine reads its data from.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// Path to the JSON snapshot, relative to the configuration directory
    /// unless absolute.
    pub snapshot_path: String,
}

/// Engine settings from engine.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSettings,
    /// Leave type cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
    /// Data source settings.
    pub data: DataSettings,
}

/// Leave type catalog file structure (leave_types.yaml).
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveTypesConfig {
    /// Every leave type offered.
    pub leave_types: Vec<LeaveType>,
}
