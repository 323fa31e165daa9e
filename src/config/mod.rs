//! Configuration loading and management for the Leave Entitlement Engine.
//!
//! This module loads engine settings and the leave type catalog from YAML
//! files.
//!
//! # Example
//!
//! ```no_run
//! use leave_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config").unwrap();
//! println!("Listening on {}", config.settings().server.bind_address);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{CacheSettings, DataSettings, EngineSettings, LeaveTypesConfig, ServerSettings};
