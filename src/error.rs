//! Error types for the Leave Entitlement Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while computing leave balances.

use thiserror::Error;

/// The main error type for the Leave Entitlement Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use leave_engine::error::EngineError;
///
/// let error = EngineError::DataUnavailable {
///     store: "entitlements".to_string(),
///     message: "connection refused".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Data unavailable from entitlements: connection refused"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A backing store could not be reached or returned no usable answer.
    ///
    /// Never coalesced into a default value: a zero balance must stay
    /// distinguishable from a balance that could not be computed.
    #[error("Data unavailable from {store}: {message}")]
    DataUnavailable {
        /// The name of the store that failed.
        store: String,
        /// A description of the failure.
        message: String,
    },

    /// A stored record could not be interpreted.
    #[error("Malformed record '{record}': {message}")]
    MalformedRecord {
        /// A human-readable identifier of the offending record.
        record: String,
        /// A description of what made the record malformed.
        message: String,
    },

    /// The leave type is not present in the catalog.
    #[error("Leave type not found: {id}")]
    LeaveTypeNotFound {
        /// The leave type id that was not found.
        id: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// A caller-supplied parameter was invalid.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A report build was cancelled because a newer build replaced it.
    #[error("Report build {generation} was superseded by a newer request")]
    Superseded {
        /// The generation number of the cancelled build.
        generation: u64,
    },
}

impl EngineError {
    /// Returns a stable, machine-readable code for this error.
    ///
    /// Used for per-cell error markers in reports and for API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                "CONFIG_ERROR"
            }
            EngineError::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            EngineError::MalformedRecord { .. } => "MALFORMED_RECORD",
            EngineError::LeaveTypeNotFound { .. } => "LEAVE_TYPE_NOT_FOUND",
            EngineError::CalculationError { .. } => "CALCULATION_ERROR",
            EngineError::InvalidRequest { .. } => "VALIDATION_ERROR",
            EngineError::Superseded { .. } => "SUPERSEDED",
        }
    }

    /// Creates a `DataUnavailable` error for the named store.
    pub fn unavailable(store: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::DataUnavailable {
            store: store.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
