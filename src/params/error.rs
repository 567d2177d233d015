//! Configuration errors.

use thiserror::Error;

/// Why a configuration string failed to update the parameters.
///
/// These never reach the host as failures; the plugin logs them and keeps
/// running with whatever parameters are in force.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The host has no configuration string for this plugin.
    #[error("PrioritySiteFactorParameters not set")]
    NotSet,

    /// A required `key=` token is absent.
    #[error("{key} not configured")]
    MissingKey { key: &'static str },

    /// The value after a key is outside its valid range. Non-numeric
    /// values parse as 0 and land here too.
    #[error("invalid {key} value {value}: expected {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
}

impl ParamError {
    /// The configuration key involved, if any.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ParamError::NotSet => None,
            ParamError::MissingKey { key } | ParamError::OutOfRange { key, .. } => Some(key),
        }
    }
}
