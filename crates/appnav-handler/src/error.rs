//! Error types for the navigation handler
//!
//! [`NavError`] from `appnav-state` is the taxonomy every operation
//! reports. This module adds the collaborator failure type, the inbound
//! parse rejection, and configuration loading errors.

use crate::inbound::NavigationKind;
use appnav_state::{NavError, StartupParameters};
use std::path::PathBuf;

pub use appnav_state::{NavResult, TechnicalCode};

/// Failure reported by an external collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Collaborator message
    pub message: String,
}

impl ServiceError {
    /// Create service error
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Convert into a technical navigation error
    #[must_use]
    pub fn into_technical(self, code: TechnicalCode) -> NavError {
        NavError::technical(code, self.message)
    }
}

/// Rejection of inbound navigation parsing
///
/// Carries whatever was known when parsing failed so callers can still
/// fall back to startup parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind} navigation could not be parsed: {error}")]
pub struct ParseNavigationError {
    /// Underlying failure
    #[source]
    pub error: NavError,
    /// Normalized startup parameters (empty if they were malformed)
    pub startup_parameters: StartupParameters,
    /// Branch that failed
    pub kind: NavigationKind,
}

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the file failed
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
