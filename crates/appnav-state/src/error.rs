//! Error taxonomy for navigation state handling
//!
//! Three kinds of failure exist:
//! - `InvalidInput`: the caller passed something malformed; reported
//!   before any asynchronous work starts
//! - `Technical`: an external collaborator failed or answered with an
//!   unexpected shape; reported through the returned future
//! - `IntentNotSupported`: the navigation target declared itself unreachable

use appnav_selection::SelectionError;
use std::fmt::{self, Display, Formatter};

/// Code attached to a technical error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechnicalCode {
    /// Persisting an app state failed
    SaveFailed,
    /// Loading an app state failed
    LoadFailed,
    /// Loaded data did not have the expected shape
    ParseFailed,
    /// Metadata was required but not loaded
    MetadataNotReady,
    /// The reachability check of a navigation target failed
    IntentCheckFailed,
    /// Handing the navigation over to the platform failed
    NavigationFailed,
}

impl TechnicalCode {
    /// Stable code string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SaveFailed => "save-failed",
            Self::LoadFailed => "load-failed",
            Self::ParseFailed => "parse-failed",
            Self::MetadataNotReady => "metadata-not-ready",
            Self::IntentCheckFailed => "intent-check-failed",
            Self::NavigationFailed => "navigation-failed",
        }
    }
}

impl Display for TechnicalCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Navigation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// Malformed arguments
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// External collaborator failure
    #[error("technical error [{code}]: {message}")]
    Technical {
        /// Failure class
        code: TechnicalCode,
        /// Collaborator message
        message: String,
    },

    /// Target declared itself unreachable
    #[error("navigation target not supported: {target}")]
    IntentNotSupported {
        /// Semantic target that was rejected
        target: String,
    },
}

impl NavError {
    /// Create invalid-input error
    #[inline]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create technical error
    #[inline]
    pub fn technical(code: TechnicalCode, message: impl Into<String>) -> Self {
        Self::Technical {
            code,
            message: message.into(),
        }
    }

    /// Technical code, if this is a technical error
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<TechnicalCode> {
        match self {
            Self::Technical { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check for invalid input
    #[inline]
    #[must_use]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check for technical failure
    #[inline]
    #[must_use]
    pub fn is_technical(&self) -> bool {
        matches!(self, Self::Technical { .. })
    }
}

impl From<SelectionError> for NavError {
    fn from(err: SelectionError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

/// Result alias for navigation operations
pub type NavResult<T> = Result<T, NavError>;
