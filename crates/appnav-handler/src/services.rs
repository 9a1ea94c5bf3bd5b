//! Collaborator interfaces
//!
//! The handler drives four external services it does not implement:
//! the opaque app-state store, the hash of the current screen, the
//! platform navigator, and (through `appnav-state`) the metadata lookup.

use crate::error::ServiceError;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::request::NavigationMode;

/// One stored app state
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppState: Send + Sync {
    /// Store-assigned key
    fn key(&self) -> String;

    /// Replace the payload
    fn set_data(&mut self, data: Value);

    /// Current payload
    fn data(&self) -> Value;

    /// Persist the payload under [`AppState::key`]
    async fn save(&self) -> Result<(), ServiceError>;
}

/// Opaque key-value app-state store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppStateStore: Send + Sync {
    /// New state with a fresh key; nothing is persisted yet
    fn create_empty_state(&self, owner: &str) -> Box<dyn AppState>;

    /// Load a state, `None` if the key is unknown or expired
    async fn get_state(&self, owner: &str, key: &str)
        -> Result<Option<Box<dyn AppState>>, ServiceError>;
}

/// Hash of the current screen
#[cfg_attr(test, mockall::automock)]
pub trait HashChanger: Send + Sync {
    /// Current hash
    fn current_hash(&self) -> String;

    /// Replace the hash without adding a history entry
    fn replace_hash(&self, hash: &str);
}

/// Resolved outbound navigation handed to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    /// Semantic object and action, e.g. `SalesOrder-display`
    pub semantic_target: String,
    /// Flat URL parameters
    pub parameters: IndexMap<String, String>,
    /// Key of the stored external app state
    pub app_state_key: Option<String>,
    /// How the target is opened
    pub mode: NavigationMode,
}

/// Platform navigation services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Raw startup parameters of the running application
    fn startup_parameters(&self) -> Value;

    /// Whether `semantic_target` can be reached
    async fn is_navigation_supported(&self, semantic_target: &str) -> Result<bool, ServiceError>;

    /// Open a target
    async fn to_external(&self, target: &NavigationTarget) -> Result<(), ServiceError>;
}
