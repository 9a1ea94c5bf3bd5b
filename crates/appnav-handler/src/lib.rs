//! AppNav Navigation Handler
//!
//! Orchestrates cross-application navigation state on top of
//! `appnav-state`:
//!
//! - [`NavigationHandler::navigate`]: clean, redact and hand a selection
//!   to another application, saving inner and external state on the way
//! - [`NavigationHandler::parse_navigation`]: restore state from the hash,
//!   a cross-app handoff, or startup parameters
//! - [`NavigationHandler::store_inner_app_state`]: cached inner state saves
//!   with hash rewriting
//! - [`mix_attributes_and_selection_variant`]: merge UI attributes into a
//!   selection variant
//!
//! External services are reached through the traits in [`services`].

pub mod config;
pub mod error;
pub mod handler;
pub mod inbound;
pub mod memory_store;
pub mod metadata;
pub mod mix;
pub mod request;
pub mod services;

pub use config::NavigationConfig;
pub use error::{ConfigError, ParseNavigationError, ServiceError};
pub use handler::{NavigationHandler, NavigationOutcome};
pub use inbound::{NavigationKind, ParsedNavigation, RestoredState};
pub use memory_store::InMemoryAppStateStore;
pub use metadata::StaticMetadata;
pub use mix::{
    attributes_from_json, mix_attributes_and_selection_variant,
    mix_attributes_and_selection_variant_str, AttributeValue, Attributes, SuppressionBehavior,
};
pub use request::{NavigationMode, NavigationRequest};
pub use services::{AppState, AppStateStore, HashChanger, NavigationTarget, Navigator};

pub use appnav_state::{NavError, NavResult, TechnicalCode};
