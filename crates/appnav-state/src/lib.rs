//! AppNav State Protocol
//!
//! Pure building blocks of cross-application navigation state:
//!
//! - [`AppData`]: persisted payload for back navigation and handoffs
//! - [`StartupParameters`] and [`ParameterFilter`]: inbound URL parameters
//! - [`split_inbound`]: conflict resolution between stored and URL state
//! - [`redaction`]: metadata-driven removal of sensitive and measure
//!   properties, failing closed while metadata is missing
//! - [`hash_key`]: the app-state key embedded in a navigation hash
//! - [`StateCache`]: single-slot cache that skips redundant saves
//!
//! # Example
//!
//! ```rust
//! use appnav_selection::SelectionVariant;
//! use appnav_state::{split_inbound, ParamHandlingMode, ParameterFilter, StartupParameters};
//!
//! let mut stored = SelectionVariant::new();
//! stored.add_select_option("Customer", "I", "EQ", "C1", None)?;
//! let startup = StartupParameters::new().with("Customer", "C2");
//!
//! let result = split_inbound(
//!     &stored,
//!     &startup,
//!     &[],
//!     ParamHandlingMode::UrlParamWins,
//!     &ParameterFilter::default(),
//! )?;
//! assert_eq!(result.navigation_selection.select_option("Customer").unwrap()[0].low, "C2");
//! # Ok::<(), appnav_state::NavError>(())
//! ```


pub mod app_data;
pub mod cache;
pub mod conflict;
pub mod error;
pub mod hash_key;
pub mod redaction;
pub mod startup;

pub use app_data::{AppData, ExternalAppData, InnerAppData, SemanticDates, ValueTexts};
pub use cache::{
    CachePayload, CacheState, CacheStats, CachedSaveEntry, Clock, EqualityFn, SaveOutcome,
    StateCache, SystemClock,
};
pub use conflict::{split_inbound, split_inbound_json, ConflictResolution, ParamHandlingMode};
pub use error::{NavError, NavResult, TechnicalCode};
pub use hash_key::{extract_key, is_valid_key, replace_key, KeyEncoding, IAPP_STATE_PARAMETER};
pub use redaction::{context_url, redact, MetadataLookup, RedactionMode, Redactor};
pub use startup::{
    url_parameters_from_variant, ParameterFilter, StartupParameters, StartupValue,
    DEFAULTED_PARAMETER_NAMES, XAPP_STATE_PARAMETER,
};
