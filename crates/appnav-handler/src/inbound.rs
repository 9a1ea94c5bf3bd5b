//! Inbound navigation parsing
//!
//! Decides where the state of a freshly started screen comes from, in
//! this order:
//!
//! 1. an inner app-state key in the hash (back navigation)
//! 2. a pending cross-app handoff announced through `sap-xapp-state`
//! 3. plain startup parameters
//! 4. nothing at all
//!
//! An expired handoff falls back to startup parameters but is still
//! reported as [`NavigationKind::XAppState`].

use crate::error::{ParseNavigationError, ServiceError};
use crate::handler::NavigationHandler;
use appnav_selection::SelectionVariant;
use appnav_state::{
    extract_key, split_inbound, AppData, NavError, NavResult, StartupParameters, TechnicalCode,
};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, info, warn};

/// Where the restored state came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// Fresh start without parameters
    Initial,
    /// Startup parameters only
    URLParams,
    /// Cross-app handoff
    XAppState,
    /// Back navigation into this screen
    IAppState,
}

impl NavigationKind {
    /// Stable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::URLParams => "URLParams",
            Self::XAppState => "xAppState",
            Self::IAppState => "iAppState",
        }
    }
}

impl Display for NavigationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restored state of the screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredState {
    /// App data with the navigation selection
    pub app_data: AppData,
    /// Values filled in from user defaults
    pub defaulted_selection: SelectionVariant,
    /// The selection consists of user defaults only
    pub navigation_is_defaults_only: bool,
}

/// Successful inbound parse
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNavigation {
    /// Restored state
    pub state: RestoredState,
    /// Normalized startup parameters
    pub startup_parameters: StartupParameters,
    /// Branch taken
    pub kind: NavigationKind,
}

impl NavigationHandler {
    /// Restore state for the current screen
    ///
    /// # Errors
    /// `ParseNavigationError` carrying `InvalidInput` for malformed startup
    /// parameters, or `Technical` (`load-failed` / `parse-failed`) when a
    /// stored state cannot be read.
    pub async fn parse_navigation(&self) -> Result<ParsedNavigation, ParseNavigationError> {
        let raw = self.navigator.startup_parameters();
        let startup = match raw {
            Value::Null => StartupParameters::new(),
            raw => StartupParameters::from_json(&raw).map_err(|error| ParseNavigationError {
                error,
                startup_parameters: StartupParameters::new(),
                kind: NavigationKind::URLParams,
            })?,
        };
        let reject = |error: NavError, kind: NavigationKind| ParseNavigationError {
            error,
            startup_parameters: startup.clone(),
            kind,
        };

        let hash = self.hash.current_hash();
        if let Some(key) = extract_key(&hash) {
            debug!(%key, "restoring inner app state");
            let app_data = self
                .load_app_data(key)
                .await
                .map_err(|e| reject(e, NavigationKind::IAppState))?
                .unwrap_or_else(|| {
                    warn!(%key, "inner app state not found, starting empty");
                    AppData::default()
                });
            return Ok(ParsedNavigation {
                state: RestoredState {
                    app_data,
                    ..RestoredState::default()
                },
                startup_parameters: startup,
                kind: NavigationKind::IAppState,
            });
        }

        let defaulted = startup
            .defaulted_names()
            .map_err(|e| reject(e, NavigationKind::URLParams))?;

        if let Some(key) = startup.xapp_state_key() {
            debug!(%key, "restoring cross-app state");
            let loaded = self
                .load_app_data(key)
                .await
                .map_err(|e| reject(e, NavigationKind::XAppState))?;
            let app_data = loaded.unwrap_or_else(|| {
                warn!(%key, "cross-app state expired, using startup parameters");
                AppData::default()
            });
            let state = self
                .resolve(app_data, &startup, &defaulted)
                .map_err(|e| reject(e, NavigationKind::XAppState))?;
            return Ok(ParsedNavigation {
                state,
                startup_parameters: startup,
                kind: NavigationKind::XAppState,
            });
        }

        if startup.has_navigation_parameters(&self.filter) {
            let state = self
                .resolve(AppData::default(), &startup, &defaulted)
                .map_err(|e| reject(e, NavigationKind::URLParams))?;
            return Ok(ParsedNavigation {
                state,
                startup_parameters: startup,
                kind: NavigationKind::URLParams,
            });
        }

        info!("initial navigation");
        Ok(ParsedNavigation {
            state: RestoredState::default(),
            startup_parameters: startup,
            kind: NavigationKind::Initial,
        })
    }

    fn resolve(
        &self,
        mut app_data: AppData,
        startup: &StartupParameters,
        defaulted: &[String],
    ) -> NavResult<RestoredState> {
        let resolution = split_inbound(
            &app_data.selection_variant,
            startup,
            defaulted,
            self.config.param_handling,
            &self.filter,
        )?;
        app_data.selection_variant = resolution.navigation_selection;
        Ok(RestoredState {
            app_data,
            defaulted_selection: resolution.defaulted_selection,
            navigation_is_defaults_only: resolution.navigation_is_defaults_only,
        })
    }

    async fn load_app_data(&self, key: &str) -> NavResult<Option<AppData>> {
        let state = self
            .store
            .get_state(&self.config.owner, key)
            .await
            .map_err(|e: ServiceError| e.into_technical(TechnicalCode::LoadFailed))?;
        let Some(state) = state else {
            return Ok(None);
        };
        match state.data() {
            Value::Null => Ok(Some(AppData::default())),
            data => AppData::from_json_value(&data).map(Some).map_err(|e| {
                NavError::technical(
                    TechnicalCode::ParseFailed,
                    format!("stored app state {key} is malformed: {e}"),
                )
            }),
        }
    }
}
