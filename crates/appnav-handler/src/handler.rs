//! Navigation handler
//!
//! Orchestrates outbound navigation and inner state saves over the
//! collaborator services. Inbound parsing lives in [`crate::inbound`].
//!
//! Within one `navigate` call the inner state is always saved before the
//! external state, and both before the platform is asked to navigate.

use crate::config::NavigationConfig;
use crate::request::NavigationRequest;
use crate::services::{AppStateStore, HashChanger, NavigationTarget, Navigator};
use appnav_selection::SelectionVariant;
use appnav_state::{
    replace_key, url_parameters_from_variant, AppData, ExternalAppData, InnerAppData,
    MetadataLookup, NavError, NavResult, ParameterFilter, Redactor, SaveOutcome, StateCache,
    TechnicalCode,
};
use indexmap::IndexMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Result of a successful navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// What was handed to the platform
    pub target: NavigationTarget,
    /// Key of the saved inner state, empty if nothing was saved
    pub inner_state_key: String,
}

/// Orchestrator of navigation state handling
pub struct NavigationHandler {
    pub(crate) config: NavigationConfig,
    pub(crate) filter: ParameterFilter,
    pub(crate) store: Arc<dyn AppStateStore>,
    pub(crate) hash: Arc<dyn HashChanger>,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) redactor: Redactor,
    pub(crate) cache: StateCache<InnerAppData>,
}

impl NavigationHandler {
    /// Create handler over the given collaborators
    #[must_use]
    pub fn new(
        config: NavigationConfig,
        store: Arc<dyn AppStateStore>,
        hash: Arc<dyn HashChanger>,
        navigator: Arc<dyn Navigator>,
        metadata: Arc<dyn MetadataLookup>,
    ) -> Self {
        let filter = config.parameter_filter();
        let redactor = Redactor::with_capacity(metadata, config.annotation_cache_capacity);
        Self {
            config,
            filter,
            store,
            hash,
            navigator,
            redactor,
            cache: StateCache::new(),
        }
    }

    /// Replace the save cache, e.g. to inject a clock or equality
    #[must_use]
    pub fn with_state_cache(mut self, cache: StateCache<InnerAppData>) -> Self {
        self.cache = cache;
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Save cache
    #[inline]
    #[must_use]
    pub fn state_cache(&self) -> &StateCache<InnerAppData> {
        &self.cache
    }

    /// Navigate to another application
    ///
    /// The outbound variant is stripped of technical parameters, measures
    /// and sensitive properties before it leaves.
    ///
    /// # Errors
    /// - `Technical` (`save-failed`) if a state cannot be saved
    /// - `Technical` (`intent-check-failed` / `navigation-failed`) if the
    ///   platform fails
    /// - `IntentNotSupported` if the target is unreachable
    pub async fn navigate(&self, request: NavigationRequest) -> NavResult<NavigationOutcome> {
        let NavigationRequest {
            semantic_target,
            selection,
            inner_app_data,
            external_app_data,
            mode,
        } = request;

        let outbound = self.outbound_variant(&selection);
        let parameters = url_parameters_from_variant(&outbound);

        let mut inner_state_key = String::new();
        if let Some(inner) = inner_app_data {
            if mode.saves_inner_state() {
                inner_state_key = self
                    .store_inner_app_state(inner, self.config.immediate_hash_replace, false)
                    .await?;
            } else {
                debug!(%mode, "skipping inner state save");
            }
        }

        let app_state_key = match external_app_data {
            Some(external) => Some(self.save_external(external, &outbound).await?),
            None => None,
        };

        let supported = self
            .navigator
            .is_navigation_supported(&semantic_target)
            .await
            .map_err(|e| {
                error!(%semantic_target, error = %e, "intent check failed");
                e.into_technical(TechnicalCode::IntentCheckFailed)
            })?;
        if !supported {
            return Err(NavError::IntentNotSupported {
                target: semantic_target,
            });
        }

        let target = NavigationTarget {
            semantic_target,
            parameters,
            app_state_key,
            mode,
        };
        self.navigator.to_external(&target).await.map_err(|e| {
            error!(semantic_target = %target.semantic_target, error = %e, "navigation failed");
            e.into_technical(TechnicalCode::NavigationFailed)
        })?;
        info!(semantic_target = %target.semantic_target, %mode, "navigated");

        Ok(NavigationOutcome {
            target,
            inner_state_key,
        })
    }

    /// Save the current screen's state for back navigation
    ///
    /// Returns the state key, or an empty key for trivial data. The hash is
    /// rewritten to carry the key before the save when `immediate` is set,
    /// after it otherwise, and not at all with `skip_hash_replace`. A
    /// payload equal to the last save reuses its key.
    ///
    /// # Errors
    /// `Technical` (`save-failed`) if the store rejects the save.
    pub async fn store_inner_app_state(
        &self,
        data: InnerAppData,
        immediate: bool,
        skip_hash_replace: bool,
    ) -> NavResult<String> {
        let data = if self.config.redact_inner_state {
            self.redactor.redact_for_navigation(&data)
        } else {
            data
        };

        let outcome = self
            .cache
            .save_or_reuse(data, move |data| async move {
                let mut state = self.store.create_empty_state(&self.config.owner);
                let key = state.key();
                state.set_data(data.to_json_value());
                if immediate && !skip_hash_replace {
                    self.replace_hash(&key)?;
                }
                state.save().await.map_err(|e| {
                    error!(%key, error = %e, "inner app state save failed");
                    e.into_technical(TechnicalCode::SaveFailed)
                })?;
                if !immediate && !skip_hash_replace {
                    self.replace_hash(&key)?;
                }
                Ok::<_, NavError>(key)
            })
            .await?;

        if let SaveOutcome::Reused(key) = &outcome {
            if !skip_hash_replace {
                self.replace_hash(key)?;
            }
        }
        Ok(outcome.key().to_string())
    }

    /// Put `key` into the current hash
    ///
    /// # Errors
    /// `InvalidInput` if `key` could not be read back from the hash.
    pub fn replace_hash(&self, key: &str) -> NavResult<()> {
        let current = self.hash.current_hash();
        let next = replace_key(Some(&current), key)?;
        if next != current {
            debug!(hash = %next, "replacing hash");
            self.hash.replace_hash(&next);
        }
        Ok(())
    }

    /// Store a variant as external state for a link resolved later
    ///
    /// # Errors
    /// `Technical` (`save-failed`) if the store rejects the save.
    pub async fn app_state_key_and_url_parameters(
        &self,
        variant: &SelectionVariant,
    ) -> NavResult<(String, IndexMap<String, String>)> {
        let outbound = self.outbound_variant(variant);
        let parameters = url_parameters_from_variant(&outbound);
        let key = self
            .save_external(AppData::with_selection(outbound.clone()), &outbound)
            .await?;
        Ok((key, parameters))
    }

    fn outbound_variant(&self, selection: &SelectionVariant) -> SelectionVariant {
        let cleaned = self.filter.remove_technical_parameters(selection);
        self.redactor.redact_variant_for_navigation(&cleaned)
    }

    async fn save_external(
        &self,
        mut external: ExternalAppData,
        outbound: &SelectionVariant,
    ) -> NavResult<String> {
        if external.selection_variant.is_empty() {
            external.selection_variant = outbound.clone();
        } else {
            external.selection_variant = self
                .filter
                .remove_technical_parameters(&external.selection_variant);
        }
        let external = self.redactor.redact_for_navigation(&external);

        let mut state = self.store.create_empty_state(&self.config.owner);
        let key = state.key();
        state.set_data(external.to_json_value());
        state.save().await.map_err(|e| {
            error!(%key, error = %e, "external app state save failed");
            e.into_technical(TechnicalCode::SaveFailed)
        })?;
        info!(%key, "external app state saved");
        Ok(key)
    }
}

impl Debug for NavigationHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationHandler")
            .field("config", &self.config)
            .field("redactor", &self.redactor)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
