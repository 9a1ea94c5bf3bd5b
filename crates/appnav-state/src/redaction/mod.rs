//! Metadata-driven redaction of outbound state
//!
//! Properties annotated as sensitive (or excluded from navigation) and
//! measures must not leave the application. Redaction resolves the entity
//! set behind the payload's context URLs, classifies its properties through
//! a [`MetadataLookup`], and returns a filtered copy.
//!
//! While metadata is not loaded nothing can be classified, so every select
//! option, parameter, value text and semantic date is dropped instead.

mod annotations;
mod redactor;

pub use redactor::{Redactor, DEFAULT_ANNOTATION_CACHE_CAPACITY};

use crate::app_data::AppData;
use appnav_selection::SelectionVariant;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::NavError;

/// Read-only view of service metadata
pub trait MetadataLookup: Send + Sync {
    /// Whether metadata is fully available
    fn is_loaded(&self) -> bool;

    /// Object at a metadata path such as `/Orders/` or `/Orders/Customer@`
    fn get_object(&self, path: &str) -> Option<Value>;
}

impl<M: MetadataLookup + ?Sized> MetadataLookup for Arc<M> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn get_object(&self, path: &str) -> Option<Value> {
        (**self).get_object(path)
    }
}

/// Which annotation class to strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedactionMode {
    /// Potentially sensitive, excluded from navigation, or inapplicable
    Sensitive,
    /// Analytical measures
    Measure,
}

impl Display for RedactionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sensitive => "sensitive",
            Self::Measure => "measure",
        })
    }
}

impl FromStr for RedactionMode {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sensitive" => Ok(Self::Sensitive),
            "measure" => Ok(Self::Measure),
            _ => Err(NavError::invalid_input(format!("unknown redaction mode '{s}'"))),
        }
    }
}

/// Build a context URL `<service>/$metadata#<EntitySet>`
#[must_use]
pub fn context_url(service_root: &str, entity_set: &str) -> String {
    format!(
        "{}/$metadata#{}",
        service_root.trim_end_matches('/'),
        entity_set
    )
}

/// Entity set named by a context URL fragment
#[must_use]
pub fn entity_set_from_context_url(url: &str) -> Option<&str> {
    let (_, fragment) = url.split_once('#')?;
    let entity_set = fragment.trim_matches('/');
    (!entity_set.is_empty()).then_some(entity_set)
}

/// Redacted copy of `data`
#[must_use]
pub fn redact(data: &AppData, lookup: &dyn MetadataLookup, mode: RedactionMode) -> AppData {
    redact_with(data, lookup.is_loaded(), mode, |entity_set| {
        Arc::new(annotations::restricted_properties(lookup, entity_set, mode))
    })
}

/// Redacted copy of a bare variant
#[must_use]
pub fn redact_variant(
    variant: &SelectionVariant,
    lookup: &dyn MetadataLookup,
    mode: RedactionMode,
) -> SelectionVariant {
    redact(&AppData::with_selection(variant.clone()), lookup, mode).selection_variant
}

pub(crate) fn redact_with(
    data: &AppData,
    metadata_loaded: bool,
    mode: RedactionMode,
    classify: impl Fn(&str) -> Arc<HashSet<String>>,
) -> AppData {
    let mut redacted = data.clone();

    if !metadata_loaded {
        if !data.is_trivial() {
            warn!(%mode, "metadata not loaded, dropping all filter values");
        }
        clear_all(&mut redacted);
        return redacted;
    }

    let variant = &data.selection_variant;
    let filter_url = variant
        .filter_context_url()
        .or_else(|| variant.parameter_context_url());
    let parameter_url = variant
        .parameter_context_url()
        .or_else(|| variant.filter_context_url());

    let filter_set = filter_url.and_then(entity_set_from_context_url);
    let parameter_set = parameter_url.and_then(entity_set_from_context_url);
    if filter_set.is_none() && parameter_set.is_none() {
        debug!(%mode, "no context url, nothing to classify against");
        return redacted;
    }

    if let Some(entity_set) = filter_set {
        let restricted = classify(entity_set);
        for name in variant.select_option_property_names() {
            if restricted.contains(name) {
                debug!(property = name, %mode, entity_set, "redacting select option");
                redacted.selection_variant.remove_select_option(name);
            }
        }
        if let Some(texts) = redacted.value_texts.as_mut() {
            texts.retain_properties(|name| !restricted.contains(name));
        }
        if let Some(dates) = redacted.semantic_dates.as_mut() {
            dates.retain_properties(|name| !restricted.contains(name));
        }
    }

    if let Some(entity_set) = parameter_set {
        let restricted = classify(entity_set);
        for name in variant.parameter_names() {
            if restricted.contains(name) {
                debug!(parameter = name, %mode, entity_set, "redacting parameter");
                redacted.selection_variant.remove_parameter(name);
            }
        }
    }

    redacted
}

fn clear_all(data: &mut AppData) {
    data.selection_variant.clear_values();
    if let Some(texts) = data.value_texts.as_mut() {
        texts.clear();
    }
    if let Some(dates) = data.semantic_dates.as_mut() {
        dates.dates.clear();
    }
}
