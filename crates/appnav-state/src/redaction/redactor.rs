//! Memoizing redactor bound to one metadata source

use super::{annotations, redact_with, MetadataLookup, RedactionMode};
use crate::app_data::AppData;
use appnav_selection::SelectionVariant;
use moka::sync::Cache;
use std::collections::HashSet;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Default number of memoized (entity set, mode) classifications
pub const DEFAULT_ANNOTATION_CACHE_CAPACITY: u64 = 256;

/// Redaction with memoized property classification
///
/// Classifications are only cached once metadata reports loaded, so a
/// fail-closed pass never poisons the memo.
#[derive(Clone)]
pub struct Redactor {
    lookup: Arc<dyn MetadataLookup>,
    memo: Cache<(String, RedactionMode), Arc<HashSet<String>>>,
}

impl Redactor {
    /// Create redactor with the default memo size
    #[must_use]
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self::with_capacity(lookup, DEFAULT_ANNOTATION_CACHE_CAPACITY)
    }

    /// Create redactor with a memo of `capacity` entries
    #[must_use]
    pub fn with_capacity(lookup: Arc<dyn MetadataLookup>, capacity: u64) -> Self {
        Self {
            lookup,
            memo: Cache::new(capacity),
        }
    }

    /// Metadata source
    #[inline]
    #[must_use]
    pub fn lookup(&self) -> &Arc<dyn MetadataLookup> {
        &self.lookup
    }

    /// Redacted copy of `data`
    #[must_use]
    pub fn redact(&self, data: &AppData, mode: RedactionMode) -> AppData {
        redact_with(data, self.lookup.is_loaded(), mode, |entity_set| {
            self.restricted(entity_set, mode)
        })
    }

    /// Strip measures, then sensitive properties
    #[must_use]
    pub fn redact_for_navigation(&self, data: &AppData) -> AppData {
        let without_measures = self.redact(data, RedactionMode::Measure);
        self.redact(&without_measures, RedactionMode::Sensitive)
    }

    /// [`Redactor::redact_for_navigation`] on a bare variant
    #[must_use]
    pub fn redact_variant_for_navigation(&self, variant: &SelectionVariant) -> SelectionVariant {
        self.redact_for_navigation(&AppData::with_selection(variant.clone()))
            .selection_variant
    }

    /// Forget memoized classifications
    pub fn invalidate(&self) {
        self.memo.invalidate_all();
    }

    fn restricted(&self, entity_set: &str, mode: RedactionMode) -> Arc<HashSet<String>> {
        self.memo.get_with((entity_set.to_string(), mode), || {
            Arc::new(annotations::restricted_properties(
                self.lookup.as_ref(),
                entity_set,
                mode,
            ))
        })
    }
}

impl Debug for Redactor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Redactor")
            .field("metadata_loaded", &self.lookup.is_loaded())
            .field("memoized", &self.memo.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        loaded: AtomicBool,
        calls: AtomicUsize,
    }

    impl MetadataLookup for Counting {
        fn is_loaded(&self) -> bool {
            self.loaded.load(Ordering::SeqCst)
        }

        fn get_object(&self, path: &str) -> Option<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match path {
                "/Orders/" => Some(json!({
                    "Owner": {"$kind": "Property"},
                    "Margin": {"$kind": "Property"}
                })),
                "/Orders/Owner@" => Some(json!({
                    "@com.sap.vocabularies.PersonalData.v1.IsPotentiallySensitive": true
                })),
                "/Orders/Margin@" => {
                    Some(json!({"@com.sap.vocabularies.Analytics.v1.Measure": true}))
                }
                _ => None,
            }
        }
    }

    fn payload() -> AppData {
        let mut variant = SelectionVariant::new();
        variant
            .add_parameter("Owner", "jdoe")
            .unwrap()
            .add_select_option("Margin", "I", "GT", "5", None)
            .unwrap()
            .add_select_option("Status", "I", "EQ", "OPEN", None)
            .unwrap()
            .set_filter_context_url("/srv/$metadata#Orders");
        AppData::with_selection(variant)
    }

    #[test]
    fn navigation_redaction_strips_both_classes() {
        let lookup = Arc::new(Counting::default());
        lookup.loaded.store(true, Ordering::SeqCst);
        let redactor = Redactor::new(lookup);

        let redacted = redactor.redact_for_navigation(&payload());
        assert_eq!(redacted.selection_variant.property_names(), vec!["Status"]);
    }

    #[test]
    fn classification_is_memoized() {
        let lookup = Arc::new(Counting::default());
        lookup.loaded.store(true, Ordering::SeqCst);
        let redactor = Redactor::new(lookup.clone());

        let _ = redactor.redact(&payload(), RedactionMode::Sensitive);
        let after_first = lookup.calls.load(Ordering::SeqCst);
        let _ = redactor.redact(&payload(), RedactionMode::Sensitive);

        assert_eq!(lookup.calls.load(Ordering::SeqCst), after_first);
    }

    #[test]
    fn not_loaded_is_not_memoized() {
        let lookup = Arc::new(Counting::default());
        let redactor = Redactor::new(lookup.clone());

        let closed = redactor.redact(&payload(), RedactionMode::Sensitive);
        assert!(closed.selection_variant.is_empty());

        lookup.loaded.store(true, Ordering::SeqCst);
        let open = redactor.redact(&payload(), RedactionMode::Sensitive);
        assert_eq!(
            open.selection_variant.property_names(),
            vec!["Margin", "Status"]
        );
    }
}
