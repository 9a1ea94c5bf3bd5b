//! Testing utilities for the AppNav workspace
//!
//! In-process fakes for the handler's collaborators plus shared fixtures.

#![allow(missing_docs)]

use appnav_handler::{HashChanger, NavigationTarget, Navigator, ServiceError};
use appnav_selection::SelectionVariant;
use appnav_state::{context_url, AppData, Clock};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;

pub use appnav_handler::StaticMetadata;

pub const MEASURE: &str = "@com.sap.vocabularies.Analytics.v1.Measure";
pub const SENSITIVE: &str = "@com.sap.vocabularies.PersonalData.v1.IsPotentiallySensitive";

/// Hash held in memory, records every replacement
#[derive(Debug, Default)]
pub struct MemoryHashChanger {
    hash: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryHashChanger {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: Mutex::new(hash.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn set(&self, hash: impl Into<String>) {
        *self.hash.lock() = hash.into();
    }

    pub fn replacements(&self) -> Vec<String> {
        self.history.lock().clone()
    }
}

impl HashChanger for MemoryHashChanger {
    fn current_hash(&self) -> String {
        self.hash.lock().clone()
    }

    fn replace_hash(&self, hash: &str) {
        *self.hash.lock() = hash.to_string();
        self.history.lock().push(hash.to_string());
    }
}

/// Navigator that records targets instead of leaving
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    startup: Mutex<Value>,
    unsupported: Mutex<HashSet<String>>,
    fail_with: Mutex<Option<String>>,
    targets: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_startup_parameters(self, startup: Value) -> Self {
        *self.startup.lock() = startup;
        self
    }

    pub fn set_startup_parameters(&self, startup: Value) {
        *self.startup.lock() = startup;
    }

    pub fn unsupported(self, semantic_target: &str) -> Self {
        self.unsupported.lock().insert(semantic_target.to_string());
        self
    }

    /// Every platform call fails with `message`
    pub fn failing(self, message: &str) -> Self {
        *self.fail_with.lock() = Some(message.to_string());
        self
    }

    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.targets.lock().clone()
    }

    pub fn last_target(&self) -> Option<NavigationTarget> {
        self.targets.lock().last().cloned()
    }

    fn failure(&self) -> Result<(), ServiceError> {
        match self.fail_with.lock().as_ref() {
            Some(message) => Err(ServiceError::new(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    fn startup_parameters(&self) -> Value {
        self.startup.lock().clone()
    }

    async fn is_navigation_supported(&self, semantic_target: &str) -> Result<bool, ServiceError> {
        self.failure()?;
        Ok(!self.unsupported.lock().contains(semantic_target))
    }

    async fn to_external(&self, target: &NavigationTarget) -> Result<(), ServiceError> {
        self.failure()?;
        self.targets.lock().push(target.clone());
        Ok(())
    }
}

/// Manually advanced clock
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).single().unwrap_or_default())
    }
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// `Order` entity set: `InternalMargin` is a measure, `CustomerEmail`
/// potentially sensitive, `Customer` and `Region` plain
pub fn order_metadata() -> StaticMetadata {
    StaticMetadata::new()
        .with_entity_set(
            "Order",
            &["Customer", "Region", "InternalMargin", "CustomerEmail"],
        )
        .with_annotation("Order", "InternalMargin", MEASURE)
        .with_annotation("Order", "CustomerEmail", SENSITIVE)
}

pub fn order_context_url() -> String {
    context_url("/sap/opu/odata4/sales", "Order")
}

/// Customer `C1`, Region `EMEA`, bound to the `Order` entity set
///
/// # Panics
/// If a fixture filter is rejected by the variant.
pub fn customer_variant() -> SelectionVariant {
    let mut variant = SelectionVariant::new();
    variant.set_filter_context_url(order_context_url());
    variant
        .add_select_option("Customer", "I", "EQ", "C1", None)
        .expect("fixture");
    variant
        .add_select_option("Region", "I", "EQ", "EMEA", None)
        .expect("fixture");
    variant
}

/// [`customer_variant`] plus a margin measure and a sensitive email filter
///
/// # Panics
/// If a fixture filter is rejected by the variant.
pub fn order_variant() -> SelectionVariant {
    let mut variant = customer_variant();
    variant
        .add_select_option("InternalMargin", "I", "GT", "10", None)
        .expect("fixture");
    variant
        .add_select_option("CustomerEmail", "I", "EQ", "a@b.c", None)
        .expect("fixture");
    variant
}

pub fn order_app_data() -> AppData {
    AppData::with_selection(order_variant())
        .with_custom_data(json!({"scrollTop": 120}))
        .with_table_variant_id("compact")
}

/// Low values of `name` in `variant`, empty when absent
pub fn lows(variant: &SelectionVariant, name: &str) -> Vec<String> {
    variant
        .value(name)
        .unwrap_or_default()
        .into_iter()
        .map(|range| range.low)
        .collect()
}
