//! App state payloads
//!
//! [`AppData`] is the blob persisted for "back" navigation (inner state) and
//! handed to other applications (external state). Its `customData` belongs
//! to the calling screen and is never inspected here.

use appnav_selection::SelectionVariant;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Persistable app state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    /// Current filter state
    #[serde(default, deserialize_with = "variant_or_encoded")]
    pub selection_variant: SelectionVariant,
    /// Table personalization variant
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub table_variant_id: String,
    /// Screen-owned data, opaque to navigation handling
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub custom_data: Value,
    /// Sort/group/visualization state
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub presentation_variant: Value,
    /// Display texts for filter values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_texts: Option<ValueTexts>,
    /// Semantic date operators per property
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_dates: Option<SemanticDates>,
}

/// State kept for back navigation into the current screen
pub type InnerAppData = AppData;

/// State handed to a different target application
pub type ExternalAppData = AppData;

impl AppData {
    /// Create payload around a selection variant
    #[inline]
    #[must_use]
    pub fn with_selection(selection_variant: SelectionVariant) -> Self {
        Self {
            selection_variant,
            ..Self::default()
        }
    }

    /// Set custom data
    #[inline]
    #[must_use]
    pub fn with_custom_data(mut self, custom_data: Value) -> Self {
        self.custom_data = custom_data;
        self
    }

    /// Set table variant id
    #[inline]
    #[must_use]
    pub fn with_table_variant_id(mut self, id: impl Into<String>) -> Self {
        self.table_variant_id = id.into();
        self
    }

    /// Decode from a stored JSON value
    ///
    /// # Errors
    /// Returns the decoding error if the value does not have the app data
    /// shape.
    pub fn from_json_value(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }

    /// Encode for the store
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// True when nothing worth persisting is present
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        self.selection_variant.is_empty()
            && self.table_variant_id.is_empty()
            && is_blank(&self.custom_data)
            && is_blank(&self.presentation_variant)
            && self.value_texts.as_ref().map_or(true, ValueTexts::is_empty)
            && self.semantic_dates.as_ref().map_or(true, SemanticDates::is_empty)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Accepts the variant either as an object or as JSON-encoded text
fn variant_or_encoded<'de, D>(deserializer: D) -> Result<SelectionVariant, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(SelectionVariant::default()),
        Value::String(text) if text.trim().is_empty() => Ok(SelectionVariant::default()),
        Value::String(text) => {
            SelectionVariant::from_json_str(&text).map_err(serde::de::Error::custom)
        }
        other => SelectionVariant::from_json_value(&other).map_err(serde::de::Error::custom),
    }
}

/// Display texts for filter values, grouped by context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueTexts {
    /// Text groups
    #[serde(default)]
    pub texts: Vec<ValueTextGroup>,
}

/// Texts of one metadata context and language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueTextGroup {
    /// Metadata context the texts belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_url: Option<String>,
    /// Language of the texts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Texts per property
    #[serde(default)]
    pub property_texts: Vec<PropertyText>,
}

/// Value texts of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PropertyText {
    /// Property the texts describe
    pub property_name: String,
    /// Text per value
    #[serde(default)]
    pub value_texts: Vec<ValueText>,
}

/// One value and its display text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValueText {
    /// Raw filter value
    pub property_value: String,
    /// Display text
    pub text: String,
}

impl ValueTexts {
    /// No property texts at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.iter().all(|group| group.property_texts.is_empty())
    }

    /// Keep only property texts whose name passes `keep`
    pub fn retain_properties(&mut self, mut keep: impl FnMut(&str) -> bool) {
        for group in &mut self.texts {
            group
                .property_texts
                .retain(|text| keep(&text.property_name));
        }
    }

    /// Drop every property text
    pub fn clear(&mut self) {
        for group in &mut self.texts {
            group.property_texts.clear();
        }
    }

    /// Names of properties that carry texts
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        self.texts
            .iter()
            .flat_map(|group| group.property_texts.iter())
            .map(|text| text.property_name.as_str())
            .collect()
    }
}

/// Semantic date operators per property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SemanticDates {
    /// One entry per property
    #[serde(default)]
    pub dates: Vec<SemanticDate>,
}

/// Semantic date operator of one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SemanticDate {
    /// Property the operator applies to
    pub property_name: String,
    /// Operator payload, opaque here
    #[serde(default)]
    pub data: Value,
}

impl SemanticDates {
    /// No entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Keep only entries whose name passes `keep`
    pub fn retain_properties(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.dates.retain(|date| keep(&date.property_name));
    }
}
