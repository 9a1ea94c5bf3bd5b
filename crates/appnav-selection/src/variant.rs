//! Selection variant
//!
//! An ordered, named collection of select options (multi-range filter
//! criteria per property) and single-value parameters.

use crate::condition::ConditionOperator;
use crate::error::{SelectionError, SelectionResult};
use crate::range::{Range, SelectOption, Sign};
use crate::wire::{
    WireParameter, WireRange, WireSelectOption, WireVariant, WireVersion, VARIANT_KEYS,
};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Filter criteria and parameters describing "what data is shown"
///
/// Insertion order of both maps is kept so that serialization is
/// deterministic. Equality ignores that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionVariant {
    id: Option<String>,
    text: Option<String>,
    parameter_context_url: Option<String>,
    filter_context_url: Option<String>,
    odata_filter_expression: Option<String>,
    parameters: IndexMap<String, String>,
    select_options: IndexMap<String, Vec<Range>>,
}

impl SelectionVariant {
    /// Create empty variant
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON text
    ///
    /// # Errors
    /// `Malformed` if the text is not a selection variant document, or any
    /// validation error of its entries.
    pub fn from_json_str(json: &str) -> SelectionResult<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| SelectionError::malformed(format!("JSON parse error: {e}")))?;
        Self::from_json_value(&value)
    }

    /// Parse from an already decoded JSON value
    ///
    /// # Errors
    /// Same as [`Self::from_json_str`].
    pub fn from_json_value(value: &Value) -> SelectionResult<Self> {
        if !value.is_object() {
            return Err(SelectionError::malformed("expected a JSON object"));
        }
        let wire: WireVariant = serde_json::from_value(value.clone())
            .map_err(|e| SelectionError::malformed(e.to_string()))?;
        Self::from_wire(wire)
    }

    /// Whether `key` is a top-level key of the wire object
    #[must_use]
    pub fn is_wire_key(key: &str) -> bool {
        VARIANT_KEYS.contains(&key)
    }

    /// Canonical JSON object
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(WireVariant::from(self)).unwrap_or(Value::Null)
    }

    /// Canonical JSON text
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&WireVariant::from(self)).unwrap_or_default()
    }

    fn from_wire(wire: WireVariant) -> SelectionResult<Self> {
        let mut variant = Self {
            id: wire.selection_variant_id,
            text: wire.text,
            parameter_context_url: wire.parameter_context_url,
            filter_context_url: wire.filter_context_url,
            odata_filter_expression: wire.odata_filter_expression,
            ..Self::default()
        };

        for parameter in wire.parameters {
            variant.add_parameter(&parameter.property_name, parameter.property_value)?;
        }

        for select_option in wire.select_options {
            for range in select_option.ranges {
                let high = range.high;
                let sign: Sign = range.sign.parse()?;
                let option: SelectOption = range.option.parse()?;
                let mut parsed = Range::new(sign, option, range.low, high).map_err(|_| {
                    SelectionError::MissingHigh {
                        property: select_option.property_name.clone(),
                        option: option.code().to_string(),
                    }
                })?;
                parsed.semantic_dates = range.semantic_dates;
                variant.add_range(&select_option.property_name, parsed)?;
            }
        }

        Ok(variant)
    }

    // ------------------------------------------------------------------
    // Select options
    // ------------------------------------------------------------------

    /// Append one range to a property's select option
    ///
    /// # Errors
    /// - `EmptyPropertyName` for an empty property
    /// - `UnknownSign` / `UnknownOption` for codes outside the closed sets
    /// - `MissingHigh` when `BT`/`NB` is used without `high`
    pub fn add_select_option(
        &mut self,
        property: &str,
        sign: &str,
        option: &str,
        low: &str,
        high: Option<&str>,
    ) -> SelectionResult<&mut Self> {
        check_name(property)?;
        let sign: Sign = sign.parse()?;
        let option: SelectOption = option.parse()?;
        let range = Range::new(sign, option, low, high.map(str::to_string)).map_err(|_| {
            SelectionError::MissingHigh {
                property: property.to_string(),
                option: option.code().to_string(),
            }
        })?;
        self.add_range(property, range)
    }

    /// Append an already validated range
    ///
    /// # Errors
    /// `EmptyPropertyName` for an empty property.
    pub fn add_range(&mut self, property: &str, range: Range) -> SelectionResult<&mut Self> {
        check_name(property)?;
        self.select_options
            .entry(property.to_string())
            .or_default()
            .push(range);
        Ok(self)
    }

    /// Append the range a widget condition maps to
    ///
    /// # Errors
    /// `ConditionArity` if `values` does not fit the operator.
    pub fn add_condition(
        &mut self,
        property: &str,
        operator: ConditionOperator,
        values: &[&str],
    ) -> SelectionResult<&mut Self> {
        let range = operator.to_range(values)?;
        self.add_range(property, range)
    }

    /// Replace the whole range list of a property
    ///
    /// An empty list removes the select option.
    ///
    /// # Errors
    /// `EmptyPropertyName` for an empty property.
    pub fn mass_add_select_option(
        &mut self,
        property: &str,
        ranges: Vec<Range>,
    ) -> SelectionResult<&mut Self> {
        check_name(property)?;
        if ranges.is_empty() {
            self.select_options.shift_remove(property);
        } else {
            self.select_options.insert(property.to_string(), ranges);
        }
        Ok(self)
    }

    /// Remove all ranges of a property; no-op if absent
    pub fn remove_select_option(&mut self, property: &str) -> &mut Self {
        self.select_options.shift_remove(property);
        self
    }

    /// Ranges of a property
    #[inline]
    #[must_use]
    pub fn select_option(&self, property: &str) -> Option<&[Range]> {
        self.select_options.get(property).map(Vec::as_slice)
    }

    /// Rename a select option in place, keeping its position
    ///
    /// # Errors
    /// `RenameMissing` if `from` is absent, `RenameCollision` if `to` exists.
    pub fn rename_select_option(&mut self, from: &str, to: &str) -> SelectionResult<&mut Self> {
        check_name(to)?;
        rename_entry(&mut self.select_options, from, to)?;
        Ok(self)
    }

    /// Property names of all select options, in insertion order
    #[must_use]
    pub fn select_option_property_names(&self) -> Vec<&str> {
        self.select_options.keys().map(String::as_str).collect()
    }

    /// Iterate select options in insertion order
    pub fn select_options(&self) -> impl Iterator<Item = (&str, &[Range])> {
        self.select_options
            .iter()
            .map(|(name, ranges)| (name.as_str(), ranges.as_slice()))
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Set a single-value parameter, replacing any previous value
    ///
    /// # Errors
    /// `EmptyPropertyName` for an empty name.
    pub fn add_parameter(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> SelectionResult<&mut Self> {
        check_name(name)?;
        self.parameters.insert(name.to_string(), value.into());
        Ok(self)
    }

    /// Remove a parameter; no-op if absent
    pub fn remove_parameter(&mut self, name: &str) -> &mut Self {
        self.parameters.shift_remove(name);
        self
    }

    /// Value of a parameter
    #[inline]
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Rename a parameter in place, keeping its position
    ///
    /// # Errors
    /// `RenameMissing` if `from` is absent, `RenameCollision` if `to` exists.
    pub fn rename_parameter(&mut self, from: &str, to: &str) -> SelectionResult<&mut Self> {
        check_name(to)?;
        rename_entry(&mut self.parameters, from, to)?;
        Ok(self)
    }

    /// Parameter names, in insertion order
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.keys().map(String::as_str).collect()
    }

    /// Iterate parameters in insertion order
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    // ------------------------------------------------------------------
    // Combined views
    // ------------------------------------------------------------------

    /// Ranges for `name`: the select option, or `I EQ value` for a parameter
    #[must_use]
    pub fn value(&self, name: &str) -> Option<Vec<Range>> {
        if let Some(ranges) = self.select_options.get(name) {
            return Some(ranges.clone());
        }
        self.parameters
            .get(name)
            .map(|value| vec![Range::include_eq(value.clone())])
    }

    /// Parameter names followed by select option names, without duplicates
    #[must_use]
    pub fn property_names(&self) -> Vec<&str> {
        let mut names = self.parameter_names();
        for name in self.select_options.keys() {
            if !self.parameters.contains_key(name) {
                names.push(name);
            }
        }
        names
    }

    /// Whether `name` is a parameter or a select option
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name) || self.select_options.contains_key(name)
    }

    /// Drop both the parameter and the select option named `name`
    pub fn remove_property(&mut self, name: &str) -> &mut Self {
        self.remove_parameter(name);
        self.remove_select_option(name)
    }

    /// True iff there are neither parameters nor select options
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.select_options.is_empty()
    }

    /// Remove every parameter and select option, keeping id, text and URLs
    pub fn clear_values(&mut self) -> &mut Self {
        self.parameters.clear();
        self.select_options.clear();
        self
    }

    // ------------------------------------------------------------------
    // Descriptive fields
    // ------------------------------------------------------------------

    /// Variant id
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set variant id
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into());
        self
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Set label
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.text = Some(text.into());
        self
    }

    /// Metadata context of the parameters
    #[inline]
    #[must_use]
    pub fn parameter_context_url(&self) -> Option<&str> {
        self.parameter_context_url.as_deref()
    }

    /// Set parameter context URL
    pub fn set_parameter_context_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.parameter_context_url = Some(url.into());
        self
    }

    /// Metadata context of the select options
    #[inline]
    #[must_use]
    pub fn filter_context_url(&self) -> Option<&str> {
        self.filter_context_url.as_deref()
    }

    /// Set filter context URL
    pub fn set_filter_context_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.filter_context_url = Some(url.into());
        self
    }

    /// Opaque OData filter expression carried through unchanged
    #[inline]
    #[must_use]
    pub fn odata_filter_expression(&self) -> Option<&str> {
        self.odata_filter_expression.as_deref()
    }

    /// Copy id, text and context URLs from another variant
    pub fn copy_descriptors_from(&mut self, other: &SelectionVariant) -> &mut Self {
        self.id.clone_from(&other.id);
        self.text.clone_from(&other.text);
        self.parameter_context_url
            .clone_from(&other.parameter_context_url);
        self.filter_context_url.clone_from(&other.filter_context_url);
        self.odata_filter_expression
            .clone_from(&other.odata_filter_expression);
        self
    }
}

fn check_name(name: &str) -> SelectionResult<()> {
    if name.is_empty() {
        return Err(SelectionError::EmptyPropertyName);
    }
    Ok(())
}

fn rename_entry<V>(map: &mut IndexMap<String, V>, from: &str, to: &str) -> SelectionResult<()> {
    if map.contains_key(to) {
        return Err(SelectionError::RenameCollision {
            from: from.to_string(),
            to: to.to_string(),
        });
    }
    let index = map
        .get_index_of(from)
        .ok_or_else(|| SelectionError::RenameMissing(from.to_string()))?;
    if let Some((_, value)) = map.shift_remove_index(index) {
        map.shift_insert(index, to.to_string(), value);
    }
    Ok(())
}

impl From<&SelectionVariant> for WireVariant {
    fn from(variant: &SelectionVariant) -> Self {
        Self {
            version: Some(WireVersion::default()),
            selection_variant_id: variant.id.clone(),
            text: variant.text.clone(),
            parameter_context_url: variant.parameter_context_url.clone(),
            filter_context_url: variant.filter_context_url.clone(),
            odata_filter_expression: variant.odata_filter_expression.clone(),
            parameters: variant
                .parameters
                .iter()
                .map(|(name, value)| WireParameter {
                    property_name: name.clone(),
                    property_value: value.clone(),
                })
                .collect(),
            select_options: variant
                .select_options
                .iter()
                .map(|(name, ranges)| WireSelectOption {
                    property_name: name.clone(),
                    ranges: ranges
                        .iter()
                        .map(|range| WireRange {
                            sign: range.sign.code().to_string(),
                            option: range.option.code().to_string(),
                            low: range.low.clone(),
                            high: range.high.clone(),
                            semantic_dates: range.semantic_dates.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl Serialize for SelectionVariant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireVariant::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SelectionVariant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireVariant::deserialize(deserializer)?;
        Self::from_wire(wire).map_err(serde::de::Error::custom)
    }
}

impl FromStr for SelectionVariant {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl TryFrom<&Value> for SelectionVariant {
    type Error = SelectionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_json_value(value)
    }
}

impl Display for SelectionVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}
