//! Mixing live UI attributes into a selection variant
//!
//! Attribute values always win over the base variant for the same
//! property. Empty strings, nulls and undefined values are each included,
//! ignored, or rejected according to [`SuppressionBehavior`].

use appnav_selection::{Range, SelectionVariant};
use appnav_state::{NavError, NavResult};
use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;
use std::ops::BitOr;
use tracing::{debug, warn};

/// One attribute value of a UI context
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Text
    String(String),
    /// Number, kept in its JSON rendering
    Number(serde_json::Number),
    /// Boolean
    Boolean(bool),
    /// Point in time
    Date(DateTime<Utc>),
    /// Explicit null
    Null,
    /// Declared but without a value
    Undefined,
    /// Any other shape (objects, lists)
    Unsupported(Value),
}

impl AttributeValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::String(s.clone()),
            Value::Number(n) => Self::Number(n.clone()),
            Value::Bool(b) => Self::Boolean(*b),
            Value::Null => Self::Null,
            other => Self::Unsupported(other.clone()),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<DateTime<Utc>> for AttributeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

/// Flat attribute map of one UI context
pub type Attributes = IndexMap<String, AttributeValue>;

/// Parse one attribute object or a list of them
///
/// # Errors
/// `InvalidInput` unless `value` is an object or an array of objects.
pub fn attributes_from_json(value: &Value) -> NavResult<Vec<Attributes>> {
    let to_map = |item: &Value| -> NavResult<Attributes> {
        let object = item
            .as_object()
            .ok_or_else(|| NavError::invalid_input("attributes must be JSON objects"))?;
        Ok(object
            .iter()
            .map(|(name, value)| (name.clone(), AttributeValue::from_json(value)))
            .collect())
    };
    match value {
        Value::Array(items) => items.iter().map(to_map).collect(),
        other => Ok(vec![to_map(other)?]),
    }
}

/// Bit mask controlling empty, null and undefined attribute values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SuppressionBehavior(u8);

impl SuppressionBehavior {
    /// Empty strings included, null and undefined ignored
    pub const STANDARD: Self = Self(0);
    /// Skip empty strings
    pub const IGNORE_EMPTY_STRING: Self = Self(1);
    /// Fail on null
    pub const RAISE_ERROR_ON_NULL: Self = Self(2);
    /// Fail on undefined
    pub const RAISE_ERROR_ON_UNDEFINED: Self = Self(4);
    /// Fail on empty strings
    pub const RAISE_ERROR_ON_EMPTY_STRING: Self = Self(8);
    /// Keep null as `I EQ ""`
    pub const INCLUDE_NULL: Self = Self(16);
    /// Keep undefined as `I EQ ""`
    pub const INCLUDE_UNDEFINED: Self = Self(32);

    /// Mask from raw bits; unknown bits are dropped
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11_1111)
    }

    /// Raw bits
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every bit of `other` is set
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    fn decide(self, raise: Self, ignore: bool, include: bool) -> Decision {
        if self.contains(raise) {
            Decision::Raise
        } else if ignore || !include {
            Decision::Ignore
        } else {
            Decision::Include
        }
    }
}

impl BitOr for SuppressionBehavior {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

enum Decision {
    Include,
    Ignore,
    Raise,
}

/// Merge attribute maps into a copy of `base`
///
/// Each attribute contributes `I EQ value`; the same property in several
/// maps collects several ranges. Base parameters and select options not
/// set by any attribute are carried over, parameters as `I EQ` ranges.
///
/// # Errors
/// `InvalidInput` for unsupported attribute values or values the
/// suppression mask says to reject.
pub fn mix_attributes_and_selection_variant(
    attributes: &[Attributes],
    base: &SelectionVariant,
    suppression: SuppressionBehavior,
) -> NavResult<SelectionVariant> {
    let mut mixed = SelectionVariant::new();
    mixed.copy_descriptors_from(base);

    let mut collected: IndexMap<&str, Vec<Range>> = IndexMap::new();
    for map in attributes {
        for (name, value) in map {
            if let Some(text) = attribute_text(name, value, suppression)? {
                collected
                    .entry(name.as_str())
                    .or_default()
                    .push(Range::include_eq(text));
            }
        }
    }
    for (name, ranges) in collected {
        mixed.mass_add_select_option(name, ranges)?;
    }

    for (name, value) in base.parameters() {
        if !mixed.contains(name) {
            mixed.add_range(name, Range::include_eq(value))?;
        }
    }
    for (name, ranges) in base.select_options() {
        if mixed.select_option(name).is_none() {
            mixed.mass_add_select_option(name, ranges.to_vec())?;
        }
    }
    Ok(mixed)
}

/// [`mix_attributes_and_selection_variant`] with a base given as JSON text
///
/// # Errors
/// `InvalidInput` if `base` is not a valid variant, plus the errors of the
/// typed variant.
pub fn mix_attributes_and_selection_variant_str(
    attributes: &[Attributes],
    base: &str,
    suppression: SuppressionBehavior,
) -> NavResult<SelectionVariant> {
    let base = if base.trim().is_empty() {
        SelectionVariant::new()
    } else {
        SelectionVariant::from_json_str(base)?
    };
    mix_attributes_and_selection_variant(attributes, &base, suppression)
}

fn attribute_text(
    name: &str,
    value: &AttributeValue,
    suppression: SuppressionBehavior,
) -> NavResult<Option<String>> {
    let decision = match value {
        AttributeValue::String(s) if s.is_empty() => suppression.decide(
            SuppressionBehavior::RAISE_ERROR_ON_EMPTY_STRING,
            suppression.contains(SuppressionBehavior::IGNORE_EMPTY_STRING),
            true,
        ),
        AttributeValue::Null => suppression.decide(
            SuppressionBehavior::RAISE_ERROR_ON_NULL,
            false,
            suppression.contains(SuppressionBehavior::INCLUDE_NULL),
        ),
        AttributeValue::Undefined => suppression.decide(
            SuppressionBehavior::RAISE_ERROR_ON_UNDEFINED,
            false,
            suppression.contains(SuppressionBehavior::INCLUDE_UNDEFINED),
        ),
        AttributeValue::String(s) => return Ok(Some(s.clone())),
        AttributeValue::Number(n) => return Ok(Some(n.to_string())),
        AttributeValue::Boolean(b) => return Ok(Some(b.to_string())),
        AttributeValue::Date(date) => {
            return Ok(Some(date.to_rfc3339_opts(SecondsFormat::Millis, true)))
        }
        AttributeValue::Unsupported(raw) => {
            return Err(NavError::invalid_input(format!(
                "attribute '{name}' has unsupported value {raw}"
            )))
        }
    };

    match decision {
        Decision::Include => Ok(Some(String::new())),
        Decision::Ignore => {
            debug!(attribute = name, "suppressing empty attribute value");
            Ok(None)
        }
        Decision::Raise => {
            warn!(attribute = name, "rejected empty attribute value");
            Err(NavError::invalid_input(format!(
                "attribute '{name}' has a suppressed empty value"
            )))
        }
    }
}
