//! Startup parameters
//!
//! URL-style parameters an application is started with. Values arrive as a
//! string or a list of strings; everything else is rejected during
//! normalization. Platform-reserved names never become filter criteria.

use crate::error::{NavError, NavResult};
use appnav_selection::SelectionVariant;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Startup parameter carrying the key of a pending cross-app state
pub const XAPP_STATE_PARAMETER: &str = "sap-xapp-state";

/// Startup parameter listing the names filled from user defaults
pub const DEFAULTED_PARAMETER_NAMES: &str = "sap-ushell-defaultedParameterNames";

const TECHNICAL_PREFIX: &str = "sap-";
const FRAMEWORK_PREFIX: &str = "sap-ui-fe";
const TECHNICAL_NAMES: [&str; 1] = ["hcpApplicationId"];

/// Normalized startup parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupValue {
    /// One value (scalars and single-element lists)
    Single(String),
    /// Ordered list of two or more values
    Multi(Vec<String>),
}

impl StartupValue {
    /// All values in order
    #[must_use]
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multi(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// First value
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            Self::Multi(values) => values.first().map(String::as_str),
        }
    }

    fn from_json(name: &str, value: &Value) -> NavResult<Self> {
        match value {
            Value::String(s) => Ok(Self::Single(s.clone())),
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            NavError::invalid_input(format!(
                                "startup parameter '{name}' contains a non-string value"
                            ))
                        })
                    })
                    .collect::<NavResult<Vec<_>>>()?;
                match values.len() {
                    0 => Err(NavError::invalid_input(format!(
                        "startup parameter '{name}' has no values"
                    ))),
                    1 => Ok(Self::Single(values.into_iter().next().unwrap_or_default())),
                    _ => Ok(Self::Multi(values)),
                }
            }
            other => Err(NavError::invalid_input(format!(
                "startup parameter '{name}' must be a string or a list of strings, got {other}"
            ))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Single(value) => Value::String(value.clone()),
            Self::Multi(values) => Value::from(values.clone()),
        }
    }
}

/// Ordered, normalized startup parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupParameters {
    entries: IndexMap<String, StartupValue>,
}

impl StartupParameters {
    /// Create empty parameter set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a raw JSON object
    ///
    /// # Errors
    /// `InvalidInput` if `raw` is not an object or any value is neither a
    /// string nor a non-empty list of strings.
    pub fn from_json(raw: &Value) -> NavResult<Self> {
        let object = raw
            .as_object()
            .ok_or_else(|| NavError::invalid_input("startup parameters must be a JSON object"))?;
        let mut parameters = Self::new();
        for (name, value) in object {
            parameters
                .entries
                .insert(name.clone(), StartupValue::from_json(name, value)?);
        }
        Ok(parameters)
    }

    /// Add or replace a single value
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries
            .insert(name.into(), StartupValue::Single(value.into()));
        self
    }

    /// Add or replace a multi-value entry
    #[must_use]
    pub fn with_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        let value = if values.len() == 1 {
            StartupValue::Single(values.remove(0))
        } else {
            StartupValue::Multi(values)
        };
        self.entries.insert(name.into(), value);
        self
    }

    /// Value of a parameter
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StartupValue> {
        self.entries.get(name)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &StartupValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameters
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No parameters at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any parameter survives the reserved-name filter
    #[must_use]
    pub fn has_navigation_parameters(&self, filter: &ParameterFilter) -> bool {
        self.entries.keys().any(|name| !filter.is_reserved(name))
    }

    /// Key of a pending cross-app state handoff
    #[must_use]
    pub fn xapp_state_key(&self) -> Option<&str> {
        self.get(XAPP_STATE_PARAMETER)
            .and_then(StartupValue::first)
            .filter(|key| !key.is_empty())
    }

    /// Names the platform filled from user defaults
    ///
    /// # Errors
    /// `InvalidInput` if the parameter is present but is not a JSON array
    /// of strings.
    pub fn defaulted_names(&self) -> NavResult<Vec<String>> {
        let Some(raw) = self.get(DEFAULTED_PARAMETER_NAMES).and_then(StartupValue::first) else {
            return Ok(Vec::new());
        };
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            NavError::invalid_input(format!("{DEFAULTED_PARAMETER_NAMES} is not JSON: {e}"))
        })?;
        parse_defaulted_names(&value)
    }

    /// Encode as a JSON object
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

impl Serialize for StartupParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StartupParameters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

/// Validate a defaulted-names list
///
/// # Errors
/// `InvalidInput` unless `value` is an array of strings.
pub fn parse_defaulted_names(value: &Value) -> NavResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| NavError::invalid_input("defaulted parameter names must be an array"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| NavError::invalid_input("defaulted parameter names must be strings"))
        })
        .collect()
}

/// Recognizes platform-reserved parameter names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterFilter {
    /// Names treated as technical on top of the built-in rules
    #[serde(default)]
    pub extra_technical: Vec<String>,
}

impl ParameterFilter {
    /// Create filter with additional technical names
    #[must_use]
    pub fn with_extra<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extra_technical: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Platform/system reserved name
    #[must_use]
    pub fn is_technical(&self, name: &str) -> bool {
        name.to_ascii_lowercase().starts_with(TECHNICAL_PREFIX)
            || TECHNICAL_NAMES.contains(&name)
            || self.extra_technical.iter().any(|extra| extra == name)
    }

    /// Internal framework parameter
    #[must_use]
    pub fn is_framework(&self, name: &str) -> bool {
        name.to_ascii_lowercase().starts_with(FRAMEWORK_PREFIX)
    }

    /// Technical or framework parameter
    #[inline]
    #[must_use]
    pub fn is_reserved(&self, name: &str) -> bool {
        self.is_technical(name) || self.is_framework(name)
    }

    /// Copy of `variant` without reserved parameters and select options
    #[must_use]
    pub fn remove_technical_parameters(&self, variant: &SelectionVariant) -> SelectionVariant {
        let mut cleaned = variant.clone();
        for name in variant.property_names() {
            if self.is_reserved(name) {
                tracing::debug!(parameter = name, "dropping technical parameter");
                cleaned.remove_property(name);
            }
        }
        cleaned
    }
}

/// Flat URL parameters derivable from a variant
///
/// Parameters are taken as-is; a select option contributes only when it is
/// exactly one `I EQ` range. Parameters win over select options of the same
/// name.
#[must_use]
pub fn url_parameters_from_variant(variant: &SelectionVariant) -> IndexMap<String, String> {
    let mut url_parameters: IndexMap<String, String> = variant
        .parameters()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    for (name, ranges) in variant.select_options() {
        if let [range] = ranges {
            if range.is_single_value() && !url_parameters.contains_key(name) {
                url_parameters.insert(name.to_string(), range.low.clone());
            }
        }
    }
    url_parameters
}
