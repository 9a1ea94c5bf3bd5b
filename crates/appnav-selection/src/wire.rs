//! JSON wire shape
//!
//! ```text
//! {
//!   "Version": {"Major": "1", "Minor": "0", "Patch": "0"},
//!   "SelectionVariantID": "...",
//!   "Text": "...",
//!   "ParameterContextUrl": "...",
//!   "FilterContextUrl": "...",
//!   "Parameters": [{"PropertyName": "P", "PropertyValue": "v"}],
//!   "SelectOptions": [{"PropertyName": "S", "Ranges": [{"Sign": "I", "Option": "EQ", "Low": "a", "High": null}]}]
//! }
//! ```
//!
//! Unknown keys are rejected at every level, so a misspelled or
//! wrongly cased key never decodes into an empty variant.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level keys of the wire object
pub(crate) const VARIANT_KEYS: [&str; 8] = [
    "Version",
    "SelectionVariantID",
    "Text",
    "ParameterContextUrl",
    "FilterContextUrl",
    "ODataFilterExpression",
    "Parameters",
    "SelectOptions",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct WireVersion {
    pub(crate) major: String,
    pub(crate) minor: String,
    pub(crate) patch: String,
}

impl Default for WireVersion {
    fn default() -> Self {
        Self {
            major: "1".to_string(),
            minor: "0".to_string(),
            patch: "0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct WireVariant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) version: Option<WireVersion>,
    #[serde(
        rename = "SelectionVariantID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) selection_variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parameter_context_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) filter_context_url: Option<String>,
    #[serde(
        rename = "ODataFilterExpression",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub(crate) odata_filter_expression: Option<String>,
    #[serde(default)]
    pub(crate) parameters: Vec<WireParameter>,
    #[serde(default)]
    pub(crate) select_options: Vec<WireSelectOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct WireParameter {
    pub(crate) property_name: String,
    pub(crate) property_value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct WireSelectOption {
    pub(crate) property_name: String,
    pub(crate) ranges: Vec<WireRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub(crate) struct WireRange {
    pub(crate) sign: String,
    pub(crate) option: String,
    pub(crate) low: String,
    #[serde(default)]
    pub(crate) high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) semantic_dates: Option<Value>,
}
