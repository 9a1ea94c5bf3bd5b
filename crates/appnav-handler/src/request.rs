//! Outbound navigation requests
//!
//! Everything a caller passes to `navigate` is validated here, before any
//! asynchronous work starts.

use crate::mix::{attributes_from_json, mix_attributes_and_selection_variant, SuppressionBehavior};
use appnav_selection::SelectionVariant;
use appnav_state::{ExternalAppData, InnerAppData, NavError, NavResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// How a navigation target is opened
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Replace the current application
    #[default]
    Inplace,
    /// Open in a new window; the current screen stays, so no inner save
    Explace,
    /// Leave the platform
    External,
    /// Open embedded in the current shell
    Embedded,
}

impl NavigationMode {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inplace => "inplace",
            Self::Explace => "explace",
            Self::External => "external",
            Self::Embedded => "embedded",
        }
    }

    /// Whether the current screen's state must be kept for back navigation
    #[inline]
    #[must_use]
    pub fn saves_inner_state(self) -> bool {
        self != Self::Explace
    }
}

impl Display for NavigationMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationMode {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inplace" => Ok(Self::Inplace),
            "explace" => Ok(Self::Explace),
            "external" => Ok(Self::External),
            "embedded" => Ok(Self::Embedded),
            other => Err(NavError::invalid_input(format!(
                "unknown navigation mode '{other}'"
            ))),
        }
    }
}

/// Validated outbound navigation
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub(crate) semantic_target: String,
    pub(crate) selection: SelectionVariant,
    pub(crate) inner_app_data: Option<InnerAppData>,
    pub(crate) external_app_data: Option<ExternalAppData>,
    pub(crate) mode: NavigationMode,
}

impl NavigationRequest {
    /// Validate a navigation request
    ///
    /// `params` is a JSON object, or JSON-encoded text of one; `null` or an
    /// empty string means no parameters. An object using selection variant
    /// keys (`SelectOptions`, `Parameters`, ...) must be a well formed
    /// variant. Any other object is a flat attribute map, mixed in as
    /// `I EQ` ranges.
    ///
    /// # Errors
    /// `InvalidInput` for an empty target, malformed `params`, or an
    /// unknown `nav_mode`.
    pub fn new(
        semantic_target: impl Into<String>,
        params: &Value,
        nav_mode: Option<&str>,
    ) -> NavResult<Self> {
        let semantic_target = semantic_target.into();
        if semantic_target.trim().is_empty() {
            return Err(NavError::invalid_input("semantic target must not be empty"));
        }
        let selection = match params {
            Value::Null => SelectionVariant::new(),
            Value::String(text) if text.trim().is_empty() => SelectionVariant::new(),
            Value::String(text) => {
                let decoded: Value = serde_json::from_str(text).map_err(|err| {
                    NavError::invalid_input(format!("navigation parameters are not JSON: {err}"))
                })?;
                selection_from_object(&decoded)?
            }
            other => selection_from_object(other)?,
        };
        let mode = nav_mode.map(str::parse::<NavigationMode>).transpose()?.unwrap_or_default();
        Ok(Self {
            semantic_target,
            selection,
            inner_app_data: None,
            external_app_data: None,
            mode,
        })
    }

    /// Request from an already built variant
    #[must_use]
    pub fn from_variant(semantic_target: impl Into<String>, selection: SelectionVariant) -> Self {
        Self {
            semantic_target: semantic_target.into(),
            selection,
            inner_app_data: None,
            external_app_data: None,
            mode: NavigationMode::default(),
        }
    }

    /// With state of the current screen
    #[must_use]
    pub fn with_inner_app_data(mut self, data: InnerAppData) -> Self {
        self.inner_app_data = Some(data);
        self
    }

    /// With state handed to the target
    #[must_use]
    pub fn with_external_app_data(mut self, data: ExternalAppData) -> Self {
        self.external_app_data = Some(data);
        self
    }

    /// With navigation mode
    #[must_use]
    pub fn with_mode(mut self, mode: NavigationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Semantic target
    #[inline]
    #[must_use]
    pub fn semantic_target(&self) -> &str {
        &self.semantic_target
    }

    /// Outbound selection before cleanup
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &SelectionVariant {
        &self.selection
    }

    /// Navigation mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> NavigationMode {
        self.mode
    }
}

fn selection_from_object(params: &Value) -> NavResult<SelectionVariant> {
    let Value::Object(object) = params else {
        return Err(NavError::invalid_input(format!(
            "navigation parameters must be an object or a string, got {params}"
        )));
    };
    if object.keys().any(|key| SelectionVariant::is_wire_key(key)) {
        return Ok(SelectionVariant::from_json_value(params)?);
    }
    mix_attributes_and_selection_variant(
        &attributes_from_json(params)?,
        &SelectionVariant::new(),
        SuppressionBehavior::STANDARD,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_object_and_string_params() {
        let object = json!({"Parameters": [{"PropertyName": "A", "PropertyValue": "1"}]});
        let from_object = NavigationRequest::new("Order-display", &object, None).unwrap();
        let from_text =
            NavigationRequest::new("Order-display", &Value::String(object.to_string()), None)
                .unwrap();
        assert_eq!(from_object.selection(), from_text.selection());
        assert_eq!(from_object.mode(), NavigationMode::Inplace);
    }

    #[test]
    fn rejects_bad_inputs_synchronously() {
        let cases = [
            NavigationRequest::new("", &Value::Null, None),
            NavigationRequest::new("Order-display", &json!(42), None),
            NavigationRequest::new("Order-display", &json!("{broken"), None),
            NavigationRequest::new("Order-display", &Value::Null, Some("sideways")),
        ];
        for case in cases {
            assert!(case.unwrap_err().is_invalid_input());
        }
    }

    #[test]
    fn flat_object_params_become_select_options() {
        let request =
            NavigationRequest::new("Order-display", &json!({"Customer": "C1", "Open": true}), None)
                .unwrap();
        let customer = request.selection().select_option("Customer").unwrap();
        assert_eq!(customer.len(), 1);
        assert_eq!(customer[0].low, "C1");
        assert_eq!(
            request.selection().select_option("Open").unwrap()[0].low,
            "true"
        );

        let from_text = NavigationRequest::new(
            "Order-display",
            &Value::String(r#"{"Customer":"C1","Open":true}"#.to_string()),
            None,
        )
        .unwrap();
        assert_eq!(from_text.selection(), request.selection());
    }

    #[test]
    fn malformed_object_params_are_rejected() {
        let cases = [
            json!({"Customer": "C1", "Region": ["EMEA"]}),
            json!({"selectOptions": [
                {"PropertyName": "Customer", "Ranges": [{"Sign": "I", "Option": "EQ", "Low": "C1"}]}
            ]}),
            json!({"SelectOptions": [], "Customer": "C1"}),
            json!({"SelectOptions": [
                {"PropertyName": "Customer", "Ranges": [{"sign": "I", "option": "EQ", "low": "C1"}]}
            ]}),
        ];
        for params in &cases {
            let err = NavigationRequest::new("Order-display", params, None).unwrap_err();
            assert!(err.is_invalid_input(), "{params} gave {err}");
        }
        let err = NavigationRequest::new("Order-display", &json!("[1, 2]"), None).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn explace_skips_inner_state() {
        let request =
            NavigationRequest::new("Order-display", &Value::Null, Some("explace")).unwrap();
        assert!(!request.mode().saves_inner_state());
        assert!(NavigationMode::Embedded.saves_inner_state());
    }
}
