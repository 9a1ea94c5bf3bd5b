//! Conflict resolution between a stored variant and startup parameters
//!
//! Inbound navigation can carry state from three places: a persisted
//! selection variant, URL-style startup parameters, and values the platform
//! filled in from user defaults. [`split_inbound`] routes every property
//! into either the navigation selection or the defaulted selection and
//! settles properties present in both sources by [`ParamHandlingMode`].

use crate::error::{NavError, NavResult};
use crate::startup::{parse_defaulted_names, ParameterFilter, StartupParameters, StartupValue};
use appnav_selection::{Range, SelectionResult, SelectionVariant};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use tracing::debug;

/// Policy for properties present in both the variant and the startup
/// parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamHandlingMode {
    /// Keep the variant's value
    #[default]
    SelVarWins,
    /// Keep the startup value
    #[serde(rename = "URLParamWins")]
    UrlParamWins,
    /// Keep the variant's ranges and append the startup values
    InsertInSelOpt,
}

impl ParamHandlingMode {
    /// All policies
    pub const ALL: [Self; 3] = [Self::SelVarWins, Self::UrlParamWins, Self::InsertInSelOpt];

    /// Configuration name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SelVarWins => "SelVarWins",
            Self::UrlParamWins => "URLParamWins",
            Self::InsertInSelOpt => "InsertInSelOpt",
        }
    }
}

impl Display for ParamHandlingMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ParamHandlingMode {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| NavError::invalid_input(format!("unknown parameter handling mode '{s}'")))
    }
}

/// Outcome of splitting inbound state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictResolution {
    /// Properties meant for forward navigation
    pub navigation_selection: SelectionVariant,
    /// Properties that came from user defaults
    pub defaulted_selection: SelectionVariant,
    /// The navigation selection was empty and got backfilled from defaults
    pub navigation_is_defaults_only: bool,
}

/// Split `base` and `startup` into navigation and defaulted selections
///
/// Reserved parameters (see [`ParameterFilter`]) never reach either
/// output. Both outputs inherit the context URLs of `base`.
///
/// # Errors
/// `InvalidInput` if a value cannot be placed into an output variant.
pub fn split_inbound(
    base: &SelectionVariant,
    startup: &StartupParameters,
    defaulted: &[String],
    policy: ParamHandlingMode,
    filter: &ParameterFilter,
) -> NavResult<ConflictResolution> {
    let mut navigation = SelectionVariant::new();
    let mut defaults = SelectionVariant::new();
    copy_context(base, &mut navigation);
    copy_context(base, &mut defaults);

    let is_defaulted = |name: &str| defaulted.iter().any(|d| d == name);

    for name in base.property_names() {
        if filter.is_reserved(name) {
            debug!(property = name, "skipping reserved property of stored variant");
            continue;
        }
        match startup.get(name) {
            Some(value) if is_defaulted(name) => {
                copy_property(base, name, &mut navigation)?;
                put_startup_value(&mut defaults, name, value)?;
            }
            Some(value) => {
                debug!(property = name, %policy, "property present in variant and startup parameters");
                match policy {
                    ParamHandlingMode::SelVarWins => copy_property(base, name, &mut navigation)?,
                    ParamHandlingMode::UrlParamWins => {
                        put_startup_value(&mut navigation, name, value)?;
                    }
                    ParamHandlingMode::InsertInSelOpt => {
                        let mut ranges = base.value(name).unwrap_or_default();
                        ranges.extend(value.values().into_iter().map(Range::include_eq));
                        // intentionally no dedup: identical values stay twice
                        navigation.mass_add_select_option(name, ranges)?;
                    }
                }
            }
            None if is_defaulted(name) => copy_property(base, name, &mut defaults)?,
            None => copy_property(base, name, &mut navigation)?,
        }
    }

    for (name, value) in startup.iter() {
        if name.is_empty() || base.contains(name) {
            continue;
        }
        if filter.is_reserved(name) {
            debug!(parameter = name, "skipping reserved startup parameter");
            continue;
        }
        if is_defaulted(name) {
            put_startup_value(&mut defaults, name, value)?;
        } else {
            put_startup_value(&mut navigation, name, value)?;
        }
    }

    let navigation_is_defaults_only = navigation.is_empty() && !defaults.is_empty();
    if navigation_is_defaults_only {
        debug!("navigation selection empty, backfilling from defaulted values");
        for name in defaults.property_names() {
            copy_property(&defaults, name, &mut navigation)?;
        }
    }

    Ok(ConflictResolution {
        navigation_selection: navigation,
        defaulted_selection: defaults,
        navigation_is_defaults_only,
    })
}

/// [`split_inbound`] over raw JSON inputs
///
/// # Errors
/// `InvalidInput` if `startup` fails normalization or `defaulted` is not
/// an array of strings.
pub fn split_inbound_json(
    base: &SelectionVariant,
    startup: &Value,
    defaulted: &Value,
    policy: ParamHandlingMode,
    filter: &ParameterFilter,
) -> NavResult<ConflictResolution> {
    let startup = StartupParameters::from_json(startup)?;
    let defaulted = parse_defaulted_names(defaulted)?;
    split_inbound(base, &startup, &defaulted, policy, filter)
}

fn copy_context(from: &SelectionVariant, to: &mut SelectionVariant) {
    if let Some(url) = from.filter_context_url() {
        to.set_filter_context_url(url);
    }
    if let Some(url) = from.parameter_context_url() {
        to.set_parameter_context_url(url);
    }
}

fn copy_property(
    from: &SelectionVariant,
    name: &str,
    to: &mut SelectionVariant,
) -> SelectionResult<()> {
    if let Some(value) = from.parameter(name) {
        to.add_parameter(name, value)?;
    }
    if let Some(ranges) = from.select_option(name) {
        to.mass_add_select_option(name, ranges.to_vec())?;
    }
    Ok(())
}

fn put_startup_value(
    to: &mut SelectionVariant,
    name: &str,
    value: &StartupValue,
) -> SelectionResult<()> {
    let ranges = value.values().into_iter().map(Range::include_eq).collect();
    to.mass_add_select_option(name, ranges)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(variant: &SelectionVariant, name: &str) -> Vec<String> {
        variant
            .value(name)
            .unwrap_or_default()
            .into_iter()
            .map(|range| range.low)
            .collect()
    }

    fn base_with_customer() -> SelectionVariant {
        let mut base = SelectionVariant::new();
        base.add_select_option("Customer", "I", "EQ", "C1", None).unwrap();
        base
    }

    fn startup() -> StartupParameters {
        StartupParameters::new()
            .with("Customer", "C2")
            .with_values("Region", ["EMEA", "APAC"])
    }

    #[test]
    fn sel_var_wins_keeps_stored_value() {
        let result = split_inbound(
            &base_with_customer(),
            &startup(),
            &[],
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        let nav = &result.navigation_selection;
        assert_eq!(values(nav, "Customer"), vec!["C1"]);
        assert_eq!(values(nav, "Region"), vec!["EMEA", "APAC"]);
        assert!(result.defaulted_selection.is_empty());
        assert!(!result.navigation_is_defaults_only);
    }

    #[test]
    fn url_param_wins_takes_startup_value() {
        let result = split_inbound(
            &base_with_customer(),
            &startup(),
            &[],
            ParamHandlingMode::UrlParamWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(values(&result.navigation_selection, "Customer"), vec!["C2"]);
        assert_eq!(
            values(&result.navigation_selection, "Region"),
            vec!["EMEA", "APAC"]
        );
    }

    #[test]
    fn insert_in_sel_opt_keeps_both() {
        let result = split_inbound(
            &base_with_customer(),
            &startup(),
            &[],
            ParamHandlingMode::InsertInSelOpt,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(
            values(&result.navigation_selection, "Customer"),
            vec!["C1", "C2"]
        );
    }

    #[test]
    fn insert_in_sel_opt_keeps_duplicates() {
        let result = split_inbound(
            &base_with_customer(),
            &StartupParameters::new().with("Customer", "C1"),
            &[],
            ParamHandlingMode::InsertInSelOpt,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(
            values(&result.navigation_selection, "Customer"),
            vec!["C1", "C1"]
        );
    }

    #[test]
    fn insert_in_sel_opt_converts_parameter_to_range() {
        let mut base = SelectionVariant::new();
        base.add_parameter("Plant", "1000").unwrap();
        let result = split_inbound(
            &base,
            &StartupParameters::new().with("Plant", "2000"),
            &[],
            ParamHandlingMode::InsertInSelOpt,
            &ParameterFilter::default(),
        )
        .unwrap();
        let nav = &result.navigation_selection;
        assert_eq!(nav.parameter("Plant"), None);
        assert_eq!(values(nav, "Plant"), vec!["1000", "2000"]);
    }

    #[test]
    fn defaults_only_backfill() {
        let mut base = SelectionVariant::new();
        base.add_select_option("CompanyCode", "I", "EQ", "0001", None)
            .unwrap();
        let result = split_inbound(
            &base,
            &StartupParameters::new(),
            &["CompanyCode".to_string()],
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert!(result.navigation_is_defaults_only);
        assert_eq!(values(&result.navigation_selection, "CompanyCode"), vec!["0001"]);
        assert_eq!(values(&result.defaulted_selection, "CompanyCode"), vec!["0001"]);
    }

    #[test]
    fn defaulted_in_both_sources_splits() {
        let mut base = SelectionVariant::new();
        base.add_parameter("Plant", "1000").unwrap();
        let result = split_inbound(
            &base,
            &StartupParameters::new().with("Plant", "2000"),
            &["Plant".to_string()],
            ParamHandlingMode::UrlParamWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(result.navigation_selection.parameter("Plant"), Some("1000"));
        assert_eq!(values(&result.defaulted_selection, "Plant"), vec!["2000"]);
        assert!(!result.navigation_is_defaults_only);
    }

    #[test]
    fn empty_startup_keeps_base() {
        let base = base_with_customer();
        let result = split_inbound(
            &base,
            &StartupParameters::new(),
            &[],
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(result.navigation_selection, base);
    }

    #[test]
    fn reserved_names_never_routed() {
        let mut base = base_with_customer();
        base.add_parameter("sap-ui-fe-variant", "x").unwrap();
        let startup = StartupParameters::new()
            .with("sap-system", "ABC")
            .with("sap-xapp-state", "K")
            .with("hcpApplicationId", "app");
        let result = split_inbound(
            &base,
            &startup,
            &[],
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(
            result.navigation_selection.property_names(),
            vec!["Customer"]
        );
    }

    #[test]
    fn context_urls_inherited() {
        let mut base = base_with_customer();
        base.set_filter_context_url("/srv/$metadata#Orders");
        let result = split_inbound(
            &base,
            &StartupParameters::new(),
            &[],
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(
            result.defaulted_selection.filter_context_url(),
            Some("/srv/$metadata#Orders")
        );
    }

    #[test]
    fn json_wrapper_validates_inputs() {
        let base = SelectionVariant::new();
        let err = split_inbound_json(
            &base,
            &serde_json::json!({}),
            &serde_json::json!("CompanyCode"),
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap_err();
        assert!(err.is_invalid_input());

        let err = split_inbound_json(
            &base,
            &serde_json::json!({"A": 5}),
            &serde_json::json!([]),
            ParamHandlingMode::SelVarWins,
            &ParameterFilter::default(),
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn nameless_startup_entry_is_dropped_not_failed() {
        let startup = StartupParameters::new().with("", "x").with("Customer", "C2");
        for policy in [
            ParamHandlingMode::SelVarWins,
            ParamHandlingMode::UrlParamWins,
            ParamHandlingMode::InsertInSelOpt,
        ] {
            let result = split_inbound(
                &base_with_customer(),
                &startup,
                &["Customer".to_string()],
                policy,
                &ParameterFilter::default(),
            )
            .unwrap();
            assert_eq!(result.navigation_selection.property_names(), vec!["Customer"]);
            assert_eq!(values(&result.defaulted_selection, "Customer"), vec!["C2"]);
        }
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            "urlparamwins".parse::<ParamHandlingMode>().unwrap(),
            ParamHandlingMode::UrlParamWins
        );
        assert!("Other".parse::<ParamHandlingMode>().is_err());
    }
}
