//! Property classification from metadata annotations

use super::{MetadataLookup, RedactionMode};
use serde_json::Value;
use std::collections::HashSet;

const SENSITIVE: &str = "@com.sap.vocabularies.PersonalData.v1.IsPotentiallySensitive";
const EXCLUDE_FROM_NAVIGATION: &str = "@com.sap.vocabularies.UI.v1.ExcludeFromNavigationContext";
const FIELD_CONTROL: &str = "@com.sap.vocabularies.Common.v1.FieldControl";
const MEASURE: &str = "@com.sap.vocabularies.Analytics.v1.Measure";

const KIND: &str = "$kind";
const PROPERTY: &str = "Property";
const NAVIGATION_PROPERTY: &str = "NavigationProperty";

/// Names of properties of `entity_set` that must not leave under `mode`
///
/// Members of directly reachable navigation targets are reported as
/// `nav.property`. An entity set unknown to the metadata yields an empty
/// set.
pub(crate) fn restricted_properties(
    lookup: &dyn MetadataLookup,
    entity_set: &str,
    mode: RedactionMode,
) -> HashSet<String> {
    let mut restricted = HashSet::new();
    let Some(entity_type) = lookup.get_object(&format!("/{entity_set}/")) else {
        tracing::debug!(entity_set, "entity set not found in metadata");
        return restricted;
    };

    for (name, kind) in members(&entity_type) {
        match kind {
            PROPERTY => {
                if is_restricted(lookup, &format!("/{entity_set}/{name}@"), mode) {
                    restricted.insert(name.to_string());
                }
            }
            NAVIGATION_PROPERTY => {
                let Some(target) = lookup.get_object(&format!("/{entity_set}/{name}/")) else {
                    continue;
                };
                for (member, member_kind) in members(&target) {
                    if member_kind == PROPERTY
                        && is_restricted(
                            lookup,
                            &format!("/{entity_set}/{name}/{member}@"),
                            mode,
                        )
                    {
                        restricted.insert(format!("{name}.{member}"));
                    }
                }
            }
            _ => {}
        }
    }
    restricted
}

fn members(entity_type: &Value) -> impl Iterator<Item = (&str, &str)> {
    entity_type
        .as_object()
        .into_iter()
        .flat_map(|object| object.iter())
        .filter(|(name, _)| !name.starts_with('$'))
        .filter_map(|(name, member)| {
            member
                .get(KIND)
                .and_then(Value::as_str)
                .map(|kind| (name.as_str(), kind))
        })
}

fn is_restricted(lookup: &dyn MetadataLookup, path: &str, mode: RedactionMode) -> bool {
    let Some(annotations) = lookup.get_object(path) else {
        return false;
    };
    match mode {
        RedactionMode::Measure => is_truthy(annotations.get(MEASURE)),
        RedactionMode::Sensitive => {
            is_truthy(annotations.get(SENSITIVE))
                || is_truthy(annotations.get(EXCLUDE_FROM_NAVIGATION))
                || is_inapplicable(annotations.get(FIELD_CONTROL))
        }
    }
}

fn is_truthy(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null | Value::Bool(false)))
}

fn is_inapplicable(field_control: Option<&Value>) -> bool {
    field_control
        .and_then(|control| control.get("$EnumMember"))
        .and_then(Value::as_str)
        .is_some_and(|member| member.ends_with("/Inapplicable"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    struct Map(HashMap<String, Value>);

    impl MetadataLookup for Map {
        fn is_loaded(&self) -> bool {
            true
        }

        fn get_object(&self, path: &str) -> Option<Value> {
            self.0.get(path).cloned()
        }
    }

    fn metadata() -> Map {
        let entries = [
            (
                "/Orders/",
                json!({
                    "$kind": "EntityType",
                    "Customer": {"$kind": "Property"},
                    "InternalMargin": {"$kind": "Property"},
                    "Owner": {"$kind": "Property"},
                    "Status": {"$kind": "Property"},
                    "_Buyer": {"$kind": "NavigationProperty"}
                }),
            ),
            (
                "/Orders/InternalMargin@",
                json!({(MEASURE): true}),
            ),
            ("/Orders/Owner@", json!({(SENSITIVE): true})),
            (
                "/Orders/Status@",
                json!({(FIELD_CONTROL): {"$EnumMember": "com.sap.vocabularies.Common.v1.FieldControlType/Inapplicable"}}),
            ),
            ("/Orders/Customer@", json!({(SENSITIVE): false})),
            (
                "/Orders/_Buyer/",
                json!({"Email": {"$kind": "Property"}, "Name": {"$kind": "Property"}}),
            ),
            (
                "/Orders/_Buyer/Email@",
                json!({(EXCLUDE_FROM_NAVIGATION): {}}),
            ),
        ];
        Map(entries
            .into_iter()
            .map(|(path, value)| (path.to_string(), value))
            .collect())
    }

    #[test]
    fn measure_classification() {
        let names = restricted_properties(&metadata(), "Orders", RedactionMode::Measure);
        assert_eq!(names, HashSet::from(["InternalMargin".to_string()]));
    }

    #[test]
    fn sensitive_classification_includes_navigation_members() {
        let names = restricted_properties(&metadata(), "Orders", RedactionMode::Sensitive);
        let expected: HashSet<String> = ["Owner", "Status", "_Buyer.Email"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn unknown_entity_restricts_nothing() {
        assert!(restricted_properties(&metadata(), "Missing", RedactionMode::Sensitive).is_empty());
    }
}
