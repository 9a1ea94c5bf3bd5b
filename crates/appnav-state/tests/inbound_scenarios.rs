//! End-to-end scenarios across the protocol pieces.

use appnav_selection::SelectionVariant;
use appnav_state::{
    redact, split_inbound_json, AppData, MetadataLookup, ParamHandlingMode, ParameterFilter,
    RedactionMode, SaveOutcome, StateCache,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

fn lows(variant: &SelectionVariant, name: &str) -> Vec<String> {
    variant
        .value(name)
        .unwrap_or_default()
        .into_iter()
        .map(|range| range.low)
        .collect()
}

fn stored_customer() -> SelectionVariant {
    r#"{"SelectOptions":[{"PropertyName":"Customer","Ranges":[{"Sign":"I","Option":"EQ","Low":"C1","High":null}]}]}"#
        .parse()
        .unwrap()
}

#[test]
fn every_policy_on_the_customer_region_scenario() {
    let startup = json!({"Customer": "C2", "Region": ["EMEA", "APAC"]});
    let expected = [
        (ParamHandlingMode::SelVarWins, vec!["C1"]),
        (ParamHandlingMode::UrlParamWins, vec!["C2"]),
        (ParamHandlingMode::InsertInSelOpt, vec!["C1", "C2"]),
    ];

    for (policy, customer) in expected {
        let result = split_inbound_json(
            &stored_customer(),
            &startup,
            &json!([]),
            policy,
            &ParameterFilter::default(),
        )
        .unwrap();
        assert_eq!(lows(&result.navigation_selection, "Customer"), customer, "{policy}");
        assert_eq!(
            lows(&result.navigation_selection, "Region"),
            vec!["EMEA", "APAC"],
            "{policy}"
        );
    }
}

#[test]
fn defaults_only_navigation_is_flagged() {
    let mut stored = SelectionVariant::new();
    stored.add_parameter("CompanyCode", "0001").unwrap();

    let result = split_inbound_json(
        &stored,
        &json!({}),
        &json!(["CompanyCode"]),
        ParamHandlingMode::SelVarWins,
        &ParameterFilter::default(),
    )
    .unwrap();

    assert!(result.navigation_is_defaults_only);
    assert_eq!(result.navigation_selection.parameter("CompanyCode"), Some("0001"));
}

struct OrderMetadata {
    loaded: bool,
}

impl MetadataLookup for OrderMetadata {
    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn get_object(&self, path: &str) -> Option<Value> {
        match path {
            "/Order/" => Some(json!({
                "$kind": "EntityType",
                "Customer": {"$kind": "Property"},
                "InternalMargin": {"$kind": "Property"}
            })),
            "/Order/InternalMargin@" => {
                Some(json!({"@com.sap.vocabularies.Analytics.v1.Measure": true}))
            }
            _ => None,
        }
    }
}

fn order_payload() -> AppData {
    AppData::from_json_value(&json!({
        "selectionVariant": {
            "FilterContextUrl": "/srv/$metadata#Order",
            "Parameters": [{"PropertyName": "P_Currency", "PropertyValue": "EUR"}],
            "SelectOptions": [
                {"PropertyName": "InternalMargin", "Ranges": [{"Sign": "I", "Option": "GT", "Low": "0.2"}]},
                {"PropertyName": "Customer", "Ranges": [{"Sign": "I", "Option": "EQ", "Low": "C1"}]}
            ]
        },
        "valueTexts": {"Texts": [{"PropertyTexts": [
            {"PropertyName": "Customer", "ValueTexts": [{"PropertyValue": "C1", "Text": "Acme"}]}
        ]}]},
        "semanticDates": {"Dates": [{"PropertyName": "Customer", "Data": {}}]}
    }))
    .unwrap()
}

#[test]
fn measure_redaction_keeps_customer() {
    let redacted = redact(
        &order_payload(),
        &OrderMetadata { loaded: true },
        RedactionMode::Measure,
    );
    assert_eq!(
        redacted.selection_variant.select_option_property_names(),
        vec!["Customer"]
    );
    assert_eq!(redacted.selection_variant.parameter("P_Currency"), Some("EUR"));
}

#[test]
fn unloaded_metadata_clears_every_redactable_field() {
    let redacted = redact(
        &order_payload(),
        &OrderMetadata { loaded: false },
        RedactionMode::Sensitive,
    );
    assert!(redacted.selection_variant.is_empty());
    assert!(redacted.value_texts.unwrap().is_empty());
    assert!(redacted.semantic_dates.unwrap().is_empty());
}

#[tokio::test]
async fn cache_persists_once_per_distinct_payload() {
    let cache = StateCache::new();
    let counter = AtomicUsize::new(0);
    let persisted = &counter;
    let persist = move |_: AppData| async move {
        let n = persisted.fetch_add(1, Ordering::SeqCst);
        Ok::<_, ()>(format!("key-{n}"))
    };

    let a = cache.save_or_reuse(order_payload(), persist).await.unwrap();
    let b = cache.save_or_reuse(order_payload(), persist).await.unwrap();
    let changed = order_payload().with_table_variant_id("compact");
    let c = cache.save_or_reuse(changed, persist).await.unwrap();

    assert_eq!(a, SaveOutcome::Saved("key-0".into()));
    assert_eq!(b, SaveOutcome::Reused("key-0".into()));
    assert_eq!(c, SaveOutcome::Saved("key-1".into()));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}
