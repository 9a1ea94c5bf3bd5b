//! Serialization laws for selection variants.

use appnav_selection::{Range, SelectOption, SelectionVariant, Sign};
use proptest::prelude::*;

fn arb_sign() -> impl Strategy<Value = Sign> {
    prop_oneof![Just(Sign::Include), Just(Sign::Exclude)]
}

fn arb_range() -> impl Strategy<Value = Range> {
    (
        arb_sign(),
        proptest::sample::select(SelectOption::ALL.to_vec()),
        ".{0,12}",
        proptest::option::of(".{0,12}"),
    )
        .prop_map(|(sign, option, low, high)| {
            let high = if option.needs_high() {
                Some(high.unwrap_or_default())
            } else {
                high
            };
            Range::new(sign, option, low, high).expect("high is set for BT/NB")
        })
}

fn arb_variant() -> impl Strategy<Value = SelectionVariant> {
    (
        proptest::collection::vec(("[A-Za-z][A-Za-z0-9_]{0,8}", ".{0,10}"), 0..5),
        proptest::collection::vec(
            (
                "[A-Za-z][A-Za-z0-9_]{0,8}",
                proptest::collection::vec(arb_range(), 1..4),
            ),
            0..5,
        ),
        proptest::option::of("[a-z/#$]{1,20}"),
        proptest::option::of(".{0,16}"),
    )
        .prop_map(|(parameters, select_options, context, text)| {
            let mut variant = SelectionVariant::new();
            for (name, value) in parameters {
                variant.add_parameter(&name, value).unwrap();
            }
            for (name, ranges) in select_options {
                variant.mass_add_select_option(&name, ranges).unwrap();
            }
            if let Some(url) = context {
                variant.set_filter_context_url(url);
            }
            if let Some(text) = text {
                variant.set_text(text);
            }
            variant
        })
}

proptest! {
    #[test]
    fn prop_json_string_roundtrip(variant in arb_variant()) {
        let parsed = SelectionVariant::from_json_str(&variant.to_json_string()).unwrap();
        prop_assert_eq!(parsed.to_json_value(), variant.to_json_value());
        prop_assert_eq!(parsed, variant);
    }

    #[test]
    fn prop_serialization_is_deterministic(variant in arb_variant()) {
        prop_assert_eq!(variant.to_json_string(), variant.clone().to_json_string());
    }
}

#[test]
fn parses_foreign_document() {
    let doc = r#"{
        "SelectionVariantID": "v1",
        "Parameters": [{"PropertyName": "P_Year", "PropertyValue": "2024"}],
        "SelectOptions": [
            {"PropertyName": "Customer", "Ranges": [
                {"Sign": "I", "Option": "EQ", "Low": "C1", "High": null},
                {"Sign": "E", "Option": "CP", "Low": "*test*"}
            ]}
        ]
    }"#;
    let variant: SelectionVariant = doc.parse().unwrap();
    assert_eq!(variant.id(), Some("v1"));
    assert_eq!(variant.parameter("P_Year"), Some("2024"));
    assert_eq!(variant.select_option("Customer").unwrap().len(), 2);
}
