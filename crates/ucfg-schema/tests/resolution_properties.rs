//! Property tests for the resolution and validation pipeline over the
//! bundled `usb-button-color` schema.

use proptest::prelude::*;
use serde_json::{json, Value};
use ucfg_schema::{
    Resolver, SchemaRegistry, ValidationPolicy, ValidationReport, ViolationKind,
};

const CHANNELS: [&str; 3] = ["red", "green", "blue"];

fn resolver() -> Resolver<SchemaRegistry> {
    Resolver::new(SchemaRegistry::builtin().expect("builtin schemas"))
}

fn color_doc(red: i64, green: i64, blue: i64) -> Value {
    json!({
        "schemaVersion": 2.0,
        "resourceType": "usb-button-color",
        "deviceClass": "usb-button",
        "colorRGB": { "red": red, "green": green, "blue": blue }
    })
}

fn summary(report: &ValidationReport) -> Vec<(String, ViolationKind)> {
    report
        .violations()
        .iter()
        .map(|v| (v.path.to_string(), v.kind))
        .collect()
}

/// Arbitrary JSON documents, including ones that look nothing like a resource.
fn any_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-300i64..600).prop_map(|n| json!(n)),
        prop_oneof![
            Just("usb-button".to_string()),
            Just("usb-button-color".to_string()),
            "[a-z]{0,8}",
        ]
        .prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map(
                prop_oneof![
                    Just("colorRGB".to_string()),
                    Just("red".to_string()),
                    Just("deviceClass".to_string()),
                    "[a-z]{1,6}",
                ],
                inner,
                0..5,
            )
            .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// In-range channels are always valid; every out-of-range channel yields
    /// exactly one RangeViolation at its own path, in declaration order.
    #[test]
    fn channel_range_is_exact(red in -100i64..400, green in -100i64..400, blue in -100i64..400) {
        let report = resolver().validate(&color_doc(red, green, blue));
        let expected: Vec<(String, ViolationKind)> = CHANNELS
            .iter()
            .zip([red, green, blue])
            .filter(|(_, v)| !(0..=255).contains(v))
            .map(|(name, _)| (format!("colorRGB.{name}"), ViolationKind::RangeViolation))
            .collect();
        prop_assert_eq!(summary(&report), expected);
    }

    /// Removing any set of required channels from a valid document reports
    /// exactly those channels as missing, and nothing else.
    #[test]
    fn removing_required_fields_reports_exactly_them(mask in 0u8..8) {
        let mut doc = color_doc(10, 20, 30);
        let rgb = doc["colorRGB"].as_object_mut().unwrap();
        let mut expected = Vec::new();
        for (i, name) in CHANNELS.iter().enumerate() {
            if mask & (1 << i) != 0 {
                rgb.remove(*name);
                expected.push((format!("colorRGB.{name}"), ViolationKind::MissingRequiredField));
            }
        }
        prop_assert_eq!(summary(&resolver().validate(&doc)), expected);
    }

    /// Any version other than the registered one is a single SchemaNotFound,
    /// even when the payload is also broken.
    #[test]
    fn unregistered_version_is_terminal(version in -10.0f64..10.0, red in -100i64..400) {
        prop_assume!(version != 2.0);
        let mut doc = color_doc(red, 0, 0);
        doc["schemaVersion"] = json!(version);
        let report = resolver().validate(&doc);
        prop_assert_eq!(
            summary(&report),
            vec![("(root)".to_string(), ViolationKind::SchemaNotFound)]
        );
    }

    /// Validation never panics and is order-stable across repeated runs,
    /// under both leaf reporting policies.
    #[test]
    fn validation_is_deterministic(doc in any_json()) {
        let registry = SchemaRegistry::builtin().unwrap();
        for policy in [ValidationPolicy::default(), ValidationPolicy::all_failures()] {
            let resolver = Resolver::with_policy(&registry, policy);
            let first = resolver.validate(&doc);
            let second = resolver.validate(&doc);
            prop_assert_eq!(first, second);
        }
    }

    /// Terminal violations are always the only violation in a report.
    #[test]
    fn terminal_violations_stand_alone(doc in any_json()) {
        let report = resolver().validate(&doc);
        if report.violations().iter().any(|v| v.kind.is_terminal()) {
            prop_assert_eq!(report.len(), 1);
        }
    }
}

#[test]
fn test_button_color_scenarios() {
    let resolver = resolver();
    assert!(resolver.validate(&color_doc(255, 0, 128)).is_valid());
    assert_eq!(
        summary(&resolver.validate(&color_doc(300, 0, 128))),
        [("colorRGB.red".to_string(), ViolationKind::RangeViolation)]
    );
    let mut doc = color_doc(255, 0, 128);
    doc.as_object_mut().unwrap().remove("colorRGB");
    assert_eq!(
        summary(&resolver.validate(&doc)),
        [("colorRGB".to_string(), ViolationKind::MissingRequiredField)]
    );
}
