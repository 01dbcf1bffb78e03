//! Text-level laws of the facade: what `set` writes, `get` reads back.

use njson::json_cli::Engine;
use proptest::prelude::*;
use serde_json::{json, Value};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 _.-]{0,16}".prop_map(Value::String),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        ..ProptestConfig::default()
    })]

    #[test]
    fn set_then_get_returns_the_value(
        keys in prop::collection::vec("[a-z][a-z0-9_]{0,7}", 1..4),
        index in 0usize..6,
        value in scalar(),
    ) {
        let engine = Engine::default();
        let path = format!("{}[{index}]", keys.join("."));
        let value_text = serde_json::to_string(&value).unwrap();

        let doc = engine.try_set("{}", &path, &value_text).unwrap();
        prop_assert_eq!(engine.try_get(&doc, &path).unwrap(), Some(value.clone()));

        let resp = engine.get(&doc, &path);
        prop_assert!(resp.exists);
        prop_assert_eq!(resp.value, Some(value));
    }

    #[test]
    fn delete_after_set_leaves_only_padding(
        key in "[a-z]{1,8}",
        index in 0usize..6,
        value in scalar(),
    ) {
        let engine = Engine::default();
        let path = format!("{key}.{index}");
        let value_text = serde_json::to_string(&value).unwrap();

        let doc = engine.try_set("{}", &path, &value_text).unwrap();
        let doc = engine.try_delete(&doc, &path).unwrap();
        let parsed: Value = serde_json::from_str(&doc).unwrap();
        prop_assert_eq!(parsed, json!({ key: vec![Value::Null; index] }));
    }
}
