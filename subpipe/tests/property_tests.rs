use proptest::prelude::*;
use serde_json::{Value as Json, json};
use subpipe::script::split_arguments;
use subpipe::{Path, compile};

fn segment() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,6}"
}

fn field_path() -> impl Strategy<Value = String> {
    (prop::bool::ANY, prop::collection::vec(segment(), 1..5)).prop_map(|(meta, segments)| {
        let root = if meta { "meta.$" } else { "$" };
        format!("{}.{}", root, segments.join("."))
    })
}

fn leaf() -> impl Strategy<Value = Json> {
    prop_oneof![
        any::<bool>().prop_map(Json::from),
        any::<i64>().prop_map(Json::from),
        "\\PC{0,12}".prop_map(Json::from),
    ]
}

fn value() -> impl Strategy<Value = Json> {
    leaf().prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Json::Array),
            prop::collection::btree_map(segment(), inner, 0..4)
                .prop_map(|map| Json::Object(map.into_iter().collect())),
        ]
    })
}

fn script_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("split_string()".to_string()),
        Just("print()".to_string()),
        Just("decompress()".to_string()),
        field_path().prop_map(|p| format!("lowercase({})", p.replace("meta.$", "$"))),
        (field_path(), field_path()).prop_map(|(a, b)| format!("{} = {}", a, b)),
        (segment(), "[a-z|,;]{1,3}")
            .prop_map(|(id, sep)| format!("split($.data, separator=\"{}\", id={})", sep, id)),
        segment().prop_map(|s| format!("print(lower(decode_base64($.{})))", s)),
        segment().prop_map(|s| format!("custom_{}(x, 'y', n:3)", s)),
        Just("# comment".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    /// Reading a path right after writing it returns the written value.
    #[test]
    fn get_after_set(path in field_path(), first in value(), second in value()) {
        prop_assume!(!second.is_null());
        let path = Path::parse(&path).unwrap();
        let mut tree = json!({});

        // a previous write may leave a scalar in the way
        if path.set(&mut tree, first).is_err() {
            return Ok(());
        }
        if path.set(&mut tree, second.clone()).is_ok() {
            let got = path.get(&tree);
            prop_assert!(got.exists());
            prop_assert_eq!(got.value(), &second);
        }
    }
}

proptest! {
    /// Deleting an object key makes it absent.
    #[test]
    fn delete_object_key_makes_absent(path in field_path(), v in value()) {
        let path = Path::parse(&path).unwrap();
        let mut tree = json!({});
        path.set(&mut tree, v).unwrap();
        path.delete(&mut tree).unwrap();
        prop_assert!(!path.get(&tree).exists());
    }
}

proptest! {
    /// Deleting an array element nulls it without changing the length.
    #[test]
    fn delete_array_element_keeps_length(
        items in prop::collection::vec(leaf(), 1..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let index = pick.index(items.len());
        let mut tree = json!({ "items": items.clone() });
        let path = Path::parse(&format!("$.items.{}", index)).unwrap();

        path.delete(&mut tree).unwrap();

        let array = tree["items"].as_array().unwrap();
        prop_assert_eq!(array.len(), items.len());
        prop_assert!(array[index].is_null());
        for (i, item) in items.iter().enumerate() {
            if i != index {
                prop_assert_eq!(&array[i], item);
            }
        }
    }
}

proptest! {
    /// Compiling the same script twice gives the same operations.
    #[test]
    fn compile_is_deterministic(lines in prop::collection::vec(script_line(), 0..8)) {
        let script = lines.join("\n");
        let first = compile(&script);
        let second = compile(&script);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(a), Ok(b)) = (first, second) {
            prop_assert_eq!(a, b);
        }
    }
}

proptest! {
    /// The tokenizer and compiler return errors instead of panicking.
    #[test]
    fn compiler_does_not_panic(s in "\\PC*") {
        let _ = split_arguments(&s);
        let _ = compile(&s);
    }
}

proptest! {
    /// Every nested call adds exactly one operation.
    #[test]
    fn nesting_adds_one_operation_per_level(depth in 1usize..10) {
        let line = format!("{}$.x{}", "lower(".repeat(depth), ")".repeat(depth));
        prop_assert_eq!(compile(&line).unwrap().len(), depth);
    }
}
