//! Resolution properties over generated object namespaces.
//!
//! Namespaces are built from a small pool of paths so that chains, broken
//! links and cycles all show up. Resolving against an unchanged namespace
//! must always give the same answer, whether the resolver is fresh or
//! reused.

use proptest::prelude::*;
use sgui_engine::{EngineError, ObjectBinding, ObjectNamespace, Registry, Resolver};
use sgui_namespace::{Node, NodePath};
use sgui_schema::FieldValue;

const POOL: [&str; 6] = ["\\A", "\\B", "\\In\\C", "\\In\\D", "\\E", "\\Gone"];

fn p(s: &str) -> NodePath {
    s.parse().unwrap()
}

fn pooled() -> impl Strategy<Value = NodePath> {
    prop::sample::select(POOL.to_vec()).prop_map(p)
}

fn value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        "[a-z0-9]{0,6}".prop_map(FieldValue::text),
        pooled().prop_map(FieldValue::path),
    ]
}

fn namespace() -> impl Strategy<Value = ObjectNamespace> {
    // \Gone is never written, so links to it stay broken
    prop::collection::vec((pooled(), value()), 0..8).prop_map(|entries| {
        let mut objects = ObjectNamespace::new();
        for (path, value) in entries {
            if path != p("\\Gone") {
                objects.set(&path, Node::Leaf(ObjectBinding::string(value))).unwrap();
            }
        }
        objects
    })
}

proptest! {
    #[test]
    fn prop_resolution_is_deterministic(objects in namespace()) {
        let registry = Registry::new();
        let mut reused = Resolver::new(&registry, &objects);

        for path in POOL.map(p) {
            let first = Resolver::new(&registry, &objects).resolve_text(&path);
            let second = Resolver::new(&registry, &objects).resolve_text(&path);
            let again = reused.resolve_text(&path);
            let once_more = reused.resolve_text(&path);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(&first, &again);
            prop_assert_eq!(&first, &once_more);
        }
    }

    #[test]
    fn prop_literals_resolve_to_themselves(objects in namespace()) {
        let registry = Registry::new();
        for (path, binding) in objects.leaves() {
            if let Some(FieldValue::Literal(literal)) = binding.inputs().get("Value") {
                let resolved = Resolver::new(&registry, &objects).resolve_text(&path);
                prop_assert_eq!(resolved, Ok(literal.to_string()));
            }
        }
    }

    #[test]
    fn prop_unresolvable_paths_fail_with_resolution_errors(objects in namespace()) {
        let registry = Registry::new();
        for path in POOL.map(p) {
            if let Err(err) = Resolver::new(&registry, &objects).resolve_text(&path) {
                prop_assert!(err.is_resolution(), "unexpected error {err:?}");
                if !objects.contains(&path) {
                    prop_assert_eq!(err, EngineError::BrokenReference(path));
                }
            }
        }
    }
}
