//! Document round-trip and rejection tests.
//!
//! Saved documents must reproduce both namespaces exactly, including folder
//! order and path references, and a document naming an unregistered plugin
//! type must be rejected without building anything.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use sgui_engine::{
    ExecutionContext, FunctionBinding, FunctionNamespace, FunctionOutputs, FunctionType, ObjectBinding,
    ObjectNamespace, ObjectType, PluginError, PluginKind, Registry, ResolvedInputs, RuntimeObject, StringObject,
};
use sgui_namespace::{Folder, Namespace, Node, NodePath};
use sgui_persist::{decode, decode_str, encode, encode_string, load_from_file, save_to_file, PersistError, SaveOptions};
use sgui_schema::{BaseKind, FieldMap, FieldValue, OutputSpec, SchemaDescriptor};

struct Named(&'static str);

impl ObjectType for Named {
    fn type_name(&self) -> &str {
        self.0
    }

    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new().input("Value", BaseKind::Raw)
    }

    fn construct(&self, inputs: &ResolvedInputs) -> Result<Box<dyn RuntimeObject>, PluginError> {
        Ok(Box::new(StringObject::new(inputs.text("Value")?)))
    }
}

struct CopyValue;

impl FunctionType for CopyValue {
    fn type_name(&self) -> &str {
        "Copy"
    }

    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new()
            .input("Source", BaseKind::Raw)
            .input("Tags", sgui_schema::InputKind::list(BaseKind::Raw))
            .output("Result", OutputSpec::object("String"))
    }

    fn execute(&self, _ctx: &ExecutionContext<'_>) -> Result<FunctionOutputs, PluginError> {
        Ok(FunctionOutputs::new())
    }
}

fn p(s: &str) -> NodePath {
    s.parse().unwrap()
}

/// String plus four more object types, one function type
fn registry() -> Registry {
    Registry::new()
        .with_object(Named("A"))
        .and_then(|r| r.with_object(Named("B")))
        .and_then(|r| r.with_object(Named("C")))
        .and_then(|r| r.with_object(Named("D")))
        .and_then(|r| r.with_function(CopyValue))
        .unwrap()
}

fn blank_inputs() -> FieldMap {
    let mut inputs = FieldMap::new();
    inputs.insert("Source".into(), FieldValue::blank());
    inputs.insert("Tags".into(), FieldValue::list([]));
    inputs
}

fn workspace() -> (ObjectNamespace, FunctionNamespace) {
    let mut objects = ObjectNamespace::new();
    objects.set(&p("\\Inputs\\X"), Node::Leaf(ObjectBinding::string("5"))).unwrap();
    objects
        .set(&p("\\Inputs\\Y"), Node::Leaf(ObjectBinding::string(FieldValue::number(2.5))))
        .unwrap();
    let mut value = FieldMap::new();
    value.insert("Value".into(), FieldValue::path(p("\\Inputs\\X")));
    objects.set(&p("\\Alias"), Node::Leaf(ObjectBinding::new(3, value))).unwrap();
    objects.set(&p("\\Outputs"), Node::Folder(Folder::new())).unwrap();

    let mut inputs = FieldMap::new();
    inputs.insert("Source".into(), FieldValue::path(p("\\Alias")));
    inputs.insert(
        "Tags".into(),
        FieldValue::list([FieldValue::text("a"), FieldValue::path(p("\\Inputs\\Y"))]),
    );
    let mut functions = FunctionNamespace::flat();
    functions
        .set(
            &p("\\Copy"),
            Node::Leaf(FunctionBinding::new(0, inputs).with_output("Result", Some(p("\\Outputs\\Z")))),
        )
        .unwrap();
    functions
        .set(
            &p("\\Discard"),
            Node::Leaf(FunctionBinding::new(0, blank_inputs()).with_output("Result", None)),
        )
        .unwrap();
    (objects, functions)
}

/// Every binding, folder, reference and destination survives a round trip
#[test]
fn document_round_trip() {
    let registry = registry();
    let (objects, functions) = workspace();
    let text = encode_string(&objects, &functions, true).unwrap();
    let doc = decode_str(&text, &registry).unwrap();

    assert_eq!(doc.objects, objects);
    assert_eq!(doc.functions, functions);
    let discard = doc.functions.binding(&p("\\Discard")).unwrap();
    assert_eq!(discard.outputs().get("Result"), Some(&None));
}

/// Inputs absent from a saved binding are filled from the current schema
#[test]
fn missing_inputs_take_schema_defaults() {
    let doc = json!({"Functions": {"F": {"\\INPUTS\\": {"Source": "x"}, "\\FUNCTION_INDEX\\": 0}}});
    let doc = decode(&doc, &registry()).unwrap();
    let binding = doc.functions.binding(&p("\\F")).unwrap();
    assert_eq!(binding.inputs()["Source"], FieldValue::text("x"));
    assert_eq!(binding.inputs()["Tags"], FieldValue::list([]));
}

/// Index 99 with five object types registered is rejected up front
#[test]
fn unknown_schema_index_builds_nothing() {
    let registry = registry();
    assert_eq!(registry.object_count(), 5);
    let doc = json!({
        "Objects": {
            "Good": { "\\INPUTS\\": {"Value": "1"}, "\\OBJECT_INDEX\\": 1 },
            "Bad": { "\\INPUTS\\": {"Value": "2"}, "\\OBJECT_INDEX\\": 99 }
        },
        "Functions": {}
    });
    match decode(&doc, &registry) {
        Err(PersistError::SchemaIndexOutOfRange { kind, index, count, at }) => {
            assert_eq!(kind, PluginKind::Object);
            assert_eq!(index, 99);
            assert_eq!(count, 5);
            assert_eq!(at, "Objects\\Bad");
        }
        other => panic!("expected out of range index, got {other:?}"),
    }
}

#[test]
fn unknown_function_index_is_rejected() {
    let doc = json!({"Functions": {"F": {"\\FUNCTION_INDEX\\": 1}}});
    assert!(matches!(
        decode(&doc, &registry()),
        Err(PersistError::SchemaIndexOutOfRange { kind: PluginKind::Function, index: 1, count: 1, .. })
    ));
}

/// Saved files are verified by reading them back
#[test]
fn save_verify_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sgui");
    let registry = registry();
    let (objects, functions) = workspace();

    save_to_file(&path, &objects, &functions, &registry, SaveOptions::default()).unwrap();
    let doc = load_from_file(&path, &registry).unwrap();
    assert_eq!(doc.objects, objects);
    assert_eq!(doc.functions, functions);
}

/// A binding missing inputs its type declares does not round-trip
#[test]
fn verification_detects_incomplete_binding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sgui");
    let registry = registry();
    let mut objects = ObjectNamespace::new();
    objects.set(&p("\\Empty"), Node::Leaf(ObjectBinding::new(1, FieldMap::new()))).unwrap();

    let result = save_to_file(&path, &objects, &Namespace::flat(), &registry, SaveOptions::default());
    assert!(matches!(result, Err(PersistError::VerificationFailed(_))));

    let unverified = SaveOptions {
        verify: false,
        ..SaveOptions::default()
    };
    assert!(save_to_file(&path, &objects, &Namespace::flat(), &registry, unverified).is_ok());
}

#[test]
fn compact_and_pretty_decode_alike() {
    let registry = registry();
    let (objects, functions) = workspace();
    let compact = encode_string(&objects, &functions, false).unwrap();
    let pretty = encode_string(&objects, &functions, true).unwrap();
    assert!(compact.len() < pretty.len());
    assert_eq!(
        decode_str(&compact, &registry).unwrap(),
        decode_str(&pretty, &registry).unwrap()
    );
}

/// Folder order set by a reorder is what a reload produces
#[test]
fn saved_file_keeps_custom_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.sgui");
    let registry = registry();
    let (mut objects, functions) = workspace();
    objects
        .reorder(&NodePath::root(), &["Outputs".into(), "Alias".into(), "Inputs".into()])
        .unwrap();
    objects.move_to_position(&p("\\Inputs\\Y"), 0).unwrap();

    save_to_file(&path, &objects, &functions, &registry, SaveOptions::default()).unwrap();
    let doc = load_from_file(&path, &registry).unwrap();

    assert_eq!(doc.objects.root().names(), vec!["Outputs", "Alias", "Inputs"]);
    assert_eq!(doc.objects.folder(&p("\\Inputs")).unwrap().names(), vec!["Y", "X"]);
    assert_eq!(doc.objects, objects);

    let (original, _) = workspace();
    assert_ne!(doc.objects, original);
}

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,5}"
}

fn node_path() -> impl Strategy<Value = NodePath> {
    prop::collection::vec(name(), 1..4).prop_map(|segments| NodePath::new(segments).unwrap())
}

fn literal() -> impl Strategy<Value = FieldValue> {
    prop_oneof![
        "[ -~]{0,8}".prop_map(FieldValue::text),
        (-4_000_000i32..4_000_000).prop_map(|n| FieldValue::number(f64::from(n) / 4.0)),
    ]
}

fn single_value() -> impl Strategy<Value = FieldValue> {
    prop_oneof![literal(), node_path().prop_map(FieldValue::path)]
}

/// Either a binding or an empty folder, at a generated path
fn object_entry() -> impl Strategy<Value = (NodePath, Option<FieldValue>)> {
    (node_path(), prop::option::weighted(0.8, single_value()))
}

fn function_entry() -> impl Strategy<Value = (String, FieldMap, Option<NodePath>)> {
    (
        name(),
        single_value(),
        prop::collection::vec(single_value(), 0..4),
        prop::option::of(node_path()),
    )
        .prop_map(|(name, source, tags, destination)| {
            let mut inputs = FieldMap::new();
            inputs.insert("Source".into(), source);
            inputs.insert("Tags".into(), FieldValue::list(tags));
            (name, inputs, destination)
        })
}

proptest! {
    #[test]
    fn prop_workspace_round_trip(
        object_entries in prop::collection::vec(object_entry(), 0..12),
        function_entries in prop::collection::vec(function_entry(), 0..6),
    ) {
        let registry = registry();
        let mut objects = ObjectNamespace::new();
        for (path, value) in object_entries {
            let node = match value {
                Some(value) => Node::Leaf(ObjectBinding::string(value)),
                None => Node::Folder(Folder::new()),
            };
            // paths blocked by an earlier entry are skipped
            let _ = objects.set(&path, node);
        }
        let mut functions = FunctionNamespace::flat();
        for (name, inputs, destination) in function_entries {
            let binding = FunctionBinding::new(0, inputs).with_output("Result", destination);
            let _ = functions.set(&NodePath::single(name).unwrap(), Node::Leaf(binding));
        }

        let value = encode(&objects, &functions).unwrap();
        let doc = decode(&value, &registry).unwrap();
        prop_assert_eq!(doc.objects, objects);
        prop_assert_eq!(doc.functions, functions);
    }
}
