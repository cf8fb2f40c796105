//! Document codec
//!
//! Converts the objects and functions namespaces to a tree of JSON maps,
//! arrays and literals, and back. Folders become nested maps; a binding
//! becomes a map holding its inputs plus a sentinel key with its schema
//! index. Sentinel keys start and end with the path separator, so they can
//! never collide with an entity name.
//!
//! ```text
//! {
//!   "Objects":   { "Inputs": { "X": { "\INPUTS\": {"Value": "5"}, "\OBJECT_INDEX\": 0 } } },
//!   "Functions": { "Add": { "\INPUTS\": {"Value 1": {"\PATH\": "\Inputs\X"}},
//!                           "\OUTPUTS\": {"Result": "\Outputs\Z"},
//!                           "\FUNCTION_INDEX\": 0 } }
//! }
//! ```

use crate::error::PersistError;
use serde_json::{Map, Number, Value};
use sgui_engine::{FunctionBinding, FunctionNamespace, ObjectBinding, ObjectNamespace, PluginKind, Registry};
use sgui_namespace::{Folder, Namespace, Node, NodePath, SEPARATOR};
use sgui_schema::{FieldMap, FieldValue, Literal};
use tracing::debug;

/// Top-level key of the objects namespace
pub const OBJECTS_KEY: &str = "Objects";
/// Top-level key of the functions namespace
pub const FUNCTIONS_KEY: &str = "Functions";
/// Key holding a binding's input values
pub const INPUTS_KEY: &str = "\\INPUTS\\";
/// Key holding a function binding's output destinations
pub const OUTPUTS_KEY: &str = "\\OUTPUTS\\";
/// Sentinel marking an object binding
pub const OBJECT_INDEX_KEY: &str = "\\OBJECT_INDEX\\";
/// Sentinel marking a function binding
pub const FUNCTION_INDEX_KEY: &str = "\\FUNCTION_INDEX\\";
/// Key of a path reference value
pub const PATH_KEY: &str = "\\PATH\\";

/// Decoded namespaces
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Objects namespace
    pub objects: ObjectNamespace,
    /// Functions namespace
    pub functions: FunctionNamespace,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            objects: Namespace::new(),
            functions: Namespace::flat(),
        }
    }
}

type LeafEncoder<'a, B> = &'a dyn Fn(&B, &str) -> Result<Value, PersistError>;
type LeafDecoder<'a, B> = &'a dyn Fn(&Map<String, Value>, &str) -> Result<B, PersistError>;

/// Encode both namespaces into one document
///
/// # Errors
/// [`PersistError::NonFiniteNumber`] for NaN or infinite literals
pub fn encode(objects: &ObjectNamespace, functions: &FunctionNamespace) -> Result<Value, PersistError> {
    let mut doc = Map::new();
    doc.insert(
        OBJECTS_KEY.to_string(),
        encode_folder(objects.root(), OBJECTS_KEY, &encode_object)?,
    );
    doc.insert(
        FUNCTIONS_KEY.to_string(),
        encode_folder(functions.root(), FUNCTIONS_KEY, &encode_function)?,
    );
    Ok(Value::Object(doc))
}

/// Encode both namespaces as JSON text
///
/// # Errors
/// Same as [`encode`]
pub fn encode_string(
    objects: &ObjectNamespace,
    functions: &FunctionNamespace,
    pretty: bool,
) -> Result<String, PersistError> {
    let value = encode(objects, functions)?;
    let text = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    Ok(text)
}

/// Decode a document against the registered plugin types
///
/// Every schema index is checked before anything is built. Inputs missing
/// from a saved binding are filled with blanks for the current schema.
///
/// # Errors
/// - [`PersistError::SchemaIndexOutOfRange`] for an unregistered type
/// - [`PersistError::CorruptDocument`] for anything else malformed
pub fn decode(doc: &Value, registry: &Registry) -> Result<Document, PersistError> {
    let root = doc
        .as_object()
        .ok_or_else(|| PersistError::corrupt("document", "expected a map"))?;
    if let Some(key) = root.keys().find(|k| *k != OBJECTS_KEY && *k != FUNCTIONS_KEY) {
        return Err(PersistError::corrupt("document", format!("unexpected key '{key}'")));
    }
    let empty = Value::Object(Map::new());
    let objects_value = root.get(OBJECTS_KEY).unwrap_or(&empty);
    let functions_value = root.get(FUNCTIONS_KEY).unwrap_or(&empty);

    check_indices(objects_value, OBJECTS_KEY, PluginKind::Object, registry)?;
    check_indices(functions_value, FUNCTIONS_KEY, PluginKind::Function, registry)?;

    let objects_root = decode_folder(objects_value, OBJECTS_KEY, OBJECT_INDEX_KEY, &|map, at| {
        decode_object(map, at, registry)
    })?;
    let functions_root = decode_folder(functions_value, FUNCTIONS_KEY, FUNCTION_INDEX_KEY, &|map, at| {
        decode_function(map, at, registry)
    })?;

    let objects = Namespace::new()
        .with_root(objects_root)
        .map_err(|e| PersistError::corrupt(OBJECTS_KEY, e.to_string()))?;
    let functions = Namespace::flat()
        .with_root(functions_root)
        .map_err(|e| PersistError::corrupt(FUNCTIONS_KEY, e.to_string()))?;
    debug!(objects = objects.len(), functions = functions.len(), "decoded document");
    Ok(Document { objects, functions })
}

/// Decode JSON text
///
/// # Errors
/// [`PersistError::Syntax`] for invalid JSON, otherwise as [`decode`]
pub fn decode_str(text: &str, registry: &Registry) -> Result<Document, PersistError> {
    let value: Value = serde_json::from_str(text)?;
    decode(&value, registry)
}

fn encode_folder<B>(folder: &Folder<B>, at: &str, leaf: LeafEncoder<'_, B>) -> Result<Value, PersistError> {
    let mut map = Map::new();
    for (name, node) in folder.iter() {
        let here = format!("{at}{SEPARATOR}{name}");
        let value = match node {
            Node::Folder(sub) => encode_folder(sub, &here, leaf)?,
            Node::Leaf(binding) => leaf(binding, &here)?,
        };
        map.insert(name.to_string(), value);
    }
    Ok(Value::Object(map))
}

fn encode_object(binding: &ObjectBinding, at: &str) -> Result<Value, PersistError> {
    let mut map = Map::new();
    map.insert(INPUTS_KEY.to_string(), encode_fields(binding.inputs(), at)?);
    map.insert(OBJECT_INDEX_KEY.to_string(), Value::from(binding.schema_index()));
    Ok(Value::Object(map))
}

fn encode_function(binding: &FunctionBinding, at: &str) -> Result<Value, PersistError> {
    let outputs: Map<String, Value> = binding
        .outputs()
        .iter()
        .map(|(name, dest)| {
            let rendered = dest.as_ref().map(ToString::to_string).unwrap_or_default();
            (name.clone(), Value::String(rendered))
        })
        .collect();

    let mut map = Map::new();
    map.insert(INPUTS_KEY.to_string(), encode_fields(binding.inputs(), at)?);
    map.insert(OUTPUTS_KEY.to_string(), Value::Object(outputs));
    map.insert(FUNCTION_INDEX_KEY.to_string(), Value::from(binding.schema_index()));
    Ok(Value::Object(map))
}

fn encode_fields(fields: &FieldMap, at: &str) -> Result<Value, PersistError> {
    let mut map = Map::new();
    for (name, value) in fields {
        map.insert(name.clone(), encode_value(value, &format!("{at}.{name}"))?);
    }
    Ok(Value::Object(map))
}

fn encode_value(value: &FieldValue, at: &str) -> Result<Value, PersistError> {
    match value {
        FieldValue::Literal(Literal::Text(s)) => Ok(Value::String(s.clone())),
        FieldValue::Literal(Literal::Number(n)) => Number::from_f64(*n)
            .map(Value::Number)
            .ok_or_else(|| PersistError::NonFiniteNumber(at.to_string())),
        FieldValue::Path(path) => {
            let mut map = Map::new();
            map.insert(PATH_KEY.to_string(), Value::String(path.to_string()));
            Ok(Value::Object(map))
        }
        FieldValue::List(items) => items
            .iter()
            .map(|item| encode_value(item, at))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
    }
}

/// Walk a section and check every sentinel index before building
fn check_indices(value: &Value, at: &str, kind: PluginKind, registry: &Registry) -> Result<(), PersistError> {
    let Some(map) = value.as_object() else {
        return Ok(());
    };
    let (own, other) = match kind {
        PluginKind::Object => (OBJECT_INDEX_KEY, FUNCTION_INDEX_KEY),
        PluginKind::Function => (FUNCTION_INDEX_KEY, OBJECT_INDEX_KEY),
    };
    if map.contains_key(other) {
        return Err(PersistError::corrupt(at, format!("unexpected {other} in this section")));
    }
    if map.contains_key(own) {
        let index = decode_index(map, own, at)?;
        return registry.check_index(kind, index).map_err(|_| PersistError::SchemaIndexOutOfRange {
            kind,
            index,
            count: match kind {
                PluginKind::Object => registry.object_count(),
                PluginKind::Function => registry.function_count(),
            },
            at: at.to_string(),
        });
    }
    for (name, child) in map {
        check_indices(child, &format!("{at}{SEPARATOR}{name}"), kind, registry)?;
    }
    Ok(())
}

fn decode_folder<B>(
    value: &Value,
    at: &str,
    sentinel: &str,
    leaf: LeafDecoder<'_, B>,
) -> Result<Folder<B>, PersistError> {
    let map = value
        .as_object()
        .ok_or_else(|| PersistError::corrupt(at, "expected a folder"))?;
    let mut folder = Folder::new();
    for (name, child) in map {
        let here = format!("{at}{SEPARATOR}{name}");
        let child_map = child
            .as_object()
            .ok_or_else(|| PersistError::corrupt(&here, "expected a folder or binding"))?;
        let node = if child_map.contains_key(sentinel) {
            Node::Leaf(leaf(child_map, &here)?)
        } else {
            Node::Folder(decode_folder(child, &here, sentinel, leaf)?)
        };
        folder
            .insert(name.clone(), node)
            .map_err(|e| PersistError::corrupt(&here, e.to_string()))?;
    }
    Ok(folder)
}

fn decode_object(map: &Map<String, Value>, at: &str, registry: &Registry) -> Result<ObjectBinding, PersistError> {
    check_keys(map, &[INPUTS_KEY, OBJECT_INDEX_KEY], at)?;
    let index = decode_index(map, OBJECT_INDEX_KEY, at)?;
    let saved = decode_fields(map.get(INPUTS_KEY), at)?;
    let defaults = registry
        .object(index)
        .map(|entry| entry.schema().default_values())
        .unwrap_or_default();
    Ok(ObjectBinding::new(index, merge(defaults, saved)))
}

fn decode_function(
    map: &Map<String, Value>,
    at: &str,
    registry: &Registry,
) -> Result<FunctionBinding, PersistError> {
    check_keys(map, &[INPUTS_KEY, OUTPUTS_KEY, FUNCTION_INDEX_KEY], at)?;
    let index = decode_index(map, FUNCTION_INDEX_KEY, at)?;
    let saved = decode_fields(map.get(INPUTS_KEY), at)?;
    let defaults = registry
        .function(index)
        .map(|entry| entry.schema().default_values())
        .unwrap_or_default();

    let mut binding = FunctionBinding::new(index, merge(defaults, saved));
    if let Some(outputs) = map.get(OUTPUTS_KEY) {
        let outputs = outputs
            .as_object()
            .ok_or_else(|| PersistError::corrupt(at, "outputs must be a map"))?;
        for (name, dest) in outputs {
            let dest = match dest.as_str() {
                Some("") => None,
                Some(rendered) => Some(
                    rendered
                        .parse::<NodePath>()
                        .map_err(|e| PersistError::corrupt(format!("{at}.{name}"), e.to_string()))?,
                ),
                None => return Err(PersistError::corrupt(format!("{at}.{name}"), "destination must be a string")),
            };
            binding = binding.with_output(name.clone(), dest);
        }
    }
    Ok(binding)
}

fn check_keys(map: &Map<String, Value>, allowed: &[&str], at: &str) -> Result<(), PersistError> {
    match map.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(PersistError::corrupt(at, format!("unexpected key '{key}' in binding"))),
        None => Ok(()),
    }
}

fn decode_index(map: &Map<String, Value>, key: &str, at: &str) -> Result<usize, PersistError> {
    map.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| PersistError::corrupt(at, format!("{key} must be a non-negative integer")))
}

fn decode_fields(value: Option<&Value>, at: &str) -> Result<FieldMap, PersistError> {
    let Some(value) = value else {
        return Ok(FieldMap::new());
    };
    let map = value
        .as_object()
        .ok_or_else(|| PersistError::corrupt(at, "inputs must be a map"))?;
    map.iter()
        .map(|(name, v)| Ok((name.clone(), decode_value(v, &format!("{at}.{name}"))?)))
        .collect()
}

fn decode_value(value: &Value, at: &str) -> Result<FieldValue, PersistError> {
    match value {
        Value::String(s) => Ok(FieldValue::text(s.clone())),
        Value::Number(n) => n
            .as_f64()
            .map(FieldValue::number)
            .ok_or_else(|| PersistError::corrupt(at, "number out of range")),
        Value::Array(items) => items
            .iter()
            .map(|item| decode_value(item, at))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        Value::Object(map) => match (map.len(), map.get(PATH_KEY).and_then(Value::as_str)) {
            (1, Some(rendered)) => rendered
                .parse::<NodePath>()
                .map(FieldValue::Path)
                .map_err(|e| PersistError::corrupt(at, e.to_string())),
            _ => Err(PersistError::corrupt(at, "expected a path reference")),
        },
        Value::Bool(_) | Value::Null => Err(PersistError::corrupt(at, "unsupported value")),
    }
}

/// Saved values over current defaults
fn merge(defaults: FieldMap, saved: FieldMap) -> FieldMap {
    let mut merged = defaults;
    merged.extend(saved);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn p(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    fn sample() -> (ObjectNamespace, FunctionNamespace) {
        let mut objects = ObjectNamespace::new();
        objects.set(&p("\\Inputs\\X"), Node::Leaf(ObjectBinding::string("5"))).unwrap();
        objects
            .set(&p("\\Alias"), Node::Leaf(ObjectBinding::string(p("\\Inputs\\X"))))
            .unwrap();
        objects.set(&p("\\Empty"), Node::Folder(Folder::new())).unwrap();
        (objects, Namespace::flat())
    }

    #[test]
    fn encode_layout() {
        let (objects, functions) = sample();
        let value = encode(&objects, &functions).unwrap();
        assert_eq!(
            value,
            json!({
                "Objects": {
                    "Inputs": { "X": { "\\INPUTS\\": {"Value": "5"}, "\\OBJECT_INDEX\\": 0 } },
                    "Alias": { "\\INPUTS\\": {"Value": {"\\PATH\\": "\\Inputs\\X"}}, "\\OBJECT_INDEX\\": 0 },
                    "Empty": {}
                },
                "Functions": {}
            })
        );
    }

    #[test]
    fn encode_keeps_folder_order() {
        let (objects, functions) = sample();
        let text = encode_string(&objects, &functions, false).unwrap();
        let inputs = text.find("\"Inputs\"").unwrap();
        let alias = text.find("\"Alias\"").unwrap();
        assert!(inputs < alias);
    }

    #[test]
    fn encode_rejects_nan() {
        let mut objects = ObjectNamespace::new();
        objects
            .set(&p("\\N"), Node::Leaf(ObjectBinding::string(FieldValue::number(f64::NAN))))
            .unwrap();
        assert!(matches!(
            encode(&objects, &Namespace::flat()),
            Err(PersistError::NonFiniteNumber(_))
        ));
    }

    #[test]
    fn decode_round_trip() {
        let (objects, functions) = sample();
        let registry = Registry::new();
        let value = encode(&objects, &functions).unwrap();
        let doc = decode(&value, &registry).unwrap();
        assert_eq!(doc.objects, objects);
        assert_eq!(doc.functions, functions);
    }

    #[test]
    fn decode_literal_with_separator_stays_literal() {
        let registry = Registry::new();
        let doc = decode(
            &json!({"Objects": {"F": {"\\INPUTS\\": {"Value": "C:\\dir"}, "\\OBJECT_INDEX\\": 0}}}),
            &registry,
        )
        .unwrap();
        let binding = doc.objects.binding(&p("\\F")).unwrap();
        assert_eq!(binding.inputs()["Value"], FieldValue::text("C:\\dir"));
    }

    #[test]
    fn decode_fills_missing_inputs() {
        let registry = Registry::new();
        let doc = decode(&json!({"Objects": {"S": {"\\OBJECT_INDEX\\": 0}}}), &registry).unwrap();
        assert!(doc.objects.binding(&p("\\S")).unwrap().inputs()["Value"].is_blank());
    }

    #[test]
    fn decode_out_of_range_index() {
        let registry = Registry::new();
        let result = decode(
            &json!({"Objects": {"A": {"\\INPUTS\\": {}, "\\OBJECT_INDEX\\": 99}}}),
            &registry,
        );
        assert!(matches!(
            result,
            Err(PersistError::SchemaIndexOutOfRange { index: 99, count: 1, .. })
        ));
    }

    #[test]
    fn decode_rejects_malformed_structure() {
        let registry = Registry::new();
        for doc in [
            json!([]),
            json!({"Objects": {"A": 5}}),
            json!({"Objects": {"A": {"\\OBJECT_INDEX\\": -1}}}),
            json!({"Objects": {"A": {"\\OBJECT_INDEX\\": 0, "\\INPUTS\\": {"Value": true}}}}),
            json!({"Objects": {"A": {"\\OBJECT_INDEX\\": 0, "extra": 1}}}),
            json!({"Objects": {"A": {"\\FUNCTION_INDEX\\": 0}}}),
            json!({"Objects": {}, "Other": {}}),
        ] {
            assert!(
                matches!(decode(&doc, &registry), Err(PersistError::CorruptDocument { .. })),
                "accepted {doc}"
            );
        }
    }

    #[test]
    fn decode_rejects_nested_functions() {
        let registry = Registry::new();
        let result = decode(&json!({"Functions": {"Group": {"Inner": {}}}}), &registry);
        assert!(matches!(result, Err(PersistError::CorruptDocument { .. })));
    }

    #[test]
    fn decode_str_reports_syntax() {
        assert!(matches!(
            decode_str("{not json", &Registry::new()),
            Err(PersistError::Syntax(_))
        ));
    }
}
