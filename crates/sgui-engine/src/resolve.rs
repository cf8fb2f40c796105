//! Reference resolution
//!
//! Turns raw field values into [`ResolvedValue`]s by following paths into the
//! objects namespace. Following a path materializes the referenced binding,
//! which resolves that binding's own fields in turn. An in-progress path
//! stack catches reference cycles and a depth limit bounds long chains.
//!
//! Rules per kind:
//! - `raw`: literals pass through as text; a path must name a String object
//!   and yields its text
//! - `object`: a path is required and yields a freshly constructed object
//! - `file`, `dropdown`, `disabled`: literals pass through
//! - lists apply the element kind to every item
//! - dynamic kinds are evaluated against the unresolved values first

use crate::binding::{ObjectBinding, ObjectNamespace};
use crate::error::EngineError;
use crate::object::{RuntimeObject, STRING_INDEX, STRING_TYPE};
use crate::registry::Registry;
use crate::resolved::{ResolvedInputs, ResolvedValue};
use sgui_namespace::{NamespaceError, Node, NodePath};
use sgui_schema::{BaseKind, EffectiveKind, FieldMap, FieldValue, SchemaDescriptor, SchemaError};
use std::collections::HashSet;
use tracing::debug;

/// Default limit on nested reference depth
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolves field values against a read-only objects namespace
#[derive(Debug)]
pub struct Resolver<'a> {
    registry: &'a Registry,
    objects: &'a ObjectNamespace,
    max_depth: usize,
    in_progress: Vec<NodePath>,
}

impl<'a> Resolver<'a> {
    /// Create resolver with [`DEFAULT_MAX_DEPTH`]
    #[must_use]
    pub fn new(registry: &'a Registry, objects: &'a ObjectNamespace) -> Self {
        Self {
            registry,
            objects,
            max_depth: DEFAULT_MAX_DEPTH,
            in_progress: Vec::new(),
        }
    }

    /// Override the depth limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Resolve every declared input of `schema`
    ///
    /// Values for undeclared fields are ignored.
    ///
    /// # Errors
    /// [`EngineError::MissingField`] for an absent input, or the first
    /// resolution error in declaration order
    pub fn resolve_inputs(
        &mut self,
        schema: &SchemaDescriptor,
        values: &FieldMap,
    ) -> Result<ResolvedInputs, EngineError> {
        let mut resolved = ResolvedInputs::new();
        for (name, kind) in schema.effective_kinds(values) {
            let value = values
                .get(&name)
                .ok_or_else(|| EngineError::MissingField(name.clone()))?;
            let value = self.resolve_value(&name, &kind, value)?;
            resolved.insert(name, value);
        }
        Ok(resolved)
    }

    /// Resolve one value of an already evaluated kind
    ///
    /// # Errors
    /// See the module documentation
    pub fn resolve_value(
        &mut self,
        field: &str,
        kind: &EffectiveKind,
        value: &FieldValue,
    ) -> Result<ResolvedValue, EngineError> {
        match (kind, value) {
            (EffectiveKind::List(base), FieldValue::List(items)) => items
                .iter()
                .map(|item| self.resolve_single(field, base, item))
                .collect::<Result<_, _>>()
                .map(ResolvedValue::List),
            (EffectiveKind::List(_), _) => Err(SchemaError::ExpectedList(field.to_string()).into()),
            (EffectiveKind::Single(base), value) => self.resolve_single(field, base, value),
        }
    }

    fn resolve_single(
        &mut self,
        field: &str,
        kind: &BaseKind,
        value: &FieldValue,
    ) -> Result<ResolvedValue, EngineError> {
        match (kind, value) {
            (_, FieldValue::List(_)) => Err(SchemaError::UnexpectedList(field.to_string()).into()),
            (BaseKind::Raw, FieldValue::Path(path)) => self.resolve_text(path).map(ResolvedValue::Text),
            (BaseKind::Object, FieldValue::Path(path)) => self.materialize_path(path).map(ResolvedValue::Object),
            (BaseKind::Object, FieldValue::Literal(_)) => Err(SchemaError::ExpectedPath(field.to_string()).into()),
            (_, FieldValue::Path(_)) => Err(SchemaError::UnexpectedPath(field.to_string()).into()),
            (_, FieldValue::Literal(literal)) => Ok(ResolvedValue::Text(literal.to_string())),
        }
    }

    /// Text of the String object at `path`
    ///
    /// # Errors
    /// [`EngineError::TypeMismatch`] if the object is of another type
    pub fn resolve_text(&mut self, path: &NodePath) -> Result<String, EngineError> {
        let binding = self.lookup(path)?;
        if binding.schema_index() != STRING_INDEX {
            let found = self.registry.object(binding.schema_index())?.type_name().to_string();
            return Err(EngineError::TypeMismatch {
                path: path.clone(),
                expected: STRING_TYPE.to_string(),
                found,
            });
        }
        let object = self.materialize_path(path)?;
        object.as_text().map(str::to_string).ok_or_else(|| EngineError::TypeMismatch {
            path: path.clone(),
            expected: STRING_TYPE.to_string(),
            found: object.type_name().to_string(),
        })
    }

    /// Materialize the binding at `path`
    ///
    /// # Errors
    /// - [`EngineError::BrokenReference`] if nothing exists at `path`
    /// - [`EngineError::CyclicReference`] if `path` is already being resolved
    /// - [`EngineError::DepthExceeded`] past the depth limit
    pub fn materialize_path(&mut self, path: &NodePath) -> Result<Box<dyn RuntimeObject>, EngineError> {
        if let Some(start) = self.in_progress.iter().position(|p| p == path) {
            let mut cycle = self.in_progress[start..].to_vec();
            cycle.push(path.clone());
            return Err(EngineError::CyclicReference(cycle));
        }
        if self.in_progress.len() >= self.max_depth {
            return Err(EngineError::DepthExceeded(self.max_depth));
        }

        let binding = self.lookup(path)?;
        debug!(%path, depth = self.in_progress.len(), "materializing reference");
        self.in_progress.push(path.clone());
        let result = self.materialize(binding);
        self.in_progress.pop();
        result
    }

    /// Construct a fresh runtime object from a binding
    ///
    /// Nothing is cached: each call resolves every field again.
    ///
    /// # Errors
    /// Any resolution error, or [`EngineError::PluginExecution`] if the
    /// type's constructor fails
    pub fn materialize(&mut self, binding: &ObjectBinding) -> Result<Box<dyn RuntimeObject>, EngineError> {
        let registry = self.registry;
        let entry = registry.object(binding.schema_index())?;
        let inputs = self.resolve_inputs(entry.schema(), binding.inputs())?;
        entry
            .plugin()
            .construct(&inputs)
            .map_err(|source| EngineError::PluginExecution {
                type_name: entry.type_name().to_string(),
                source,
            })
    }

    /// Check that every path in `values` names an object of an acceptable
    /// type, without constructing anything
    ///
    /// # Errors
    /// - [`EngineError::BrokenReference`] or [`EngineError::ReferencedFolder`]
    ///   for a path that names no object
    /// - [`EngineError::TypeMismatch`] for a `raw` path to a non-String object
    pub fn check_references(&self, schema: &SchemaDescriptor, values: &FieldMap) -> Result<(), EngineError> {
        for (name, kind) in schema.effective_kinds(values) {
            let Some(value) = values.get(&name) else {
                continue;
            };
            for path in value.paths() {
                let binding = self.lookup(path)?;
                if *kind.base() == BaseKind::Raw && binding.schema_index() != STRING_INDEX {
                    return Err(EngineError::TypeMismatch {
                        path: path.clone(),
                        expected: STRING_TYPE.to_string(),
                        found: self.registry.object(binding.schema_index())?.type_name().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn lookup(&self, path: &NodePath) -> Result<&'a ObjectBinding, EngineError> {
        let objects = self.objects;
        match objects.get(path) {
            Ok(Node::Leaf(binding)) => Ok(binding),
            Ok(Node::Folder(_)) => Err(EngineError::ReferencedFolder(path.clone())),
            Err(NamespaceError::RootPath) => Err(EngineError::ReferencedFolder(path.clone())),
            Err(_) => Err(EngineError::BrokenReference(path.clone())),
        }
    }
}

/// First reference cycle reachable from `start`, as the looping path list
///
/// Only existing bindings are followed.
#[must_use]
pub fn reference_cycle(objects: &ObjectNamespace, start: &NodePath) -> Option<Vec<NodePath>> {
    let mut stack = vec![start.clone()];
    let mut finished = HashSet::new();
    find_cycle(objects, &mut stack, &mut finished)
}

fn find_cycle(
    objects: &ObjectNamespace,
    stack: &mut Vec<NodePath>,
    finished: &mut HashSet<NodePath>,
) -> Option<Vec<NodePath>> {
    let current = stack.last()?.clone();
    let Ok(binding) = objects.binding(&current) else {
        return None;
    };
    for next in binding.inputs().values().flat_map(FieldValue::paths) {
        if let Some(start) = stack.iter().position(|p| p == next) {
            let mut cycle = stack[start..].to_vec();
            cycle.push(next.clone());
            return Some(cycle);
        }
        if finished.contains(next) {
            continue;
        }
        stack.push(next.clone());
        if let Some(cycle) = find_cycle(objects, stack, finished) {
            return Some(cycle);
        }
        stack.pop();
        finished.insert(next.clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::StringObject;
    use crate::plugin::{ObjectType, PluginError};
    use pretty_assertions::assert_eq;
    use sgui_schema::InputKind;
    use std::any::Any;

    #[derive(Debug)]
    struct Pair {
        left: String,
        right: Option<String>,
    }

    impl RuntimeObject for Pair {
        fn type_name(&self) -> &str {
            "Pair"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Object type with a raw field and a reference to another Pair
    struct PairType;

    impl ObjectType for PairType {
        fn type_name(&self) -> &str {
            "Pair"
        }

        fn schema(&self) -> SchemaDescriptor {
            SchemaDescriptor::new()
                .input("left", BaseKind::Raw)
                .input("next", InputKind::list(BaseKind::Object))
        }

        fn construct(&self, inputs: &crate::resolved::ResolvedInputs) -> Result<Box<dyn RuntimeObject>, PluginError> {
            let right = inputs
                .list("next")?
                .first()
                .and_then(ResolvedValue::as_object)
                .and_then(|o| o.downcast_ref::<Pair>())
                .map(|p| p.left.clone());
            Ok(Box::new(Pair {
                left: inputs.text("left")?.to_string(),
                right,
            }))
        }
    }

    fn p(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    fn pair(left: impl Into<FieldValue>, next: &[&str]) -> ObjectBinding {
        let mut inputs = FieldMap::new();
        inputs.insert("left".into(), left.into());
        inputs.insert(
            "next".into(),
            FieldValue::list(next.iter().map(|s| FieldValue::Path(p(s)))),
        );
        ObjectBinding::new(1, inputs)
    }

    fn setup() -> (Registry, ObjectNamespace) {
        let registry = Registry::new().with_object(PairType).unwrap();
        let mut objects = ObjectNamespace::new();
        objects.set(&p("\\Inputs\\X"), Node::Leaf(ObjectBinding::string("5"))).unwrap();
        objects.set(&p("\\Link"), Node::Leaf(ObjectBinding::string(p("\\Inputs\\X")))).unwrap();
        (registry, objects)
    }

    #[test]
    fn raw_literal_passes_through() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        let value = resolver
            .resolve_value("f", &EffectiveKind::Single(BaseKind::Raw), &FieldValue::text("a\\b"))
            .unwrap();
        assert_eq!(value.as_text(), Some("a\\b"));
    }

    #[test]
    fn raw_path_yields_string_text() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        assert_eq!(resolver.resolve_text(&p("\\Inputs\\X")).unwrap(), "5");
        // One level of indirection through another String
        assert_eq!(resolver.resolve_text(&p("\\Link")).unwrap(), "5");
    }

    #[test]
    fn raw_path_to_other_type_is_mismatch() {
        let (registry, mut objects) = setup();
        objects.set(&p("\\P"), Node::Leaf(pair("x", &[]))).unwrap();
        let mut resolver = Resolver::new(&registry, &objects);
        assert_eq!(
            resolver.resolve_text(&p("\\P")),
            Err(EngineError::TypeMismatch {
                path: p("\\P"),
                expected: "String".into(),
                found: "Pair".into(),
            })
        );
    }

    #[test]
    fn object_path_must_exist() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        let result = resolver.resolve_value(
            "f",
            &EffectiveKind::Single(BaseKind::Object),
            &FieldValue::Path(p("\\Nope")),
        );
        assert_eq!(result.unwrap_err(), EngineError::BrokenReference(p("\\Nope")));
    }

    #[test]
    fn object_path_to_folder_is_rejected() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        assert_eq!(
            resolver.materialize_path(&p("\\Inputs")).unwrap_err(),
            EngineError::ReferencedFolder(p("\\Inputs"))
        );
    }

    #[test]
    fn materialize_follows_object_lists() {
        let (registry, mut objects) = setup();
        objects.set(&p("\\B"), Node::Leaf(pair("b", &[]))).unwrap();
        objects.set(&p("\\A"), Node::Leaf(pair(p("\\Inputs\\X"), &["\\B"]))).unwrap();

        let mut resolver = Resolver::new(&registry, &objects);
        let object = resolver.materialize_path(&p("\\A")).unwrap();
        let pair = object.downcast_ref::<Pair>().unwrap();
        assert_eq!(pair.left, "5");
        assert_eq!(pair.right.as_deref(), Some("b"));
    }

    #[test]
    fn materialize_twice_builds_independent_objects() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        let a = resolver.materialize_path(&p("\\Inputs\\X")).unwrap();
        let b = resolver.materialize_path(&p("\\Inputs\\X")).unwrap();
        assert!(!std::ptr::eq(a.as_any(), b.as_any()));
        assert_eq!(a.downcast_ref::<StringObject>(), b.downcast_ref::<StringObject>());
    }

    #[test]
    fn cyclic_objects_fail_fast() {
        let (registry, mut objects) = setup();
        objects.set(&p("\\A"), Node::Leaf(pair("a", &["\\B"]))).unwrap();
        objects.set(&p("\\B"), Node::Leaf(pair("b", &["\\A"]))).unwrap();

        let mut resolver = Resolver::new(&registry, &objects);
        assert_eq!(
            resolver.materialize_path(&p("\\A")).unwrap_err(),
            EngineError::CyclicReference(vec![p("\\A"), p("\\B"), p("\\A")])
        );
    }

    #[test]
    fn cyclic_strings_fail_fast() {
        let (registry, mut objects) = setup();
        objects.set(&p("\\S"), Node::Leaf(ObjectBinding::string(p("\\S")))).unwrap();
        let mut resolver = Resolver::new(&registry, &objects);
        assert!(matches!(
            resolver.resolve_text(&p("\\S")),
            Err(EngineError::CyclicReference(_))
        ));
    }

    #[test]
    fn depth_limit_bounds_chains() {
        let (registry, mut objects) = setup();
        objects.set(&p("\\C0"), Node::Leaf(ObjectBinding::string("end"))).unwrap();
        for i in 1..6 {
            let target = p(&format!("\\C{}", i - 1));
            objects
                .set(&p(&format!("\\C{i}")), Node::Leaf(ObjectBinding::string(target)))
                .unwrap();
        }

        let mut shallow = Resolver::new(&registry, &objects).with_max_depth(3);
        assert_eq!(shallow.resolve_text(&p("\\C5")), Err(EngineError::DepthExceeded(3)));

        let mut deep = Resolver::new(&registry, &objects);
        assert_eq!(deep.resolve_text(&p("\\C5")).unwrap(), "end");
    }

    #[test]
    fn missing_declared_field() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        let binding = ObjectBinding::new(STRING_INDEX, FieldMap::new());
        assert_eq!(
            resolver.materialize(&binding).unwrap_err(),
            EngineError::MissingField("Value".into())
        );
    }

    #[test]
    fn literal_kinds_reject_paths() {
        let (registry, objects) = setup();
        let mut resolver = Resolver::new(&registry, &objects);
        for kind in [BaseKind::File, BaseKind::Disabled, BaseKind::dropdown(["a"])] {
            let result = resolver.resolve_value(
                "f",
                &EffectiveKind::Single(kind),
                &FieldValue::Path(p("\\Inputs\\X")),
            );
            assert!(matches!(result, Err(EngineError::Shape(SchemaError::UnexpectedPath(_)))));
        }
    }

    #[test]
    fn check_references_is_shallow() {
        let (registry, mut objects) = setup();
        objects.set(&p("\\A"), Node::Leaf(pair("a", &["\\Missing"]))).unwrap();
        let resolver = Resolver::new(&registry, &objects);
        let schema = PairType.schema();

        // \A itself holds a broken link, but only the direct target is checked
        assert!(resolver.check_references(&schema, pair("x", &["\\A"]).inputs()).is_ok());
        assert_eq!(
            resolver.check_references(&schema, pair("x", &["\\Gone"]).inputs()),
            Err(EngineError::BrokenReference(p("\\Gone")))
        );
        assert!(matches!(
            resolver.check_references(&schema, pair(p("\\A"), &[]).inputs()),
            Err(EngineError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn reference_cycle_reports_loop() {
        let (_, mut objects) = setup();
        objects.set(&p("\\A"), Node::Leaf(pair("a", &["\\B"]))).unwrap();
        objects.set(&p("\\B"), Node::Leaf(pair("b", &["\\C", "\\A"]))).unwrap();
        objects.set(&p("\\C"), Node::Leaf(pair("c", &[]))).unwrap();

        assert_eq!(
            reference_cycle(&objects, &p("\\B")),
            Some(vec![p("\\B"), p("\\A"), p("\\B")])
        );
        assert_eq!(reference_cycle(&objects, &p("\\C")), None);
        assert_eq!(reference_cycle(&objects, &p("\\Link")), None);
    }
}
