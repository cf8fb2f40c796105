//! Object and function bindings
//!
//! A binding is a saved instance of a plugin type: its schema index plus the
//! raw field values entered for it. Bindings hold paths, never live objects.

use crate::object::STRING_INDEX;
use crate::plugin::{Destinations, StringType};
use sgui_namespace::{Namespace, NodePath};
use sgui_schema::{FieldMap, FieldValue};

/// Namespace of object bindings
pub type ObjectNamespace = Namespace<ObjectBinding>;

/// Namespace of function bindings, one segment deep
pub type FunctionNamespace = Namespace<FunctionBinding>;

/// Saved object instance
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectBinding {
    schema_index: usize,
    inputs: FieldMap,
}

impl ObjectBinding {
    /// Create binding
    #[inline]
    #[must_use]
    pub fn new(schema_index: usize, inputs: FieldMap) -> Self {
        Self {
            schema_index,
            inputs,
        }
    }

    /// Binding of the built-in string type
    #[must_use]
    pub fn string(value: impl Into<FieldValue>) -> Self {
        let mut inputs = FieldMap::new();
        inputs.insert(StringType::VALUE_FIELD.to_string(), value.into());
        Self::new(STRING_INDEX, inputs)
    }

    /// Index into the registered object types
    #[inline]
    #[must_use]
    pub fn schema_index(&self) -> usize {
        self.schema_index
    }

    /// Raw input values
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &FieldMap {
        &self.inputs
    }

    /// Replace every input value
    pub fn set_inputs(&mut self, inputs: FieldMap) {
        self.inputs = inputs;
    }
}

/// Saved function instance
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBinding {
    schema_index: usize,
    inputs: FieldMap,
    outputs: Destinations,
}

impl FunctionBinding {
    /// Create binding with no output destinations
    #[inline]
    #[must_use]
    pub fn new(schema_index: usize, inputs: FieldMap) -> Self {
        Self {
            schema_index,
            inputs,
            outputs: Destinations::new(),
        }
    }

    /// Set the destination of one output; `None` discards it
    #[must_use]
    pub fn with_output(mut self, name: impl Into<String>, destination: Option<NodePath>) -> Self {
        self.outputs.insert(name.into(), destination);
        self
    }

    /// Index into the registered function types
    #[inline]
    #[must_use]
    pub fn schema_index(&self) -> usize {
        self.schema_index
    }

    /// Raw input values
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &FieldMap {
        &self.inputs
    }

    /// Output destinations
    #[inline]
    #[must_use]
    pub fn outputs(&self) -> &Destinations {
        &self.outputs
    }

    /// Destination of one output
    #[must_use]
    pub fn destination(&self, output: &str) -> Option<&NodePath> {
        self.outputs.get(output).and_then(Option::as_ref)
    }

    /// Replace inputs and destinations
    pub fn set_fields(&mut self, inputs: FieldMap, outputs: Destinations) {
        self.inputs = inputs;
        self.outputs = outputs;
    }
}
