//! Plugin traits
//!
//! Object types construct runtime objects from resolved inputs; function
//! types execute against resolved inputs and return field maps for their
//! outputs. Both are identified by a stable type name and describe
//! themselves with a [`SchemaDescriptor`].

use crate::binding::ObjectBinding;
use crate::host::{Host, SurfaceHandle};
use crate::object::{RuntimeObject, StringObject, STRING_TYPE};
use crate::resolved::ResolvedInputs;
use indexmap::IndexMap;
use sgui_namespace::NodePath;
use sgui_schema::{BaseKind, FieldMap, SchemaDescriptor};
use std::cell::RefCell;
use thiserror::Error;

/// Failure raised by a plugin's own routine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PluginError {
    message: String,
}

impl PluginError {
    /// Create from a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Error message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for PluginError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for PluginError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Field maps produced by a function, keyed by output name
pub type FunctionOutputs = IndexMap<String, FieldMap>;

/// Output destinations of a function binding; `None` discards the result
pub type Destinations = IndexMap<String, Option<NodePath>>;

/// Object type plugin
pub trait ObjectType: Send + Sync {
    /// Stable type id
    fn type_name(&self) -> &str;

    /// Input contract
    fn schema(&self) -> SchemaDescriptor;

    /// Build a runtime object from resolved inputs
    ///
    /// # Errors
    /// Returns error if the inputs cannot form a valid object
    fn construct(&self, inputs: &ResolvedInputs) -> Result<Box<dyn RuntimeObject>, PluginError>;
}

/// Function type plugin
pub trait FunctionType: Send + Sync {
    /// Stable type id
    fn type_name(&self) -> &str;

    /// Input and output contract
    fn schema(&self) -> SchemaDescriptor;

    /// Run with resolved inputs
    ///
    /// # Errors
    /// Any failure aborts this execution; nothing is written
    fn execute(&self, ctx: &ExecutionContext<'_>) -> Result<FunctionOutputs, PluginError>;
}

/// Edit or execution a function asks for while it runs
///
/// Requests are applied in the order they were made, after the requesting
/// function's outputs. Object edits commit together with those outputs;
/// executions run once that commit has happened.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    /// Store a binding in the objects namespace
    SetObject {
        /// Where to store it
        path: NodePath,
        /// What to store
        binding: ObjectBinding,
    },
    /// Remove the node at a path in the objects namespace
    DeleteObject(NodePath),
    /// Execute the function binding at a path
    Execute(NodePath),
}

/// Everything a function sees while executing
///
/// Besides the host, a function reaches the session only by queueing
/// [`FollowUp`] requests.
pub struct ExecutionContext<'a> {
    inputs: ResolvedInputs,
    destinations: Destinations,
    host: &'a dyn Host,
    follow_ups: RefCell<Vec<FollowUp>>,
}

impl<'a> ExecutionContext<'a> {
    /// Create context
    #[must_use]
    pub fn new(inputs: ResolvedInputs, destinations: Destinations, host: &'a dyn Host) -> Self {
        Self {
            inputs,
            destinations,
            host,
            follow_ups: RefCell::new(Vec::new()),
        }
    }

    /// Resolved inputs
    #[inline]
    #[must_use]
    pub fn inputs(&self) -> &ResolvedInputs {
        &self.inputs
    }

    /// Copy of the binding's output destinations
    #[inline]
    #[must_use]
    pub fn destinations(&self) -> &Destinations {
        &self.destinations
    }

    /// Hosting application
    #[inline]
    #[must_use]
    pub fn host(&self) -> &'a dyn Host {
        self.host
    }

    /// Shorthand for [`Host::notify`]
    pub fn notify(&self, title: &str, body: &str) {
        self.host.notify(title, body);
    }

    /// Shorthand for [`Host::acquire_drawing_surface`]
    #[must_use]
    pub fn drawing_surface(&self, title: &str, is_3d: bool) -> SurfaceHandle {
        self.host.acquire_drawing_surface(title, is_3d)
    }

    /// Queue storing `binding` at `path` in the objects namespace
    pub fn set_object(&self, path: NodePath, binding: ObjectBinding) {
        self.follow_ups.borrow_mut().push(FollowUp::SetObject { path, binding });
    }

    /// Queue removing the node at `path` from the objects namespace
    pub fn delete_object(&self, path: NodePath) {
        self.follow_ups.borrow_mut().push(FollowUp::DeleteObject(path));
    }

    /// Queue executing the function binding at `path`
    pub fn execute(&self, path: NodePath) {
        self.follow_ups.borrow_mut().push(FollowUp::Execute(path));
    }

    /// Requests queued so far, in order
    #[must_use]
    pub fn into_follow_ups(self) -> Vec<FollowUp> {
        self.follow_ups.into_inner()
    }
}

/// The built-in string type, always registered at index 0
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl StringType {
    /// Name of its single input
    pub const VALUE_FIELD: &'static str = "Value";
}

impl ObjectType for StringType {
    fn type_name(&self) -> &str {
        STRING_TYPE
    }

    fn schema(&self) -> SchemaDescriptor {
        SchemaDescriptor::new()
            .input(Self::VALUE_FIELD, BaseKind::Raw)
            .input_tip(Self::VALUE_FIELD, "Text value; may reference another String")
    }

    fn construct(&self, inputs: &ResolvedInputs) -> Result<Box<dyn RuntimeObject>, PluginError> {
        let value = inputs.text(Self::VALUE_FIELD)?;
        Ok(Box::new(StringObject::new(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolved::ResolvedValue;

    #[test]
    fn string_type_constructs_from_value() {
        let mut inputs = ResolvedInputs::new();
        inputs.insert("Value", ResolvedValue::Text("hi".into()));
        let obj = StringType.construct(&inputs).unwrap();
        assert_eq!(obj.as_text(), Some("hi"));
        StringType.schema().validate().unwrap();
    }

    #[test]
    fn follow_ups_keep_request_order() {
        let host = crate::host::HeadlessHost::new();
        let ctx = ExecutionContext::new(ResolvedInputs::new(), Destinations::new(), &host);
        let x: NodePath = "\\X".parse().unwrap();
        let f: NodePath = "\\F".parse().unwrap();
        ctx.set_object(x.clone(), ObjectBinding::string("1"));
        ctx.execute(f.clone());
        ctx.delete_object(x.clone());

        assert_eq!(
            ctx.into_follow_ups(),
            vec![
                FollowUp::SetObject {
                    path: x.clone(),
                    binding: ObjectBinding::string("1"),
                },
                FollowUp::Execute(f),
                FollowUp::DeleteObject(x),
            ]
        );
    }

    #[test]
    fn string_type_needs_value() {
        assert!(StringType.construct(&ResolvedInputs::new()).is_err());
    }
}
