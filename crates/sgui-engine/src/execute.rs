//! Function execution
//!
//! Runs one function binding: resolve inputs, call the plugin, then store
//! each produced output as a new object binding at its destination.
//! Execution is all-or-nothing. Outputs and any object edits the function
//! queued are staged on a copy of the objects namespace that replaces the
//! live one only after every write succeeded. Queued executions are handed
//! back to the caller.

use crate::binding::{FunctionBinding, ObjectBinding, ObjectNamespace};
use crate::error::{EngineError, PluginKind};
use crate::host::Host;
use crate::plugin::{ExecutionContext, FollowUp};
use crate::registry::Registry;
use crate::resolve::{Resolver, DEFAULT_MAX_DEPTH};
use sgui_namespace::{Node, NodePath};
use sgui_schema::OutputSpec;
use tracing::{debug, warn};

/// Outcome of a successful execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    /// Function type that ran
    pub type_name: String,
    /// Paths written, in output declaration order
    pub written: Vec<NodePath>,
    /// Paths set or removed by queued object edits, in request order
    pub edited: Vec<NodePath>,
    /// Function bindings the function asked to execute next, in request order
    pub queued: Vec<NodePath>,
}

/// Executes function bindings against an objects namespace
#[derive(Clone, Copy)]
pub struct Executor<'a> {
    registry: &'a Registry,
    host: &'a dyn Host,
    max_depth: usize,
}

impl<'a> Executor<'a> {
    /// Create executor
    #[must_use]
    pub fn new(registry: &'a Registry, host: &'a dyn Host) -> Self {
        Self {
            registry,
            host,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the resolver depth limit
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Registry in use
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Host in use
    #[inline]
    #[must_use]
    pub fn host(&self) -> &'a dyn Host {
        self.host
    }

    /// Execute `binding`, writing its outputs into `objects`
    ///
    /// A broken reference is reported through [`Host::notify`] before the
    /// error is returned. On any error `objects` is left untouched.
    ///
    /// # Errors
    /// - [`EngineError::SchemaIndexOutOfRange`] for an unregistered function
    /// - any resolution error
    /// - [`EngineError::PluginExecution`] if the plugin fails
    /// - [`EngineError::MissingOutput`], [`EngineError::UnknownType`] or
    ///   [`EngineError::InvalidOutput`] if a produced output cannot be stored
    /// - [`EngineError::Shape`] or [`EngineError::Namespace`] if a queued
    ///   object edit cannot be applied
    pub fn execute(
        &self,
        binding: &FunctionBinding,
        objects: &mut ObjectNamespace,
    ) -> Result<ExecutionReport, EngineError> {
        let result = self.run(binding, objects);
        match &result {
            Ok(report) => self.host.console(&format!(
                "{} executed, {} output(s) written",
                report.type_name,
                report.written.len()
            )),
            Err(err) => self.host.console(&format!("Error: {err}")),
        }
        result
    }

    fn run(&self, binding: &FunctionBinding, objects: &mut ObjectNamespace) -> Result<ExecutionReport, EngineError> {
        let entry = self.registry.function(binding.schema_index())?;
        let type_name = entry.type_name().to_string();

        let inputs = {
            let mut resolver = Resolver::new(self.registry, objects).with_max_depth(self.max_depth);
            resolver.resolve_inputs(entry.schema(), binding.inputs())
        };
        let inputs = inputs.map_err(|err| {
            if let EngineError::BrokenReference(path) = &err {
                self.host
                    .notify("Broken reference", &format!("{type_name}: {path} does not exist"));
            }
            err
        })?;

        debug!(%type_name, inputs = inputs.len(), "executing function");
        let ctx = ExecutionContext::new(inputs, binding.outputs().clone(), self.host);
        let mut produced = entry
            .plugin()
            .execute(&ctx)
            .map_err(|source| EngineError::PluginExecution {
                type_name: type_name.clone(),
                source,
            })?;
        let follow_ups = ctx.into_follow_ups();

        let mut staged = objects.clone();
        let mut written = Vec::new();
        for (output, destination) in binding.outputs() {
            let Some(spec) = entry.schema().output_spec(output) else {
                warn!(%type_name, output = %output, "binding names an undeclared output");
                continue;
            };
            let fields = produced.shift_remove(output);
            let (OutputSpec::Object(output_type), Some(destination)) = (spec, destination) else {
                debug!(%type_name, output = %output, "output discarded");
                continue;
            };
            let fields = fields.ok_or_else(|| EngineError::MissingOutput(output.clone()))?;

            let index = self
                .registry
                .object_index(output_type)
                .ok_or_else(|| EngineError::UnknownType {
                    kind: PluginKind::Object,
                    name: output_type.clone(),
                })?;
            self.registry
                .object(index)?
                .schema()
                .check_values(&fields)
                .map_err(|source| EngineError::InvalidOutput {
                    output: output.clone(),
                    source,
                })?;

            staged.set(destination, Node::Leaf(ObjectBinding::new(index, fields)))?;
            written.push(destination.clone());
        }

        for extra in produced.keys() {
            warn!(%type_name, output = %extra, "function produced an undeclared output");
        }

        let mut edited = Vec::new();
        let mut queued = Vec::new();
        for request in follow_ups {
            match request {
                FollowUp::SetObject { path, binding } => {
                    self.registry
                        .object(binding.schema_index())?
                        .schema()
                        .check_values(binding.inputs())?;
                    staged.set(&path, Node::Leaf(binding))?;
                    edited.push(path);
                }
                FollowUp::DeleteObject(path) => {
                    staged.delete(&path)?;
                    edited.push(path);
                }
                FollowUp::Execute(path) => queued.push(path),
            }
        }
        if !edited.is_empty() || !queued.is_empty() {
            debug!(%type_name, edited = edited.len(), queued = queued.len(), "follow-ups applied");
        }

        *objects = staged;
        Ok(ExecutionReport {
            type_name,
            written,
            edited,
            queued,
        })
    }
}
