//! Workspace session
//!
//! Owns the objects and functions namespaces, the file they came from and a
//! modified flag. Form saves check shape and references before touching the
//! session; a rejected save is reported through the [`Host`] and changes
//! nothing.

use crate::config::WorkspaceConfig;
use crate::error::{Result, SguiError};
use sgui_engine::{
    reference_cycle, BatchAborted, BatchReport, BatchRunner, Destinations, EngineError, ExecutionReport, Executor,
    FunctionBinding, FunctionNamespace, Host, ObjectBinding, ObjectNamespace, Registry, Resolver,
    RuntimeObject,
};
use sgui_namespace::{Folder, Namespace, Node, NodePath};
use sgui_persist::{load_from_file, save_to_file, with_extension};
use sgui_schema::{FieldMap, FieldValue, OutputSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Notification title for rejected form saves
pub const INVALID_INPUT_TITLE: &str = "Invalid input";

/// One editing session
#[derive(Debug)]
pub struct Workspace {
    registry: Arc<Registry>,
    objects: ObjectNamespace,
    functions: FunctionNamespace,
    config: WorkspaceConfig,
    current_file: Option<PathBuf>,
    modified: bool,
}

impl Workspace {
    /// Create an empty session
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            objects: Namespace::new(),
            functions: Namespace::flat(),
            config: WorkspaceConfig::default(),
            current_file: None,
            modified: false,
        }
    }

    /// With configuration
    #[must_use]
    pub fn with_config(mut self, config: WorkspaceConfig) -> Self {
        self.config = config;
        self
    }

    /// Registered plugin types
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Objects namespace
    #[inline]
    #[must_use]
    pub fn objects(&self) -> &ObjectNamespace {
        &self.objects
    }

    /// Functions namespace
    #[inline]
    #[must_use]
    pub fn functions(&self) -> &FunctionNamespace {
        &self.functions
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// File last saved to or opened from
    #[inline]
    #[must_use]
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Check for changes since the last save or open
    #[inline]
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    // ---------------------------------------------------------------------
    // Objects
    // ---------------------------------------------------------------------

    /// Save a new object form at `path`, replacing any object already there
    ///
    /// # Errors
    /// Shape, reference or placement errors, each also sent to `host`
    pub fn create_object(
        &mut self,
        host: &dyn Host,
        path: &NodePath,
        schema_index: usize,
        inputs: FieldMap,
    ) -> Result<()> {
        let staged = self
            .stage_object(path, schema_index, inputs)
            .map_err(|err| reject(host, err))?;
        self.objects = staged;
        self.touch();
        info!(%path, "object saved");
        Ok(())
    }

    /// Save an edited object form, keeping its type
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if no object exists at `path`, otherwise as
    /// [`Self::create_object`]
    pub fn update_object(&mut self, host: &dyn Host, path: &NodePath, inputs: FieldMap) -> Result<()> {
        let schema_index = self.objects.binding(path)?.schema_index();
        self.create_object(host, path, schema_index, inputs)
    }

    /// Add an empty folder
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if `path` is taken or blocked
    pub fn add_folder(&mut self, path: &NodePath) -> Result<()> {
        self.objects.insert_new(path, Node::Folder(Folder::new()))?;
        self.touch();
        Ok(())
    }

    /// Rename an object or folder in place
    ///
    /// References to the old path are not rewritten.
    ///
    /// # Errors
    /// [`SguiError::Namespace`] on a missing path or a name conflict
    pub fn rename_object(&mut self, path: &NodePath, new_name: &str) -> Result<NodePath> {
        let renamed = self.objects.rename(path, new_name)?;
        self.touch();
        Ok(renamed)
    }

    /// Move an object or folder into another folder
    ///
    /// # Errors
    /// [`SguiError::Namespace`] for cycles, conflicts or missing paths
    pub fn move_object(&mut self, path: &NodePath, dest_folder: &NodePath) -> Result<NodePath> {
        let moved = self.objects.move_into(path, dest_folder)?;
        self.touch();
        Ok(moved)
    }

    /// Delete an object or folder
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if nothing exists at `path`
    pub fn delete_object(&mut self, path: &NodePath) -> Result<()> {
        self.objects.delete(path)?;
        self.touch();
        Ok(())
    }

    /// Reorder a folder's children
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if `order` is not a permutation of the children
    pub fn reorder_objects(&mut self, folder: &NodePath, order: &[String]) -> Result<()> {
        self.objects.reorder(folder, order)?;
        self.touch();
        Ok(())
    }

    /// Move an object to `index` among its siblings
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if nothing exists at `path`
    pub fn move_object_to_position(&mut self, path: &NodePath, index: usize) -> Result<()> {
        self.objects.move_to_position(path, index)?;
        self.touch();
        Ok(())
    }

    /// Remove every object
    pub fn clear_objects(&mut self) {
        self.objects.clear();
        self.touch();
    }

    /// Paths of all objects, optionally only those of one type
    #[must_use]
    pub fn object_paths(&self, type_name: Option<&str>) -> Vec<NodePath> {
        self.objects
            .leaves()
            .into_iter()
            .filter(|(_, binding)| {
                type_name.map_or(true, |wanted| {
                    self.registry
                        .object(binding.schema_index())
                        .is_ok_and(|entry| entry.type_name() == wanted)
                })
            })
            .map(|(path, _)| path)
            .collect()
    }

    /// Construct the object at `path`
    ///
    /// # Errors
    /// Any resolution error or a failing constructor
    pub fn materialize_object(&self, path: &NodePath) -> Result<Box<dyn RuntimeObject>> {
        let object = Resolver::new(&self.registry, &self.objects)
            .with_max_depth(self.config.max_resolution_depth)
            .materialize_path(path)?;
        Ok(object)
    }

    // ---------------------------------------------------------------------
    // Functions
    // ---------------------------------------------------------------------

    /// Save a new function form at `path`, replacing any function there
    ///
    /// Outputs the type declares but `outputs` omits are left blank.
    ///
    /// # Errors
    /// Shape, reference or destination errors, each also sent to `host`
    pub fn create_function(
        &mut self,
        host: &dyn Host,
        path: &NodePath,
        schema_index: usize,
        inputs: FieldMap,
        outputs: Destinations,
    ) -> Result<()> {
        let mut staged = self.functions.clone();
        self.check_function(schema_index, inputs, &outputs)
            .and_then(|binding| staged.set(path, Node::Leaf(binding)).map_err(SguiError::from))
            .map_err(|err| reject(host, err))?;
        self.functions = staged;
        self.touch();
        info!(%path, "function saved");
        Ok(())
    }

    /// Save an edited function form, keeping its type
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if no function exists at `path`, otherwise as
    /// [`Self::create_function`]
    pub fn update_function(
        &mut self,
        host: &dyn Host,
        path: &NodePath,
        inputs: FieldMap,
        outputs: Destinations,
    ) -> Result<()> {
        let schema_index = self.functions.binding(path)?.schema_index();
        self.create_function(host, path, schema_index, inputs, outputs)
    }

    /// Rename a function in place
    ///
    /// # Errors
    /// [`SguiError::Namespace`] on a missing path or a name conflict
    pub fn rename_function(&mut self, path: &NodePath, new_name: &str) -> Result<NodePath> {
        let renamed = self.functions.rename(path, new_name)?;
        self.touch();
        Ok(renamed)
    }

    /// Delete a function
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if nothing exists at `path`
    pub fn delete_function(&mut self, path: &NodePath) -> Result<()> {
        self.functions.delete(path)?;
        self.touch();
        Ok(())
    }

    /// Reorder the function list
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if `order` is not a permutation of the functions
    pub fn reorder_functions(&mut self, order: &[String]) -> Result<()> {
        self.functions.reorder(&NodePath::root(), order)?;
        self.touch();
        Ok(())
    }

    /// Move a function to `index` in the list
    ///
    /// # Errors
    /// [`SguiError::Namespace`] if nothing exists at `path`
    pub fn move_function_to_position(&mut self, path: &NodePath, index: usize) -> Result<()> {
        self.functions.move_to_position(path, index)?;
        self.touch();
        Ok(())
    }

    /// Remove every function
    pub fn clear_functions(&mut self) {
        self.functions.clear();
        self.touch();
    }

    /// Paths of all functions, in run order
    #[must_use]
    pub fn function_paths(&self) -> Vec<NodePath> {
        self.functions.leaves().into_iter().map(|(path, _)| path).collect()
    }

    /// Execute one function, writing its outputs into the objects namespace
    ///
    /// Object edits the function queued commit together with its outputs.
    /// Executions it queued run afterwards, in request order; a failure
    /// among them leaves the requesting function's writes in place.
    ///
    /// # Errors
    /// Resolution, plugin or output errors, with objects left untouched;
    /// [`SguiError::Batch`] if a queued execution fails
    pub fn execute_function(&mut self, host: &dyn Host, path: &NodePath) -> Result<ExecutionReport> {
        let binding = self.functions.binding(path)?.clone();
        let executor =
            Executor::new(&self.registry, host).with_max_depth(self.config.max_resolution_depth);
        let report = executor.execute(&binding, &mut self.objects)?;
        if !report.written.is_empty() || !report.edited.is_empty() {
            // executor still borrows the registry
            self.modified = true;
        }
        if report.queued.is_empty() {
            return Ok(report);
        }

        let queue = report
            .queued
            .iter()
            .map(|next| -> Result<(NodePath, FunctionBinding)> {
                Ok((next.clone(), self.functions.binding(next)?.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(%path, queued = queue.len(), "running queued executions");
        let outcome = BatchRunner::new(executor).run_queue(queue, &self.functions, &mut self.objects);
        self.touch_if_written(&outcome);
        outcome?;
        Ok(report)
    }

    /// Execute every function in order, stopping at the first failure
    ///
    /// # Errors
    /// [`SguiError::Batch`] with the partial report
    pub fn run_all(&mut self, host: &dyn Host) -> Result<BatchReport> {
        let executor =
            Executor::new(&self.registry, host).with_max_depth(self.config.max_resolution_depth);
        let outcome = BatchRunner::new(executor).run(&self.functions, &mut self.objects);
        self.touch_if_written(&outcome);
        outcome.map_err(SguiError::from)
    }

    // ---------------------------------------------------------------------
    // Files
    // ---------------------------------------------------------------------

    /// Empty both namespaces and forget the current file
    pub fn reset(&mut self) {
        self.objects.clear();
        self.functions.clear();
        self.current_file = None;
        self.modified = false;
        info!("workspace reset");
    }

    /// Save to the current file
    ///
    /// # Errors
    /// [`SguiError::NoCurrentFile`] before the first save or open, otherwise
    /// as [`Self::save_as`]
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = self.current_file.clone().ok_or(SguiError::NoCurrentFile)?;
        self.save_as(&path)
    }

    /// Save to `path`, adding the configured extension if missing
    ///
    /// # Errors
    /// [`SguiError::Persist`] if writing or verification fails
    pub fn save_as(&mut self, path: &Path) -> Result<PathBuf> {
        let path = with_extension(path, &self.config.file_extension);
        save_to_file(
            &path,
            &self.objects,
            &self.functions,
            &self.registry,
            self.config.save_options(),
        )?;
        self.current_file = Some(path.clone());
        self.modified = false;
        Ok(path)
    }

    /// Replace the session with the contents of `path`
    ///
    /// The session is untouched if loading fails.
    ///
    /// # Errors
    /// [`SguiError::Persist`] for unreadable or invalid documents
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let doc = load_from_file(path, &self.registry)?;
        self.objects = doc.objects;
        self.functions = doc.functions;
        self.current_file = Some(path.to_path_buf());
        self.modified = false;
        info!(path = %path.display(), objects = self.objects.len(), functions = self.functions.len(), "workspace opened");
        Ok(())
    }

    /// Check every binding against its schema and the current objects
    ///
    /// Returns one entry per failing binding, objects first.
    #[must_use]
    pub fn validate(&self) -> Vec<(NodePath, SguiError)> {
        let mut problems = Vec::new();
        for (path, binding) in self.objects.leaves() {
            let checked = self
                .check_object_fields(binding.schema_index(), binding.inputs())
                .and_then(|()| match reference_cycle(&self.objects, &path) {
                    Some(cycle) => Err(EngineError::CyclicReference(cycle).into()),
                    None => Ok(()),
                });
            if let Err(err) = checked {
                problems.push((path, err));
            }
        }
        for (path, binding) in self.functions.leaves() {
            let checked = self.check_function(binding.schema_index(), binding.inputs().clone(), binding.outputs());
            if let Err(err) = checked {
                problems.push((path, err));
            }
        }
        problems
    }

    // ---------------------------------------------------------------------
    // Form checks
    // ---------------------------------------------------------------------

    fn check_object_fields(&self, schema_index: usize, inputs: &FieldMap) -> Result<()> {
        let entry = self.registry.object(schema_index)?;
        entry.schema().check_values(inputs)?;
        Resolver::new(&self.registry, &self.objects).check_references(entry.schema(), inputs)?;
        Ok(())
    }

    fn stage_object(&self, path: &NodePath, schema_index: usize, inputs: FieldMap) -> Result<ObjectNamespace> {
        self.check_object_fields(schema_index, &inputs)?;

        let mut staged = self.objects.clone();
        staged.set(path, Node::Leaf(ObjectBinding::new(schema_index, inputs)))?;
        if let Some(cycle) = reference_cycle(&staged, path) {
            return Err(EngineError::CyclicReference(cycle).into());
        }
        Ok(staged)
    }

    fn check_function(
        &self,
        schema_index: usize,
        inputs: FieldMap,
        outputs: &Destinations,
    ) -> Result<FunctionBinding> {
        let entry = self.registry.function(schema_index)?;
        let schema = entry.schema();
        schema.check_values(&inputs)?;
        if let Some(extra) = outputs.keys().find(|name| schema.output_spec(name).is_none()) {
            return Err(SguiError::UndeclaredOutput(extra.clone()));
        }
        Resolver::new(&self.registry, &self.objects).check_references(schema, &inputs)?;

        // every destination must be writable, alone and together
        let mut staged = self.objects.clone();
        let mut binding = FunctionBinding::new(schema_index, inputs);
        for (output, spec) in schema.outputs() {
            let destination = outputs.get(output).cloned().flatten();
            if let (OutputSpec::Object(_), Some(destination)) = (spec, &destination) {
                staged
                    .set(destination, Node::Leaf(ObjectBinding::string(FieldValue::blank())))
                    .map_err(|source| SguiError::InvalidDestination {
                        output: output.to_string(),
                        destination: destination.clone(),
                        source,
                    })?;
            }
            binding = binding.with_output(output, destination);
        }
        debug!(type_name = entry.type_name(), "function form accepted");
        Ok(binding)
    }

    fn touch_if_written(&mut self, outcome: &std::result::Result<BatchReport, Box<BatchAborted>>) {
        let report = match outcome {
            Ok(report) => report,
            Err(aborted) => &aborted.report,
        };
        if report.entries().iter().any(|e| !e.written.is_empty()) {
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.modified = true;
    }
}

fn reject(host: &dyn Host, err: SguiError) -> SguiError {
    warn!(error = %err, "form rejected");
    host.notify(INVALID_INPUT_TITLE, &err.to_string());
    err
}
