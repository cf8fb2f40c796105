//! Plugin registry
//!
//! Provides [`Registry`], the lookup table of object and function types.
//! Bindings refer to types by schema index; the registry also maps stable
//! type names to indices so produced outputs can find their type.

use crate::error::{EngineError, PluginKind};
use crate::plugin::{FunctionType, ObjectType, StringType};
use sgui_schema::SchemaDescriptor;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Registered object type with its validated descriptor
#[derive(Clone)]
pub struct RegisteredObject {
    plugin: Arc<dyn ObjectType>,
    schema: SchemaDescriptor,
}

impl RegisteredObject {
    /// Stable type id
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.plugin.type_name()
    }

    /// Descriptor captured at registration
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Plugin implementation
    #[inline]
    #[must_use]
    pub fn plugin(&self) -> &dyn ObjectType {
        self.plugin.as_ref()
    }
}

/// Registered function type with its validated descriptor
#[derive(Clone)]
pub struct RegisteredFunction {
    plugin: Arc<dyn FunctionType>,
    schema: SchemaDescriptor,
}

impl RegisteredFunction {
    /// Stable type id
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.plugin.type_name()
    }

    /// Descriptor captured at registration
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    /// Plugin implementation
    #[inline]
    #[must_use]
    pub fn plugin(&self) -> &dyn FunctionType {
        self.plugin.as_ref()
    }
}

/// Lookup table of plugin types
///
/// Object index 0 is always the built-in [`StringType`]. Lists are supplied
/// at startup and never persisted, so saved documents depend on
/// registration order.
#[derive(Clone)]
pub struct Registry {
    objects: Vec<RegisteredObject>,
    functions: Vec<RegisteredFunction>,
    object_names: HashMap<String, usize>,
    function_names: HashMap<String, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create registry holding only the built-in string type
    #[must_use]
    pub fn new() -> Self {
        let string = RegisteredObject {
            plugin: Arc::new(StringType),
            schema: StringType.schema(),
        };
        let mut object_names = HashMap::new();
        object_names.insert(string.type_name().to_string(), 0);
        Self {
            objects: vec![string],
            functions: Vec::new(),
            object_names,
            function_names: HashMap::new(),
        }
    }

    /// Register an object type, returning its schema index
    ///
    /// # Errors
    /// - [`EngineError::InvalidSchema`] if the descriptor is malformed
    /// - [`EngineError::DuplicateType`] if the name is taken
    pub fn register_object(&mut self, plugin: impl ObjectType + 'static) -> Result<usize, EngineError> {
        let name = plugin.type_name().to_string();
        if self.object_names.contains_key(&name) {
            return Err(EngineError::DuplicateType {
                kind: PluginKind::Object,
                name,
            });
        }
        let schema = validated(&name, plugin.schema())?;
        let index = self.objects.len();
        self.objects.push(RegisteredObject {
            plugin: Arc::new(plugin),
            schema,
        });
        debug!(type_name = %name, index, "registered object type");
        self.object_names.insert(name, index);
        Ok(index)
    }

    /// Register a function type, returning its schema index
    ///
    /// # Errors
    /// Same as [`Registry::register_object`]
    pub fn register_function(&mut self, plugin: impl FunctionType + 'static) -> Result<usize, EngineError> {
        let name = plugin.type_name().to_string();
        if self.function_names.contains_key(&name) {
            return Err(EngineError::DuplicateType {
                kind: PluginKind::Function,
                name,
            });
        }
        let schema = validated(&name, plugin.schema())?;
        let index = self.functions.len();
        self.functions.push(RegisteredFunction {
            plugin: Arc::new(plugin),
            schema,
        });
        debug!(type_name = %name, index, "registered function type");
        self.function_names.insert(name, index);
        Ok(index)
    }

    /// Builder form of [`Registry::register_object`]
    ///
    /// # Errors
    /// Same as [`Registry::register_object`]
    pub fn with_object(mut self, plugin: impl ObjectType + 'static) -> Result<Self, EngineError> {
        self.register_object(plugin)?;
        Ok(self)
    }

    /// Builder form of [`Registry::register_function`]
    ///
    /// # Errors
    /// Same as [`Registry::register_function`]
    pub fn with_function(mut self, plugin: impl FunctionType + 'static) -> Result<Self, EngineError> {
        self.register_function(plugin)?;
        Ok(self)
    }

    /// Object type by schema index
    ///
    /// # Errors
    /// [`EngineError::SchemaIndexOutOfRange`] if not registered
    pub fn object(&self, index: usize) -> Result<&RegisteredObject, EngineError> {
        self.objects
            .get(index)
            .ok_or(EngineError::SchemaIndexOutOfRange {
                kind: PluginKind::Object,
                index,
                count: self.objects.len(),
            })
    }

    /// Function type by schema index
    ///
    /// # Errors
    /// [`EngineError::SchemaIndexOutOfRange`] if not registered
    pub fn function(&self, index: usize) -> Result<&RegisteredFunction, EngineError> {
        self.functions
            .get(index)
            .ok_or(EngineError::SchemaIndexOutOfRange {
                kind: PluginKind::Function,
                index,
                count: self.functions.len(),
            })
    }

    /// Schema index of an object type
    #[inline]
    #[must_use]
    pub fn object_index(&self, type_name: &str) -> Option<usize> {
        self.object_names.get(type_name).copied()
    }

    /// Schema index of a function type
    #[inline]
    #[must_use]
    pub fn function_index(&self, type_name: &str) -> Option<usize> {
        self.function_names.get(type_name).copied()
    }

    /// Check an index against one of the lists
    ///
    /// # Errors
    /// [`EngineError::SchemaIndexOutOfRange`] if not registered
    pub fn check_index(&self, kind: PluginKind, index: usize) -> Result<(), EngineError> {
        match kind {
            PluginKind::Object => self.object(index).map(|_| ()),
            PluginKind::Function => self.function(index).map(|_| ()),
        }
    }

    /// Object types in index order
    pub fn object_types(&self) -> impl Iterator<Item = &RegisteredObject> {
        self.objects.iter()
    }

    /// Function types in index order
    pub fn function_types(&self) -> impl Iterator<Item = &RegisteredFunction> {
        self.functions.iter()
    }

    /// Number of object types, the built-in string included
    #[inline]
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Number of function types
    #[inline]
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("objects", &self.objects.iter().map(RegisteredObject::type_name).collect::<Vec<_>>())
            .field(
                "functions",
                &self.functions.iter().map(RegisteredFunction::type_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn validated(type_name: &str, schema: SchemaDescriptor) -> Result<SchemaDescriptor, EngineError> {
    schema.validate().map_err(|source| EngineError::InvalidSchema {
        type_name: type_name.to_string(),
        source,
    })?;
    Ok(schema)
}
