//! Resolved input values handed to plugins

use crate::object::RuntimeObject;
use crate::plugin::PluginError;
use indexmap::IndexMap;

/// Input value after references have been followed
#[derive(Debug)]
pub enum ResolvedValue {
    /// Literal text, or the text of a referenced string object
    Text(String),
    /// Freshly materialized object
    Object(Box<dyn RuntimeObject>),
    /// Values of a repeatable input
    List(Vec<ResolvedValue>),
}

impl ResolvedValue {
    /// Borrow as text
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as object
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&dyn RuntimeObject> {
        match self {
            Self::Object(obj) => Some(&**obj),
            _ => None,
        }
    }

    /// Borrow as list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

/// Resolved inputs keyed by field name, in declaration order
#[derive(Debug, Default)]
pub struct ResolvedInputs {
    values: IndexMap<String, ResolvedValue>,
}

impl ResolvedInputs {
    /// Empty set of inputs
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    pub fn insert(&mut self, name: impl Into<String>, value: ResolvedValue) {
        self.values.insert(name.into(), value);
    }

    /// Get value by field name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedValue> {
        self.values.get(name)
    }

    /// Text value of a field
    ///
    /// # Errors
    /// Returns error if the field is absent or not text
    pub fn text(&self, name: &str) -> Result<&str, PluginError> {
        self.get(name)
            .and_then(ResolvedValue::as_text)
            .ok_or_else(|| PluginError::new(format!("input '{name}' is not text")))
    }

    /// Text value of a field parsed as a number
    ///
    /// # Errors
    /// Returns error if the field is absent or not numeric
    pub fn number(&self, name: &str) -> Result<f64, PluginError> {
        let text = self.text(name)?;
        text.trim()
            .parse()
            .map_err(|_| PluginError::new(format!("input '{name}' is not a number: '{text}'")))
    }

    /// Object value of a field
    ///
    /// # Errors
    /// Returns error if the field is absent or not an object
    pub fn object(&self, name: &str) -> Result<&dyn RuntimeObject, PluginError> {
        self.get(name)
            .and_then(ResolvedValue::as_object)
            .ok_or_else(|| PluginError::new(format!("input '{name}' is not an object")))
    }

    /// List value of a field
    ///
    /// # Errors
    /// Returns error if the field is absent or not a list
    pub fn list(&self, name: &str) -> Result<&[ResolvedValue], PluginError> {
        self.get(name)
            .and_then(ResolvedValue::as_list)
            .ok_or_else(|| PluginError::new(format!("input '{name}' is not a list")))
    }

    /// Number of inputs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no inputs
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Inputs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}
