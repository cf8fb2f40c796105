//! Runtime objects produced by object types
//!
//! A runtime object is what an object binding materializes into. Bindings
//! are re-materialized on every use, so objects are never cached.

use std::any::Any;
use std::fmt::Debug;

/// Stable id of the built-in string type
pub const STRING_TYPE: &str = "String";

/// Schema index reserved for the built-in string type
pub const STRING_INDEX: usize = 0;

/// Materialized object handed to plugins
pub trait RuntimeObject: Debug + Any {
    /// Stable id of the type that constructed this object
    fn type_name(&self) -> &str;

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

impl<'a> dyn RuntimeObject + 'a {
    /// Downcast to a concrete object type
    #[must_use]
    pub fn downcast_ref<T: RuntimeObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Text of a [`StringObject`], if this is one
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.downcast_ref::<StringObject>().map(StringObject::value)
    }
}

/// Built-in string object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringObject {
    value: String,
}

impl StringObject {
    /// Wrap a string
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Wrapped string
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl RuntimeObject for StringObject {
    fn type_name(&self) -> &str {
        STRING_TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Other;

    impl RuntimeObject for Other {
        fn type_name(&self) -> &str {
            "Other"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn string_object_downcasts() {
        let obj: Box<dyn RuntimeObject> = Box::new(StringObject::new("5"));
        assert_eq!(obj.type_name(), STRING_TYPE);
        assert_eq!(obj.as_text(), Some("5"));
    }

    #[test]
    fn other_object_is_not_text() {
        let obj: Box<dyn RuntimeObject> = Box::new(Other);
        assert!(obj.as_text().is_none());
        assert!(obj.downcast_ref::<Other>().is_some());
    }
}
