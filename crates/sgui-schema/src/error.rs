//! Schema error types

use thiserror::Error;

/// Errors raised while validating descriptors or checking field values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Unrecognised kind string
    #[error("unknown input kind: {0}")]
    UnknownKind(String),

    /// Field or output name is empty or contains the separator
    #[error("invalid field name '{0}'")]
    InvalidFieldName(String),

    /// Field or output declared twice
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),

    /// Dropdown without options
    #[error("dropdown field '{0}' has no options")]
    EmptyDropdown(String),

    /// Dropdown option listed twice
    #[error("dropdown field '{field}' lists option '{option}' twice")]
    DuplicateOption { field: String, option: String },

    /// Dynamic kind reads a field that is not declared before it
    #[error("dynamic field '{field}' depends on '{dependency}', which is not declared before it")]
    DynamicDependency { field: String, dependency: String },

    /// Output declared with an empty type name
    #[error("output '{0}' has no type name")]
    InvalidOutputType(String),

    /// Tip given for an undeclared field
    #[error("tip given for undeclared field '{0}'")]
    UnknownTip(String),

    /// Declared field has no value
    #[error("missing value for '{0}'")]
    MissingValue(String),

    /// Value given for an undeclared field
    #[error("'{0}' is not an input of this type")]
    UnexpectedField(String),

    /// Repeatable field given a single value
    #[error("'{0}' expects a list of values")]
    ExpectedList(String),

    /// Single-valued field given a list
    #[error("'{0}' does not accept a list")]
    UnexpectedList(String),

    /// Object field given a literal
    #[error("'{0}' must reference an object by path")]
    ExpectedPath(String),

    /// Literal-only field given a path
    #[error("'{0}' does not accept an object reference")]
    UnexpectedPath(String),

    /// Dropdown value outside its options
    #[error("'{value}' is not an option of '{field}'")]
    InvalidOption { field: String, value: String },

    /// Disabled field carries data
    #[error("'{0}' is disabled and must be empty")]
    DisabledNotEmpty(String),
}
