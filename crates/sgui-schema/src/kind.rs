//! Input kinds and output specs

use crate::error::SchemaError;
use crate::value::FieldMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Prefix of the textual dropdown form
const DROPDOWN_PREFIX: &str = "dropdown";

/// Separator between dropdown options in the textual form
const OPTION_SEPARATOR: char = '_';

/// Non-repeatable input kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseKind {
    /// Free text; may also reference a String object
    Raw,
    /// Reference to another object
    Object,
    /// Filesystem path chosen by the user
    File,
    /// One of a fixed set of options
    Dropdown(Vec<String>),
    /// Greyed out; always empty
    Disabled,
}

impl BaseKind {
    /// Dropdown from options
    #[must_use]
    pub fn dropdown<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Dropdown(options.into_iter().map(Into::into).collect())
    }

    /// Check if values of this kind are resolved through the namespace
    #[inline]
    #[must_use]
    pub fn accepts_path(&self) -> bool {
        matches!(self, Self::Raw | Self::Object)
    }
}

impl Display for BaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw => f.write_str("raw"),
            Self::Object => f.write_str("object"),
            Self::File => f.write_str("file"),
            Self::Disabled => f.write_str("disabled"),
            Self::Dropdown(options) => {
                f.write_str(DROPDOWN_PREFIX)?;
                for option in options {
                    write!(f, "{OPTION_SEPARATOR}{option}")?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for BaseKind {
    type Err = SchemaError;

    /// Parse `raw`, `object`, `file`, `disabled` or `dropdown_a_b_c`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "raw" => Ok(Self::Raw),
            "object" => Ok(Self::Object),
            "file" => Ok(Self::File),
            "disabled" => Ok(Self::Disabled),
            _ => s
                .strip_prefix(DROPDOWN_PREFIX)
                .and_then(|rest| rest.strip_prefix(OPTION_SEPARATOR))
                .filter(|rest| !rest.is_empty())
                .map(|rest| Self::dropdown(rest.split(OPTION_SEPARATOR)))
                .ok_or_else(|| SchemaError::UnknownKind(s.to_string())),
        }
    }
}

type KindSelector = dyn Fn(&FieldMap) -> Option<BaseKind> + Send + Sync;

/// Input whose kind is computed from the values of earlier inputs
///
/// The selector returns `None` when no rule applies, in which case the
/// fallback kind (`Disabled` unless overridden) is used.
#[derive(Clone)]
pub struct DynamicKind {
    name: String,
    depends_on: Vec<String>,
    fallback: BaseKind,
    select: Arc<KindSelector>,
}

impl DynamicKind {
    /// Create with a selector
    pub fn new<F>(name: impl Into<String>, select: F) -> Self
    where
        F: Fn(&FieldMap) -> Option<BaseKind> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            depends_on: Vec::new(),
            fallback: BaseKind::Disabled,
            select: Arc::new(select),
        }
    }

    /// Declare a field the selector reads
    #[must_use]
    pub fn depends_on(mut self, field: impl Into<String>) -> Self {
        self.depends_on.push(field.into());
        self
    }

    /// Kind used when the selector has no answer
    #[must_use]
    pub fn with_fallback(mut self, fallback: BaseKind) -> Self {
        self.fallback = fallback;
        self
    }

    /// Selector name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields the selector reads
    #[inline]
    #[must_use]
    pub fn dependencies(&self) -> &[String] {
        &self.depends_on
    }

    /// Fallback kind
    #[inline]
    #[must_use]
    pub fn fallback(&self) -> &BaseKind {
        &self.fallback
    }

    /// Evaluate against the current, unresolved values
    #[must_use]
    pub fn evaluate(&self, values: &FieldMap) -> BaseKind {
        (self.select)(values).unwrap_or_else(|| self.fallback.clone())
    }
}

impl Debug for DynamicKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicKind")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

/// Selectors are compared by name
impl PartialEq for DynamicKind {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.depends_on == other.depends_on && self.fallback == other.fallback
    }
}

/// Declared kind of an input field
#[derive(Debug, Clone, PartialEq)]
pub enum InputKind {
    /// Single value
    Base(BaseKind),
    /// Repeatable single-kind value
    List(BaseKind),
    /// Kind computed from earlier inputs
    Dynamic(DynamicKind),
}

impl InputKind {
    /// Repeatable input of `kind`
    #[inline]
    #[must_use]
    pub fn list(kind: BaseKind) -> Self {
        Self::List(kind)
    }

    /// Kind for the given values, with dynamic kinds evaluated
    #[must_use]
    pub fn effective(&self, values: &FieldMap) -> EffectiveKind {
        match self {
            Self::Base(kind) => EffectiveKind::Single(kind.clone()),
            Self::List(kind) => EffectiveKind::List(kind.clone()),
            Self::Dynamic(dynamic) => EffectiveKind::Single(dynamic.evaluate(values)),
        }
    }
}

impl From<BaseKind> for InputKind {
    fn from(kind: BaseKind) -> Self {
        Self::Base(kind)
    }
}

impl From<DynamicKind> for InputKind {
    fn from(kind: DynamicKind) -> Self {
        Self::Dynamic(kind)
    }
}

impl Display for InputKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(kind) => write!(f, "{kind}"),
            Self::List(kind) => write!(f, "[{kind}]"),
            Self::Dynamic(dynamic) => write!(f, "dynamic({})", dynamic.name()),
        }
    }
}

/// Input kind after dynamic evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveKind {
    /// Single value
    Single(BaseKind),
    /// Repeatable value
    List(BaseKind),
}

impl EffectiveKind {
    /// Kind of each individual value
    #[inline]
    #[must_use]
    pub fn base(&self) -> &BaseKind {
        match self {
            Self::Single(kind) | Self::List(kind) => kind,
        }
    }
}

/// Declared result of a function output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSpec {
    /// Produces an object of the named type
    Object(String),
    /// Informational only; nothing is stored
    File,
}

impl OutputSpec {
    /// Object output of the named type
    #[inline]
    #[must_use]
    pub fn object(type_name: impl Into<String>) -> Self {
        Self::Object(type_name.into())
    }
}

impl Display for OutputSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object(name) => f.write_str(name),
            Self::File => f.write_str("file"),
        }
    }
}
