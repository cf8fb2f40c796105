//! Field values stored in bindings
//!
//! A value is either a literal, a reference to another entity by path, or an
//! ordered list of values for repeatable inputs. References are distinguished
//! at the type level, so a literal that happens to contain the path separator
//! is still a literal.

use indexmap::IndexMap;
use sgui_namespace::NodePath;
use std::fmt::{self, Display, Formatter};

/// Insertion-ordered mapping from field name to value
pub type FieldMap = IndexMap<String, FieldValue>;

/// Literal scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Free text
    Text(String),
    /// Numeric value
    Number(f64),
}

impl Literal {
    /// Check for the empty string
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Parse as a number, accepting numeric text
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            // Integral values print without a fractional part
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Value of one input field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Literal, passed through as-is
    Literal(Literal),
    /// Reference into the objects namespace
    Path(NodePath),
    /// Values of a repeatable input
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Text literal
    #[inline]
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Literal(Literal::Text(s.into()))
    }

    /// Numeric literal
    #[inline]
    #[must_use]
    pub fn number(n: f64) -> Self {
        Self::Literal(Literal::Number(n))
    }

    /// Empty text literal
    #[inline]
    #[must_use]
    pub fn blank() -> Self {
        Self::text("")
    }

    /// Path reference
    #[inline]
    #[must_use]
    pub fn path(path: NodePath) -> Self {
        Self::Path(path)
    }

    /// List of values
    #[inline]
    #[must_use]
    pub fn list(values: impl IntoIterator<Item = FieldValue>) -> Self {
        Self::List(values.into_iter().collect())
    }

    /// Check for the empty text literal
    #[inline]
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Literal(l) if l.is_blank())
    }

    /// Borrow as literal
    #[inline]
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// Borrow as path
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> Option<&NodePath> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Borrow as list
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Every path referenced by this value, in order
    #[must_use]
    pub fn paths(&self) -> Vec<&NodePath> {
        match self {
            Self::Literal(_) => Vec::new(),
            Self::Path(p) => vec![p],
            Self::List(items) => items.iter().flat_map(Self::paths).collect(),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(l) => l.fmt(f),
            Self::Path(p) => p.fmt(f),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt(f)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::number(n)
    }
}

impl From<NodePath> for FieldValue {
    fn from(p: NodePath) -> Self {
        Self::Path(p)
    }
}

impl From<Literal> for FieldValue {
    fn from(l: Literal) -> Self {
        Self::Literal(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_display_drops_integral_fraction() {
        assert_eq!(Literal::Number(12.0).to_string(), "12");
        assert_eq!(Literal::Number(-3.0).to_string(), "-3");
        assert_eq!(Literal::Number(2.5).to_string(), "2.5");
    }

    #[test]
    fn literal_with_separator_stays_literal() {
        let value = FieldValue::from("C:\\data\\file.txt");
        assert!(value.as_path().is_none());
        assert!(value.paths().is_empty());
    }

    #[test]
    fn numeric_text_parses() {
        assert_eq!(Literal::Text(" 5 ".into()).as_number(), Some(5.0));
        assert_eq!(Literal::Text("five".into()).as_number(), None);
    }

    #[test]
    fn list_paths_in_order() {
        let a: NodePath = "\\A".parse().unwrap();
        let b: NodePath = "\\B".parse().unwrap();
        let value = FieldValue::list([a.clone().into(), "x".into(), b.clone().into()]);
        assert_eq!(value.paths(), vec![&a, &b]);
        assert_eq!(value.to_string(), "[\\A, x, \\B]");
    }

    #[test]
    fn blank_detection() {
        assert!(FieldValue::blank().is_blank());
        assert!(!FieldValue::number(0.0).is_blank());
    }
}
