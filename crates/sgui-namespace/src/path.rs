//! Node paths for addressing entities in a namespace
//!
//! Provides [`NodePath`] for hierarchical addressing of folders and bindings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path separator between segments
pub const SEPARATOR: char = '\\';

/// Path within a namespace tree
///
/// Rendered with a leading separator before every segment.
///
/// # Examples
/// - `["Inputs", "X"]` → `\Inputs\X`
/// - `[]` (root) → `\`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// Create path from segments, validating each one
    ///
    /// # Errors
    /// Returns error if any segment is not a valid entity name
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments = segments
            .into_iter()
            .map(|seg| {
                let seg = seg.into();
                validate_name(&seg).map(|()| seg)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(segments))
    }

    /// Single-segment path
    ///
    /// # Errors
    /// Returns error if `name` is not a valid entity name
    pub fn single(name: impl Into<String>) -> Result<Self, PathError> {
        Self::new([name.into()])
    }

    /// Empty path (root)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a rendered path such as `\Inputs\X`
    ///
    /// # Errors
    /// See [`PathError`]
    #[inline]
    pub fn parse(s: &str) -> Result<Self, PathError> {
        s.parse()
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is the root
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Alias of [`NodePath::is_root`]
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_root()
    }

    /// Parent path (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Leaf name (if not root)
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new path
    ///
    /// # Errors
    /// Returns error if `segment` is not a valid entity name
    pub fn child(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let segment = segment.into();
        validate_name(&segment)?;
        let mut new = self.clone();
        new.0.push(segment);
        Ok(new)
    }

    /// Same parent, different leaf name
    ///
    /// # Errors
    /// Returns error for the root path or an invalid name
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self, PathError> {
        let parent = self.parent().ok_or(PathError::RootHasNoName)?;
        parent.child(name)
    }

    /// Check if this path is a prefix of another (or equal)
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Check if this path is a strict ancestor of another
    #[inline]
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Relative segments from an ancestor
    ///
    /// # Errors
    /// Returns error if `self` is not under `ancestor`
    pub fn relative_to(&self, ancestor: &Self) -> Result<&[String], PathError> {
        if !ancestor.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                ancestor: ancestor.to_string(),
            });
        }
        Ok(&self.0[ancestor.0.len()..])
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Validate a single entity name
///
/// # Errors
/// - [`PathError::EmptySegment`] for `""`
/// - [`PathError::ContainsSeparator`] if the name contains the separator
pub fn validate_name(name: &str) -> Result<(), PathError> {
    if name.is_empty() {
        Err(PathError::EmptySegment)
    } else if name.contains(SEPARATOR) {
        Err(PathError::ContainsSeparator(name.to_string()))
    } else {
        Ok(())
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{SEPARATOR}");
        }
        for seg in &self.0 {
            write!(f, "{SEPARATOR}{seg}")?;
        }
        Ok(())
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || (s.len() == SEPARATOR.len_utf8() && s.starts_with(SEPARATOR)) {
            return Ok(Self::root());
        }

        let rest = s
            .strip_prefix(SEPARATOR)
            .ok_or_else(|| PathError::MissingLeadingSeparator(s.to_string()))?;

        let segments = rest
            .split(SEPARATOR)
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment)
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl Serialize for NodePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to node paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Rendered path did not start with the separator
    #[error("path '{0}' must start with '\\'")]
    MissingLeadingSeparator(String),

    /// Entity name contains the separator
    #[error("name '{0}' cannot contain '\\'")]
    ContainsSeparator(String),

    /// Root was asked for a name
    #[error("the root path has no name")]
    RootHasNoName,

    /// Not a descendant path
    #[error("path '{path}' is not a descendant of '{ancestor}'")]
    NotDescendant { path: String, ancestor: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    #[test]
    fn serde_uses_rendered_form() {
        let path = p("\\Inputs\\X");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#""\\Inputs\\X""#);
        assert_eq!(serde_json::from_str::<NodePath>(&json).unwrap(), path);
        assert!(serde_json::from_str::<NodePath>(r#""Inputs""#).is_err());
    }

    #[test]
    fn path_new_and_segments() {
        let path = NodePath::new(["a", "b"]).unwrap();
        assert_eq!(path.segments(), &["a", "b"]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn path_new_rejects_separator_in_name() {
        let result = NodePath::new(["a\\b"]);
        assert!(matches!(result, Err(PathError::ContainsSeparator(_))));
    }

    #[test]
    fn path_root_display_and_parse() {
        assert_eq!(NodePath::root().to_string(), "\\");
        assert!(p("").is_root());
        assert!(p("\\").is_root());
    }

    #[test]
    fn path_display_has_leading_separator() {
        let path = NodePath::new(["Inputs", "X"]).unwrap();
        assert_eq!(path.to_string(), "\\Inputs\\X");
    }

    #[test]
    fn path_parse_round_trips_display() {
        let path = p("\\First Folder\\Second Folder\\Object");
        assert_eq!(path.len(), 3);
        assert_eq!(path.to_string(), "\\First Folder\\Second Folder\\Object");
    }

    #[test]
    fn path_parse_requires_leading_separator() {
        let result: Result<NodePath, _> = "Inputs\\X".parse();
        assert!(matches!(result, Err(PathError::MissingLeadingSeparator(_))));
    }

    #[test]
    fn path_parse_rejects_empty_segment() {
        let result: Result<NodePath, _> = "\\a\\\\b".parse();
        assert_eq!(result, Err(PathError::EmptySegment));

        let trailing: Result<NodePath, _> = "\\a\\".parse();
        assert_eq!(trailing, Err(PathError::EmptySegment));
    }

    #[test]
    fn path_parent_and_name() {
        let path = p("\\a\\b\\c");
        assert_eq!(path.parent().unwrap(), p("\\a\\b"));
        assert_eq!(path.name(), Some("c"));
        assert!(NodePath::root().parent().is_none());
        assert!(NodePath::root().name().is_none());
    }

    #[test]
    fn path_child_validates() {
        let parent = p("\\a");
        assert_eq!(parent.child("b").unwrap(), p("\\a\\b"));
        assert!(parent.child("").is_err());
        assert!(parent.child("x\\y").is_err());
    }

    #[test]
    fn path_with_name() {
        assert_eq!(p("\\a\\b").with_name("c").unwrap(), p("\\a\\c"));
        assert_eq!(NodePath::root().with_name("c"), Err(PathError::RootHasNoName));
    }

    #[test]
    fn path_prefix_and_ancestor() {
        let a = p("\\a");
        let ab = p("\\a\\b");
        assert!(a.is_prefix_of(&ab));
        assert!(a.is_ancestor_of(&ab));
        assert!(a.is_prefix_of(&a));
        assert!(!a.is_ancestor_of(&a));
        assert!(!ab.is_prefix_of(&a));
        assert!(NodePath::root().is_ancestor_of(&a));
    }

    #[test]
    fn path_relative_to() {
        let full = p("\\a\\b\\c");
        assert_eq!(full.relative_to(&p("\\a")).unwrap(), &["b", "c"]);
        assert!(matches!(
            full.relative_to(&p("\\x")),
            Err(PathError::NotDescendant { .. })
        ));
    }
}
