//! Foldered namespace tree
//!
//! Provides [`Namespace`] for path-addressed storage of leaf entities under
//! insertion-ordered folders.

use crate::error::NamespaceError;
use crate::path::{validate_name, NodePath};
use indexmap::IndexMap;

/// A node in the namespace tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node<B> {
    /// Sub-namespace
    Folder(Folder<B>),
    /// Bound entity
    Leaf(B),
}

impl<B> Node<B> {
    /// Check if node is a folder
    #[inline]
    #[must_use]
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// Borrow leaf value
    #[inline]
    #[must_use]
    pub fn as_leaf(&self) -> Option<&B> {
        match self {
            Self::Leaf(b) => Some(b),
            Self::Folder(_) => None,
        }
    }

    /// Borrow folder
    #[inline]
    #[must_use]
    pub fn as_folder(&self) -> Option<&Folder<B>> {
        match self {
            Self::Folder(f) => Some(f),
            Self::Leaf(_) => None,
        }
    }

    /// Take leaf value
    #[inline]
    #[must_use]
    pub fn into_leaf(self) -> Option<B> {
        match self {
            Self::Leaf(b) => Some(b),
            Self::Folder(_) => None,
        }
    }
}

/// Insertion-ordered mapping of unique child names to nodes
///
/// Equality is order-sensitive: two folders with the same children in a
/// different order are not equal.
#[derive(Debug, Clone)]
pub struct Folder<B> {
    children: IndexMap<String, Node<B>>,
}

impl<B: PartialEq> PartialEq for Folder<B> {
    fn eq(&self, other: &Self) -> bool {
        self.children.len() == other.children.len() && self.children.iter().eq(other.children.iter())
    }
}

impl<B> Default for Folder<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Folder<B> {
    /// Create empty folder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: IndexMap::new(),
        }
    }

    /// Insert a child, replacing any existing child of the same name
    ///
    /// # Errors
    /// Returns error if `name` is not a valid entity name
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        node: Node<B>,
    ) -> Result<Option<Node<B>>, NamespaceError> {
        let name = name.into();
        validate_name(&name)?;
        Ok(self.children.insert(name, node))
    }

    /// Builder form of [`Folder::insert`]
    ///
    /// # Errors
    /// Returns error if `name` is not a valid entity name
    pub fn with_child(mut self, name: impl Into<String>, node: Node<B>) -> Result<Self, NamespaceError> {
        self.insert(name, node)?;
        Ok(self)
    }

    /// Get child by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node<B>> {
        self.children.get(name)
    }

    /// Check for a child by name
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    /// Number of direct children
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Check if folder has no children
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Children in order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node<B>)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Child names in order
    #[inline]
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    fn leaf_count(&self) -> usize {
        self.children
            .values()
            .map(|node| match node {
                Node::Leaf(_) => 1,
                Node::Folder(f) => f.leaf_count(),
            })
            .sum()
    }

    /// First nested path where `incoming` would put a leaf over an existing folder
    fn merge_conflict(&self, incoming: &Self, at: &NodePath) -> Option<NodePath> {
        for (name, node) in &incoming.children {
            let here = NodePath::new(at.iter().chain([name.as_str()])).ok()?;
            match (self.children.get(name), node) {
                (Some(Node::Folder(existing)), Node::Folder(sub)) => {
                    if let Some(conflict) = existing.merge_conflict(sub, &here) {
                        return Some(conflict);
                    }
                }
                (Some(Node::Folder(_)), Node::Leaf(_)) => return Some(here),
                _ => {}
            }
        }
        None
    }

    /// Merge `incoming` children into `self`; caller has ruled out conflicts
    fn merge(&mut self, incoming: Self) {
        for (name, node) in incoming.children {
            if let Node::Folder(sub) = node {
                if let Some(Node::Folder(existing)) = self.children.get_mut(&name) {
                    existing.merge(sub);
                    continue;
                }
                self.children.insert(name, Node::Folder(sub));
            } else {
                self.children.insert(name, node);
            }
        }
    }
}

/// Kind of entry reported by [`Namespace::entries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A folder
    Folder,
    /// A bound entity
    Leaf,
}

/// Hierarchical mapping from [`NodePath`]s to folders or leaves
///
/// The root is always a folder. Sibling names are unique and insertion
/// ordered. Every read that enumerates returns an owned snapshot, so callers
/// never hold a cursor across a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Namespace<B> {
    root: Folder<B>,
    max_depth: Option<usize>,
}

impl<B> Default for Namespace<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> Namespace<B> {
    /// Create empty namespace with unbounded depth
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Folder::new(),
            max_depth: None,
        }
    }

    /// Create empty namespace holding leaves one segment deep, no folders
    #[inline]
    #[must_use]
    pub fn flat() -> Self {
        Self {
            root: Folder::new(),
            max_depth: Some(1),
        }
    }

    /// Check if this namespace only accepts single-segment leaves
    #[inline]
    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.max_depth == Some(1)
    }

    /// Replace the whole tree, keeping this namespace's depth limit
    ///
    /// # Errors
    /// Returns [`NamespaceError::TooDeep`] if `root` violates the limit
    pub fn with_root(mut self, root: Folder<B>) -> Result<Self, NamespaceError> {
        self.check_children_fit(&NodePath::root(), &root)?;
        self.root = root;
        Ok(self)
    }

    /// Root folder
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Folder<B> {
        &self.root
    }

    /// Number of leaves in the whole tree
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.leaf_count()
    }

    /// Check if tree has no nodes at all
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Drop every node
    pub fn clear(&mut self) {
        self.root = Folder::new();
    }

    /// Resolve a folder (the root included)
    ///
    /// # Errors
    /// [`NamespaceError::PathNotFound`] if any segment is missing or is a leaf
    pub fn folder(&self, path: &NodePath) -> Result<&Folder<B>, NamespaceError> {
        let mut current = &self.root;
        for seg in path.segments() {
            current = match current.children.get(seg) {
                Some(Node::Folder(f)) => f,
                _ => return Err(NamespaceError::PathNotFound(path.clone())),
            };
        }
        Ok(current)
    }

    fn folder_mut(&mut self, path: &NodePath) -> Result<&mut Folder<B>, NamespaceError> {
        let mut current = &mut self.root;
        for seg in path.segments() {
            current = match current.children.get_mut(seg) {
                Some(Node::Folder(f)) => f,
                _ => return Err(NamespaceError::PathNotFound(path.clone())),
            };
        }
        Ok(current)
    }

    /// Resolve the node at `path`
    ///
    /// # Errors
    /// - [`NamespaceError::RootPath`] for the root
    /// - [`NamespaceError::PathNotFound`] if any segment is missing
    pub fn get(&self, path: &NodePath) -> Result<&Node<B>, NamespaceError> {
        let (parent, name) = split(path)?;
        self.folder(&parent)
            .ok()
            .and_then(|folder| folder.children.get(name))
            .ok_or_else(|| NamespaceError::PathNotFound(path.clone()))
    }

    /// Mutable access to the node at `path`
    ///
    /// # Errors
    /// Same as [`Namespace::get`]
    pub fn get_mut(&mut self, path: &NodePath) -> Result<&mut Node<B>, NamespaceError> {
        let (parent, name) = split(path)?;
        self.folder_mut(&parent)
            .ok()
            .and_then(|folder| folder.children.get_mut(name))
            .ok_or_else(|| NamespaceError::PathNotFound(path.clone()))
    }

    /// Resolve the leaf at `path`
    ///
    /// # Errors
    /// [`NamespaceError::NotABinding`] if `path` names a folder
    pub fn binding(&self, path: &NodePath) -> Result<&B, NamespaceError> {
        self.get(path)?
            .as_leaf()
            .ok_or_else(|| NamespaceError::NotABinding(path.clone()))
    }

    /// Mutable access to the leaf at `path`
    ///
    /// # Errors
    /// Same as [`Namespace::binding`]
    pub fn binding_mut(&mut self, path: &NodePath) -> Result<&mut B, NamespaceError> {
        match self.get_mut(path)? {
            Node::Leaf(b) => Ok(b),
            Node::Folder(_) => Err(NamespaceError::NotABinding(path.clone())),
        }
    }

    /// Check if anything exists at `path`
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &NodePath) -> bool {
        path.is_root() || self.get(path).is_ok()
    }

    /// Check if `path` names a folder (the root is one)
    #[inline]
    #[must_use]
    pub fn is_folder(&self, path: &NodePath) -> bool {
        self.folder(path).is_ok()
    }

    /// Store `node` at `path`, creating intermediate folders
    ///
    /// A folder set over an existing folder is merged into it so children
    /// absent from the replacement survive. Setting at the root replaces the
    /// entire top-level mapping. Returns the displaced node, if any.
    ///
    /// # Errors
    /// - [`NamespaceError::InvalidIntermediatePath`] if a prefix is a leaf
    /// - [`NamespaceError::FolderOccupied`] if a leaf would replace a folder
    /// - [`NamespaceError::RootMustBeFolder`] for a leaf at the root
    /// - [`NamespaceError::TooDeep`] if the depth limit is exceeded
    pub fn set(&mut self, path: &NodePath, node: Node<B>) -> Result<Option<Node<B>>, NamespaceError> {
        if path.is_root() {
            return self.set_root(node);
        }
        self.check_fits(path, &node)?;
        self.check_intermediate(path)?;

        if let Ok(Node::Folder(existing)) = self.get(path) {
            match &node {
                Node::Folder(incoming) => {
                    if let Some(conflict) = existing.merge_conflict(incoming, path) {
                        return Err(NamespaceError::FolderOccupied(conflict));
                    }
                }
                Node::Leaf(_) => return Err(NamespaceError::FolderOccupied(path.clone())),
            }
        }

        let (parent, name) = split(path)?;
        let folder = self.create_folders(&parent)?;
        match node {
            Node::Folder(incoming) => {
                if let Some(Node::Folder(existing)) = folder.children.get_mut(name) {
                    existing.merge(incoming);
                    return Ok(None);
                }
                Ok(folder.children.insert(name.to_string(), Node::Folder(incoming)))
            }
            leaf @ Node::Leaf(_) => Ok(folder.children.insert(name.to_string(), leaf)),
        }
    }

    /// Store `node` at `path`, discarding whatever was there
    ///
    /// # Errors
    /// Same as [`Namespace::set`] minus [`NamespaceError::FolderOccupied`]
    pub fn replace(&mut self, path: &NodePath, node: Node<B>) -> Result<Option<Node<B>>, NamespaceError> {
        if path.is_root() {
            return self.set_root(node);
        }
        self.check_fits(path, &node)?;
        self.check_intermediate(path)?;
        let (parent, name) = split(path)?;
        let folder = self.create_folders(&parent)?;
        Ok(folder.children.insert(name.to_string(), node))
    }

    /// Store `node` at a currently unoccupied `path`
    ///
    /// # Errors
    /// [`NamespaceError::NameConflict`] if something already exists there
    pub fn insert_new(&mut self, path: &NodePath, node: Node<B>) -> Result<(), NamespaceError> {
        if self.contains(path) {
            return Err(NamespaceError::NameConflict(path.clone()));
        }
        self.replace(path, node).map(|_| ())
    }

    /// Remove and return the node at `path`
    ///
    /// # Errors
    /// [`NamespaceError::PathNotFound`] if absent
    pub fn delete(&mut self, path: &NodePath) -> Result<Node<B>, NamespaceError> {
        let (parent, name) = split(path)?;
        self.folder_mut(&parent)
            .ok()
            .and_then(|folder| folder.children.shift_remove(name))
            .ok_or_else(|| NamespaceError::PathNotFound(path.clone()))
    }

    /// Re-parent the node at `old` under the folder `dest`, keeping its name
    ///
    /// Every check runs before the tree is touched.
    ///
    /// # Errors
    /// - [`NamespaceError::CyclicMove`] if `dest` is `old` or lies under it
    /// - [`NamespaceError::NameConflict`] if `dest` has a same-named child
    /// - [`NamespaceError::PathNotFound`] if `old` or `dest` is missing
    /// - [`NamespaceError::InvalidIntermediatePath`] if `dest` is a leaf
    pub fn move_into(&mut self, old: &NodePath, dest: &NodePath) -> Result<NodePath, NamespaceError> {
        let (current_parent, name) = split(old)?;
        if old.is_prefix_of(dest) {
            return Err(NamespaceError::CyclicMove {
                from: old.clone(),
                to: dest.clone(),
            });
        }
        let node = self.get(old)?;
        if current_parent == *dest {
            return Ok(old.clone());
        }

        let target = match self.get(dest) {
            Ok(Node::Leaf(_)) => {
                return Err(NamespaceError::InvalidIntermediatePath {
                    path: dest.clone(),
                    blocking: dest.clone(),
                })
            }
            _ => self.folder(dest)?,
        };
        let new_path = dest.child(name)?;
        if target.contains(name) {
            return Err(NamespaceError::NameConflict(new_path));
        }
        self.check_fits(&new_path, node)?;

        let node = self.delete(old)?;
        self.folder_mut(dest)?.children.insert(name.to_string(), node);
        Ok(new_path)
    }

    /// Rename the node at `path`, keeping its position among its siblings
    ///
    /// # Errors
    /// - [`NamespaceError::NameConflict`] if a sibling already has `new_name`
    /// - [`NamespaceError::PathNotFound`] if `path` is absent
    pub fn rename(&mut self, path: &NodePath, new_name: &str) -> Result<NodePath, NamespaceError> {
        let new_path = path.with_name(new_name)?;
        if new_path == *path {
            self.get(path)?;
            return Ok(new_path);
        }
        let (parent, name) = split(path)?;
        let folder = self
            .folder_mut(&parent)
            .map_err(|_| NamespaceError::PathNotFound(path.clone()))?;
        if folder.children.contains_key(new_name) {
            return Err(NamespaceError::NameConflict(new_path));
        }
        let (index, _, node) = folder
            .children
            .shift_remove_full(name)
            .ok_or_else(|| NamespaceError::PathNotFound(path.clone()))?;
        folder.children.shift_insert(index, new_name.to_string(), node);
        Ok(new_path)
    }

    /// Rebuild the folder at `folder` with its children in `order`
    ///
    /// # Errors
    /// [`NamespaceError::ReorderMismatch`] unless `order` is a permutation of
    /// the current child names
    pub fn reorder(&mut self, folder: &NodePath, order: &[String]) -> Result<(), NamespaceError> {
        let target = self.folder_mut(folder)?;
        let mut seen = std::collections::HashSet::with_capacity(order.len());
        let is_permutation = order.len() == target.children.len()
            && order
                .iter()
                .all(|name| target.children.contains_key(name) && seen.insert(name));
        if !is_permutation {
            return Err(NamespaceError::ReorderMismatch(folder.clone()));
        }

        let mut previous = std::mem::take(&mut target.children);
        let mut rebuilt = IndexMap::with_capacity(previous.len());
        for name in order {
            if let Some(node) = previous.swap_remove(name) {
                rebuilt.insert(name.clone(), node);
            }
        }
        target.children = rebuilt;
        Ok(())
    }

    /// Move the node at `path` to position `index` among its siblings
    ///
    /// # Errors
    /// [`NamespaceError::PathNotFound`] if `path` is absent
    pub fn move_to_position(&mut self, path: &NodePath, index: usize) -> Result<(), NamespaceError> {
        let (parent, name) = split(path)?;
        let mut order = self.folder(&parent)?.names();
        let from = order
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| NamespaceError::PathNotFound(path.clone()))?;
        let moved = order.remove(from);
        order.insert(index.min(order.len()), moved);
        self.reorder(&parent, &order)
    }

    /// Ordered snapshot of every leaf with its path
    #[must_use]
    pub fn leaves(&self) -> Vec<(NodePath, &B)> {
        let mut out = Vec::new();
        collect(&self.root, &NodePath::root(), &mut |path, node| {
            if let Node::Leaf(b) = node {
                out.push((path, b));
            }
        });
        out
    }

    /// Ordered snapshot of every folder and leaf path
    #[must_use]
    pub fn entries(&self) -> Vec<(NodePath, EntryKind)> {
        let mut out = Vec::new();
        collect(&self.root, &NodePath::root(), &mut |path, node| {
            let kind = if node.is_folder() {
                EntryKind::Folder
            } else {
                EntryKind::Leaf
            };
            out.push((path, kind));
        });
        out
    }

    fn set_root(&mut self, node: Node<B>) -> Result<Option<Node<B>>, NamespaceError> {
        match node {
            Node::Folder(folder) => {
                self.check_children_fit(&NodePath::root(), &folder)?;
                let previous = std::mem::replace(&mut self.root, folder);
                Ok(Some(Node::Folder(previous)))
            }
            Node::Leaf(_) => Err(NamespaceError::RootMustBeFolder),
        }
    }

    /// Walk existing prefixes of `path` and fail on the first leaf
    fn check_intermediate(&self, path: &NodePath) -> Result<(), NamespaceError> {
        let mut current = &self.root;
        let segments = path.segments();
        for (i, seg) in segments[..segments.len().saturating_sub(1)].iter().enumerate() {
            match current.children.get(seg) {
                Some(Node::Folder(f)) => current = f,
                Some(Node::Leaf(_)) => {
                    return Err(NamespaceError::InvalidIntermediatePath {
                        path: path.clone(),
                        blocking: NodePath::new(segments[..=i].iter().cloned())?,
                    })
                }
                None => return Ok(()),
            }
        }
        Ok(())
    }

    /// Caller must have run [`Namespace::check_intermediate`]
    fn create_folders(&mut self, path: &NodePath) -> Result<&mut Folder<B>, NamespaceError> {
        let mut current = &mut self.root;
        for seg in path.segments() {
            let entry = current
                .children
                .entry(seg.clone())
                .or_insert_with(|| Node::Folder(Folder::new()));
            current = match entry {
                Node::Folder(f) => f,
                Node::Leaf(_) => {
                    return Err(NamespaceError::InvalidIntermediatePath {
                        path: path.clone(),
                        blocking: path.clone(),
                    })
                }
            };
        }
        Ok(current)
    }

    fn check_fits(&self, path: &NodePath, node: &Node<B>) -> Result<(), NamespaceError> {
        match self.max_depth {
            Some(max) if !fits(path.len(), node, max) => {
                Err(NamespaceError::TooDeep {
                    path: path.clone(),
                    max,
                })
            }
            _ => Ok(()),
        }
    }

    fn check_children_fit(&self, at: &NodePath, folder: &Folder<B>) -> Result<(), NamespaceError> {
        for (name, node) in &folder.children {
            self.check_fits(&at.child(name.as_str())?, node)?;
        }
        Ok(())
    }
}

/// Folders may only sit strictly above the depth limit
fn fits<B>(depth: usize, node: &Node<B>, max: usize) -> bool {
    match node {
        Node::Leaf(_) => depth <= max,
        Node::Folder(f) => depth < max && f.children.values().all(|c| fits(depth + 1, c, max)),
    }
}

fn split(path: &NodePath) -> Result<(NodePath, &str), NamespaceError> {
    match (path.parent(), path.name()) {
        (Some(parent), Some(name)) => Ok((parent, name)),
        _ => Err(NamespaceError::RootPath),
    }
}

fn collect<'a, B>(folder: &'a Folder<B>, at: &NodePath, visit: &mut impl FnMut(NodePath, &'a Node<B>)) {
    for (name, node) in &folder.children {
        let mut segments = at.segments().to_vec();
        segments.push(name.clone());
        // Names were validated on insertion
        let Ok(path) = NodePath::new(segments) else { continue };
        visit(path.clone(), node);
        if let Node::Folder(sub) = node {
            collect(sub, &path, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn p(s: &str) -> NodePath {
        s.parse().unwrap()
    }

    fn leaf(v: u32) -> Node<u32> {
        Node::Leaf(v)
    }

    fn sample() -> Namespace<u32> {
        let mut ns = Namespace::new();
        ns.set(&p("\\Inputs\\X"), leaf(5)).unwrap();
        ns.set(&p("\\Inputs\\Y"), leaf(7)).unwrap();
        ns.set(&p("\\Top"), leaf(1)).unwrap();
        ns
    }

    #[test]
    fn set_creates_intermediate_folders() {
        let ns = sample();
        assert!(ns.is_folder(&p("\\Inputs")));
        assert_eq!(ns.binding(&p("\\Inputs\\X")).unwrap(), &5);
        assert_eq!(ns.len(), 3);
    }

    #[test]
    fn get_missing_segment_is_path_not_found() {
        let ns = sample();
        assert_eq!(
            ns.get(&p("\\Nope\\X")),
            Err(NamespaceError::PathNotFound(p("\\Nope\\X")))
        );
    }

    #[test]
    fn get_through_leaf_is_path_not_found() {
        let ns = sample();
        assert!(matches!(
            ns.get(&p("\\Top\\Below")),
            Err(NamespaceError::PathNotFound(_))
        ));
    }

    #[test]
    fn get_root_is_rejected() {
        let ns = sample();
        assert_eq!(ns.get(&NodePath::root()), Err(NamespaceError::RootPath));
        assert!(ns.folder(&NodePath::root()).is_ok());
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut ns = sample();
        *ns.binding_mut(&p("\\Inputs\\X")).unwrap() = 50;
        assert_eq!(ns.binding(&p("\\Inputs\\X")).unwrap(), &50);
    }

    #[test]
    fn set_cannot_tunnel_through_leaf() {
        let mut ns = sample();
        let result = ns.set(&p("\\Top\\Child"), leaf(2));
        assert_eq!(
            result,
            Err(NamespaceError::InvalidIntermediatePath {
                path: p("\\Top\\Child"),
                blocking: p("\\Top"),
            })
        );
    }

    #[test]
    fn set_failure_does_not_create_partial_folders() {
        let mut ns = sample();
        let before = ns.clone();
        assert!(ns.set(&p("\\Top\\A\\B"), leaf(2)).is_err());
        assert_eq!(ns, before);
    }

    #[test]
    fn set_overwrites_leaf() {
        let mut ns = sample();
        let old = ns.set(&p("\\Top"), leaf(9)).unwrap();
        assert_eq!(old, Some(leaf(1)));
        assert_eq!(ns.binding(&p("\\Top")).unwrap(), &9);
    }

    #[test]
    fn set_folder_over_folder_merges_children() {
        let mut ns = sample();
        let incoming = Folder::new().with_child("Z", leaf(3)).unwrap();
        ns.set(&p("\\Inputs"), Node::Folder(incoming)).unwrap();

        let names = ns.folder(&p("\\Inputs")).unwrap().names();
        assert_eq!(names, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn set_leaf_over_folder_is_rejected() {
        let mut ns = sample();
        assert_eq!(
            ns.set(&p("\\Inputs"), leaf(0)),
            Err(NamespaceError::FolderOccupied(p("\\Inputs")))
        );
        assert_eq!(ns.len(), 3);
    }

    #[test]
    fn replace_discards_folder_children() {
        let mut ns = sample();
        ns.replace(&p("\\Inputs"), Node::Folder(Folder::new())).unwrap();
        assert!(ns.folder(&p("\\Inputs")).unwrap().is_empty());
    }

    #[test]
    fn set_root_replaces_top_level() {
        let mut ns = sample();
        let fresh = Folder::new().with_child("Only", leaf(4)).unwrap();
        ns.set(&NodePath::root(), Node::Folder(fresh)).unwrap();
        assert_eq!(ns.root().names(), vec!["Only"]);
        assert_eq!(
            ns.set(&NodePath::root(), leaf(1)),
            Err(NamespaceError::RootMustBeFolder)
        );
    }

    #[test]
    fn insert_new_rejects_existing() {
        let mut ns = sample();
        assert_eq!(
            ns.insert_new(&p("\\Top"), leaf(2)),
            Err(NamespaceError::NameConflict(p("\\Top")))
        );
        ns.insert_new(&p("\\Other"), leaf(2)).unwrap();
    }

    #[test]
    fn delete_removes_and_keeps_sibling_order() {
        let mut ns = sample();
        ns.set(&p("\\Inputs\\W"), leaf(0)).unwrap();
        let removed = ns.delete(&p("\\Inputs\\Y")).unwrap();
        assert_eq!(removed, leaf(7));
        assert_eq!(ns.folder(&p("\\Inputs")).unwrap().names(), vec!["X", "W"]);
        assert!(matches!(
            ns.delete(&p("\\Inputs\\Y")),
            Err(NamespaceError::PathNotFound(_))
        ));
    }

    #[test]
    fn move_into_reparents() {
        let mut ns = sample();
        ns.set(&p("\\Dest"), Node::Folder(Folder::new())).unwrap();
        let new_path = ns.move_into(&p("\\Inputs\\X"), &p("\\Dest")).unwrap();
        assert_eq!(new_path, p("\\Dest\\X"));
        assert_eq!(ns.binding(&p("\\Dest\\X")).unwrap(), &5);
        assert!(!ns.contains(&p("\\Inputs\\X")));
    }

    #[test]
    fn move_into_name_conflict_leaves_tree_untouched() {
        let mut ns: Namespace<u32> = Namespace::new();
        ns.set(&p("\\A\\B"), leaf(1)).unwrap();
        ns.set(&p("\\C\\B"), leaf(2)).unwrap();
        let before = ns.clone();

        let result = ns.move_into(&p("\\A\\B"), &p("\\C"));
        assert_eq!(result, Err(NamespaceError::NameConflict(p("\\C\\B"))));
        assert_eq!(ns, before);
    }

    #[test]
    fn move_into_descendant_is_cyclic() {
        let mut ns: Namespace<u32> = Namespace::new();
        ns.set(&p("\\A\\B\\C"), leaf(1)).unwrap();
        assert!(matches!(
            ns.move_into(&p("\\A"), &p("\\A\\B")),
            Err(NamespaceError::CyclicMove { .. })
        ));
        assert!(matches!(
            ns.move_into(&p("\\A"), &p("\\A")),
            Err(NamespaceError::CyclicMove { .. })
        ));
    }

    #[test]
    fn move_into_leaf_destination_is_invalid() {
        let mut ns = sample();
        assert!(matches!(
            ns.move_into(&p("\\Inputs\\X"), &p("\\Top")),
            Err(NamespaceError::InvalidIntermediatePath { .. })
        ));
    }

    #[test]
    fn move_into_root() {
        let mut ns = sample();
        let new_path = ns.move_into(&p("\\Inputs\\X"), &NodePath::root()).unwrap();
        assert_eq!(new_path, p("\\X"));
        assert_eq!(ns.root().names(), vec!["Inputs", "Top", "X"]);
    }

    #[test]
    fn rename_keeps_position() {
        let mut ns = sample();
        ns.rename(&p("\\Inputs\\X"), "Renamed").unwrap();
        assert_eq!(
            ns.folder(&p("\\Inputs")).unwrap().names(),
            vec!["Renamed", "Y"]
        );
        assert_eq!(
            ns.rename(&p("\\Inputs\\Renamed"), "Y"),
            Err(NamespaceError::NameConflict(p("\\Inputs\\Y")))
        );
    }

    #[test]
    fn rename_rejects_separator() {
        let mut ns = sample();
        assert!(matches!(
            ns.rename(&p("\\Top"), "a\\b"),
            Err(NamespaceError::InvalidName(_))
        ));
    }

    #[test]
    fn reorder_rebuilds_in_order() {
        let mut ns = sample();
        ns.reorder(&NodePath::root(), &["Top".into(), "Inputs".into()]).unwrap();
        assert_eq!(ns.root().names(), vec!["Top", "Inputs"]);
    }

    #[test]
    fn equality_counts_child_order() {
        let original = sample();
        let mut reordered = original.clone();
        assert_eq!(reordered, original);

        reordered.reorder(&NodePath::root(), &["Top".into(), "Inputs".into()]).unwrap();
        assert_ne!(reordered, original);

        let mut nested = original.clone();
        nested.move_to_position(&p("\\Inputs\\Y"), 0).unwrap();
        assert_ne!(nested, original);
    }

    #[test]
    fn reorder_requires_permutation() {
        let mut ns = sample();
        for bad in [
            vec!["Top".to_string()],
            vec!["Top".to_string(), "Top".to_string()],
            vec!["Top".to_string(), "Missing".to_string()],
        ] {
            assert_eq!(
                ns.reorder(&NodePath::root(), &bad),
                Err(NamespaceError::ReorderMismatch(NodePath::root()))
            );
        }
        assert_eq!(ns.root().names(), vec!["Inputs", "Top"]);
    }

    #[test]
    fn move_to_position_shifts_siblings() {
        let mut ns = sample();
        ns.set(&p("\\Inputs\\Z"), leaf(3)).unwrap();
        ns.move_to_position(&p("\\Inputs\\Z"), 0).unwrap();
        assert_eq!(ns.folder(&p("\\Inputs")).unwrap().names(), vec!["Z", "X", "Y"]);
        ns.move_to_position(&p("\\Inputs\\Z"), 99).unwrap();
        assert_eq!(ns.folder(&p("\\Inputs")).unwrap().names(), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn leaves_and_entries_are_ordered_snapshots() {
        let ns = sample();
        let leaves: Vec<_> = ns.leaves().into_iter().map(|(p, v)| (p.to_string(), *v)).collect();
        assert_eq!(
            leaves,
            vec![
                ("\\Inputs\\X".to_string(), 5),
                ("\\Inputs\\Y".to_string(), 7),
                ("\\Top".to_string(), 1),
            ]
        );
        let entries = ns.entries();
        assert_eq!(entries[0], (p("\\Inputs"), EntryKind::Folder));
        assert_eq!(entries.len(), 4);
    }

    #[test]
    fn flat_namespace_rejects_depth() {
        let mut ns: Namespace<u32> = Namespace::flat();
        ns.set(&p("\\Add"), leaf(1)).unwrap();
        assert!(matches!(
            ns.set(&p("\\Group\\Add"), leaf(1)),
            Err(NamespaceError::TooDeep { max: 1, .. })
        ));
        assert!(matches!(
            ns.set(&p("\\Group"), Node::Folder(Folder::new())),
            Err(NamespaceError::TooDeep { .. })
        ));
    }

    #[test]
    fn with_root_checks_depth() {
        let nested = Folder::new()
            .with_child("F", Node::Folder(Folder::new().with_child("x", leaf(1)).unwrap()))
            .unwrap();
        assert!(Namespace::<u32>::flat().with_root(nested.clone()).is_err());
        assert_eq!(Namespace::<u32>::new().with_root(nested).unwrap().len(), 1);
    }
}
