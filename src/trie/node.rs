//! Trie vertex and edge types

use super::table;
use crate::cancel::CancelToken;
use crate::model::{Entry, Metadata, Reference};
use crate::store::Loader;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Resolution state of a vertex's outgoing edges
#[derive(Clone, Debug)]
pub enum Children {
    /// Only the address of the fork table is known
    Unresolved(Reference),
    /// Fork table loaded, keyed by the first byte of each label
    Resolved(BTreeMap<u8, Fork>),
}

impl Default for Children {
    fn default() -> Self {
        Children::Resolved(BTreeMap::new())
    }
}

/// A vertex in the manifest trie
///
/// A vertex may be a directory (it has forks), a value (some stored path ends
/// exactly here and `entry` is set), or both: a path inserted with a trailing
/// separator next to deeper paths is a value vertex with forks.
#[derive(Clone, Debug, Default)]
pub struct Node {
    /// Address of this vertex's fork table once persisted
    reference: Option<Reference>,
    entry: Option<Entry>,
    children: Children,
}

/// A compacted edge from a parent vertex to a child
///
/// The label holds one or more consecutive path bytes and may span
/// separators; it is never empty.
#[derive(Clone, Debug)]
pub struct Fork {
    pub(crate) label: Vec<u8>,
    pub(crate) child: Node,
}

impl Fork {
    pub fn new(label: impl Into<Vec<u8>>, child: Node) -> Result<Self> {
        let label = label.into();
        if label.is_empty() {
            return Err(Error::InvalidPath("fork label must not be empty".into()));
        }
        Ok(Fork { label, child })
    }

    /// The key this fork is stored under in its parent
    pub fn key(&self) -> u8 {
        self.label[0]
    }

    pub fn label(&self) -> &[u8] {
        &self.label
    }

    pub fn child(&self) -> &Node {
        &self.child
    }

    /// The child terminates a stored path
    pub fn is_value_edge(&self) -> bool {
        self.child.is_value()
    }

    /// The child has further forks (or has not been loaded yet)
    pub fn has_children(&self) -> bool {
        self.child.has_forks()
    }

    /// The label crosses at least one directory boundary
    pub fn has_embedded_separator(&self, separator: u8) -> bool {
        self.label.contains(&separator)
    }
}

impl Node {
    /// Create an empty, resolved vertex
    pub fn new() -> Self {
        Node::default()
    }

    /// A persisted vertex whose fork table has not been loaded
    pub fn from_reference(reference: Reference) -> Self {
        Node {
            reference: Some(reference),
            entry: None,
            children: Children::Unresolved(reference),
        }
    }

    /// A childless value vertex
    pub fn leaf(entry: Entry) -> Self {
        Node {
            reference: None,
            entry: Some(entry),
            children: Children::default(),
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub(crate) fn set_reference(&mut self, reference: Reference) {
        self.reference = Some(reference);
    }

    pub fn entry(&self) -> Option<&Entry> {
        self.entry.as_ref()
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.entry.as_ref().map(|e| &e.metadata)
    }

    pub fn set_entry(&mut self, entry: Option<Entry>) {
        self.entry = entry;
    }

    pub(crate) fn with_entry(mut self, entry: Option<Entry>) -> Self {
        self.entry = entry;
        self
    }

    pub fn is_value(&self) -> bool {
        self.entry.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.children, Children::Resolved(_))
    }

    /// Whether the vertex has outgoing edges; unloaded vertices always do,
    /// since childless vertices are stored inline in their parent
    pub fn has_forks(&self) -> bool {
        match &self.children {
            Children::Unresolved(_) => true,
            Children::Resolved(forks) => !forks.is_empty(),
        }
    }

    pub fn children(&self) -> &Children {
        &self.children
    }

    /// The fork table, if resolved
    pub fn forks(&self) -> Option<&BTreeMap<u8, Fork>> {
        match &self.children {
            Children::Resolved(forks) => Some(forks),
            Children::Unresolved(_) => None,
        }
    }

    pub(crate) fn forks_mut(&mut self) -> Option<&mut BTreeMap<u8, Fork>> {
        match &mut self.children {
            Children::Resolved(forks) => Some(forks),
            Children::Unresolved(_) => None,
        }
    }

    pub fn fork(&self, key: u8) -> Option<&Fork> {
        self.forks().and_then(|forks| forks.get(&key))
    }

    pub(crate) fn fork_mut(&mut self, key: u8) -> Option<&mut Fork> {
        self.forks_mut().and_then(|forks| forks.get_mut(&key))
    }

    /// Attach an edge to a resolved vertex, returning any fork it replaced
    pub fn add_fork(&mut self, label: impl Into<Vec<u8>>, child: Node) -> Result<Option<Fork>> {
        let fork = Fork::new(label, child)?;
        let forks = self
            .forks_mut()
            .ok_or_else(|| Error::InvalidPath("cannot add a fork to an unresolved vertex".into()))?;
        Ok(forks.insert(fork.key(), fork))
    }

    /// Load the fork table from `loader` unless already resolved
    ///
    /// Loader failures surface as [`Error::Fetch`], undecodable tables as
    /// [`Error::Decode`]. Repeated calls are free.
    pub fn resolve<L: Loader + ?Sized>(&mut self, loader: &L) -> Result<()> {
        let reference = match &self.children {
            Children::Resolved(_) => return Ok(()),
            Children::Unresolved(reference) => *reference,
        };

        let bytes = loader.fetch(&reference).map_err(|e| match e {
            e @ (Error::Fetch { .. } | Error::Decode(_) | Error::Cancelled { .. }) => e,
            other => Error::fetch(&reference, other),
        })?;
        let forks = table::decode(&bytes)?;

        tracing::debug!(reference = %reference.short(), forks = forks.len(), "resolved vertex");
        self.children = Children::Resolved(forks);
        Ok(())
    }

    /// [`Node::resolve`] preceded by a cancellation check when a fetch is due
    pub fn resolve_checked<L: Loader + ?Sized>(
        &mut self,
        loader: &L,
        cancel: &CancelToken,
        path: &[u8],
    ) -> Result<()> {
        if !self.is_resolved() {
            cancel.check(path)?;
        }
        self.resolve(loader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn entry(name: &str) -> Entry {
        Entry::new(Reference::digest(name.as_bytes()))
    }

    #[test]
    fn test_empty_label_rejected() {
        assert!(Fork::new(Vec::new(), Node::new()).is_err());

        let mut node = Node::new();
        assert!(node.add_fork("", Node::new()).is_err());
    }

    #[test]
    fn test_add_fork_keys_by_first_byte() {
        let mut node = Node::new();
        assert!(node.add_fork("abc/", Node::leaf(entry("a"))).unwrap().is_none());
        let replaced = node.add_fork("axe", Node::leaf(entry("b"))).unwrap();

        assert_eq!(replaced.unwrap().label(), b"abc/");
        assert_eq!(node.forks().unwrap().len(), 1);
        assert_eq!(node.fork(b'a').unwrap().label(), b"axe");
    }

    #[test]
    fn test_unresolved_is_not_empty() {
        let unresolved = Node::from_reference(Reference::digest(b"table"));
        assert!(!unresolved.is_resolved());
        assert!(unresolved.has_forks());
        assert!(unresolved.forks().is_none());

        let childless = Node::new();
        assert!(childless.is_resolved());
        assert!(!childless.has_forks());
    }

    #[test]
    fn test_edge_classification() {
        let mut dir = Node::leaf(entry("dir"));
        dir.add_fork("file", Node::leaf(entry("file"))).unwrap();
        let fork = Fork::new("dir1/", dir).unwrap();

        assert!(fork.is_value_edge());
        assert!(fork.has_children());
        assert!(fork.has_embedded_separator(b'/'));
        assert!(!fork.has_embedded_separator(b':'));
    }

    #[test]
    fn test_resolve_missing_reference_is_fetch_error() {
        let store = MemoryStore::new();
        let mut node = Node::from_reference(Reference::digest(b"missing"));

        let err = node.resolve(&store).unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
        assert!(!node.is_resolved());
    }

    #[test]
    fn test_resolve_checked_skips_cancel_when_resolved() {
        let store = MemoryStore::new();
        let cancel = CancelToken::new();
        cancel.cancel();

        let mut resolved = Node::new();
        resolved.resolve_checked(&store, &cancel, b"").unwrap();

        let mut unresolved = Node::from_reference(Reference::digest(b"x"));
        let err = unresolved.resolve_checked(&store, &cancel, b"x/").unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(store.fetch_count(), 0);
    }
}
