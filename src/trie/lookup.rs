//! Closest-prefix and exact path lookup

use super::node::Node;
use super::prefix::common_prefix_len;
use crate::cancel::CancelToken;
use crate::store::Loader;
use crate::{Error, Result};

/// Where a closest-prefix lookup stopped
#[derive(Debug)]
pub enum Closest<'n> {
    /// Stopped on a vertex boundary. `rest` is the tail of the requested path
    /// that no fork matched, empty when `node` stands exactly for the path.
    Vertex { node: &'n mut Node, rest: Vec<u8> },
    /// Stopped inside a fork label. `node` is the fork's child, `label_rest`
    /// the part of the stored label the path did not consume, `path_rest`
    /// the part of the path that disagreed with the label (empty when the
    /// path simply ended mid-label).
    MidEdge {
        node: &'n mut Node,
        label_rest: Vec<u8>,
        path_rest: Vec<u8>,
    },
}

impl Closest<'_> {
    /// Landed inside a label rather than on a vertex
    pub fn is_diverged(&self) -> bool {
        matches!(self, Closest::MidEdge { .. })
    }

    pub fn node(&self) -> &Node {
        match self {
            Closest::Vertex { node, .. } | Closest::MidEdge { node, .. } => node,
        }
    }
}

impl Node {
    /// Walk toward `path`, loading vertices on the way, and stop at the
    /// deepest point the stored compaction agrees with
    ///
    /// Cancellation is checked before every step; a cancelled lookup fails
    /// with the part of `path` consumed so far.
    pub fn lookup_closest<'n, L: Loader + ?Sized>(
        &'n mut self,
        path: &[u8],
        loader: &L,
        cancel: &CancelToken,
    ) -> Result<Closest<'n>> {
        self.closest_from(path, 0, loader, cancel)
    }

    fn closest_from<'n, L: Loader + ?Sized>(
        &'n mut self,
        path: &[u8],
        consumed: usize,
        loader: &L,
        cancel: &CancelToken,
    ) -> Result<Closest<'n>> {
        cancel.check(&path[..consumed])?;
        self.resolve(loader)?;

        let rest = &path[consumed..];
        let Some(&key) = rest.first() else {
            return Ok(Closest::Vertex {
                node: self,
                rest: Vec::new(),
            });
        };

        let matched = self
            .fork(key)
            .map(|fork| (common_prefix_len(fork.label(), rest), fork.label().len()));
        let Some((common, label_len)) = matched else {
            return Ok(Closest::Vertex {
                node: self,
                rest: rest.to_vec(),
            });
        };

        let fork = self
            .fork_mut(key)
            .ok_or_else(|| Error::not_found(&path[..consumed]))?;
        if common == label_len {
            return fork
                .child
                .closest_from(path, consumed + common, loader, cancel);
        }

        Ok(Closest::MidEdge {
            label_rest: fork.label[common..].to_vec(),
            path_rest: rest[common..].to_vec(),
            node: &mut fork.child,
        })
    }

    /// Find the vertex standing exactly for `path`
    ///
    /// Fails with [`Error::NotFound`] when the path runs off the stored forks
    /// or ends inside a label.
    pub fn lookup_node<'n, L: Loader + ?Sized>(
        &'n mut self,
        path: &[u8],
        loader: &L,
        cancel: &CancelToken,
    ) -> Result<&'n mut Node> {
        match self.lookup_closest(path, loader, cancel)? {
            Closest::Vertex { node, rest } if rest.is_empty() => Ok(node),
            _ => Err(Error::not_found(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, Reference};

    fn leaf(name: &str) -> Node {
        Node::leaf(Entry::new(Reference::digest(name.as_bytes())))
    }

    /// root -"dir"-> {"1/" -> leaf, "2/direct" -> {".old" leaf, "/file" leaf}}
    fn sample() -> Node {
        let mut direct = Node::new();
        direct.add_fork(".old", leaf("direct.old")).unwrap();
        direct.add_fork("/file", leaf("direct/file")).unwrap();

        let mut dir = Node::new();
        dir.add_fork("1/", leaf("dir1/")).unwrap();
        dir.add_fork("2/direct", direct).unwrap();

        let mut root = Node::new();
        root.add_fork("dir", dir).unwrap();
        root
    }

    fn no_loader() -> crate::store::MemoryStore {
        crate::store::MemoryStore::new()
    }

    #[test]
    fn test_empty_path_lands_on_start() {
        let mut root = sample();
        let store = no_loader();
        let closest = root
            .lookup_closest(b"", &store, &CancelToken::new())
            .unwrap();
        assert!(!closest.is_diverged());
        assert_eq!(closest.node().forks().unwrap().len(), 1);
    }

    #[test]
    fn test_exact_vertex() {
        let mut root = sample();
        let store = no_loader();
        match root.lookup_closest(b"dir1/", &store, &CancelToken::new()).unwrap() {
            Closest::Vertex { node, rest } => {
                assert!(rest.is_empty());
                assert!(node.is_value());
            }
            other => panic!("expected vertex, got {:?}", other),
        }
    }

    #[test]
    fn test_mid_edge_reports_label_remainder() {
        let mut root = sample();
        let store = no_loader();
        match root.lookup_closest(b"dir2/", &store, &CancelToken::new()).unwrap() {
            Closest::MidEdge {
                node,
                label_rest,
                path_rest,
            } => {
                assert_eq!(label_rest, b"direct");
                assert!(path_rest.is_empty());
                assert_eq!(node.forks().unwrap().len(), 2);
            }
            other => panic!("expected mid-edge, got {:?}", other),
        }
    }

    #[test]
    fn test_divergent_path_keeps_both_remainders() {
        let mut root = sample();
        let store = no_loader();
        match root.lookup_closest(b"dir2/dix", &store, &CancelToken::new()).unwrap() {
            Closest::MidEdge {
                label_rest,
                path_rest,
                ..
            } => {
                assert_eq!(label_rest, b"ect");
                assert_eq!(path_rest, b"x");
            }
            other => panic!("expected mid-edge, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_fork_returns_unmatched_path() {
        let mut root = sample();
        let store = no_loader();
        match root.lookup_closest(b"dir9/a", &store, &CancelToken::new()).unwrap() {
            Closest::Vertex { rest, .. } => assert_eq!(rest, b"9/a"),
            other => panic!("expected vertex, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_node() {
        let mut root = sample();
        let store = no_loader();
        let cancel = CancelToken::new();

        let node = root.lookup_node(b"dir2/direct.old", &store, &cancel).unwrap();
        assert!(node.is_value());

        assert!(root.lookup_node(b"dir2/", &store, &cancel).unwrap_err().is_not_found());
        assert!(root.lookup_node(b"dir3/", &store, &cancel).unwrap_err().is_not_found());
        assert!(root
            .lookup_node(b"dir2/direct/file/deeper", &store, &cancel)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_cancelled_lookup_carries_consumed_path() {
        let mut root = sample();
        let store = no_loader();
        let cancel = CancelToken::new();
        cancel.cancel();

        match root.lookup_closest(b"dir1/", &store, &cancel) {
            Err(Error::Cancelled { path }) => assert_eq!(path, ""),
            other => panic!("expected cancellation, got {:?}", other.map(|c| c.is_diverged())),
        }
    }
}
