//! Level-bounded and unbounded manifest walks
//!
//! Both walks report two kinds of events to a callback:
//! - **Directory**: emitted once for every separator crossed, with the path up
//!   to and including that separator, whether the separator sits on a vertex
//!   boundary or inside a compacted label
//! - **File**: emitted for every value vertex whose path does not end in the
//!   separator, split into directory part and file name
//!
//! Paths are relative to the directory of the start path. The level walk
//! starts one level deep: a Directory event whose separator takes the depth
//! past `max_level` is still reported, but nothing below it is loaded or
//! reported. It reports one directory level at a time, each in ascending byte
//! order, so the sequence does not depend on how labels are compacted. The
//! unbounded walk is depth-first.

use super::lookup::Closest;
use super::node::{Fork, Node};
use crate::cancel::CancelToken;
use crate::model::{Metadata, Reference};
use crate::store::Loader;
use crate::{Error, Result, PATH_SEPARATOR};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Depth bound requesting full expansion
pub const MAX_LEVEL: u32 = u32::MAX;

/// Kind of a walk event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Directory,
    File,
}

/// One event handed to a walk callback
///
/// All buffers are borrowed for the duration of the call; use
/// [`WalkEntry::to_record`] to keep one.
#[derive(Clone, Copy, Debug)]
pub struct WalkEntry<'a> {
    pub kind: EntryKind,
    /// Directory part; ends with the separator or is empty
    pub path: &'a [u8],
    /// Final path component for files, empty for directories
    pub name: &'a [u8],
    /// Content reference for files, the marker entry's reference for
    /// explicitly stored directories
    pub reference: Option<&'a Reference>,
    pub metadata: Option<&'a Metadata>,
}

impl WalkEntry<'_> {
    pub fn full_path(&self) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.path.len() + self.name.len());
        full.extend_from_slice(self.path);
        full.extend_from_slice(self.name);
        full
    }

    pub fn to_record(&self) -> WalkRecord {
        WalkRecord {
            kind: self.kind,
            path: self.path.to_vec(),
            name: self.name.to_vec(),
            reference: self.reference.copied(),
            metadata: self.metadata.cloned(),
        }
    }
}

/// Owned copy of a [`WalkEntry`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkRecord {
    pub kind: EntryKind,
    pub path: Vec<u8>,
    pub name: Vec<u8>,
    pub reference: Option<Reference>,
    pub metadata: Option<Metadata>,
}

impl WalkRecord {
    pub fn full_path(&self) -> Vec<u8> {
        [self.path.as_slice(), self.name.as_slice()].concat()
    }

    pub fn full_path_lossy(&self) -> String {
        String::from_utf8_lossy(&self.full_path()).into_owned()
    }
}

/// Outcome of crossing a separator
#[derive(PartialEq, Eq)]
enum Step {
    Continue,
    /// Depth went past the bound; the branch is a frontier
    MaxDepthReached,
}

/// A branch waiting in the level walk's queue, one directory level down
struct Pending<'n> {
    node: &'n mut Node,
    /// Path accumulated up to the start of `label`
    path: Vec<u8>,
    /// Label bytes not yet attributed to directory boundaries
    label: Vec<u8>,
    depth: u32,
}

/// Drives walks over a manifest trie
///
/// Holds the loader used to resolve vertices, the cancellation handle checked
/// at every step, and the trie's path separator.
pub struct Walker<'a, L: ?Sized> {
    loader: &'a L,
    cancel: CancelToken,
    separator: u8,
}

impl<'a, L: Loader + ?Sized> Walker<'a, L> {
    pub fn new(loader: &'a L) -> Self {
        Walker {
            loader,
            cancel: CancelToken::new(),
            separator: PATH_SEPARATOR,
        }
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Enumerate entries below `start` down to `max_level` directory levels
    ///
    /// Fails with [`Error::NotFound`] if no stored path starts with `start`.
    /// Callback errors are returned as-is and stop the walk at once.
    pub fn walk_level<F, E>(
        &self,
        root: &mut Node,
        start: &[u8],
        max_level: u32,
        mut callback: F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        let (node, label) = self.start(root, start)?;
        if max_level == MAX_LEVEL {
            return self.depth_first(node, Vec::new(), &label, &mut callback);
        }
        self.breadth_first(node, label, max_level, &mut callback)
    }

    /// Enumerate every entry of the trie
    pub fn walk_all<F, E>(&self, root: &mut Node, callback: F) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        self.walk_level(root, &[], MAX_LEVEL, callback)
    }

    /// Locate the vertex a walk begins at and the label still to replay
    ///
    /// The trailing component of `start` after its last separator is replayed
    /// as label, so landing on a vertex and landing inside a compacted edge
    /// yield the same events.
    fn start<'n>(&self, root: &'n mut Node, start: &[u8]) -> Result<(&'n mut Node, Vec<u8>)> {
        let dir_len = start
            .iter()
            .rposition(|&b| b == self.separator)
            .map_or(0, |i| i + 1);
        let partial = &start[dir_len..];

        match root.lookup_closest(start, self.loader, &self.cancel)? {
            Closest::Vertex { node, rest } if rest.is_empty() => Ok((node, partial.to_vec())),
            Closest::MidEdge {
                node,
                label_rest,
                path_rest,
            } if path_rest.is_empty() => {
                let mut label = Vec::with_capacity(partial.len() + label_rest.len());
                label.extend_from_slice(partial);
                label.extend_from_slice(&label_rest);
                Ok((node, label))
            }
            _ => Err(Error::not_found(start)),
        }
    }

    fn breadth_first<'n, F, E>(
        &self,
        node: &'n mut Node,
        label: Vec<u8>,
        max_level: u32,
        callback: &mut F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        // The walk itself is already one level deep
        if max_level == 0 {
            return Ok(());
        }

        let mut queue: VecDeque<Pending<'n>> = VecDeque::new();
        queue.push_back(Pending {
            node,
            path: Vec::new(),
            label,
            depth: 1,
        });

        while let Some(Pending {
            node,
            path,
            label,
            depth,
        }) = queue.pop_front()
        {
            self.expand_level(node, path, &label, depth, max_level, &mut queue, callback)?;
        }
        Ok(())
    }

    /// Walk one directory level below `node` in key order
    ///
    /// Vertex boundaries inside the level are followed in place. At each
    /// separator the rest of the branch goes to the back of `queue`, so events
    /// come out level by level whatever the label compaction.
    #[allow(clippy::too_many_arguments)]
    fn expand_level<'n, F, E>(
        &self,
        node: &'n mut Node,
        mut path: Vec<u8>,
        label: &[u8],
        depth: u32,
        max_level: u32,
        queue: &mut VecDeque<Pending<'n>>,
        callback: &mut F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        self.cancel.check(&path)?;

        path.reserve(label.len());
        for (i, &byte) in label.iter().enumerate() {
            path.push(byte);
            if byte != self.separator {
                continue;
            }

            let rest = &label[i + 1..];
            let mut next = depth;
            if self.cross_separator(node, &path, rest.is_empty(), &mut next, max_level, callback)?
                == Step::MaxDepthReached
            {
                tracing::trace!(
                    path = %String::from_utf8_lossy(&path),
                    depth = next,
                    "collapsed below level bound"
                );
                return Ok(());
            }
            queue.push_back(Pending {
                node,
                path,
                label: rest.to_vec(),
                depth: next,
            });
            return Ok(());
        }

        self.emit_file(node, &path, callback)?;

        node.resolve_checked(self.loader, &self.cancel, &path)?;
        let Some(forks) = node.forks_mut() else {
            return Ok(());
        };
        for fork in forks.values_mut() {
            let Fork { label, child } = fork;
            self.expand_level(child, path.clone(), label, depth, max_level, queue, callback)?;
        }
        Ok(())
    }

    fn depth_first<F, E>(
        &self,
        node: &mut Node,
        mut path: Vec<u8>,
        label: &[u8],
        callback: &mut F,
    ) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        self.cancel.check(&path)?;

        let mut depth = 0;
        path.reserve(label.len());
        for (i, &byte) in label.iter().enumerate() {
            path.push(byte);
            if byte == self.separator {
                let closes_label = i + 1 == label.len();
                self.cross_separator(node, &path, closes_label, &mut depth, MAX_LEVEL, callback)?;
            }
        }
        self.emit_file(node, &path, callback)?;

        node.resolve_checked(self.loader, &self.cancel, &path)?;
        if let Some(forks) = node.forks_mut() {
            for fork in forks.values_mut() {
                self.depth_first(&mut fork.child, path.clone(), &fork.label, callback)?;
            }
        }
        Ok(())
    }

    /// Report the separator that ends `path` and step one level down
    ///
    /// A separator closing the label is the vertex's own boundary, so an
    /// explicitly stored directory hands its entry to the event.
    fn cross_separator<F, E>(
        &self,
        node: &Node,
        path: &[u8],
        closes_label: bool,
        depth: &mut u32,
        max_level: u32,
        callback: &mut F,
    ) -> std::result::Result<Step, E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        *depth = depth.saturating_add(1);

        let marker = if closes_label { node.entry() } else { None };
        self.emit(
            callback,
            &WalkEntry {
                kind: EntryKind::Directory,
                path,
                name: &[],
                reference: marker.map(|e| &e.reference),
                metadata: marker.map(|e| &e.metadata),
            },
        )?;

        if *depth > max_level {
            return Ok(Step::MaxDepthReached);
        }
        Ok(Step::Continue)
    }

    /// Report `node` as a file if it terminates a path that is not a directory
    fn emit_file<F, E>(&self, node: &Node, path: &[u8], callback: &mut F) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        let Some(entry) = node.entry() else {
            return Ok(());
        };
        match path.last() {
            Some(&last) if last != self.separator => {}
            _ => return Ok(()),
        }

        let split = path
            .iter()
            .rposition(|&b| b == self.separator)
            .map_or(0, |i| i + 1);
        self.emit(
            callback,
            &WalkEntry {
                kind: EntryKind::File,
                path: &path[..split],
                name: &path[split..],
                reference: Some(&entry.reference),
                metadata: Some(&entry.metadata),
            },
        )
    }

    fn emit<F, E>(&self, callback: &mut F, entry: &WalkEntry<'_>) -> std::result::Result<(), E>
    where
        F: FnMut(&WalkEntry<'_>) -> std::result::Result<(), E>,
        E: From<Error>,
    {
        self.cancel.check(entry.path)?;
        callback(entry)
    }
}
