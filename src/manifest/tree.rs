//! Hierarchical path namespace
//!
//! A [`PathTree`] maps slash-separated paths to leaf payloads while keeping
//! the directory structure around for traversal and dumps.
//!
//! ## Structure
//!
//! ```text
//! root/
//!   ui/
//!     x.png      -> payload
//!     zonemaps/
//!       zone1    -> payload
//! ```
//!
//! Nodes live in an arena and refer to their children by index. Children are
//! kept in insertion order, so traversal and dumps are reproducible without
//! sorting.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::error::{Result, tree as tree_error};

type NodeId = usize;

const ROOT: NodeId = 0;

#[derive(Debug, Clone)]
enum NodeKind<T> {
    Dir {
        children: Vec<NodeId>,
        lookup: HashMap<String, NodeId>,
    },
    Leaf(T),
}

#[derive(Debug, Clone)]
struct Node<T> {
    name: String,
    kind: NodeKind<T>,
}

impl<T> Node<T> {
    fn dir(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Dir {
                children: Vec::new(),
                lookup: HashMap::new(),
            },
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir { .. })
    }
}

/// One node visited by [`PathTree::iter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry<'a, T> {
    /// Full path relative to the tree root
    pub path: String,
    /// Number of segments above this node
    pub depth: usize,
    pub is_dir: bool,
    /// Leaf payload, `None` for directories
    pub payload: Option<&'a T>,
}

/// Slash-separated path namespace with leaf payloads
#[derive(Debug, Clone)]
pub struct PathTree<T> {
    nodes: Vec<Node<T>>,
    leaf_count: usize,
}

/// Split a path into its non-empty segments
///
/// Stray slashes are ignored here, so alias paths like `ui/zonemaps/` look
/// up the same node. Manifest paths are rejected on parse unless canonical.
fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl<T> PathTree<T> {
    /// Create an empty tree whose root is labeled `root_name` in dumps
    pub fn new(root_name: &str) -> Self {
        Self {
            nodes: vec![Node::dir(root_name)],
            leaf_count: 0,
        }
    }

    /// Label of the synthetic root node
    pub fn root_name(&self) -> &str {
        &self.nodes[ROOT].name
    }

    /// Number of leaves in the tree
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    pub fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        match &self.nodes[parent].kind {
            NodeKind::Dir { lookup, .. } => lookup.get(name).copied(),
            NodeKind::Leaf(_) => None,
        }
    }

    fn push_child(&mut self, parent: NodeId, node: Node<T>) -> NodeId {
        let id = self.nodes.len();
        let name = node.name.clone();
        self.nodes.push(node);
        if let NodeKind::Dir { children, lookup } = &mut self.nodes[parent].kind {
            children.push(id);
            lookup.insert(name, id);
        }
        id
    }

    /// Insert a payload at `path`, creating intermediate directories
    ///
    /// # Errors
    ///
    /// Returns a path conflict if the path is empty, if an intermediate
    /// segment is already a leaf, or if the full path already exists.
    /// Existing entries are never overwritten.
    pub fn insert(&mut self, path: &str, payload: T) -> Result<()> {
        let segs = segments(path);
        let Some((leaf_name, dirs)) = segs.split_last() else {
            return Err(tree_error::conflict(path, "empty path"));
        };

        let mut current = ROOT;
        for (depth, seg) in dirs.iter().enumerate() {
            current = match self.child(current, seg) {
                Some(id) if self.nodes[id].is_dir() => id,
                Some(_) => {
                    return Err(tree_error::conflict(
                        path,
                        format!("segment '{}' is a leaf", dirs[..=depth].join("/")),
                    ));
                }
                None => self.push_child(current, Node::dir(seg)),
            };
        }

        if let Some(existing) = self.child(current, leaf_name) {
            let reason = if self.nodes[existing].is_dir() {
                "path is a directory"
            } else {
                "path already exists"
            };
            return Err(tree_error::conflict(path, reason));
        }

        self.push_child(
            current,
            Node {
                name: (*leaf_name).to_string(),
                kind: NodeKind::Leaf(payload),
            },
        );
        self.leaf_count += 1;
        Ok(())
    }

    /// Resolve a path to its node, `None` if any segment is missing
    ///
    /// Walking through a leaf is a conflict rather than a miss.
    fn locate(&self, path: &str) -> Result<Option<NodeId>> {
        let segs = segments(path);
        let mut current = ROOT;
        for (depth, seg) in segs.iter().enumerate() {
            if !self.nodes[current].is_dir() {
                return Err(tree_error::conflict(
                    path,
                    format!("segment '{}' is a leaf", segs[..depth].join("/")),
                ));
            }
            match self.child(current, seg) {
                Some(id) => current = id,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Whether `path` names an existing node (leaf or directory)
    ///
    /// # Errors
    ///
    /// Returns a path conflict if an intermediate segment is a leaf.
    pub fn contains(&self, path: &str) -> Result<bool> {
        Ok(self.locate(path)?.is_some_and(|id| id != ROOT))
    }

    /// Whether `path` names an existing directory
    pub fn is_dir(&self, path: &str) -> Result<bool> {
        Ok(self
            .locate(path)?
            .is_some_and(|id| id != ROOT && self.nodes[id].is_dir()))
    }

    /// Payload stored at `path`, if it is a leaf
    pub fn get(&self, path: &str) -> Option<&T> {
        match self.locate(path) {
            Ok(Some(id)) => match &self.nodes[id].kind {
                NodeKind::Leaf(payload) => Some(payload),
                NodeKind::Dir { .. } => None,
            },
            _ => None,
        }
    }

    /// Pre-order traversal of every node below the root
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::starting_at(self, ROOT, String::new(), 0)
    }

    /// Leaves below the directory at `path`, with paths relative to it
    ///
    /// # Errors
    ///
    /// Returns a not found error if `path` is not a directory in this tree.
    pub fn leaves_under(&self, path: &str) -> Result<Vec<(String, &T)>> {
        let id = match self.locate(path)? {
            Some(id) if id != ROOT && self.nodes[id].is_dir() => id,
            _ => return Err(tree_error::not_found(path)),
        };
        Ok(Iter::starting_at(self, id, String::new(), 0)
            .filter_map(|entry| entry.payload.map(|p| (entry.path, p)))
            .collect())
    }

    /// Leaves in traversal order
    pub fn leaves(&self) -> impl Iterator<Item = (String, &T)> {
        self.iter()
            .filter_map(|entry| entry.payload.map(|p| (entry.path, p)))
    }

    /// Indented listing of the tree for diagnostics
    pub fn dump(&self) -> String {
        let mut out = format!("{}/\n", self.root_name());
        for entry in self.iter() {
            let indent = "  ".repeat(entry.depth + 1);
            let name = entry.path.rsplit('/').next().unwrap_or_default();
            let suffix = if entry.is_dir { "/" } else { "" };
            let _ = writeln!(out, "{indent}{name}{suffix}");
        }
        out
    }
}

/// Lazy pre-order traversal over a [`PathTree`]
pub struct Iter<'a, T> {
    tree: &'a PathTree<T>,
    /// Pending nodes with their parent path and depth
    stack: Vec<(NodeId, String, usize)>,
}

impl<'a, T> Iter<'a, T> {
    fn starting_at(tree: &'a PathTree<T>, dir: NodeId, prefix: String, depth: usize) -> Self {
        let mut iter = Self {
            tree,
            stack: Vec::new(),
        };
        iter.push_children(dir, &prefix, depth);
        iter
    }

    fn push_children(&mut self, dir: NodeId, prefix: &str, depth: usize) {
        let tree = self.tree;
        if let NodeKind::Dir { children, .. } = &tree.nodes[dir].kind {
            for &child in children.iter().rev() {
                self.stack.push((child, prefix.to_string(), depth));
            }
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = TreeEntry<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, prefix, depth) = self.stack.pop()?;
        let tree = self.tree;
        let node = &tree.nodes[id];
        let path = if prefix.is_empty() {
            node.name.clone()
        } else {
            format!("{prefix}/{}", node.name)
        };

        match &node.kind {
            NodeKind::Dir { .. } => {
                self.push_children(id, &path, depth + 1);
                Some(TreeEntry {
                    path,
                    depth,
                    is_dir: true,
                    payload: None,
                })
            }
            NodeKind::Leaf(payload) => Some(TreeEntry {
                path,
                depth,
                is_dir: false,
                payload: Some(payload),
            }),
        }
    }
}
