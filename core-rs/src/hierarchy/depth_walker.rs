//! In-memory depth computation over a children adjacency map

use std::collections::HashMap;

use crate::traversal::BoundedWalk;

/// Node id to direct child ids, for nodes with at least one child.
/// Built once per metrics computation, dropped afterwards.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyMap {
    children: HashMap<String, Vec<String>>,
}

impl AdjacencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, children: Vec<String>) {
        self.children.insert(id.into(), children);
    }

    pub fn children_of(&self, id: &str) -> Option<&[String]> {
        self.children.get(id).map(Vec::as_slice)
    }

    /// True when `id` is a branching node
    pub fn contains(&self, id: &str) -> bool {
        self.children.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Depth below `node`, counted in edges from the depth `current_depth` it sits at.
///
/// Only branching children (those present in the map) are descended into, and
/// each node is expanded once per walk: a node reachable through two
/// ancestors is measured through whichever is reached first. Past the walk's
/// ceiling the current depth is returned as is.
pub fn depth(node: &str, adjacency: &AdjacencyMap, current_depth: usize, walk: &mut BoundedWalk) -> usize {
    if walk.exceeds(current_depth) {
        return current_depth;
    }

    let mut deepest = current_depth + 1;
    if let Some(children) = adjacency.children_of(node) {
        for child in children {
            if adjacency.contains(child) && walk.visit(child) {
                deepest = deepest.max(depth(child, adjacency, current_depth + 1, walk));
            }
        }
    }
    deepest
}

/// Depth of the hierarchy under `root`; 0 when the root has no children.
pub fn root_depth(root: &str, adjacency: &AdjacencyMap, walk: &mut BoundedWalk) -> usize {
    if !adjacency.contains(root) {
        return 0;
    }
    walk.visit(root);
    depth(root, adjacency, 0, walk)
}
