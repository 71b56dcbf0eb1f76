//! Breadcrumb tree reconstruction
//!
//! A tree is built for one focus node: the first root-ward path ending at a
//! designated root is expanded level by level, and every other child met on
//! the way is attached collapsed, carrying only its child count. Snapshots
//! live in a [`NodeArena`]; tree nodes refer to them by index.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Instant;
use tracing::{debug, info};

use super::partial_loader::PartialLoader;
use super::paths::PathBuilder;
use crate::config::EngineConfig;
use crate::errors::{HierarchyError, Result};
use crate::gateway::GraphGateway;
use crate::model::{Attribute, AttributeSet, Hierarchy, NodeArena, NodeSnapshot, Path};

/// Attributes loaded in one batch for every node on the chosen path
pub const TREE_PATH_PRELOAD: AttributeSet = AttributeSet::EMPTY
    .with(Attribute::Labels)
    .with(Attribute::Definitions)
    .with(Attribute::ChildCount)
    .with(Attribute::Obsolete);

/// One position in a [`TreeView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Index into the view's arena
    pub node: usize,
    pub children: Vec<TreeNode>,
    /// On the path from the root to the focus node
    pub expanded: bool,
    pub child_count: usize,
}

impl TreeNode {
    fn collapsed(node: usize, child_count: usize) -> Self {
        Self {
            node,
            children: Vec::new(),
            expanded: false,
            child_count,
        }
    }

    /// The expanded child, if any
    pub fn open_child(&self) -> Option<&TreeNode> {
        self.children.iter().find(|c| c.expanded)
    }
}

#[derive(Debug, Clone)]
pub struct TreeView {
    arena: NodeArena,
    root: TreeNode,
    focus: String,
}

impl TreeView {
    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn focus(&self) -> &str {
        &self.focus
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn snapshot(&self, node: &TreeNode) -> Option<&NodeSnapshot> {
        self.arena.get(node.node)
    }

    /// Id of the node a tree position refers to
    pub fn id_of(&self, node: &TreeNode) -> &str {
        self.snapshot(node).map(NodeSnapshot::id).unwrap_or_default()
    }

    /// True when no root-ward path reached a designated root
    pub fn is_degenerate(&self) -> bool {
        !self.root.expanded
    }

    /// Ids along the expanded chain, root first
    pub fn expanded_path(&self) -> Path {
        let mut ids = vec![self.id_of(&self.root).to_string()];
        let mut current = &self.root;
        while let Some(child) = current.open_child() {
            ids.push(self.id_of(child).to_string());
            current = child;
        }
        Path::new(ids)
    }

    /// Nodes in display order, each with its nesting level
    pub fn outline(&self) -> Vec<OutlineRow<'_>> {
        let mut rows = Vec::with_capacity(self.arena.len());
        self.collect_rows(&self.root, 0, &mut rows);
        rows
    }

    fn collect_rows<'v>(&'v self, node: &'v TreeNode, level: usize, rows: &mut Vec<OutlineRow<'v>>) {
        let Some(snapshot) = self.snapshot(node) else {
            return;
        };
        rows.push(OutlineRow {
            level,
            node,
            snapshot,
            focus: snapshot.id() == self.focus,
        });
        for child in &node.children {
            self.collect_rows(child, level + 1, rows);
        }
    }

    /// Indented plain-text outline, one node per line. Expanded nodes are
    /// marked `-`, collapsed ones `+` with their child count.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in self.outline() {
            let _ = writeln!(out, "{}", row.line(row.snapshot.display_label(), &row.node.child_count.to_string()));
        }
        out
    }
}

/// One line of a [`TreeView`] outline
#[derive(Debug, Clone, Copy)]
pub struct OutlineRow<'v> {
    pub level: usize,
    pub node: &'v TreeNode,
    pub snapshot: &'v NodeSnapshot,
    /// The node the tree was built for
    pub focus: bool,
}

impl OutlineRow<'_> {
    /// Format the row with caller-styled label and count
    pub fn line(&self, label: &str, count: &str) -> String {
        let indent = "  ".repeat(self.level);
        if self.node.expanded {
            format!("{}- {}", indent, label)
        } else if self.node.child_count > 0 {
            format!("{}+ {} ({})", indent, label, count)
        } else {
            format!("{}  {}", indent, label)
        }
    }

    pub fn is_obsolete(&self) -> bool {
        self.snapshot.is_obsolete().unwrap_or(false)
    }
}

pub struct TreeReconstructor<'a> {
    gateway: &'a dyn GraphGateway,
    config: &'a EngineConfig,
}

impl<'a> TreeReconstructor<'a> {
    pub fn new(gateway: &'a dyn GraphGateway, config: &'a EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn build_tree(&self, hierarchy: &Hierarchy, node: &str) -> Result<TreeView> {
        let started = Instant::now();
        let graph = hierarchy.id.as_str();

        let paths = PathBuilder::new(self.gateway, self.config).paths_to_root(graph, node)?;
        let chosen = paths
            .into_iter()
            .find(|p| p.root().map(|r| hierarchy.is_root(r)).unwrap_or(false));

        let Some(path) = chosen else {
            debug!(node, "no path reaches a designated root");
            return self.single_node(graph, node);
        };

        let ids = path.nodes();
        let details = self.gateway.fetch_attributes(graph, ids, TREE_PATH_PRELOAD)?;
        let mut arena = NodeArena::new();
        let mut counts = Vec::with_capacity(ids.len());
        for id in ids {
            let snapshot = details
                .get(id)
                .cloned()
                .ok_or_else(|| HierarchyError::not_loaded(id, Attribute::Labels))?;
            counts.push((id.clone(), snapshot.child_count()?));
            arena.insert(snapshot);
        }

        let mut children = PartialLoader::new(self.gateway, self.config).load_children(graph, &counts)?;

        // Assemble bottom-up so each level can take ownership of the one below.
        let mut below: Option<TreeNode> = None;
        for (id, count) in counts.iter().rev() {
            let mut level = TreeNode {
                node: arena
                    .index_of(id)
                    .ok_or_else(|| HierarchyError::NodeNotFound(id.clone()))?,
                children: Vec::new(),
                expanded: true,
                child_count: *count,
            };

            let mut open = below.take();
            for child in children.remove(id).unwrap_or_default() {
                let child_count = child.child_count()?;
                let child_id = child.id().to_string();
                let idx = arena.insert(child);
                match open.take() {
                    Some(next) if self.arena_id(&arena, next.node) == child_id => level.children.push(next),
                    other => {
                        open = other;
                        level.children.push(TreeNode::collapsed(idx, child_count));
                    }
                }
            }
            // The path child is missing from the listing when the graph changed between queries
            if let Some(next) = open {
                level.children.push(next);
            }

            sort_children(&arena, &mut level.children);
            below = Some(level);
        }

        let root = below.ok_or_else(|| HierarchyError::NodeNotFound(node.to_string()))?;
        info!(
            node,
            depth = ids.len(),
            nodes = arena.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "tree built"
        );
        Ok(TreeView {
            arena,
            root,
            focus: node.to_string(),
        })
    }

    fn arena_id<'n>(&self, arena: &'n NodeArena, idx: usize) -> &'n str {
        arena.get(idx).map(NodeSnapshot::id).unwrap_or_default()
    }

    fn single_node(&self, graph: &str, node: &str) -> Result<TreeView> {
        let ids = [node.to_string()];
        let mut details = self.gateway.fetch_attributes(graph, &ids, TREE_PATH_PRELOAD)?;
        let snapshot = details
            .remove(node)
            .ok_or_else(|| HierarchyError::not_loaded(node, Attribute::Labels))?;
        let child_count = snapshot.child_count()?;

        let mut arena = NodeArena::new();
        let idx = arena.insert(snapshot);
        Ok(TreeView {
            arena,
            root: TreeNode::collapsed(idx, child_count),
            focus: node.to_string(),
        })
    }
}

/// Case-insensitive by display label, then by id
fn sort_children(arena: &NodeArena, children: &mut [TreeNode]) {
    let mut keys: HashMap<usize, (String, String)> = HashMap::with_capacity(children.len());
    for child in children.iter() {
        if let Some(snapshot) = arena.get(child.node) {
            keys.insert(
                child.node,
                (snapshot.display_label().to_lowercase(), snapshot.id().to_string()),
            );
        }
    }
    children.sort_by(|a, b| keys.get(&a.node).cmp(&keys.get(&b.node)));
}
