//! Node snapshots, hierarchies and computed records
//!
//! Attribute access is explicit: a [`NodeSnapshot`] remembers which
//! [`Attribute`]s were requested when it was fetched, and reading anything
//! outside that set fails with `AttributeNotLoaded` instead of triggering a
//! lazy fetch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{HierarchyError, Result};

/// Node attributes a computation may ask the gateway for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Attribute {
    Parents,
    Children,
    ChildCount,
    Labels,
    Definitions,
    Obsolete,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Parents,
        Attribute::Children,
        Attribute::ChildCount,
        Attribute::Labels,
        Attribute::Definitions,
        Attribute::Obsolete,
    ];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Parents => "parents",
            Attribute::Children => "children",
            Attribute::ChildCount => "childCount",
            Attribute::Labels => "labels",
            Attribute::Definitions => "definitions",
            Attribute::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared set of attributes for one fetch.
///
/// Built with `const` chaining so each computation can name its request up front:
///
/// ```
/// use onto_hierarchy::{Attribute, AttributeSet};
///
/// const REQUEST: AttributeSet = AttributeSet::EMPTY
///     .with(Attribute::Children)
///     .with(Attribute::Definitions);
/// assert!(REQUEST.contains(Attribute::Children));
/// assert!(!REQUEST.contains(Attribute::Parents));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet(u8);

impl AttributeSet {
    pub const EMPTY: AttributeSet = AttributeSet(0);

    pub const fn with(self, attribute: Attribute) -> Self {
        AttributeSet(self.0 | attribute.bit())
    }

    pub const fn union(self, other: AttributeSet) -> Self {
        AttributeSet(self.0 | other.0)
    }

    pub const fn contains(self, attribute: Attribute) -> bool {
        self.0 & attribute.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

impl FromIterator<Attribute> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        iter.into_iter().fold(AttributeSet::EMPTY, AttributeSet::with)
    }
}

/// Immutable view of one class as returned by the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    id: String,
    loaded: AttributeSet,
    parents: Vec<String>,
    children: Vec<String>,
    child_count: usize,
    pref_label: Option<String>,
    synonyms: Vec<String>,
    definitions: Vec<String>,
    obsolete: bool,
}

impl NodeSnapshot {
    /// Empty snapshot for `id` claiming the attributes in `loaded`.
    /// Gateways fill the values in with the `with_*` builders.
    pub fn new(id: impl Into<String>, loaded: AttributeSet) -> Self {
        Self {
            id: id.into(),
            loaded,
            parents: Vec::new(),
            children: Vec::new(),
            child_count: 0,
            pref_label: None,
            synonyms: Vec::new(),
            definitions: Vec::new(),
            obsolete: false,
        }
    }

    pub fn with_parents(mut self, parents: Vec<String>) -> Self {
        self.parents = parents;
        self
    }

    pub fn with_children(mut self, children: Vec<String>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child_count(mut self, count: usize) -> Self {
        self.child_count = count;
        self
    }

    pub fn with_labels(mut self, pref_label: Option<String>, synonyms: Vec<String>) -> Self {
        self.pref_label = pref_label;
        self.synonyms = synonyms;
        self
    }

    pub fn with_definitions(mut self, definitions: Vec<String>) -> Self {
        self.definitions = definitions;
        self
    }

    pub fn with_obsolete(mut self, obsolete: bool) -> Self {
        self.obsolete = obsolete;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn loaded(&self) -> AttributeSet {
        self.loaded
    }

    fn require(&self, attribute: Attribute) -> Result<()> {
        if self.loaded.contains(attribute) {
            Ok(())
        } else {
            Err(HierarchyError::not_loaded(&self.id, attribute))
        }
    }

    pub fn parents(&self) -> Result<&[String]> {
        self.require(Attribute::Parents)?;
        Ok(&self.parents)
    }

    pub fn children(&self) -> Result<&[String]> {
        self.require(Attribute::Children)?;
        Ok(&self.children)
    }

    /// Number of direct children; answered from `ChildCount` when it was
    /// requested, otherwise from a loaded children list.
    pub fn child_count(&self) -> Result<usize> {
        if self.loaded.contains(Attribute::ChildCount) {
            return Ok(self.child_count);
        }
        self.children().map(|c| c.len())
    }

    pub fn pref_label(&self) -> Result<Option<&str>> {
        self.require(Attribute::Labels)?;
        Ok(self.pref_label.as_deref())
    }

    pub fn synonyms(&self) -> Result<&[String]> {
        self.require(Attribute::Labels)?;
        Ok(&self.synonyms)
    }

    pub fn definitions(&self) -> Result<&[String]> {
        self.require(Attribute::Definitions)?;
        Ok(&self.definitions)
    }

    pub fn has_definition(&self) -> Result<bool> {
        self.definitions().map(|d| !d.is_empty())
    }

    pub fn is_obsolete(&self) -> Result<bool> {
        self.require(Attribute::Obsolete)?;
        Ok(self.obsolete)
    }

    /// Label for display: prefLabel when loaded, else the IRI fragment.
    pub fn display_label(&self) -> &str {
        if let Some(label) = self.pref_label.as_deref() {
            return label;
        }
        self.id
            .rsplit(|c: char| c == '#' || c == '/')
            .find(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }

    /// Fold attributes loaded by another fetch of the same node into this one.
    pub fn absorb(&mut self, other: NodeSnapshot) {
        debug_assert_eq!(self.id, other.id);
        for attribute in other.loaded.iter() {
            if self.loaded.contains(attribute) {
                continue;
            }
            match attribute {
                Attribute::Parents => self.parents = other.parents.clone(),
                Attribute::Children => self.children = other.children.clone(),
                Attribute::ChildCount => self.child_count = other.child_count,
                Attribute::Labels => {
                    self.pref_label = other.pref_label.clone();
                    self.synonyms = other.synonyms.clone();
                }
                Attribute::Definitions => self.definitions = other.definitions.clone(),
                Attribute::Obsolete => self.obsolete = other.obsolete,
            }
        }
        self.loaded = self.loaded.union(other.loaded);
    }
}

/// One submission: a named graph plus its designated roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hierarchy {
    pub id: String,
    pub roots: Vec<String>,
    /// Parent/child structure carries no meaning for depth or branching
    pub flat: bool,
}

impl Hierarchy {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roots: Vec::new(),
            flat: false,
        }
    }

    pub fn with_roots<I, S>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn flat(mut self, flat: bool) -> Self {
        self.flat = flat;
        self
    }

    pub fn is_root(&self, id: &str) -> bool {
        self.roots.iter().any(|r| r == id)
    }
}

/// Aggregate structural statistics of one hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyMetrics {
    pub classes: u64,
    /// Truncated mean over nodes with at least one child
    pub average_child_count: u64,
    pub max_child_count: u64,
    pub classes_with_one_child: u64,
    #[serde(rename = "classesWithMoreThan25Children")]
    pub classes_with_more_than_25_children: u64,
    pub classes_with_no_definition: u64,
    pub max_depth: u64,
    pub individuals: u64,
    pub properties: u64,
}

/// Root-first sequence of node ids; no id appears twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    nodes: Vec<String>,
}

impl Path {
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    pub fn root(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn leaf(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.nodes.join(" > "))
    }
}

/// Arena of snapshots addressed by index
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<NodeSnapshot>,
    index: HashMap<String, usize>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a snapshot, merging with an existing entry for the same id.
    pub fn insert(&mut self, snapshot: NodeSnapshot) -> usize {
        if let Some(&idx) = self.index.get(snapshot.id()) {
            self.nodes[idx].absorb(snapshot);
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(snapshot.id().to_string(), idx);
        self.nodes.push(snapshot);
        idx
    }

    pub fn get(&self, idx: usize) -> Option<&NodeSnapshot> {
        self.nodes.get(idx)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&NodeSnapshot> {
        self.index_of(id).and_then(|idx| self.nodes.get(idx))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
