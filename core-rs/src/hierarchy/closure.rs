//! Transitive ancestor and descendant closure
//!
//! The backend is never asked for a transitive pattern. The closure is
//! widened one level at a time instead: every node on the frontier is
//! fetched in one batch, and whatever it points at that the walk has not
//! seen yet becomes the next frontier.

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::errors::{HierarchyError, Result};
use crate::gateway::GraphGateway;
use crate::model::{Attribute, AttributeSet};
use crate::traversal::BoundedWalk;

/// Which edge the closure follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Up `subClassOf`, towards the roots
    Ancestors,
    /// Down `subClassOf`, towards the leaves
    Descendants,
}

impl Direction {
    fn attribute(self) -> Attribute {
        match self {
            Direction::Ancestors => Attribute::Parents,
            Direction::Descendants => Attribute::Children,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Direction::Ancestors => "ancestor",
            Direction::Descendants => "descendant",
        }
    }
}

pub struct ClosureWalker<'a> {
    gateway: &'a dyn GraphGateway,
    config: &'a EngineConfig,
}

impl<'a> ClosureWalker<'a> {
    pub fn new(gateway: &'a dyn GraphGateway, config: &'a EngineConfig) -> Self {
        Self { gateway, config }
    }

    /// Every node reachable from `node` along `direction`, sorted.
    ///
    /// `node` itself and the sentinel are never part of the result, even
    /// when a cycle leads back to them.
    pub fn closure(&self, graph: &str, node: &str, direction: Direction) -> Result<Vec<String>> {
        let sentinel = self.config.vocabulary.sentinel.as_str();
        let attribute = direction.attribute();
        let request = AttributeSet::EMPTY.with(attribute);

        let mut walk = BoundedWalk::new(self.config.depth_ceiling);
        walk.visit(node);
        walk.visit(sentinel);

        let mut reached: Vec<String> = Vec::new();
        let mut frontier = vec![node.to_string()];
        let mut level = 0;

        while !frontier.is_empty() {
            level += 1;
            if walk.exceeds(level) {
                warn!(
                    node,
                    ceiling = self.config.depth_ceiling,
                    "{} closure truncated at ceiling",
                    direction.name()
                );
                break;
            }

            let fetched = self.gateway.fetch_attributes(graph, &frontier, request)?;
            let mut next = Vec::new();
            for id in &frontier {
                let snapshot = fetched
                    .get(id)
                    .ok_or_else(|| HierarchyError::not_loaded(id, attribute))?;
                let neighbours = match direction {
                    Direction::Ancestors => snapshot.parents()?,
                    Direction::Descendants => snapshot.children()?,
                };
                for neighbour in neighbours {
                    if walk.visit(neighbour) {
                        next.push(neighbour.clone());
                    }
                }
            }

            reached.extend(next.iter().cloned());
            next.sort();
            frontier = next;
        }

        walk.ensure_complete(self.config.strict_cycles, &format!("{} closure of {}", direction.name(), node))?;

        reached.sort();
        reached.dedup();
        debug!(node, reached = reached.len(), levels = level, "{} closure built", direction.name());
        Ok(reached)
    }
}
