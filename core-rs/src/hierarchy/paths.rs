//! Root-ward path enumeration
//!
//! Starting from one node, parents are fetched level by level (one batched
//! fetch per level for every open branch). A branch whose tail has several
//! parents forks once per parent. Parents already on the branch and the
//! sentinel top node are never appended, so every branch ends at a node with
//! nothing left to climb to. Forking stops once `maxPaths` branches exist.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::errors::{HierarchyError, Result};
use crate::gateway::GraphGateway;
use crate::model::{Attribute, AttributeSet, Path};
use crate::traversal::BoundedWalk;

pub const PATH_PRELOAD: AttributeSet = AttributeSet::EMPTY.with(Attribute::Parents);

/// One path under construction, leaf first
#[derive(Debug, Clone)]
struct Branch {
    nodes: Vec<String>,
    walk: BoundedWalk,
}

impl Branch {
    fn tail(&self) -> &str {
        self.nodes.last().map(String::as_str).unwrap_or_default()
    }

    fn push(&mut self, id: &str) {
        self.walk.visit(id);
        self.nodes.push(id.to_string());
    }

    fn into_path(self) -> Path {
        let mut nodes = self.nodes;
        nodes.reverse();
        Path::new(nodes)
    }
}

pub struct PathBuilder<'a> {
    gateway: &'a dyn GraphGateway,
    config: &'a EngineConfig,
}

impl<'a> PathBuilder<'a> {
    pub fn new(gateway: &'a dyn GraphGateway, config: &'a EngineConfig) -> Self {
        Self { gateway, config }
    }

    /// Every acyclic path from `node` up to a top node, returned root first.
    pub fn paths_to_root(&self, graph: &str, node: &str) -> Result<Vec<Path>> {
        let sentinel = self.config.vocabulary.sentinel.as_str();

        let mut first = Branch {
            nodes: Vec::new(),
            walk: BoundedWalk::new(self.config.depth_ceiling),
        };
        first.push(node);

        let mut open = vec![first];
        let mut finished: Vec<Branch> = Vec::new();
        let mut parents_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut truncated = false;
        let mut capped = false;

        while !open.is_empty() {
            self.fetch_parents(graph, &open, &mut parents_of)?;

            let pending = open.len();
            let mut next = Vec::with_capacity(pending);
            for (i, mut branch) in open.drain(..).enumerate() {
                let mut seen = HashSet::new();
                let mut candidates: Vec<String> = parents_of
                    .get(branch.tail())
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .filter(|p| p.as_str() != sentinel && !branch.walk.is_visited(p))
                    .filter(|p| seen.insert(p.as_str()))
                    .cloned()
                    .collect();

                if candidates.is_empty() {
                    finished.push(branch);
                    continue;
                }
                if branch.walk.exceeds(branch.nodes.len()) {
                    truncated = true;
                    warn!(node, ceiling = self.config.depth_ceiling, "ancestor path truncated at ceiling");
                    if self.config.strict_cycles {
                        return Err(HierarchyError::MalformedHierarchy(format!(
                            "ancestor path from {} exceeded the traversal ceiling of {}",
                            node, self.config.depth_ceiling
                        )));
                    }
                    finished.push(branch);
                    continue;
                }

                // Branches alive once this one moves on: finished, already advanced, and not yet visited
                let live = finished.len() + next.len() + (pending - i);
                let forks = self.config.max_paths.saturating_sub(live);
                if candidates.len() > forks + 1 {
                    if !capped {
                        warn!(node, max_paths = self.config.max_paths, "ancestor paths capped");
                    }
                    capped = true;
                    if self.config.strict_cycles {
                        return Err(HierarchyError::MalformedHierarchy(format!(
                            "{} has more than {} paths to the top",
                            node, self.config.max_paths
                        )));
                    }
                    candidates.truncate(forks + 1);
                }

                if let Some((last, rest)) = candidates.split_last() {
                    for parent in rest {
                        let mut fork = branch.clone();
                        fork.push(parent);
                        next.push(fork);
                    }
                    branch.push(last);
                    next.push(branch);
                }
            }
            open = next;
        }

        debug!(node, paths = finished.len(), truncated, capped, "paths to root built");
        Ok(finished.into_iter().map(Branch::into_path).collect())
    }

    /// One batched parents fetch for every open tail not seen yet
    fn fetch_parents(
        &self,
        graph: &str,
        open: &[Branch],
        parents_of: &mut HashMap<String, Vec<String>>,
    ) -> Result<()> {
        let mut missing: Vec<String> = open
            .iter()
            .map(|b| b.tail().to_string())
            .filter(|id| !parents_of.contains_key(id))
            .collect();
        missing.sort();
        missing.dedup();
        if missing.is_empty() {
            return Ok(());
        }

        let fetched = self.gateway.fetch_attributes(graph, &missing, PATH_PRELOAD)?;
        for id in missing {
            let snapshot = fetched
                .get(&id)
                .ok_or_else(|| HierarchyError::not_loaded(&id, Attribute::Parents))?;
            let parents = snapshot.parents()?.to_vec();
            parents_of.insert(id, parents);
        }
        Ok(())
    }
}
