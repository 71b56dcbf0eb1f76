//! Hierarchy engine
//!
//! Caller-facing entry point: owns one gateway and one configuration and
//! runs each computation to completion on the calling thread. No traversal
//! state survives between calls.

use tracing::{error, info};

use crate::config::EngineConfig;
use crate::errors::{HierarchyError, Result};
use crate::gateway::{BoundedPattern, GraphGateway};
use crate::hierarchy::{ClosureWalker, Direction, MetricsCalculator, PathBuilder, TreeReconstructor, TreeView};
use crate::model::{Hierarchy, HierarchyMetrics, Path};

/// High-level hierarchy computations over one graph backend
pub struct HierarchyEngine {
    /// Graph backend every computation queries
    gateway: Box<dyn GraphGateway>,

    /// Thresholds, ceilings and vocabulary
    config: EngineConfig,
}

impl HierarchyEngine {
    /// Create an engine, rejecting invalid configuration up front
    pub fn new<G: GraphGateway + 'static>(gateway: G, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gateway: Box::new(gateway),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn gateway(&self) -> &dyn GraphGateway {
        self.gateway.as_ref()
    }

    /// Classes of `graph` with no parent besides the sentinel, sorted
    pub fn find_roots(&self, graph: &str) -> Result<Vec<String>> {
        let rows = self.gateway.execute_bounded_pattern(graph, &BoundedPattern::TopClasses)?;
        let mut roots: Vec<String> = rows.into_iter().filter_map(|mut row| row.remove("id")).collect();
        roots.sort();
        roots.dedup();
        info!(graph, roots = roots.len(), "roots discovered");
        Ok(roots)
    }

    /// Hierarchy for `graph` with its roots discovered from the graph itself
    pub fn discover_hierarchy(&self, graph: &str, flat: bool) -> Result<Hierarchy> {
        let roots = self.find_roots(graph)?;
        Ok(Hierarchy::new(graph).with_roots(roots).flat(flat))
    }

    /// Structural metrics of `hierarchy`.
    ///
    /// A failure is logged here and returned; it never turns into a
    /// zero-filled record.
    pub fn compute_metrics(&self, hierarchy: &Hierarchy) -> Result<HierarchyMetrics> {
        MetricsCalculator::new(self.gateway(), &self.config)
            .compute(hierarchy)
            .map_err(|e| {
                error!(graph = %hierarchy.id, error = %e, "hierarchy metrics failed");
                e
            })
    }

    /// Every acyclic path from `node` up to a top node, root first
    pub fn build_paths_to_root(&self, graph: &str, node: &str) -> Result<Vec<Path>> {
        PathBuilder::new(self.gateway(), &self.config).paths_to_root(graph, node)
    }

    /// Every transitive superclass of `node`, sorted, sentinel excluded
    pub fn ancestors(&self, graph: &str, node: &str) -> Result<Vec<String>> {
        ClosureWalker::new(self.gateway(), &self.config).closure(graph, node, Direction::Ancestors)
    }

    /// Every transitive subclass of `node`, sorted
    pub fn descendants(&self, graph: &str, node: &str) -> Result<Vec<String>> {
        ClosureWalker::new(self.gateway(), &self.config).closure(graph, node, Direction::Descendants)
    }

    /// Breadcrumb tree for `node`
    pub fn build_tree(&self, hierarchy: &Hierarchy, node: &str) -> Result<TreeView> {
        if node.trim().is_empty() {
            return Err(HierarchyError::NodeNotFound(node.to_string()));
        }
        TreeReconstructor::new(self.gateway(), &self.config)
            .build_tree(hierarchy, node)
            .map_err(|e| {
                error!(graph = %hierarchy.id, node, error = %e, "tree build failed");
                e
            })
    }
}
