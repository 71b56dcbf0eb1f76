//! Structural metrics of a class hierarchy
//!
//! Pages through every class once, preloading child ids and definitions,
//! and builds an [`AdjacencyMap`] on the way so depth needs no further
//! queries (unless the probe strategy is configured). Any gateway failure
//! aborts the computation; no partial metrics are ever returned.

use std::time::Instant;
use tracing::{debug, info, warn};

use super::depth_prober::probe_depth;
use super::depth_walker::{root_depth, AdjacencyMap};
use crate::config::{
    DepthStrategy, EngineConfig, OWL_DATATYPE_PROPERTY, OWL_NAMED_INDIVIDUAL, OWL_OBJECT_PROPERTY,
};
use crate::errors::{HierarchyError, Result};
use crate::gateway::{BoundedPattern, GraphGateway, ListingScope};
use crate::model::{Attribute, AttributeSet, Hierarchy, HierarchyMetrics};
use crate::traversal::BoundedWalk;

/// Attributes every listed class is fetched with
pub const METRICS_PRELOAD: AttributeSet = AttributeSet::EMPTY
    .with(Attribute::Children)
    .with(Attribute::Definitions);

pub struct MetricsCalculator<'a> {
    gateway: &'a dyn GraphGateway,
    config: &'a EngineConfig,
}

impl<'a> MetricsCalculator<'a> {
    pub fn new(gateway: &'a dyn GraphGateway, config: &'a EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn compute(&self, hierarchy: &Hierarchy) -> Result<HierarchyMetrics> {
        let started = Instant::now();
        info!(graph = %hierarchy.id, flat = hierarchy.flat, roots = hierarchy.roots.len(), "computing hierarchy metrics");

        let mut metrics = self.class_metrics(hierarchy)?;
        metrics.individuals = self.count_instances(&hierarchy.id, OWL_NAMED_INDIVIDUAL)?;
        metrics.properties = self.count_instances(&hierarchy.id, OWL_DATATYPE_PROPERTY)?
            + self.count_instances(&hierarchy.id, OWL_OBJECT_PROPERTY)?;

        info!(
            graph = %hierarchy.id,
            classes = metrics.classes,
            max_depth = metrics.max_depth,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "hierarchy metrics finished"
        );
        Ok(metrics)
    }

    fn class_metrics(&self, hierarchy: &Hierarchy) -> Result<HierarchyMetrics> {
        let mut metrics = HierarchyMetrics::default();
        let mut child_counts: Vec<u64> = Vec::new();
        let mut adjacency = AdjacencyMap::new();

        let mut page = 1;
        loop {
            let t0 = Instant::now();
            let listing = self.gateway.execute_paged_listing(
                &hierarchy.id,
                &ListingScope::Classes,
                page,
                self.config.page_size,
                METRICS_PRELOAD,
            )?;
            debug!(
                page,
                classes = listing.nodes.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "metrics page retrieved"
            );

            for node in &listing.nodes {
                metrics.classes += 1;
                if !node.has_definition()? {
                    metrics.classes_with_no_definition += 1;
                }
                if hierarchy.flat {
                    continue;
                }

                let children = node.children()?;
                let count = children.len();
                if count > self.config.large_fanout {
                    metrics.classes_with_more_than_25_children += 1;
                }
                if count == 1 {
                    metrics.classes_with_one_child += 1;
                }
                if count > 0 {
                    child_counts.push(count as u64);
                    adjacency.insert(node.id(), children.to_vec());
                }
            }

            if !listing.has_next {
                break;
            }
            page += 1;
        }

        if !hierarchy.flat {
            metrics.max_depth = self.max_depth(hierarchy, &adjacency)? as u64;
            if let Some(&max) = child_counts.iter().max() {
                let sum: u64 = child_counts.iter().sum();
                metrics.max_child_count = max;
                metrics.average_child_count = sum / child_counts.len() as u64;
            }
        }
        Ok(metrics)
    }

    fn max_depth(&self, hierarchy: &Hierarchy, adjacency: &AdjacencyMap) -> Result<usize> {
        let ceiling = self.config.depth_ceiling;
        let strict = self.config.strict_cycles;
        let mut deepest = 0;

        for root in &hierarchy.roots {
            let depth = match self.config.depth_strategy {
                DepthStrategy::Walk => {
                    let mut walk = BoundedWalk::new(ceiling);
                    let depth = root_depth(root, adjacency, &mut walk);
                    if walk.truncated() {
                        warn!(root = %root, ceiling, "depth walk truncated at ceiling");
                    }
                    walk.ensure_complete(strict, &format!("depth walk from {}", root))?;
                    depth
                }
                DepthStrategy::Probe => {
                    let probed = probe_depth(
                        self.gateway,
                        &hierarchy.id,
                        root,
                        &self.config.vocabulary.sub_class_of,
                        ceiling,
                    )?;
                    if probed.truncated {
                        warn!(root = %root, ceiling, "depth probing stopped at ceiling");
                        if strict {
                            return Err(HierarchyError::MalformedHierarchy(format!(
                                "depth probe from {} exceeded the traversal ceiling of {}",
                                root, ceiling
                            )));
                        }
                    }
                    probed.depth
                }
            };
            debug!(root = %root, depth, "root depth");
            deepest = deepest.max(depth);
        }
        Ok(deepest)
    }

    fn count_instances(&self, graph: &str, type_iri: &str) -> Result<u64> {
        let pattern = BoundedPattern::CountInstances {
            type_iri: type_iri.to_string(),
        };
        let rows = self.gateway.execute_bounded_pattern(graph, &pattern)?;
        match rows.first().and_then(|row| row.get("count")) {
            Some(value) => value.parse::<u64>().map_err(|_| {
                HierarchyError::QueryFailure(format!("non-numeric count for {}: {}", type_iri, value))
            }),
            None => Ok(0),
        }
    }
}
