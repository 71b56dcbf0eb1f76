//! Fan-out aware child loading
//!
//! Nodes with more children than the configured threshold are walked page by
//! page (page size = threshold). All other nodes share a single batched
//! children fetch, followed by one batched fetch of the children's own
//! labels and child counts.

use std::collections::HashMap;
use tracing::debug;

use crate::config::EngineConfig;
use crate::errors::{HierarchyError, Result};
use crate::gateway::{GraphGateway, ListingScope};
use crate::model::{Attribute, AttributeSet, NodeSnapshot};

/// Attributes loaded for every child placed in a tree
pub const CHILD_PRELOAD: AttributeSet = AttributeSet::EMPTY
    .with(Attribute::Labels)
    .with(Attribute::ChildCount)
    .with(Attribute::Obsolete);

const CHILD_LIST: AttributeSet = AttributeSet::EMPTY.with(Attribute::Children);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildLoad {
    Paged,
    Bulk,
}

pub struct PartialLoader<'a> {
    gateway: &'a dyn GraphGateway,
    config: &'a EngineConfig,
}

impl<'a> PartialLoader<'a> {
    pub fn new(gateway: &'a dyn GraphGateway, config: &'a EngineConfig) -> Self {
        Self { gateway, config }
    }

    pub fn strategy(&self, child_count: usize) -> ChildLoad {
        if child_count > self.config.fanout_threshold {
            ChildLoad::Paged
        } else {
            ChildLoad::Bulk
        }
    }

    /// Children of each `(id, child_count)` parent, each child carrying
    /// [`CHILD_PRELOAD`]. Every requested parent gets an entry.
    pub fn load_children(
        &self,
        graph: &str,
        parents: &[(String, usize)],
    ) -> Result<HashMap<String, Vec<NodeSnapshot>>> {
        let mut loaded = HashMap::new();
        let mut bulk = Vec::new();

        for (id, count) in parents {
            match self.strategy(*count) {
                ChildLoad::Paged => {
                    let children = self.page_children(graph, id)?;
                    loaded.insert(id.clone(), children);
                }
                ChildLoad::Bulk if *count > 0 => bulk.push(id.clone()),
                ChildLoad::Bulk => {
                    loaded.insert(id.clone(), Vec::new());
                }
            }
        }

        if !bulk.is_empty() {
            loaded.extend(self.bulk_children(graph, &bulk)?);
        }
        Ok(loaded)
    }

    fn page_children(&self, graph: &str, id: &str) -> Result<Vec<NodeSnapshot>> {
        let scope = ListingScope::ChildrenOf(id.to_string());
        let page_size = self.config.fanout_threshold;
        let mut children = Vec::new();
        let mut page = 1;
        loop {
            let listing = self
                .gateway
                .execute_paged_listing(graph, &scope, page, page_size, CHILD_PRELOAD)?;
            children.extend(listing.nodes);
            if !listing.has_next {
                break;
            }
            page += 1;
        }
        debug!(node = id, pages = page, children = children.len(), "children paged");
        Ok(children)
    }

    fn bulk_children(&self, graph: &str, ids: &[String]) -> Result<HashMap<String, Vec<NodeSnapshot>>> {
        let lists = self.gateway.fetch_attributes(graph, ids, CHILD_LIST)?;

        let mut child_ids: Vec<String> = Vec::new();
        for id in ids {
            let snapshot = lists
                .get(id)
                .ok_or_else(|| HierarchyError::not_loaded(id, Attribute::Children))?;
            child_ids.extend(snapshot.children()?.iter().cloned());
        }
        child_ids.sort();
        child_ids.dedup();

        let details = self.gateway.fetch_attributes(graph, &child_ids, CHILD_PRELOAD)?;
        debug!(parents = ids.len(), children = child_ids.len(), "children bulk loaded");

        let mut loaded = HashMap::new();
        for id in ids {
            let mut children = Vec::new();
            for child in lists[id].children()? {
                let snapshot = details
                    .get(child)
                    .cloned()
                    .ok_or_else(|| HierarchyError::not_loaded(child, Attribute::Labels))?;
                children.push(snapshot);
            }
            loaded.insert(id.clone(), children);
        }
        Ok(loaded)
    }
}
