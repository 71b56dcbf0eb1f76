//! SparqlGateway: the Graph Query Gateway over any SPARQL endpoint
//!
//! Translates [`BoundedPattern`]s, listings and attribute requests into the
//! bounded queries of [`SparqlQuery`]. Attribute fetches are batched with
//! `VALUES` blocks of at most `batch_size` ids.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{BoundedPattern, GraphGateway, ListingPage, ListingScope, QueryRow, SparqlEndpoint, SparqlQuery};
use crate::config::Vocabulary;
use crate::errors::{HierarchyError, Result};
use crate::model::{Attribute, AttributeSet, NodeSnapshot};

pub const DEFAULT_BATCH_SIZE: usize = 500;

pub struct SparqlGateway<E> {
    endpoint: E,
    vocabulary: Vocabulary,
    batch_size: usize,
}

/// Values gathered per attribute before snapshots are assembled
#[derive(Default)]
struct Collected {
    parents: HashMap<String, Vec<String>>,
    children: HashMap<String, Vec<String>>,
    counts: HashMap<String, usize>,
    pref_labels: HashMap<String, Vec<String>>,
    synonyms: HashMap<String, Vec<String>>,
    definitions: HashMap<String, Vec<String>>,
    obsolete: HashSet<String>,
}

fn group_values(rows: Vec<QueryRow>, into: &mut HashMap<String, Vec<String>>) {
    for mut row in rows {
        if let (Some(id), Some(value)) = (row.remove("id"), row.remove("value")) {
            into.entry(id).or_default().push(value);
        }
    }
}

fn take_sorted(map: &mut HashMap<String, Vec<String>>, id: &str) -> Vec<String> {
    let mut values = map.remove(id).unwrap_or_default();
    values.sort();
    values.dedup();
    values
}

impl<E: SparqlEndpoint> SparqlGateway<E> {
    pub fn new(endpoint: E, vocabulary: Vocabulary) -> Self {
        Self {
            endpoint,
            vocabulary,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    fn collect_attribute(
        &self,
        graph: &str,
        ids: &[String],
        attribute: Attribute,
        collected: &mut Collected,
    ) -> Result<()> {
        let vocab = &self.vocabulary;
        match attribute {
            Attribute::Parents => {
                let query = SparqlQuery::property_values(graph, ids, &vocab.sub_class_of, true)?;
                group_values(self.endpoint.select(&query)?, &mut collected.parents);
            }
            Attribute::Children => {
                let query = SparqlQuery::inverse_values(graph, ids, &vocab.sub_class_of)?;
                group_values(self.endpoint.select(&query)?, &mut collected.children);
            }
            Attribute::ChildCount => {
                let query = SparqlQuery::inverse_counts(graph, ids, &vocab.sub_class_of)?;
                for mut row in self.endpoint.select(&query)? {
                    if let (Some(id), Some(value)) = (row.remove("id"), row.remove("value")) {
                        let count = value.parse::<usize>().map_err(|_| {
                            HierarchyError::QueryFailure(format!(
                                "non-numeric child count for {}: {}",
                                id, value
                            ))
                        })?;
                        collected.counts.insert(id, count);
                    }
                }
            }
            Attribute::Labels => {
                let query = SparqlQuery::property_values(graph, ids, &vocab.pref_label, false)?;
                group_values(self.endpoint.select(&query)?, &mut collected.pref_labels);
                let query = SparqlQuery::property_values(graph, ids, &vocab.synonym, false)?;
                group_values(self.endpoint.select(&query)?, &mut collected.synonyms);
            }
            Attribute::Definitions => {
                let query = SparqlQuery::property_values(graph, ids, &vocab.definition, false)?;
                group_values(self.endpoint.select(&query)?, &mut collected.definitions);
            }
            Attribute::Obsolete => {
                let query = SparqlQuery::property_values(graph, ids, &vocab.obsolete, false)?;
                for mut row in self.endpoint.select(&query)? {
                    if let (Some(id), Some(value)) = (row.remove("id"), row.remove("value")) {
                        if value == "true" || value == "1" {
                            collected.obsolete.insert(id);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn assemble(id: &str, attributes: AttributeSet, collected: &mut Collected) -> NodeSnapshot {
        let mut snapshot = NodeSnapshot::new(id, attributes);
        for attribute in attributes.iter() {
            snapshot = match attribute {
                Attribute::Parents => snapshot.with_parents(take_sorted(&mut collected.parents, id)),
                Attribute::Children => snapshot.with_children(take_sorted(&mut collected.children, id)),
                Attribute::ChildCount => {
                    let count = collected.counts.remove(id).unwrap_or(0);
                    snapshot.with_child_count(count)
                }
                Attribute::Labels => {
                    let synonyms = take_sorted(&mut collected.synonyms, id);
                    let pref = take_sorted(&mut collected.pref_labels, id)
                        .into_iter()
                        .next()
                        .or_else(|| synonyms.first().cloned());
                    snapshot.with_labels(pref, synonyms)
                }
                Attribute::Definitions => {
                    snapshot.with_definitions(take_sorted(&mut collected.definitions, id))
                }
                Attribute::Obsolete => {
                    let obsolete = collected.obsolete.contains(id);
                    snapshot.with_obsolete(obsolete)
                }
            };
        }
        snapshot
    }
}

impl<E: SparqlEndpoint> GraphGateway for SparqlGateway<E> {
    fn execute_bounded_pattern(&self, graph: &str, pattern: &BoundedPattern) -> Result<Vec<QueryRow>> {
        let query = match pattern {
            BoundedPattern::HopChain { root, hops, predicate } => {
                SparqlQuery::hop_chain(graph, root, *hops, predicate)?
            }
            BoundedPattern::CountInstances { type_iri } => {
                SparqlQuery::count_instances(graph, type_iri)?
            }
            BoundedPattern::TopClasses => SparqlQuery::top_classes(graph, &self.vocabulary)?,
        };
        self.endpoint.select(&query)
    }

    fn execute_paged_listing(
        &self,
        graph: &str,
        scope: &ListingScope,
        page: usize,
        page_size: usize,
        preload: AttributeSet,
    ) -> Result<ListingPage> {
        if page == 0 || page_size == 0 {
            return Err(HierarchyError::Config(format!(
                "invalid page request: page {} of size {}",
                page, page_size
            )));
        }
        let offset = (page - 1) * page_size;
        // one extra row tells us whether another page exists
        let limit = page_size + 1;

        let query = match scope {
            ListingScope::Classes => SparqlQuery::class_page(graph, &self.vocabulary, offset, limit)?,
            ListingScope::ChildrenOf(parent) => {
                SparqlQuery::children_page(graph, &self.vocabulary, parent, offset, limit)?
            }
        };

        let mut ids: Vec<String> = self
            .endpoint
            .select(&query)?
            .into_iter()
            .filter_map(|mut row| row.remove("id"))
            .collect();
        let has_next = ids.len() > page_size;
        ids.truncate(page_size);

        let mut snapshots = self.fetch_attributes(graph, &ids, preload)?;
        let nodes = ids
            .iter()
            .map(|id| {
                snapshots
                    .remove(id)
                    .unwrap_or_else(|| NodeSnapshot::new(id.as_str(), preload))
            })
            .collect();

        debug!(graph, page, page_size, has_next, "listing page fetched");
        Ok(ListingPage { page, nodes, has_next })
    }

    fn fetch_attributes(
        &self,
        graph: &str,
        ids: &[String],
        attributes: AttributeSet,
    ) -> Result<HashMap<String, NodeSnapshot>> {
        let mut unique: Vec<String> = ids.to_vec();
        unique.sort();
        unique.dedup();

        let mut collected = Collected::default();
        if !attributes.is_empty() {
            for chunk in unique.chunks(self.batch_size) {
                for attribute in attributes.iter() {
                    self.collect_attribute(graph, chunk, attribute, &mut collected)?;
                }
            }
        }

        Ok(unique
            .iter()
            .map(|id| (id.clone(), Self::assemble(id, attributes, &mut collected)))
            .collect())
    }
}
