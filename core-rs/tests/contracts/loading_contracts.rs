// Child Loading Contract Tests
//
// These tests verify INVARIANTS that MUST NEVER BREAK regardless of implementation.
// Some hubs have tens of thousands of children; the loader's strategy switch is
// what keeps a single tree request bounded.

use onto_hierarchy::{
    Attribute, AttributeSet, BoundedPattern, ChildLoad, EngineConfig, GraphGateway, ListingPage, ListingScope,
    NodeSnapshot, PartialLoader, QueryRow, Result, SparqlGateway, StoreEndpoint, Vocabulary,
};
use std::collections::HashMap;
use std::sync::Mutex;

const GRAPH: &str = "http://data.example.org/contracts/loading";

fn ex(name: &str) -> String {
    format!("http://ex.org/{}", name)
}

/// Counts paged listings and children fetches
struct Counting {
    inner: SparqlGateway<StoreEndpoint>,
    pages: Mutex<usize>,
    bulk: Mutex<usize>,
}

impl Counting {
    fn hub(children: usize) -> Self {
        let mut turtle = String::from(
            "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
             @prefix owl: <http://www.w3.org/2002/07/owl#> .\n",
        );
        turtle.push_str(&format!("<{}> a owl:Class .\n", ex("Hub")));
        for i in 0..children {
            turtle.push_str(&format!(
                "<{}> a owl:Class ; rdfs:subClassOf <{}> .\n",
                ex(&format!("Spoke{:04}", i)),
                ex("Hub")
            ));
        }
        let store = StoreEndpoint::new().unwrap();
        store.load_turtle(GRAPH, &turtle).unwrap();
        Self {
            inner: SparqlGateway::new(store, Vocabulary::default()),
            pages: Mutex::new(0),
            bulk: Mutex::new(0),
        }
    }
}

impl GraphGateway for Counting {
    fn execute_bounded_pattern(&self, graph: &str, pattern: &BoundedPattern) -> Result<Vec<QueryRow>> {
        self.inner.execute_bounded_pattern(graph, pattern)
    }

    fn execute_paged_listing(
        &self,
        graph: &str,
        scope: &ListingScope,
        page: usize,
        page_size: usize,
        preload: AttributeSet,
    ) -> Result<ListingPage> {
        *self.pages.lock().unwrap() += 1;
        self.inner.execute_paged_listing(graph, scope, page, page_size, preload)
    }

    fn fetch_attributes(
        &self,
        graph: &str,
        ids: &[String],
        attributes: AttributeSet,
    ) -> Result<HashMap<String, NodeSnapshot>> {
        if attributes.contains(Attribute::Children) {
            *self.bulk.lock().unwrap() += 1;
        }
        self.inner.fetch_attributes(graph, ids, attributes)
    }
}

/// WHY: A bushy node must never be loaded in one request
/// REASON: 100 children is past the threshold of 99
/// BREAKS: Memory and latency bounds for hubs with huge fan-out
/// SACRIFICES: If this fails, one tree request can pull a whole ontology level
#[test]
fn hundred_children_are_paged() {
    let gateway = Counting::hub(100);
    let config = EngineConfig::default();
    let loader = PartialLoader::new(&gateway, &config);
    assert_eq!(loader.strategy(100), ChildLoad::Paged);

    let loaded = loader.load_children(GRAPH, &[(ex("Hub"), 100)]).unwrap();
    assert_eq!(loaded[&ex("Hub")].len(), 100);
    assert!(*gateway.pages.lock().unwrap() >= 2);
    assert_eq!(*gateway.bulk.lock().unwrap(), 0);
}

/// WHY: Nodes at or under the threshold load in one round trip
/// REASON: 99 children is exactly the threshold
/// BREAKS: Round-trip count of every ordinary tree request
/// SACRIFICES: If this fails, small nodes pay the paging cost
#[test]
fn ninety_nine_children_one_bulk_fetch() {
    let gateway = Counting::hub(99);
    let config = EngineConfig::default();
    let loader = PartialLoader::new(&gateway, &config);
    assert_eq!(loader.strategy(99), ChildLoad::Bulk);

    let loaded = loader.load_children(GRAPH, &[(ex("Hub"), 99)]).unwrap();
    assert_eq!(loaded[&ex("Hub")].len(), 99);
    assert_eq!(*gateway.bulk.lock().unwrap(), 1);
    assert_eq!(*gateway.pages.lock().unwrap(), 0);
}

/// WHY: Paging must not lose or repeat children across page boundaries
/// REASON: Pages are ordered by id and fetched until no next page
/// BREAKS: Missing or doubled siblings in large trees
#[test]
fn paged_children_complete_and_unique() {
    let gateway = Counting::hub(250);
    let config = EngineConfig::default();
    let loaded = PartialLoader::new(&gateway, &config)
        .load_children(GRAPH, &[(ex("Hub"), 250)])
        .unwrap();

    let mut ids: Vec<&str> = loaded[&ex("Hub")].iter().map(NodeSnapshot::id).collect();
    assert_eq!(ids.len(), 250);
    ids.dedup();
    assert_eq!(ids.len(), 250);
    assert_eq!(*gateway.pages.lock().unwrap(), 3);
}
