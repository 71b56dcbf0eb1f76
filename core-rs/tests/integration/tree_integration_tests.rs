//! Tree Reconstruction Integration Tests
//!
//! Builds breadcrumb trees against an in-memory Oxigraph store and checks
//! them against the path builder, plus the round trips the fan-out aware
//! loader is allowed to make.

use onto_hierarchy::{
    Attribute, AttributeSet, BoundedPattern, EngineConfig, GraphGateway, Hierarchy, HierarchyEngine, ListingPage,
    ListingScope, NodeSnapshot, QueryRow, Result, SparqlGateway, StoreEndpoint, TreeNode, TreeView, Vocabulary,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const GRAPH: &str = "http://data.example.org/ontologies/ANATOMY/submissions/3";
const ANATOMY: &str = include_str!("../fixtures/anatomy.ttl");

fn ex(name: &str) -> String {
    format!("http://ex.org/anatomy/{}", name)
}

fn store(turtle: &str) -> SparqlGateway<StoreEndpoint> {
    let store = StoreEndpoint::new().unwrap();
    store.load_turtle(GRAPH, turtle).unwrap();
    SparqlGateway::new(store, Vocabulary::default())
}

fn engine() -> HierarchyEngine {
    HierarchyEngine::new(store(ANATOMY), EngineConfig::default()).unwrap()
}

fn anatomy() -> Hierarchy {
    Hierarchy::new(GRAPH).with_roots([ex("Anatomy")])
}

fn child<'v>(view: &TreeView, node: &'v TreeNode, id: &str) -> &'v TreeNode {
    node.children
        .iter()
        .find(|c| view.id_of(c) == id)
        .unwrap_or_else(|| panic!("{} is not a child of {}", id, view.id_of(node)))
}

/// Calls seen by the gateway, shared with the test after the engine takes ownership
#[derive(Default)]
struct CallLog {
    listings: Vec<ListingScope>,
    fetches: Vec<AttributeSet>,
}

struct RecordingGateway<G> {
    inner: G,
    log: Arc<Mutex<CallLog>>,
}

impl<G: GraphGateway> GraphGateway for RecordingGateway<G> {
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
        self.log.lock().unwrap().listings.push(scope.clone());
        self.inner.execute_paged_listing(graph, scope, page, page_size, preload)
    }

    fn fetch_attributes(
        &self,
        graph: &str,
        ids: &[String],
        attributes: AttributeSet,
    ) -> Result<HashMap<String, NodeSnapshot>> {
        self.log.lock().unwrap().fetches.push(attributes);
        self.inner.fetch_attributes(graph, ids, attributes)
    }
}

/// Test: The expanded chain is one of the root-ward paths
#[test]
fn test_tree_round_trips_with_paths() {
    let engine = engine();
    let view = engine.build_tree(&anatomy(), &ex("Cardiac")).unwrap();
    let paths = engine.build_paths_to_root(GRAPH, &ex("Cardiac")).unwrap();

    let expanded = view.expanded_path();
    assert!(paths.contains(&expanded));
    assert_eq!(expanded.root(), Some(ex("Anatomy").as_str()));
    assert_eq!(expanded.leaf(), Some(ex("Cardiac").as_str()));
    assert_eq!(view.focus(), ex("Cardiac"));
}

/// Test: First path reaching a root wins (via Heart, not Muscle)
#[test]
fn test_first_rooted_path_chosen() {
    let view = engine().build_tree(&anatomy(), &ex("Cardiac")).unwrap();
    let expanded = view.expanded_path();
    let ids: Vec<&str> = expanded.nodes().iter().map(String::as_str).collect();
    assert_eq!(ids, vec![ex("Anatomy"), ex("Organ"), ex("Heart"), ex("Cardiac")]);
}

/// Test: Siblings are attached collapsed with labels, counts and flags
#[test]
fn test_siblings_collapsed() {
    let view = engine().build_tree(&anatomy(), &ex("Cardiac")).unwrap();
    let root = view.root();
    assert!(root.expanded);
    assert_eq!(root.children.len(), 3);

    let tissue = child(&view, root, &ex("Tissue"));
    assert!(!tissue.expanded);
    assert!(tissue.children.is_empty());
    assert_eq!(tissue.child_count, 1);
    assert_eq!(view.snapshot(tissue).unwrap().display_label(), "tissue");

    let old = child(&view, root, &ex("OldThing"));
    assert!(view.snapshot(old).unwrap().is_obsolete().unwrap());

    let organ = child(&view, root, &ex("Organ"));
    let heart = child(&view, organ, &ex("Heart"));
    let valve = child(&view, heart, &ex("Valve"));
    assert!(heart.expanded);
    assert!(!valve.expanded);
    assert_eq!(view.snapshot(heart).unwrap().definitions().unwrap().len(), 1);
}

/// Test: Children appear in label order
#[test]
fn test_children_ordered_by_label() {
    let view = engine().build_tree(&anatomy(), &ex("Cardiac")).unwrap();
    let labels: Vec<&str> = view
        .root()
        .children
        .iter()
        .map(|c| view.snapshot(c).unwrap().display_label())
        .collect();
    assert_eq!(labels, vec!["Obsolete body part", "Organ", "tissue"]);
}

/// Test: A node whose paths reach no designated root is returned alone
#[test]
fn test_degenerate_tree() {
    let hierarchy = Hierarchy::new(GRAPH).with_roots([ex("Organ")]);
    let view = engine().build_tree(&hierarchy, &ex("Muscle")).unwrap();
    assert!(view.is_degenerate());
    assert!(view.root().children.is_empty());
    assert_eq!(view.expanded_path().nodes(), &[ex("Muscle")]);
}

/// Test: Rendered outline follows the expanded path
#[test]
fn test_render_outline() {
    let view = engine().build_tree(&anatomy(), &ex("Cardiac")).unwrap();
    let text = view.render();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 8);
    assert!(lines[0].starts_with("- ") && lines[0].contains("Anatomical entity"));
    assert!(lines[1].starts_with("    ") && lines[1].contains("Obsolete body part"));
    assert!(lines[2].starts_with("  - ") && lines[2].contains("Organ"));
    assert!(lines[3].starts_with("    - ") && lines[3].contains("Heart"));
    assert!(lines[4].starts_with("      - ") && lines[4].contains("Cardiac muscle"));
    assert!(lines[5].contains("Heart valve"));
    assert!(lines[6].contains("Lung"));
    assert!(lines[7].starts_with("  + ") && lines[7].contains("tissue"));
}

/// Test: A 250-child hub is paged; the rest of the path shares one bulk fetch
#[test]
fn test_bushy_hub_round_trips() {
    let mut turtle = String::from(
        "@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n\
         @prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
         @prefix ex: <http://ex.org/anatomy/> .\n\
         ex:Anatomy a owl:Class .\n\
         ex:Cell a owl:Class ; rdfs:subClassOf ex:Anatomy .\n\
         ex:Organ a owl:Class ; rdfs:subClassOf ex:Anatomy .\n",
    );
    for i in 0..250 {
        turtle.push_str(&format!("ex:CellType{:03} a owl:Class ; rdfs:subClassOf ex:Cell .\n", i));
    }
    turtle.push_str("ex:Neuron a owl:Class ; rdfs:subClassOf ex:CellType042 .\n");

    let log = Arc::new(Mutex::new(CallLog::default()));
    let gateway = RecordingGateway {
        inner: store(&turtle),
        log: Arc::clone(&log),
    };
    let engine = HierarchyEngine::new(gateway, EngineConfig::default()).unwrap();
    let view = engine.build_tree(&anatomy(), &ex("Neuron")).unwrap();

    let cell = child(&view, view.root(), &ex("Cell"));
    assert_eq!(cell.children.len(), 250);
    assert_eq!(cell.children.iter().filter(|c| c.expanded).count(), 1);

    let log = log.lock().unwrap();
    let cell_pages = log
        .listings
        .iter()
        .filter(|s| **s == ListingScope::ChildrenOf(ex("Cell")))
        .count();
    assert_eq!(cell_pages, 3);
    // Anatomy and CellType042 share one children fetch; Neuron has none
    assert_eq!(log.fetches.iter().filter(|a| a.contains(Attribute::Children)).count(), 1);
}
