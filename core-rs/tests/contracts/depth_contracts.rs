// Depth Contract Tests
//
// These tests verify INVARIANTS that MUST NEVER BREAK regardless of implementation.
// Depth is computed client side from bounded queries, so a subtle change to the
// probe or walker silently shifts every published maxDepth.

use onto_hierarchy::hierarchy::depth_walker::root_depth;
use onto_hierarchy::{
    probe, probe_depth, AdjacencyMap, BoundedWalk, EngineConfig, Hierarchy, HierarchyEngine, SparqlGateway,
    StoreEndpoint, Vocabulary,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const GRAPH: &str = "http://data.example.org/contracts/depth";
const SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";

fn ex(name: &str) -> String {
    format!("http://ex.org/{}", name)
}

fn gateway(edges: &[(String, String)]) -> SparqlGateway<StoreEndpoint> {
    let mut turtle = String::from("@prefix owl: <http://www.w3.org/2002/07/owl#> .\n");
    for (child, parent) in edges {
        turtle.push_str(&format!("<{}> a owl:Class .\n<{}> a owl:Class .\n", child, parent));
        turtle.push_str(&format!("<{}> <{}> <{}> .\n", child, SUBCLASS_OF, parent));
    }
    let store = StoreEndpoint::new().unwrap();
    store.load_turtle(GRAPH, &turtle).unwrap();
    SparqlGateway::new(store, Vocabulary::default())
}

/// Random tree under N0 whose deepest chain is exactly `depth` edges
fn synthetic_tree(rng: &mut StdRng, depth: usize, extra: usize) -> Vec<(String, String)> {
    let mut edges = Vec::new();
    let mut levels: Vec<(String, usize)> = vec![(ex("N0"), 0)];
    for i in 1..=depth {
        edges.push((ex(&format!("N{}", i)), ex(&format!("N{}", i - 1))));
        levels.push((ex(&format!("N{}", i)), i));
    }
    for i in 0..extra {
        let shallow: Vec<&(String, usize)> = levels.iter().filter(|(_, d)| *d < depth).collect();
        let (parent, level) = shallow[rng.gen_range(0..shallow.len())].clone();
        let id = ex(&format!("X{}", i));
        edges.push((id.clone(), parent));
        levels.push((id, level + 1));
    }
    edges
}

/// WHY: maxDepth via probing assumes a failed probe ends the search
/// REASON: Any chain of n hops contains a chain of n-1 hops from the same root
/// BREAKS: Probe-based depth stops early or overshoots
/// SACRIFICES: If this fails, published maxDepth values are wrong
#[test]
fn probe_is_monotonic_on_synthetic_trees() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for depth in 1..=6 {
        let extra = rng.gen_range(0..12);
        let gw = gateway(&synthetic_tree(&mut rng, depth, extra));
        for n in 1..=depth + 3 {
            let found = probe(&gw, GRAPH, &ex("N0"), n, SUBCLASS_OF).unwrap();
            assert_eq!(found, n <= depth, "depth {} extra {} probe {}", depth, extra, n);
        }
        let probed = probe_depth(&gw, GRAPH, &ex("N0"), SUBCLASS_OF, 60).unwrap();
        assert_eq!(probed.depth, depth);
        assert!(!probed.truncated);
    }
}

/// WHY: A single chain is the reference shape for every depth metric
/// REASON: root→a→b→c has three edges and three single-child nodes
/// BREAKS: Off-by-one between counting nodes and counting edges
/// SACRIFICES: If this fails, maxDepth disagrees with previously published values
#[test]
fn single_chain_metrics() {
    let edges = vec![(ex("a"), ex("root")), (ex("b"), ex("a")), (ex("c"), ex("b"))];
    let engine = HierarchyEngine::new(gateway(&edges), EngineConfig::default()).unwrap();
    let metrics = engine
        .compute_metrics(&Hierarchy::new(GRAPH).with_roots([ex("root")]))
        .unwrap();

    assert_eq!(metrics.max_depth, 3);
    assert_eq!(metrics.classes, 4);
    assert_eq!(metrics.classes_with_one_child, 3);
    assert_eq!(metrics.max_child_count, 1);
    assert_eq!(metrics.average_child_count, 1);
}

/// WHY: Flat hierarchies carry no meaningful parent/child structure
/// REASON: Their subClassOf edges are artefacts of the source format
/// BREAKS: Structural metrics reported for ontologies flagged flat
/// SACRIFICES: If this fails, flat ontologies show bogus depth and fan-out
#[test]
fn flat_hierarchy_has_no_structure() {
    let edges = vec![(ex("a"), ex("root")), (ex("b"), ex("a")), (ex("c"), ex("root"))];
    let engine = HierarchyEngine::new(gateway(&edges), EngineConfig::default()).unwrap();
    let metrics = engine
        .compute_metrics(&Hierarchy::new(GRAPH).with_roots([ex("root")]).flat(true))
        .unwrap();

    assert_eq!(metrics.max_depth, 0);
    assert_eq!(metrics.average_child_count, 0);
    assert_eq!(metrics.max_child_count, 0);
    assert_eq!(metrics.classes, 4);
}

/// WHY: Ingested ontologies do contain cycles
/// REASON: The walker must answer, not overflow the stack or spin
/// BREAKS: Metrics computation for the whole hierarchy
/// SACRIFICES: If this fails, one bad edge takes down every metrics run
#[test]
fn depth_walker_bounded_on_large_cycle() {
    let mut map = AdjacencyMap::new();
    for i in 0..1000 {
        map.insert(format!("n{}", i), vec![format!("n{}", (i + 1) % 1000)]);
    }
    let mut walk = BoundedWalk::new(60);
    let depth = root_depth("n0", &map, &mut walk);

    assert!(depth <= 61, "depth {} escaped the ceiling", depth);
    assert!(walk.truncated());
}

/// WHY: Repeated runs over the same graph feed cached reports
/// REASON: Nothing in a computation may depend on state from a previous one
/// BREAKS: Reports flip between runs without the data changing
#[test]
fn metrics_idempotent() {
    let mut rng = StdRng::seed_from_u64(7);
    let edges = synthetic_tree(&mut rng, 5, 30);
    let engine = HierarchyEngine::new(gateway(&edges), EngineConfig::default()).unwrap();
    let hierarchy = Hierarchy::new(GRAPH).with_roots([ex("N0")]);

    let first = engine.compute_metrics(&hierarchy).unwrap();
    let second = engine.compute_metrics(&hierarchy).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.max_depth, 5);
}
