//! n-hop existence probes against the graph backend

use tracing::debug;

use crate::errors::Result;
use crate::gateway::{BoundedPattern, GraphGateway};

/// Outcome of probing one root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbedDepth {
    pub depth: usize,
    /// Probing stopped at the ceiling rather than at a failed probe
    pub truncated: bool,
}

/// True iff a chain of exactly `hops` edges along `predicate` leaves `root`.
///
/// A zero-hop chain trivially exists and costs no query.
pub fn probe(
    gateway: &dyn GraphGateway,
    graph: &str,
    root: &str,
    hops: usize,
    predicate: &str,
) -> Result<bool> {
    if hops == 0 {
        return Ok(true);
    }
    let pattern = BoundedPattern::HopChain {
        root: root.to_string(),
        hops,
        predicate: predicate.to_string(),
    };
    let found = !gateway.execute_bounded_pattern(graph, &pattern)?.is_empty();
    debug!(root, hops, found, "depth probe");
    Ok(found)
}

/// Depth of `root`: the largest n for which [`probe`] succeeds, found by
/// probing n = 1, 2, ... until the first failure. Cyclic graphs never fail a
/// probe, so probing also stops once n reaches `ceiling`.
pub fn probe_depth(
    gateway: &dyn GraphGateway,
    graph: &str,
    root: &str,
    predicate: &str,
    ceiling: usize,
) -> Result<ProbedDepth> {
    let mut hops = 1;
    while hops <= ceiling && probe(gateway, graph, root, hops, predicate)? {
        hops += 1;
    }
    Ok(ProbedDepth {
        depth: hops - 1,
        truncated: hops > ceiling,
    })
}
