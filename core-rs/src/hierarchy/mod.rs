/**
 * hierarchy module
 *
 * - closure: transitive ancestors and descendants, one fetch per level
 * - depth_walker: pure depth computation over an adjacency map
 * - depth_prober: n-hop existence probes against the backend
 * - metrics: paged structural statistics of a hierarchy
 * - paths: root-ward path enumeration across multiple parents
 * - partial_loader: paged vs bulk child loading by fan-out
 * - tree: breadcrumb tree reconstruction
 */

pub mod closure;
pub mod depth_prober;
pub mod depth_walker;
pub mod metrics;
pub mod partial_loader;
pub mod paths;
pub mod tree;

pub use closure::{ClosureWalker, Direction};
pub use depth_prober::{probe, probe_depth, ProbedDepth};
pub use depth_walker::AdjacencyMap;
pub use metrics::MetricsCalculator;
pub use partial_loader::{ChildLoad, PartialLoader};
pub use paths::PathBuilder;
pub use tree::{OutlineRow, TreeNode, TreeReconstructor, TreeView};
