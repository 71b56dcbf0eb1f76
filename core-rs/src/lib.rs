//! # Onto Hierarchy - Ontology Hierarchy & Metrics Engine
//!
//! Computes structural statistics of large class hierarchies and reconstructs
//! root-to-node paths and partial subtrees for display. The hierarchy lives in
//! a graph store that only answers bounded graph-pattern queries, so depth and
//! ancestry are worked out client side through repeated bounded queries.
//!
//! ## Key Features
//!
//! - Paged metrics: class counts, branching factor, depth, definition coverage
//! - Cycle-safe traversal through one shared bounded-DFS primitive
//! - Multi-parent path enumeration with per-path deduplication
//! - Transitive ancestor and descendant closure, one batched fetch per level
//! - Fan-out aware child loading (paged above a threshold, batched below)
//! - Explicit attribute requests: reading an undeclared attribute is an error
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │           HierarchyEngine            │
//! │ metrics · paths · tree · find_roots  │
//! └──────────────────────────────────────┘
//!           │                 │
//!   ┌───────┴───────┐  ┌──────┴────────┐
//!   │ hierarchy::*  │  │  traversal    │
//!   │ (algorithms)  │  │ (BoundedWalk) │
//!   └───────┬───────┘  └───────────────┘
//!           ▼
//!   ┌───────────────────────────────────┐
//!   │ GraphGateway  (SparqlGateway)     │
//!   │  StoreEndpoint  |  HttpEndpoint   │
//!   └───────────────────────────────────┘
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod gateway;
pub mod hierarchy;
pub mod model;
pub mod traversal;

pub use config::{DepthStrategy, EngineConfig, Vocabulary};
pub use engine::HierarchyEngine;
pub use errors::{HierarchyError, Result};
pub use gateway::{
    BoundedPattern, GraphGateway, HttpEndpoint, ListingPage, ListingScope, QueryRow, SparqlEndpoint,
    SparqlGateway, SparqlQuery, StoreEndpoint,
};
pub use hierarchy::{
    probe, probe_depth, AdjacencyMap, ChildLoad, ClosureWalker, Direction, MetricsCalculator, PartialLoader,
    OutlineRow, PathBuilder, ProbedDepth, TreeNode, TreeReconstructor, TreeView,
};
pub use model::{Attribute, AttributeSet, Hierarchy, HierarchyMetrics, NodeArena, NodeSnapshot, Path};
pub use traversal::BoundedWalk;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
