//! Graph Query Gateway
//!
//! Defines the interface the hierarchy algorithms use to reach the triple store.
//! Implementations include:
//! - SparqlGateway (builds bounded SPARQL and runs it on any [`SparqlEndpoint`])
//! - StoreEndpoint (in-process Oxigraph store)
//! - HttpEndpoint (remote SPARQL 1.1 protocol endpoint)
//!
//! Nothing behind this trait ever writes to the graph.

pub mod http;
pub mod query;
pub mod sparql;
pub mod store;

use std::collections::HashMap;

use crate::errors::Result;
use crate::model::{AttributeSet, NodeSnapshot};

pub use http::HttpEndpoint;
pub use query::SparqlQuery;
pub use sparql::SparqlGateway;
pub use store::StoreEndpoint;

/// One solution row, variable name to plain value (IRI or literal lexical form)
pub type QueryRow = HashMap<String, String>;

/// A bounded graph pattern the gateway knows how to evaluate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundedPattern {
    /// Chain of `hops` edges following `predicate` downward from `root`:
    /// `?x0 pred root . ?x1 pred ?x0 . ...`. At most one row is returned.
    HopChain {
        root: String,
        hops: usize,
        predicate: String,
    },
    /// Single row with a `count` binding: instances typed as `type_iri`
    CountInstances { type_iri: String },
    /// Classes with no parent besides the sentinel, one `id` binding per row
    TopClasses,
}

/// Which nodes a paged listing walks over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingScope {
    /// Every class of the graph
    Classes,
    /// Direct children of one node
    ChildrenOf(String),
}

/// One page of a listing, sorted by node id
#[derive(Debug, Clone)]
pub struct ListingPage {
    /// 1-based page number
    pub page: usize,
    pub nodes: Vec<NodeSnapshot>,
    pub has_next: bool,
}

/// Gateway to the graph backend
///
/// # Contract
///
/// - `graph` is the named graph (submission) IRI every call is scoped to
/// - snapshots carry exactly the attributes requested in `preload` / `attributes`
/// - `fetch_attributes` answers for every id it was given; unknown ids come
///   back with empty attribute values
/// - failures surface as `HierarchyError::QueryFailure` and are never retried here
pub trait GraphGateway: Send + Sync {
    /// Evaluate a bounded pattern and return its rows (possibly none)
    fn execute_bounded_pattern(&self, graph: &str, pattern: &BoundedPattern) -> Result<Vec<QueryRow>>;

    /// Fetch page `page` (1-based) of `page_size` nodes in `scope`,
    /// each preloaded with `preload`
    fn execute_paged_listing(
        &self,
        graph: &str,
        scope: &ListingScope,
        page: usize,
        page_size: usize,
        preload: AttributeSet,
    ) -> Result<ListingPage>;

    /// Batched attribute fetch for a set of nodes
    fn fetch_attributes(
        &self,
        graph: &str,
        ids: &[String],
        attributes: AttributeSet,
    ) -> Result<HashMap<String, NodeSnapshot>>;
}

/// Raw SPARQL SELECT execution
pub trait SparqlEndpoint: Send + Sync {
    fn select(&self, query: &SparqlQuery) -> Result<Vec<QueryRow>>;
}
