/**
 * store.rs
 * In-process SPARQL endpoint backed by an Oxigraph store
 */

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::{NamedNode, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{QueryRow, SparqlEndpoint, SparqlQuery};
use crate::errors::{HierarchyError, Result};

pub struct StoreEndpoint {
    store: Store,
}

/// Plain value of a term: IRI string, literal lexical form or blank node id
fn plain_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::Literal(literal) => literal.value().to_string(),
        Term::BlankNode(node) => node.as_str().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

impl StoreEndpoint {
    /// Empty in-memory store
    pub fn new() -> Result<Self> {
        let store = Store::new().map_err(|e| HierarchyError::QueryFailure(e.to_string()))?;
        Ok(Self { store })
    }

    /// Wrap an existing store (e.g. one opened on disk)
    pub fn from_store(store: Store) -> Self {
        Self { store }
    }

    /// Parse Turtle into the named graph `graph`
    pub fn load_turtle(&self, graph: &str, content: &str) -> Result<()> {
        let graph_name = NamedNode::new(graph)
            .map_err(|e| HierarchyError::InvalidIri(format!("{}: {}", graph, e)))?;

        let parser = RdfParser::from_format(RdfFormat::Turtle).with_default_graph(graph_name);
        self.store
            .load_from_reader(parser, content.as_bytes())
            .map_err(|e| HierarchyError::QueryFailure(format!("failed to load Turtle: {}", e)))?;

        debug!(graph, bytes = content.len(), "loaded turtle into graph");
        Ok(())
    }

    /// Load a Turtle file into the named graph `graph`
    pub fn load_turtle_file<P: AsRef<Path>>(&self, graph: &str, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(HierarchyError::Config(format!(
                "path is a directory: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        self.load_turtle(graph, &content)?;
        info!(path = %path.display(), graph, "loaded ontology file");
        Ok(())
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

impl SparqlEndpoint for StoreEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<Vec<QueryRow>> {
        let results = self.store.query(query.as_str())?;

        match results {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();

                for solution in solutions {
                    let solution = solution?;

                    let mut row = HashMap::new();
                    for (var, term) in solution.iter() {
                        row.insert(var.as_str().to_string(), plain_value(term));
                    }
                    rows.push(row);
                }

                Ok(rows)
            }
            QueryResults::Boolean(result) => {
                let mut row = HashMap::new();
                row.insert("result".to_string(), result.to_string());
                Ok(vec![row])
            }
            QueryResults::Graph(_) => Err(HierarchyError::QueryFailure(
                "CONSTRUCT/DESCRIBE results are not supported".to_string(),
            )),
        }
    }
}
