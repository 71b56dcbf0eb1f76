/**
 * query.rs
 * Bounded SPARQL query builders
 *
 * Every IRI is validated before it is spliced into a query, so a malformed
 * node id fails with `InvalidIri` instead of producing a broken or widened query.
 */

use oxigraph::model::NamedNode;

use crate::config::Vocabulary;
use crate::errors::{HierarchyError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    query: String,
}

/// Validate and wrap an IRI as `<iri>`
fn iri(value: &str) -> Result<String> {
    NamedNode::new(value)
        .map(|n| format!("<{}>", n.as_str()))
        .map_err(|e| HierarchyError::InvalidIri(format!("{}: {}", value, e)))
}

fn values_clause(ids: &[String]) -> Result<String> {
    let terms = ids.iter().map(|id| iri(id)).collect::<Result<Vec<_>>>()?;
    Ok(format!("VALUES ?id {{ {} }}", terms.join(" ")))
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    /// Existence of an n-hop downward chain from `root`
    ///
    /// ```text
    /// SELECT ?x0 WHERE { GRAPH <g> {
    ///   ?x0 <pred> <root> .
    ///   ?x1 <pred> ?x0 .
    /// } } LIMIT 1
    /// ```
    pub fn hop_chain(graph: &str, root: &str, hops: usize, predicate: &str) -> Result<Self> {
        let graph = iri(graph)?;
        let root = iri(root)?;
        let predicate = iri(predicate)?;

        let joins = (0..hops)
            .map(|i| {
                let parent = if i == 0 {
                    root.clone()
                } else {
                    format!("?x{}", i - 1)
                };
                format!("    ?x{} {} {} .", i, predicate, parent)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Self::new(format!(
            "SELECT ?x0 WHERE {{\n  GRAPH {} {{\n{}\n  }}\n}} LIMIT 1\n",
            graph, joins
        )))
    }

    /// Number of instances of `type_iri` in the graph
    pub fn count_instances(graph: &str, type_iri: &str) -> Result<Self> {
        Ok(Self::new(format!(
            r#"
            SELECT (COUNT(?s) AS ?count) WHERE {{
                GRAPH {} {{
                    ?s a {} .
                }}
            }}
            "#,
            iri(graph)?,
            iri(type_iri)?
        )))
    }

    /// Classes with no parent other than the sentinel (or themselves)
    pub fn top_classes(graph: &str, vocab: &Vocabulary) -> Result<Self> {
        let sentinel = iri(&vocab.sentinel)?;
        Ok(Self::new(format!(
            r#"
            SELECT DISTINCT ?id WHERE {{
                GRAPH {graph} {{
                    ?id a {class} .
                    FILTER(!isBlank(?id) && ?id != {sentinel})
                    FILTER NOT EXISTS {{
                        ?id {sub} ?parent .
                        FILTER(isIRI(?parent) && ?parent != {sentinel} && ?parent != ?id)
                    }}
                }}
            }}
            ORDER BY ?id
            "#,
            graph = iri(graph)?,
            class = iri(&vocab.class_type)?,
            sub = iri(&vocab.sub_class_of)?,
            sentinel = sentinel,
        )))
    }

    /// One sorted page of class ids
    pub fn class_page(graph: &str, vocab: &Vocabulary, offset: usize, limit: usize) -> Result<Self> {
        Ok(Self::new(format!(
            r#"
            SELECT DISTINCT ?id WHERE {{
                GRAPH {} {{
                    ?id a {} .
                    FILTER(!isBlank(?id))
                }}
            }}
            ORDER BY ?id
            LIMIT {} OFFSET {}
            "#,
            iri(graph)?,
            iri(&vocab.class_type)?,
            limit,
            offset
        )))
    }

    /// One sorted page of the direct children of `parent`
    pub fn children_page(
        graph: &str,
        vocab: &Vocabulary,
        parent: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Self> {
        Ok(Self::new(format!(
            r#"
            SELECT DISTINCT ?id WHERE {{
                GRAPH {} {{
                    ?id {} {} .
                    FILTER(!isBlank(?id))
                }}
            }}
            ORDER BY ?id
            LIMIT {} OFFSET {}
            "#,
            iri(graph)?,
            iri(&vocab.sub_class_of)?,
            iri(parent)?,
            limit,
            offset
        )))
    }

    /// `?id ?value` pairs for `?id <predicate> ?value`, restricted to `ids`
    pub fn property_values(graph: &str, ids: &[String], predicate: &str, iri_only: bool) -> Result<Self> {
        let filter = if iri_only { "FILTER(isIRI(?value))" } else { "" };
        Ok(Self::new(format!(
            r#"
            SELECT DISTINCT ?id ?value WHERE {{
                {}
                GRAPH {} {{
                    ?id {} ?value .
                    {}
                }}
            }}
            "#,
            values_clause(ids)?,
            iri(graph)?,
            iri(predicate)?,
            filter
        )))
    }

    /// `?id ?value` pairs for `?value <predicate> ?id` (children of each id)
    pub fn inverse_values(graph: &str, ids: &[String], predicate: &str) -> Result<Self> {
        Ok(Self::new(format!(
            r#"
            SELECT DISTINCT ?id ?value WHERE {{
                {}
                GRAPH {} {{
                    ?value {} ?id .
                    FILTER(isIRI(?value))
                }}
            }}
            ORDER BY ?id ?value
            "#,
            values_clause(ids)?,
            iri(graph)?,
            iri(predicate)?
        )))
    }

    /// Per-id count of `?child <predicate> ?id`; ids without children are absent
    pub fn inverse_counts(graph: &str, ids: &[String], predicate: &str) -> Result<Self> {
        Ok(Self::new(format!(
            r#"
            SELECT ?id (COUNT(DISTINCT ?child) AS ?value) WHERE {{
                {}
                GRAPH {} {{
                    ?child {} ?id .
                    FILTER(isIRI(?child))
                }}
            }}
            GROUP BY ?id
            "#,
            values_clause(ids)?,
            iri(graph)?,
            iri(predicate)?
        )))
    }
}
