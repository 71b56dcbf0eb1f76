/**
 * config.rs
 * Engine configuration (YAML format)
 *
 * Format:
 * ```yaml
 * pageSize: 2500
 * fanoutThreshold: 99
 * largeFanout: 24
 * depthCeiling: 60
 * maxPaths: 512
 * depthStrategy: walk
 * strictCycles: false
 * vocabulary:
 *   subClassOf: http://www.w3.org/2000/01/rdf-schema#subClassOf
 *   sentinel: http://www.w3.org/2002/07/owl#Thing
 * ```
 *
 * Every key is optional; missing keys fall back to the defaults below.
 */

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::{HierarchyError, Result};

pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
pub const OWL_CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";
pub const OWL_DEPRECATED: &str = "http://www.w3.org/2002/07/owl#deprecated";
pub const OWL_NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
pub const SKOS_PREF_LABEL: &str = "http://www.w3.org/2004/02/skos/core#prefLabel";
pub const SKOS_DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";

/// How the metrics calculator derives `maxDepth`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepthStrategy {
    /// Walk the adjacency map built while paging (no extra queries).
    #[default]
    Walk,
    /// Issue n-hop existence probes per root against the backend.
    Probe,
}

/// Predicate and class IRIs the engine queries with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Vocabulary {
    pub sub_class_of: String,
    pub class_type: String,
    /// Universal top node, never part of a path and never a root
    pub sentinel: String,
    pub pref_label: String,
    pub synonym: String,
    pub definition: String,
    pub obsolete: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            sub_class_of: RDFS_SUBCLASS_OF.to_string(),
            class_type: OWL_CLASS.to_string(),
            sentinel: OWL_THING.to_string(),
            pref_label: SKOS_PREF_LABEL.to_string(),
            synonym: RDFS_LABEL.to_string(),
            definition: SKOS_DEFINITION.to_string(),
            obsolete: OWL_DEPRECATED.to_string(),
        }
    }
}

impl Vocabulary {
    fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("subClassOf", &self.sub_class_of),
            ("classType", &self.class_type),
            ("sentinel", &self.sentinel),
            ("prefLabel", &self.pref_label),
            ("synonym", &self.synonym),
            ("definition", &self.definition),
            ("obsolete", &self.obsolete),
        ]
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Listing page size used while computing metrics
    pub page_size: usize,
    /// Child count above which children are paged instead of bulk loaded.
    /// Also the child page size.
    pub fanout_threshold: usize,
    /// Nodes with more children than this count as large fan-out
    pub large_fanout: usize,
    /// Recursion ceiling shared by every bounded traversal
    pub depth_ceiling: usize,
    /// Most root-ward paths enumerated for one node; forks past it are dropped
    pub max_paths: usize,
    pub depth_strategy: DepthStrategy,
    /// Raise `MalformedHierarchy` instead of truncating at the ceiling
    pub strict_cycles: bool,
    pub vocabulary: Vocabulary,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 2500,
            fanout_threshold: 99,
            large_fanout: 24,
            depth_ceiling: 60,
            max_paths: 512,
            depth_strategy: DepthStrategy::Walk,
            strict_cycles: false,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a YAML file
    ///
    /// # Example
    /// ```no_run
    /// use onto_hierarchy::EngineConfig;
    ///
    /// let config = EngineConfig::load("engine.yaml")?;
    /// assert!(config.page_size > 0);
    /// # Ok::<(), onto_hierarchy::HierarchyError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HierarchyError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(HierarchyError::Config("pageSize must be positive".to_string()));
        }
        if self.fanout_threshold == 0 {
            return Err(HierarchyError::Config(
                "fanoutThreshold must be positive".to_string(),
            ));
        }
        if self.depth_ceiling == 0 {
            return Err(HierarchyError::Config(
                "depthCeiling must be positive".to_string(),
            ));
        }
        if self.max_paths == 0 {
            return Err(HierarchyError::Config("maxPaths must be positive".to_string()));
        }
        for (key, iri) in self.vocabulary.entries() {
            oxigraph::model::NamedNode::new(iri).map_err(|e| {
                HierarchyError::Config(format!("vocabulary.{} is not an IRI ({}): {}", key, iri, e))
            })?;
        }
        Ok(())
    }
}
