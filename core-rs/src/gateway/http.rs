//! HttpEndpoint for remote triple stores
//!
//! Speaks the SPARQL 1.1 protocol:
//! - queries are POSTed as `application/x-www-form-urlencoded`
//! - results are requested as `application/sparql-results+json`
//! - optional bearer authentication

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::{QueryRow, SparqlEndpoint, SparqlQuery};
use crate::errors::{HierarchyError, Result};

const RESULTS_JSON: &str = "application/sparql-results+json";

#[derive(Debug, Deserialize)]
struct ResultsDocument {
    #[serde(default)]
    results: Option<Bindings>,
    #[serde(default)]
    boolean: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct Bindings {
    bindings: Vec<HashMap<String, BoundTerm>>,
}

#[derive(Debug, Deserialize)]
struct BoundTerm {
    value: String,
}

/// Parse a `application/sparql-results+json` document into rows
pub fn parse_results_json(body: &str) -> Result<Vec<QueryRow>> {
    let document: ResultsDocument = serde_json::from_str(body)?;

    if let Some(results) = document.results {
        return Ok(results
            .bindings
            .into_iter()
            .map(|binding| {
                binding
                    .into_iter()
                    .map(|(var, term)| (var, term.value))
                    .collect()
            })
            .collect());
    }

    if let Some(answer) = document.boolean {
        let mut row = HashMap::new();
        row.insert("result".to_string(), answer.to_string());
        return Ok(vec![row]);
    }

    Err(HierarchyError::QueryFailure(
        "results document has neither bindings nor boolean".to_string(),
    ))
}

/// Remote SPARQL endpoint
#[derive(Clone)]
pub struct HttpEndpoint {
    url: String,
    client: Client,
    auth_token: Option<String>,
}

impl fmt::Debug for HttpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpEndpoint")
            .field("url", &self.url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpEndpoint {
    /// Create endpoint with a request timeout
    ///
    /// # Example
    ///
    /// ```no_run
    /// use onto_hierarchy::gateway::HttpEndpoint;
    /// use std::time::Duration;
    ///
    /// let endpoint = HttpEndpoint::new("http://localhost:7878/query", Duration::from_secs(30))?;
    /// # Ok::<(), onto_hierarchy::HierarchyError>(())
    /// ```
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(HierarchyError::Config(format!(
                "endpoint must be an http(s) URL: {}",
                url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url,
            client,
            auth_token: None,
        })
    }

    /// Add bearer authentication token
    pub fn with_auth(mut self, token: String) -> Self {
        self.auth_token = Some(token);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SparqlEndpoint for HttpEndpoint {
    fn select(&self, query: &SparqlQuery) -> Result<Vec<QueryRow>> {
        let mut request = self
            .client
            .post(&self.url)
            .header(ACCEPT, RESULTS_JSON)
            .form(&[("query", query.as_str())]);

        if let Some(token) = &self.auth_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = request.send()?.error_for_status()?.text()?;
        debug!(url = %self.url, bytes = body.len(), "sparql response received");

        parse_results_json(&body)
    }
}
