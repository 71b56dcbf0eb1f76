//! ontohier - hierarchy metrics and navigation CLI
//!
//! Runs the engine against a Turtle file loaded into an in-process store, or
//! against a remote SPARQL endpoint.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

use onto_hierarchy::{
    EngineConfig, Hierarchy, HierarchyEngine, HttpEndpoint, SparqlGateway, StoreEndpoint, TreeView,
};

#[derive(Parser)]
#[command(name = "ontohier")]
#[command(version)]
#[command(about = "Ontology hierarchy metrics and navigation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Named graph (submission) IRI
    #[arg(long)]
    graph: String,
    /// Turtle file loaded into an in-memory store under --graph
    #[arg(long, conflicts_with = "endpoint")]
    data: Option<PathBuf>,
    /// Remote SPARQL query endpoint URL
    #[arg(long)]
    endpoint: Option<String>,
    /// Bearer token for the remote endpoint
    #[arg(long, requires = "endpoint")]
    token: Option<String>,
    /// Remote query timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
    /// Engine configuration (YAML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute structural metrics and print them as JSON
    Metrics {
        #[command(flatten)]
        source: Source,
        /// Designated root (repeatable); discovered from the graph when omitted
        #[arg(long = "root")]
        roots: Vec<String>,
        /// Treat the hierarchy as flat (no depth or branching metrics)
        #[arg(long)]
        flat: bool,
    },
    /// List top-level classes
    Roots {
        #[command(flatten)]
        source: Source,
    },
    /// Print every path from a class up to the top
    Paths {
        #[command(flatten)]
        source: Source,
        /// Class IRI
        node: String,
    },
    /// List every transitive superclass of a class
    Ancestors {
        #[command(flatten)]
        source: Source,
        /// Class IRI
        node: String,
    },
    /// List every transitive subclass of a class
    Descendants {
        #[command(flatten)]
        source: Source,
        /// Class IRI
        node: String,
    },
    /// Print the breadcrumb tree of a class
    Tree {
        #[command(flatten)]
        source: Source,
        /// Class IRI
        node: String,
        /// Designated root (repeatable); discovered from the graph when omitted
        #[arg(long = "root")]
        roots: Vec<String>,
    },
}

impl Commands {
    fn source(&self) -> &Source {
        match self {
            Commands::Metrics { source, .. }
            | Commands::Roots { source }
            | Commands::Paths { source, .. }
            | Commands::Ancestors { source, .. }
            | Commands::Descendants { source, .. }
            | Commands::Tree { source, .. } => source,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_engine(source: &Source) -> Result<HierarchyEngine> {
    let config = match &source.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let vocabulary = config.vocabulary.clone();

    let engine = match (&source.data, &source.endpoint) {
        (Some(data), _) => {
            let store = StoreEndpoint::new()?;
            store
                .load_turtle_file(&source.graph, data)
                .with_context(|| format!("Failed to load {}", data.display()))?;
            HierarchyEngine::new(SparqlGateway::new(store, vocabulary), config)?
        }
        (None, Some(url)) => {
            let mut endpoint = HttpEndpoint::new(url, Duration::from_secs(source.timeout))?;
            if let Some(token) = &source.token {
                endpoint = endpoint.with_auth(token.clone());
            }
            HierarchyEngine::new(SparqlGateway::new(endpoint, vocabulary), config)?
        }
        (None, None) => bail!("Either --data or --endpoint is required"),
    };
    Ok(engine)
}

fn hierarchy(engine: &HierarchyEngine, graph: &str, roots: Vec<String>, flat: bool) -> Result<Hierarchy> {
    if roots.is_empty() {
        return Ok(engine.discover_hierarchy(graph, flat)?);
    }
    Ok(Hierarchy::new(graph).with_roots(roots).flat(flat))
}

/// Focus in bold, obsolete classes dimmed, child counts in cyan
fn print_tree(view: &TreeView) {
    for row in view.outline() {
        let label = row.snapshot.display_label();
        let label = if row.focus {
            label.bold().to_string()
        } else if row.is_obsolete() {
            label.dimmed().to_string()
        } else {
            label.to_string()
        };
        println!("{}", row.line(&label, &row.node.child_count.to_string().cyan().to_string()));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.source().verbose);

    let engine = open_engine(cli.command.source())?;

    match cli.command {
        Commands::Metrics { source, roots, flat } => {
            let hierarchy = hierarchy(&engine, &source.graph, roots, flat)?;
            let metrics = engine
                .compute_metrics(&hierarchy)
                .context("Metrics computation failed")?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
        }

        Commands::Roots { source } => {
            let roots = engine.find_roots(&source.graph)?;
            if roots.is_empty() {
                println!("No top-level classes found");
            }
            for root in roots {
                println!("{}", root);
            }
        }

        Commands::Paths { source, node } => {
            let paths = engine.build_paths_to_root(&source.graph, &node)?;
            println!("{} path(s) from {}", paths.len().to_string().green(), node);
            for (i, path) in paths.iter().enumerate() {
                println!("  {}. {}", i + 1, path);
            }
        }

        Commands::Ancestors { source, node } => {
            let ids = engine.ancestors(&source.graph, &node)?;
            println!("{} ancestor(s) of {}", ids.len().to_string().green(), node);
            for id in ids {
                println!("  {}", id);
            }
        }

        Commands::Descendants { source, node } => {
            let ids = engine.descendants(&source.graph, &node)?;
            println!("{} descendant(s) of {}", ids.len().to_string().green(), node);
            for id in ids {
                println!("  {}", id);
            }
        }

        Commands::Tree { source, node, roots } => {
            let hierarchy = hierarchy(&engine, &source.graph, roots, false)?;
            let view = engine.build_tree(&hierarchy, &node)?;
            if view.is_degenerate() {
                eprintln!("{} no path from {} reaches a root", "warn:".yellow().bold(), node);
            }
            print_tree(&view);
        }
    }

    Ok(())
}
