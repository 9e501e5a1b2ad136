//! relgraph command-line client.
//!
//! Loads a JSON fixture, runs one eager-loading query and prints the result.

use std::path::PathBuf;

use clap::Parser;
use relgraph::{parse_path, Depth, Fixture, Graph};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// relgraph command-line client
#[derive(Parser, Debug)]
#[command(name = "relgraph")]
#[command(version, about = "Eager-load related records from a JSON fixture")]
pub struct Args {
    /// Fixture file with `schema`, `data` and an optional `config`
    #[arg(short, long)]
    pub fixture: PathBuf,

    /// Root entity type
    #[arg(short, long)]
    pub entity: String,

    /// Relation path to load, e.g. `posts.comments|likes` (repeatable)
    #[arg(short, long = "with", value_name = "PATH")]
    pub with: Vec<String>,

    /// Load every relation of the root type
    #[arg(long)]
    pub with_all: bool,

    /// Load every relation at every level
    #[arg(long)]
    pub with_all_recursive: bool,

    /// Relation to follow at every level (repeatable)
    #[arg(long, value_name = "NAME")]
    pub with_recursive: Vec<String>,

    /// Depth limit for recursive loads (unbounded when omitted)
    #[arg(long)]
    pub depth: Option<usize>,

    /// Only the record with this identity
    #[arg(long, value_name = "ID", conflicts_with = "first")]
    pub find: Option<String>,

    /// Only the first record
    #[arg(long)]
    pub first: bool,

    /// Materialize relations that were not requested as null / []
    #[arg(long)]
    pub fill_unloaded: bool,

    /// Name of the injected identity key
    #[arg(long, value_name = "FIELD")]
    pub id_field: Option<String>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("--depth needs --with-all-recursive or --with-recursive")]
    DepthWithoutRecursion,
    #[error("invalid --with path\n{report}")]
    InvalidPath { report: String },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relgraph=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let result = run(&args).and_then(|output| render(&output, args.compact));

    match result {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<Value, Box<dyn std::error::Error>> {
    let recursive = args.with_all_recursive || !args.with_recursive.is_empty();
    if args.depth.is_some() && !recursive {
        return Err(CliError::DepthWithoutRecursion.into());
    }
    // The query API drops malformed paths; on the command line they are errors.
    for expression in &args.with {
        parse_path(expression).map_err(|e| CliError::InvalidPath {
            report: e.format_with_source(expression),
        })?;
    }

    let graph = load_graph(args)?;
    let snapshot = graph.snapshot();

    let mut query = snapshot.query(&args.entity);
    if !args.with.is_empty() {
        query = query.with(args.with.clone());
    }
    if args.with_all {
        query = query.with_all();
    }
    let depth = Depth::from(args.depth);
    if args.with_all_recursive {
        query = query.with_all_recursive(depth);
    }
    if !args.with_recursive.is_empty() {
        query = query.with_recursive(args.with_recursive.iter().cloned(), depth);
    }
    debug!(entity = %args.entity, relations = ?query.inclusion_tree().paths(), "running query");

    let output = match (&args.find, args.first) {
        (Some(id), _) => query.find(id.as_str()).unwrap_or(Value::Null),
        (None, true) => query.first().unwrap_or(Value::Null),
        (None, false) => Value::Array(query.get()),
    };
    Ok(output)
}

fn load_graph(args: &Args) -> relgraph::Result<Graph> {
    let mut fixture = Fixture::from_path(&args.fixture)?;

    let mut config = fixture.config.take().unwrap_or_default();
    if args.fill_unloaded {
        config.fill_unloaded_relations = true;
    }
    if let Some(field) = &args.id_field {
        config.synthetic_id_field = field.clone();
    }
    fixture.config = Some(config);

    fixture.into_graph()
}

fn render(output: &Value, compact: bool) -> Result<String, Box<dyn std::error::Error>> {
    let text = if compact {
        serde_json::to_string(output)?
    } else {
        serde_json::to_string_pretty(output)?
    };
    Ok(text)
}
