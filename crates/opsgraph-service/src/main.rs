//! CLI entry point for the opsgraph knowledge graph.
//!
//! Builds the graph from a directory of source JSON files, runs one
//! command against it, and writes the JSON result to stdout.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use opsgraph_service::{GraphService, ServiceConfig};
use opsgraph_sync::JsonDirSource;

#[derive(Parser)]
#[command(name = "opsgraph")]
#[command(about = "Operational knowledge graph over departments, workflows and AI projects")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: opsgraph).
    #[arg(short, long, default_value = "opsgraph", global = true)]
    config: String,

    /// Override the source data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print every node and relationship.
    Full,
    /// Print the neighbourhood of one department.
    Department {
        /// Department ID.
        id: String,
    },
    /// Print the governance lineage of one project.
    Lineage {
        /// Project ID.
        id: i64,
    },
    /// Print all cross-entity insights.
    Insights,
    /// Print node and relationship counts.
    Stats,
    /// Refresh one project and its recent events, then print the outcome.
    SyncProject {
        /// Project ID.
        id: i64,
    },
    /// Exit non-zero unless the graph is built and the mirror reachable.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut config = ServiceConfig::load(&cli.config)?;
    if let Some(dir) = cli.data_dir.clone() {
        config.source.data_dir = dir;
    }

    let source = Arc::new(JsonDirSource::new(config.source.data_dir.clone()));
    let service = GraphService::new(source, config);
    service.start().await;

    let mut healthy = true;
    let output = match cli.command {
        Command::Full => serde_json::to_string_pretty(&service.full_graph().await)?,
        Command::Department { ref id } => {
            serde_json::to_string_pretty(&service.department_subgraph(id).await)?
        }
        Command::Lineage { id } => {
            serde_json::to_string_pretty(&service.project_lineage(id).await)?
        }
        Command::Insights => serde_json::to_string_pretty(&service.insights().await)?,
        Command::Stats => serde_json::to_string_pretty(&service.stats().await)?,
        Command::SyncProject { id } => {
            serde_json::to_string_pretty(&service.sync_project(id).await?)?
        }
        Command::Health => {
            healthy = service.health().await;
            serde_json::to_string_pretty(&serde_json::json!({ "healthy": healthy }))?
        }
    };
    println!("{output}");

    service.shutdown().await;
    if !healthy {
        std::process::exit(1);
    }
    Ok(())
}
