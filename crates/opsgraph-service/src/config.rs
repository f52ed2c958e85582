//! Service configuration.
//!
//! Loaded from `opsgraph.toml` (or another file prefix) and
//! `OPSGRAPH__`-prefixed environment variables, e.g.
//! `OPSGRAPH__SYNC__FULL_EVENT_LIMIT=500` or `OPSGRAPH__NEO4J__URI=bolt://graph:7687`.

use std::path::PathBuf;

use opsgraph_graph::Neo4jConfig;
use opsgraph_sync::SyncConfig;
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    /// Neo4j mirror. Absent disables publication.
    #[serde(default)]
    pub neo4j: Option<Neo4jConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Directory holding the source JSON files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl ServiceConfig {
    /// Layer the optional config file under environment overrides.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("OPSGRAPH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}
