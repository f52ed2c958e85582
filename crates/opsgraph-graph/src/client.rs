//! Neo4j connection management for the graph mirror.

use std::time::Duration;

use neo4rs::{ConfigBuilder, Graph, Query};
use serde::Deserialize;

use crate::error::{GraphError, Result};

/// Configuration for connecting to the Neo4j mirror.
#[derive(Debug, Clone, Deserialize)]
pub struct Neo4jConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_fetch_size")]
    pub fetch_size: usize,
    /// Upper bound on a health probe or a single-project publication, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Upper bound on publishing a whole snapshot, in seconds.
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
}

fn default_uri() -> String {
    "bolt://localhost:7687".to_string()
}

fn default_user() -> String {
    "neo4j".to_string()
}

fn default_max_connections() -> u32 {
    16
}

fn default_fetch_size() -> usize {
    256
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_publish_timeout_secs() -> u64 {
    120
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: default_user(),
            password: String::new(),
            max_connections: default_max_connections(),
            fetch_size: default_fetch_size(),
            timeout_secs: default_timeout_secs(),
            publish_timeout_secs: default_publish_timeout_secs(),
        }
    }
}

/// Pooled Neo4j client. Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
    timeout: Duration,
    publish_timeout: Duration,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self {
            graph,
            timeout: Duration::from_secs(config.timeout_secs),
            publish_timeout: Duration::from_secs(config.publish_timeout_secs),
        })
    }

    /// Bound for health checks and single-project publications.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Bound for whole-snapshot publications.
    pub fn publish_timeout(&self) -> Duration {
        self.publish_timeout
    }

    /// Round-trip a trivial query. Fails with [`GraphError::Timeout`] when
    /// Neo4j does not answer within the configured timeout.
    pub async fn health(&self) -> Result<()> {
        let probe = self.query_one(neo4rs::query("RETURN 1 AS ok"));
        match tokio::time::timeout(self.timeout, probe).await {
            Ok(Ok(Some(_))) => Ok(()),
            Ok(Ok(None)) => Err(GraphError::Connection(
                "health probe returned no rows".to_string(),
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(GraphError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    /// Execute a write-only query outside any transaction.
    pub async fn run(&self, query: Query) -> Result<()> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }

    pub async fn start_txn(&self) -> Result<neo4rs::Txn> {
        Ok(self.graph.start_txn().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Neo4jConfig =
            serde_json::from_str(r#"{"uri": "bolt://graph:7687", "password": "pw"}"#).unwrap();
        assert_eq!(config.uri, "bolt://graph:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.publish_timeout_secs, 120);
        assert_eq!(config.max_connections, 16);
    }
}
