//! Node Configuration
//!
//! Command-line arguments and the validated configuration a node is started with.

use crate::cluster::types::{ClusterTopology, NodeId};

use anyhow::{Result, ensure};
use clap::{Parser, ValueHint};
use std::net::SocketAddr;
use std::time::Duration;

/// Command-line arguments for a replica node.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Run a quorum-replicated key-value node")]
pub struct NodeArgs {
    /// Socket address the HTTP server binds to.
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// URL other nodes use to reach this node, e.g. http://127.0.0.1:8080 (must appear in --cluster)
    #[arg(long, value_hint = ValueHint::Url)]
    pub url: String,

    /// Comma-separated URLs of every cluster node, including this one.
    #[arg(long, value_delimiter = ',', required = true, value_hint = ValueHint::Url)]
    pub cluster: Vec<String>,

    /// Deadline for replica calls made on behalf of one client request, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    pub log: String,
}

/// Validated node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub topology: ClusterTopology,
    pub request_timeout: Duration,
}

impl NodeArgs {
    pub fn into_config(self) -> Result<NodeConfig> {
        ensure!(self.timeout_ms > 0, "--timeout-ms must be greater than zero");

        let nodes: Vec<NodeId> = self
            .cluster
            .iter()
            .filter(|url| !url.trim().is_empty())
            .map(NodeId::new)
            .collect();
        for node in &nodes {
            ensure!(
                node.as_str().starts_with("http://") || node.as_str().starts_with("https://"),
                "cluster node {} must be an http(s) URL",
                node
            );
        }

        let topology = ClusterTopology::new(NodeId::new(&self.url), nodes)?;

        Ok(NodeConfig {
            listen: self.listen,
            topology,
            request_timeout: Duration::from_millis(self.timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<NodeConfig> {
        let mut argv = vec!["quorum-kv"];
        argv.extend_from_slice(args);
        NodeArgs::try_parse_from(argv)?.into_config()
    }

    #[test]
    fn test_parses_cluster_list() {
        let config = parse(&[
            "--listen",
            "127.0.0.1:9001",
            "--url",
            "http://127.0.0.1:9001/",
            "--cluster",
            "http://127.0.0.1:9001,http://127.0.0.1:9002,http://127.0.0.1:9003",
            "--timeout-ms",
            "250",
        ])
        .unwrap();

        assert_eq!(config.listen, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.topology.size(), 3);
        assert_eq!(config.topology.local(), &NodeId::new("http://127.0.0.1:9001"));
        assert_eq!(config.request_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--url", "http://a:1", "--cluster", "http://a:1"]).unwrap();

        assert_eq!(config.listen, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.request_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_rejects_self_outside_cluster() {
        let result = parse(&["--url", "http://z:1", "--cluster", "http://a:1,http://b:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let result = parse(&[
            "--url",
            "http://a:1",
            "--cluster",
            "http://a:1",
            "--timeout-ms",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_non_http_nodes() {
        let result = parse(&["--url", "a:1", "--cluster", "a:1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_requires_cluster() {
        assert!(NodeArgs::try_parse_from(["quorum-kv", "--url", "http://a:1"]).is_err());
    }
}
