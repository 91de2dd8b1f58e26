use anyhow::Result;
use clap::Parser;
use quorum_kv::build_node;
use quorum_kv::config::NodeArgs;
use quorum_kv::replication::peer::HttpPeerClient;
use quorum_kv::storage::memory::MemoryStorage;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = NodeArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.into_config()?;

    tracing::info!("Starting node {}", config.topology.local());
    tracing::info!(
        "Cluster of {} nodes, replica call deadline {:?}",
        config.topology.size(),
        config.request_timeout
    );
    for node in config.topology.nodes() {
        tracing::info!("  - {}", node);
    }

    // 1. Local storage:
    let storage = Arc::new(MemoryStorage::new());

    // 2. Peer transport:
    let http_client = reqwest::Client::builder()
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .build()?;
    let peers = Arc::new(HttpPeerClient::with_client(http_client));

    // 3. HTTP Router:
    let app = build_node(config.topology, storage, peers, config.request_timeout);

    // 4. Start HTTP server:
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
