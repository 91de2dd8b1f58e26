//! Quorum-Replicated Key-Value Node Library
//!
//! Core modules of a node in a replicated key-value cluster. Any node accepts
//! client requests for any key and coordinates a quorum of replicas for it.
//! The binary (`main.rs`) wires these modules into an HTTP server.
//!
//! ## Architecture Modules
//! - **`cluster`**: Static cluster membership and node identity.
//! - **`storage`**: The local last-writer-wins storage engine behind the `Storage` trait.
//! - **`replication`**: Replica placement, the quorum coordinator, peer calls, request
//!   routing and the `/v0/entity` HTTP surface.
//! - **`config`**: Command-line configuration.

pub mod cluster;
pub mod config;
pub mod replication;
pub mod storage;

use crate::cluster::types::ClusterTopology;
use crate::replication::coordinator::QuorumCoordinator;
use crate::replication::executor::LocalOperationExecutor;
use crate::replication::handlers::entity_routes;
use crate::replication::peer::PeerClient;
use crate::replication::resolver::ReplicaSetResolver;
use crate::replication::router::RequestRouter;
use crate::storage::engine::Storage;

use std::sync::Arc;
use std::time::Duration;

/// Assembles a node's request pipeline and returns its HTTP routes.
///
/// Every collaborator is passed in, so tests can swap the storage engine or the
/// peer transport.
pub fn build_node(
    topology: ClusterTopology,
    storage: Arc<dyn Storage>,
    peers: Arc<dyn PeerClient>,
    request_timeout: Duration,
) -> axum::Router {
    let executor = Arc::new(LocalOperationExecutor::new(storage));
    let resolver = ReplicaSetResolver::new(Arc::new(topology));
    let coordinator = Arc::new(QuorumCoordinator::new(
        resolver,
        executor.clone(),
        peers,
        request_timeout,
    ));
    let router = Arc::new(RequestRouter::new(executor, coordinator));

    entity_routes(router)
}
