//! Cluster Topology Module
//!
//! Static view of the nodes that make up the cluster.
//!
//! Membership is fixed at startup: every node is started with the same list of
//! node URLs, so every node can independently compute the same replica set for
//! a key without exchanging it over the wire. Discovery and rebalancing are
//! handled outside this crate.

pub mod types;
