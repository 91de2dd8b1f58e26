//! Quorum Replication Module
//!
//! Coordinates reads and writes over the replicas responsible for a key.
//!
//! ## Request Flow
//! 1. **Routing**: `RequestRouter` inspects the internal-replica marker. Peer-originated
//!    requests go straight to the `LocalOperationExecutor` and are never re-replicated.
//! 2. **Placement**: `ReplicaSetResolver` ranks cluster nodes for the key (rendezvous
//!    hashing) and derives the `ack/from` quorum.
//! 3. **Coordination**: `QuorumCoordinator` applies the operation locally when this node
//!    is a replica, fans out to the remaining replicas through a `PeerClient`, and
//!    answers as soon as `ack` replicas agree or the quorum becomes unreachable.
//!
//! ## Submodules
//! - **`types`**: Operations, outcomes, quorum parameters and replica sets.
//! - **`resolver`**: Deterministic key-to-replicas placement.
//! - **`executor`**: The only writer to the local storage engine.
//! - **`peer`**: Outbound replica calls over HTTP.
//! - **`coordinator`**: The quorum state machine.
//! - **`router`**: Entry point deciding between local execution and coordination.
//! - **`protocol`** / **`handlers`**: The `/v0/entity` HTTP surface.

pub mod clock;
pub mod coordinator;
pub mod executor;
pub mod handlers;
pub mod peer;
pub mod protocol;
pub mod resolver;
pub mod router;
pub mod types;
