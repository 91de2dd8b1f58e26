//! Local Storage Module
//!
//! The node-local key-value engine behind the replication layer.
//!
//! ## Core Concepts
//! - **Records**: Every write carries a coordinator-assigned timestamp. Deletes are
//!   stored as tombstones rather than physical removals.
//! - **Last-writer-wins**: A write replaces the stored record only when it is newer,
//!   so replicas converge regardless of the order writes arrive in.
//! - **Engine seam**: Callers depend on the `Storage` trait; `MemoryStorage` is the
//!   in-process implementation used by the binary and the tests.

pub mod engine;
pub mod memory;
pub mod types;
