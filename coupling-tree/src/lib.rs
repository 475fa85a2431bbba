//! A concurrent binary search tree synchronized by lock coupling.
//!
//! Each node carries its own latch and the root slot has a separate one. Every
//! operation walks down from the root holding at most two latches at a time
//! (parent, then child), so operations in disjoint subtrees run in parallel and
//! latches are always acquired in root-to-leaf order.
//!
//! Removal and rebalancing never rotate or promote successors. They cut out a
//! subtree and regraft it onto the first empty slot along one direction of
//! another subtree (`find_gap`). Rebalancing repeats such moves until every
//! node's subtrees differ in height by at most one.
//!
//! The [`workers`] module drives the tree with three concurrent roles (Inserter,
//! Deleter, Balancer) whose operations arrive at Poisson-distributed intervals.
//! [`SerialTree`] runs the same algorithms without latches and serves as a
//! reference.

#[macro_use]
mod debug;

mod config;
mod latch;
mod node;
mod node_ref;
mod poisson;
mod print;
mod rebalance;
mod regraft;
mod removal;
mod root_slot;
mod search;
mod serial;
mod shape;
mod stats;
mod summary;
mod sync;
mod tree;
pub mod workers;

pub use config::{Arrivals, ConfigError, WorkloadConfig};
pub use latch::LatchVersion;
pub use node::{Direction, Value};
pub use poisson::{PoissonArrivals, poisson_from_uniform};
pub use print::{MAX_PRINT_HEIGHT, render};
pub use serial::{SerialTree, run_serial};
pub use shape::Shape;
pub use stats::TreeStats;
pub use summary::RunSummary;
pub use tree::{CouplingTree, DEFAULT_VALUE_RANGE};
pub use workers::{CompletionFlag, Role, Worker, WorkerState, run_workload};
