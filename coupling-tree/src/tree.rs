use rand::Rng;
use tracing::info;

use crate::node::{Direction, OwnedNodePtr, Value};
use crate::node_ref::{NodeRef, marker};
use crate::rebalance::rebalance_pass;
use crate::removal::remove_value;
use crate::root_slot::RootSlot;
use crate::search::{InsertPosition, find_insert_position};
use crate::shape::Shape;
use crate::stats::TreeStats;

/// Values drawn by `insert_random`/`remove_random` when no range is given.
pub const DEFAULT_VALUE_RANGE: Value = 1000;

/// Concurrent binary search tree with one latch per node.
///
/// Every operation takes latches top-down along a single root-to-leaf path,
/// starting with the root slot's latch, so any number of threads can share a
/// `&CouplingTree`.
// To test with Miri:
//   MIRIFLAGS=-Zmiri-tree-borrows cargo +nightly miri test
// Run the shuttle test:
//   cargo test --features=shuttle -- test_concurrent_workload_under_shuttle
// Run benchmarks:
//   cargo bench
pub struct CouplingTree {
    root: RootSlot,
    stats: TreeStats,
    value_range: Value,
    value_width: usize,
}

impl CouplingTree {
    pub fn new() -> Self {
        Self::with_value_range(DEFAULT_VALUE_RANGE)
    }

    /// A tree whose random operations draw from `0..value_range`.
    pub fn with_value_range(value_range: Value) -> Self {
        assert!(value_range > 0, "value range must be positive");
        CouplingTree {
            root: RootSlot::new(),
            stats: TreeStats::new(),
            value_range,
            value_width: value_width(value_range),
        }
    }

    pub fn value_range(&self) -> Value {
        self.value_range
    }

    /// Number of digits in the largest value random operations can produce.
    pub fn value_width(&self) -> usize {
        self.value_width
    }

    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Inserts `value`. Returns false, leaving the tree untouched, if it's
    /// already present.
    pub fn insert(&self, value: Value) -> bool {
        let mut locked_root = self.root.lock();
        let top = match locked_root.top() {
            Some(top) => top.lock(),
            None => {
                *locked_root.slot_mut() = Some(OwnedNodePtr::new(value));
                locked_root.unlock();
                self.record_insert(value);
                return true;
            }
        };
        locked_root.unlock();

        let (mut parent, position) = find_insert_position(top, value);
        match position {
            InsertPosition::Occupied => {
                parent.unlock();
                false
            }
            InsertPosition::Vacant(direction) => {
                parent.attach_child(direction, OwnedNodePtr::new(value));
                parent.unlock();
                self.record_insert(value);
                true
            }
        }
    }

    pub fn insert_random(&self, rng: &mut impl Rng) -> bool {
        self.insert(rng.random_range(0..self.value_range))
    }

    /// Removes `value`. Returns false if it wasn't present.
    pub fn remove(&self, value: Value) -> bool {
        let removed = remove_value(&self.root, value);
        if removed {
            self.stats.record_delete();
            info!("Deleted {:0width$}", value, width = self.value_width);
        }
        removed
    }

    pub fn remove_random(&self, rng: &mut impl Rng) -> bool {
        self.remove(rng.random_range(0..self.value_range))
    }

    /// A single rebalancing pass from the root. Returns the regrafts performed.
    pub fn rebalance(&self) -> usize {
        let ops = rebalance_pass(&self.root);
        self.stats.record_rebalance_ops(ops);
        ops
    }

    /// Repeats rebalancing passes until one changes nothing. Returns the total
    /// number of regrafts.
    pub fn rebalance_tree(&self) -> usize {
        let mut total = 0;
        loop {
            let ops = self.rebalance();
            if ops == 0 {
                return total;
            }
            total += ops;
        }
    }

    /// Runs passes until one changes nothing, giving up after `max_passes`.
    /// Returns whether a fixed point was reached.
    #[cfg(test)]
    pub(crate) fn rebalance_at_most(&self, max_passes: usize) -> bool {
        (0..max_passes).any(|_| self.rebalance() == 0)
    }

    /// Copies the current structure. The root latch is held for the whole
    /// walk and each node is latched while its subtree is copied, so the
    /// snapshot is consistent even with writers running.
    pub fn shape(&self) -> Shape {
        let locked_root = self.root.lock();
        let shape = snapshot(locked_root.top());
        locked_root.unlock();
        shape
    }

    pub fn len(&self) -> usize {
        self.shape().len()
    }

    pub fn is_empty(&self) -> bool {
        let locked_root = self.root.lock();
        let empty = locked_root.is_empty();
        locked_root.unlock();
        empty
    }

    /// Panics if search order is violated anywhere in the tree.
    pub fn check_invariants(&self) {
        let shape = self.shape();
        let values = shape.values();
        if let Some(pair) = values.windows(2).find(|pair| pair[0] >= pair[1]) {
            panic!(
                "search order violated: {} precedes {} in order ({} nodes)",
                pair[0],
                pair[1],
                values.len()
            );
        }
    }

    fn record_insert(&self, value: Value) {
        self.stats.record_insert();
        info!("Added {:0width$}", value, width = self.value_width);
    }
}

impl Default for CouplingTree {
    fn default() -> Self {
        Self::new()
    }
}

fn snapshot(node: Option<NodeRef<marker::Unlocked>>) -> Shape {
    let Some(node) = node else {
        return Shape::Empty;
    };
    let node = node.lock();
    let shape = Shape::node(
        node.value(),
        snapshot(node.child(Direction::Left)),
        snapshot(node.child(Direction::Right)),
    );
    node.unlock();
    shape
}

pub(crate) fn value_width(value_range: Value) -> usize {
    (value_range - 1).to_string().len()
}
