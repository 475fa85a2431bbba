//! Single-threaded version of the same algorithms, with no latches.
//!
//! Given the same operations in the same order, it builds exactly the shapes
//! the concurrent tree builds when nothing else is running, which makes it a
//! reference for tests and the `--serial` mode of the binary.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::config::WorkloadConfig;
use crate::node::{Direction, Value};
use crate::search::direction_toward;
use crate::shape::Shape;
use crate::summary::RunSummary;
use crate::tree::{DEFAULT_VALUE_RANGE, value_width};
use crate::workers::Role;

type Link = Option<Box<SerialNode>>;

struct SerialNode {
    value: Value,
    left: Link,
    right: Link,
}

impl SerialNode {
    fn new(value: Value) -> Box<Self> {
        Box::new(SerialNode {
            value,
            left: None,
            right: None,
        })
    }

    fn slot(&self, direction: Direction) -> &Link {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    fn slot_mut(&mut self, direction: Direction) -> &mut Link {
        match direction {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

pub struct SerialTree {
    root: Link,
    value_range: Value,
    value_width: usize,
    inserts: usize,
    deletes: usize,
    rebalance_ops: usize,
}

impl SerialTree {
    pub fn new() -> Self {
        Self::with_value_range(DEFAULT_VALUE_RANGE)
    }

    pub fn with_value_range(value_range: Value) -> Self {
        assert!(value_range > 0, "value range must be positive");
        SerialTree {
            root: None,
            value_range,
            value_width: value_width(value_range),
            inserts: 0,
            deletes: 0,
            rebalance_ops: 0,
        }
    }

    pub fn value_width(&self) -> usize {
        self.value_width
    }

    pub fn inserts(&self) -> usize {
        self.inserts
    }
    pub fn deletes(&self) -> usize {
        self.deletes
    }
    pub fn rebalance_ops(&self) -> usize {
        self.rebalance_ops
    }

    pub fn insert(&mut self, value: Value) -> bool {
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            match direction_toward(value, node.value) {
                Some(direction) => slot = node.slot_mut(direction),
                None => return false,
            }
        }
        *slot = Some(SerialNode::new(value));
        self.inserts += 1;
        info!("Added {:0width$}", value, width = self.value_width);
        true
    }

    pub fn insert_random(&mut self, rng: &mut impl Rng) -> bool {
        let value = rng.random_range(0..self.value_range);
        self.insert(value)
    }

    pub fn remove(&mut self, value: Value) -> bool {
        let mut slot = &mut self.root;
        loop {
            let direction = match slot.as_deref() {
                None => return false,
                Some(node) => match direction_toward(value, node.value) {
                    Some(direction) => direction,
                    None => break,
                },
            };
            slot = match slot {
                Some(node) => node.slot_mut(direction),
                None => unreachable!(),
            };
        }
        splice_out(slot);
        self.deletes += 1;
        info!("Deleted {:0width$}", value, width = self.value_width);
        true
    }

    pub fn remove_random(&mut self, rng: &mut impl Rng) -> bool {
        let value = rng.random_range(0..self.value_range);
        self.remove(value)
    }

    pub fn rebalance(&mut self) -> usize {
        let ops = rebalance_subtree(&mut self.root);
        self.rebalance_ops += ops;
        ops
    }

    pub fn rebalance_tree(&mut self) -> usize {
        let mut total = 0;
        loop {
            let ops = self.rebalance();
            if ops == 0 {
                return total;
            }
            total += ops;
        }
    }

    pub fn shape(&self) -> Shape {
        snapshot(&self.root)
    }
}

impl Default for SerialTree {
    fn default() -> Self {
        Self::new()
    }
}

fn splice_out(slot: &mut Link) {
    let Some(mut removed) = slot.take() else {
        return;
    };
    *slot = match removed.left.take() {
        Some(mut left) => {
            if let Some(right) = removed.right.take() {
                find_gap(&mut left, right, Direction::Right);
            }
            Some(left)
        }
        None => removed.right.take(),
    };
}

fn find_gap(start: &mut SerialNode, subtree: Box<SerialNode>, direction: Direction) {
    let mut slot = start.slot_mut(direction);
    while let Some(node) = slot {
        slot = node.slot_mut(direction);
    }
    *slot = Some(subtree);
}

fn rebalance_subtree(slot: &mut Link) -> usize {
    let mut ops = 0;
    loop {
        let Some(node) = slot.as_deref() else {
            return ops;
        };
        let left = height(node.slot(Direction::Left));
        let right = height(node.slot(Direction::Right));
        let heavy = if right > left + 1 {
            Direction::Right
        } else if left > right + 1 {
            Direction::Left
        } else {
            break;
        };
        promote(slot, heavy);
        ops += 1;
    }
    if let Some(node) = slot {
        for direction in Direction::BOTH {
            ops += rebalance_subtree(node.slot_mut(direction));
        }
    }
    ops
}

fn promote(slot: &mut Link, heavy: Direction) {
    let Some(mut old) = slot.take() else {
        unreachable!("rebalancing an empty slot")
    };
    let Some(mut promoted) = old.slot_mut(heavy).take() else {
        unreachable!("promoting from an empty {:?} slot", heavy)
    };
    find_gap(&mut promoted, old, heavy.opposite());
    *slot = Some(promoted);
}

fn height(slot: &Link) -> usize {
    match slot {
        None => 0,
        Some(node) => 1 + height(&node.left).max(height(&node.right)),
    }
}

fn snapshot(slot: &Link) -> Shape {
    match slot {
        None => Shape::Empty,
        Some(node) => Shape::node(node.value, snapshot(&node.left), snapshot(&node.right)),
    }
}

/// The single-threaded workload: each round is one random insert followed by
/// a full rebalance. Values are drawn the way the Inserter draws them, so a
/// seed picks the same values in both modes.
pub fn run_serial(tree: &mut SerialTree, config: &WorkloadConfig, seed: u64) -> RunSummary {
    let mut values = StdRng::seed_from_u64(Role::Inserter.value_seed(seed));
    for _ in 0..config.insert_quota {
        tree.insert_random(&mut values);
        tree.rebalance_tree();
        info!("Balanced");
    }
    RunSummary {
        seed,
        inserts: tree.inserts,
        insert_attempts: config.insert_quota,
        deletes: tree.deletes,
        delete_attempts: 0,
        balances: config.insert_quota,
        rebalance_ops: tree.rebalance_ops,
    }
}
