use std::cmp::Ordering as CmpOrdering;

use crate::node::{Direction, Value};
use crate::node_ref::{NodeRef, marker};

/// What a traversal wants to do at the node it currently holds.
pub(crate) enum Step<T> {
    /// Lock the child in this direction, release the current node, continue there.
    /// The child must exist.
    Descend(Direction),
    /// Stop here, keeping the current node locked.
    Stop(T),
}

/// Hand-over-hand descent from a locked `start`.
///
/// `step` inspects the node we hold and, through it, its children. We only
/// release a node after its child is locked, so at most two latches are held
/// by the walk at any moment, always acquired parent before child.
pub(crate) fn descend_coupled<T>(
    start: NodeRef<marker::Locked>,
    mut step: impl FnMut(&NodeRef<marker::Locked>) -> Step<T>,
) -> (NodeRef<marker::Locked>, T) {
    let mut current = start;
    loop {
        match step(&current) {
            Step::Stop(outcome) => return (current, outcome),
            Step::Descend(direction) => {
                let child = match current.child(direction) {
                    Some(child) => child.lock(),
                    None => unreachable!("descend into an empty {:?} slot", direction),
                };
                current.unlock();
                current = child;
            }
        }
    }
}

/// Which way a search for `value` leaves `value_at_node`; `None` if they're equal.
pub(crate) fn direction_toward(value: Value, value_at_node: Value) -> Option<Direction> {
    match value.cmp(&value_at_node) {
        CmpOrdering::Less => Some(Direction::Left),
        CmpOrdering::Greater => Some(Direction::Right),
        CmpOrdering::Equal => None,
    }
}

pub(crate) enum InsertPosition {
    /// The returned node's slot in this direction is where the value belongs.
    Vacant(Direction),
    /// The returned node already holds the value.
    Occupied,
}

pub(crate) fn find_insert_position(
    start: NodeRef<marker::Locked>,
    value: Value,
) -> (NodeRef<marker::Locked>, InsertPosition) {
    descend_coupled(start, |node| match direction_toward(value, node.value()) {
        None => Step::Stop(InsertPosition::Occupied),
        Some(direction) if node.has_child(direction) => Step::Descend(direction),
        Some(direction) => Step::Stop(InsertPosition::Vacant(direction)),
    })
}

pub(crate) enum RemovalSearch {
    /// The value isn't below the returned node.
    Missing,
    /// The returned node's child in this direction holds the value.
    ChildHolds(Direction),
}

/// Looks for `value` strictly below `start`; the caller has already checked
/// `start` itself. Stops at the parent of the match so the parent can be patched.
pub(crate) fn find_parent_of(
    start: NodeRef<marker::Locked>,
    value: Value,
) -> (NodeRef<marker::Locked>, RemovalSearch) {
    debug_assert_ne!(start.value(), value);
    descend_coupled(start, |node| {
        let direction = match direction_toward(value, node.value()) {
            Some(direction) => direction,
            None => unreachable!("walked onto the removal target without stopping at its parent"),
        };
        match node.child(direction) {
            None => Step::Stop(RemovalSearch::Missing),
            Some(child) if child.value() == value => {
                Step::Stop(RemovalSearch::ChildHolds(direction))
            }
            Some(_) => Step::Descend(direction),
        }
    })
}

/// Follows only `direction` edges until that slot is empty.
pub(crate) fn find_frontier(
    start: NodeRef<marker::Locked>,
    direction: Direction,
) -> NodeRef<marker::Locked> {
    let (frontier, ()) = descend_coupled(start, |node| {
        if node.has_child(direction) {
            Step::Descend(direction)
        } else {
            Step::Stop(())
        }
    });
    frontier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::OwnedNodePtr;

    // 50 (30 (20, 40), 70 (-, 80 (-, 90)))
    fn sample() -> OwnedNodePtr {
        let root = OwnedNodePtr::new(50);
        let mut top = root.share().lock();
        let left = OwnedNodePtr::new(30);
        let right = OwnedNodePtr::new(70);
        {
            let mut l = left.share().lock();
            l.attach_child(Direction::Left, OwnedNodePtr::new(20));
            l.attach_child(Direction::Right, OwnedNodePtr::new(40));
            l.unlock();
            let mut r = right.share().lock();
            let far = OwnedNodePtr::new(80);
            let mut f = far.share().lock();
            f.attach_child(Direction::Right, OwnedNodePtr::new(90));
            f.unlock();
            r.attach_child(Direction::Right, far);
            r.unlock();
        }
        top.attach_child(Direction::Left, left);
        top.attach_child(Direction::Right, right);
        top.unlock();
        root
    }

    fn assert_all_unlocked(owned: &OwnedNodePtr) {
        let node = unsafe { owned.node() };
        assert!(!node.is_locked(), "node {} left locked", node.value());
        for direction in Direction::BOTH {
            if let Some(child) = unsafe { node.children() }.slot(direction) {
                assert_all_unlocked(child);
            }
        }
    }

    #[test]
    fn test_find_insert_position() {
        let root = sample();

        let (node, position) = find_insert_position(root.share().lock(), 35);
        assert_eq!(node.value(), 40);
        assert!(matches!(position, InsertPosition::Vacant(Direction::Left)));
        node.unlock();

        let (node, position) = find_insert_position(root.share().lock(), 75);
        assert_eq!(node.value(), 80);
        assert!(matches!(position, InsertPosition::Vacant(Direction::Left)));
        node.unlock();

        let (node, position) = find_insert_position(root.share().lock(), 80);
        assert_eq!(node.value(), 80);
        assert!(matches!(position, InsertPosition::Occupied));
        node.unlock();

        assert_all_unlocked(&root);
    }

    #[test]
    fn test_find_parent_of() {
        let root = sample();

        let (node, search) = find_parent_of(root.share().lock(), 90);
        assert_eq!(node.value(), 80);
        assert!(matches!(search, RemovalSearch::ChildHolds(Direction::Right)));
        node.unlock();

        let (node, search) = find_parent_of(root.share().lock(), 30);
        assert_eq!(node.value(), 50);
        assert!(matches!(search, RemovalSearch::ChildHolds(Direction::Left)));
        node.unlock();

        let (node, search) = find_parent_of(root.share().lock(), 60);
        assert_eq!(node.value(), 70);
        assert!(matches!(search, RemovalSearch::Missing));
        node.unlock();

        assert_all_unlocked(&root);
    }

    #[test]
    fn test_find_frontier_ignores_values() {
        let root = sample();

        let frontier = find_frontier(root.share().lock(), Direction::Right);
        assert_eq!(frontier.value(), 90);
        frontier.unlock();

        let frontier = find_frontier(root.share().lock(), Direction::Left);
        assert_eq!(frontier.value(), 20);
        frontier.unlock();

        assert_all_unlocked(&root);
    }

    #[test]
    fn test_descent_releases_parent_before_each_step() {
        let root = sample();
        let top = root.share().lock();
        let (node, held) = {
            let mut max_held = 0;
            let result = descend_coupled(top, |node| {
                // the parent is already released whenever `step` runs
                let held = count_locked(&root);
                max_held = max_held.max(held);
                if node.has_child(Direction::Right) {
                    Step::Descend(Direction::Right)
                } else {
                    Step::Stop(())
                }
            });
            (result.0, max_held)
        };
        assert_eq!(held, 1);
        assert_eq!(node.value(), 90);
        node.unlock();
    }

    fn count_locked(owned: &OwnedNodePtr) -> usize {
        let node = unsafe { owned.node() };
        let mut count = node.is_locked() as usize;
        for direction in Direction::BOTH {
            if let Some(child) = unsafe { node.children() }.slot(direction) {
                count += count_locked(child);
            }
        }
        count
    }
}
