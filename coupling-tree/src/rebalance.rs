use crate::node::{Direction, OwnedNodePtr};
use crate::node_ref::{NodeRef, marker};
use crate::regraft::{Detached, find_gap};
use crate::root_slot::RootSlot;

/// One top-down rebalancing pass. Returns the number of regrafts it performed.
///
/// The root latch is held for the whole pass, and every node stays latched
/// while its subtrees are being fixed, so a pass holds the latches of the
/// path from the root to wherever it currently is. Other threads can still
/// work in subtrees the pass has not reached or has already left.
pub(crate) fn rebalance_pass(root: &RootSlot) -> usize {
    let mut locked_root = root.lock();
    let ops = match locked_root.top() {
        Some(top) => {
            let top = top.lock();
            rebalance_subtree(locked_root.slot_mut(), top)
        }
        None => 0,
    };
    locked_root.unlock();
    ops
}

/// Restores `|height(left) - height(right)| <= 1` at the node in `position`,
/// then recurses into both children. `current` is the latched node occupying
/// `position`; it is released before returning.
fn rebalance_subtree(
    position: &mut Option<OwnedNodePtr>,
    mut current: NodeRef<marker::Locked>,
) -> usize {
    let mut ops = 0;
    loop {
        let (left, right) = child_heights(&current);
        let heavy = if right > left + 1 {
            Direction::Right
        } else if left > right + 1 {
            Direction::Left
        } else {
            break;
        };
        debug_println!(
            "rebalancing {:?}: left {} right {}, promoting {:?}",
            current,
            left,
            right,
            heavy
        );
        current = promote(position, current, heavy);
        ops += 1;
    }

    for direction in Direction::BOTH {
        if let Some(child) = current.child(direction) {
            let child = child.lock();
            ops += rebalance_subtree(current.slot_mut(direction), child);
        }
    }
    current.unlock();
    ops
}

/// Moves `current`'s `heavy` child up into `position` and regrafts `current`
/// onto the promoted node's frontier in the opposite direction. Returns the
/// node now in `position`, latched.
fn promote(
    position: &mut Option<OwnedNodePtr>,
    mut current: NodeRef<marker::Locked>,
    heavy: Direction,
) -> NodeRef<marker::Locked> {
    let Some(heavy_child) = current.take_child(heavy) else {
        unreachable!("promoting from an empty {:?} slot", heavy)
    };
    let promoted = heavy_child.share().lock();
    let Some(old) = position.replace(heavy_child) else {
        unreachable!("rebalancing an empty position")
    };
    find_gap(
        promoted,
        Detached::from_locked(old, current),
        heavy.opposite(),
    );
    // whoever owns `position` is still latched by us, so this is the node we put there
    match position {
        Some(owned) => owned.share().lock(),
        None => unreachable!(),
    }
}

fn child_heights(node: &NodeRef<marker::Locked>) -> (usize, usize) {
    (
        subtree_height(node.child(Direction::Left)),
        subtree_height(node.child(Direction::Right)),
    )
}

/// Height of the subtree below an unlatched child of a latched node.
/// Each node is latched while its own children are measured.
pub(crate) fn subtree_height(node: Option<NodeRef<marker::Unlocked>>) -> usize {
    let Some(node) = node else {
        return 0;
    };
    let node = node.lock();
    let (left, right) = child_heights(&node);
    node.unlock();
    1 + left.max(right)
}

#[cfg(test)]
mod tests {
    use crate::shape::Shape;
    use crate::tree::CouplingTree;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn tree_of(values: &[i64]) -> CouplingTree {
        let tree = CouplingTree::new();
        for &value in values {
            tree.insert(value);
        }
        tree
    }

    #[test]
    fn test_single_pass_fixes_right_chain() {
        let tree = tree_of(&[1, 2, 3]);
        assert_eq!(tree.shape().height(), 3);

        assert_eq!(tree.rebalance(), 1);
        assert_eq!(
            tree.shape(),
            Shape::node(2, Shape::leaf(1), Shape::leaf(3))
        );
        assert_eq!(tree.rebalance(), 0);
    }

    #[test]
    fn test_single_pass_fixes_left_chain() {
        let tree = tree_of(&[3, 2, 1]);
        assert_eq!(tree.rebalance(), 1);
        assert_eq!(
            tree.shape(),
            Shape::node(2, Shape::leaf(1), Shape::leaf(3))
        );
    }

    #[test]
    fn test_rebalance_empty_and_tiny_trees() {
        let tree = CouplingTree::new();
        assert_eq!(tree.rebalance_tree(), 0);
        tree.insert(4);
        assert_eq!(tree.rebalance_tree(), 0);
        tree.insert(5);
        assert_eq!(tree.rebalance_tree(), 0);
        assert_eq!(tree.shape(), Shape::node(4, Shape::Empty, Shape::leaf(5)));
    }

    #[test]
    fn test_rebalance_fixes_nodes_below_the_root() {
        // root is balanced (3 vs 3) but 20's right chain isn't
        let tree = tree_of(&[50, 20, 70, 30, 40, 60, 80, 90]);
        assert!(!tree.shape().is_balanced());
        let ops = tree.rebalance_tree();
        assert!(ops > 0);
        let shape = tree.shape();
        assert!(shape.is_balanced());
        assert_eq!(shape.values(), vec![20, 30, 40, 50, 60, 70, 80, 90]);
        assert_eq!(tree.stats().rebalance_ops(), ops);
    }

    #[test]
    fn test_rebalance_sorted_inserts_converges() {
        let values: Vec<i64> = (0..200).collect();
        let tree = tree_of(&values);
        assert_eq!(tree.shape().height(), 200);
        tree.rebalance_tree();
        let shape = tree.shape();
        assert!(shape.is_balanced());
        assert!(shape.is_search_tree());
        assert_eq!(shape.values(), values);
        assert_eq!(tree.rebalance(), 0);
    }

    const INTERESTING_SEEDS: [u64; 2] = [13142251578868436595, 101];

    #[test]
    fn test_random_trees_converge_to_balance() {
        for &seed in &INTERESTING_SEEDS {
            run_convergence_with_seed(seed);
        }
        let random_seed: u64 = rand::rng().random();
        println!("Using random seed: {}", random_seed);
        run_convergence_with_seed(random_seed);
    }

    fn run_convergence_with_seed(seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = CouplingTree::new();
        let mut reference = BTreeSet::new();
        for round in 0..20 {
            for _ in 0..50 {
                let value = rng.random_range(0..1000);
                assert_eq!(tree.insert(value), reference.insert(value));
            }
            for _ in 0..10 {
                let value = rng.random_range(0..1000);
                assert_eq!(tree.remove(value), reference.remove(&value));
            }
            tree.rebalance_tree();
            let shape = tree.shape();
            assert!(shape.is_balanced(), "seed {seed} round {round}: {shape:?}");
            assert_eq!(
                shape.values(),
                reference.iter().copied().collect::<Vec<_>>(),
                "seed {seed} round {round}"
            );
        }
    }
}
