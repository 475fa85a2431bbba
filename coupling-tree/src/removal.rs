use crate::node::{Direction, OwnedNodePtr, Value};
use crate::node_ref::{NodeRef, marker};
use crate::regraft::{Detached, find_gap};
use crate::root_slot::RootSlot;
use crate::search::{RemovalSearch, find_parent_of};

/// Removes `value` if present. Returns whether a node was removed.
///
/// The root latch is held until the walk has shown the root node isn't the
/// target, then released exactly once (the `LockedRoot` is consumed by
/// `unlock`). Removing the root keeps the root latch for the whole splice.
pub(crate) fn remove_value(root: &RootSlot, value: Value) -> bool {
    let mut locked_root = root.lock();
    let top = match locked_root.top() {
        Some(top) => top.lock(),
        None => {
            locked_root.unlock();
            return false;
        }
    };

    if top.value() == value {
        debug_println!("removing root {:?}", top);
        let removed = splice_out(locked_root.slot_mut(), top);
        locked_root.unlock();
        drop(removed);
        return true;
    }
    // the root slot can't change under this removal anymore
    locked_root.unlock();

    let (mut parent, search) = find_parent_of(top, value);
    match search {
        RemovalSearch::Missing => {
            parent.unlock();
            false
        }
        RemovalSearch::ChildHolds(direction) => {
            let deletee = match parent.child(direction) {
                Some(child) => child.lock(),
                None => unreachable!("search stopped at a parent with no {:?} child", direction),
            };
            debug_println!("removing {:?} below {:?}", deletee, parent);
            let removed = splice_out(parent.slot_mut(direction), deletee);
            parent.unlock();
            drop(removed);
            true
        }
    }
}

/// Unlinks the latched node in `position`, patching its children back in:
/// the left subtree takes its place and the right subtree is regrafted onto the
/// right frontier of the left one. With no left subtree the right one moves up
/// as is. The caller holds whatever owns `position` (the parent's latch or the
/// root latch) for the duration.
///
/// Returns the unlinked node, now childless and unlatched, for the caller to
/// free once it has released the owner of `position`.
pub(crate) fn splice_out(
    position: &mut Option<OwnedNodePtr>,
    mut deletee: NodeRef<marker::Locked>,
) -> OwnedNodePtr {
    assert!(
        position.as_ref().is_some_and(|owned| deletee.is(owned)),
        "splice_out: {:?} doesn't occupy the given position",
        deletee
    );
    let Some(removed) = position.take() else {
        unreachable!()
    };

    match deletee.take_child(Direction::Left) {
        Some(left) => {
            let promoted = left.share().lock();
            *position = Some(left);
            match deletee.take_child(Direction::Right) {
                Some(right) => find_gap(promoted, Detached::lock(right), Direction::Right),
                None => {
                    promoted.unlock();
                }
            }
        }
        None => *position = deletee.take_child(Direction::Right),
    }

    deletee.unlock();
    removed
}
