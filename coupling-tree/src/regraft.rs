use crate::node::{Direction, OwnedNodePtr};
use crate::node_ref::{NodeRef, marker};
use crate::search::find_frontier;

/// A subtree that has been cut out of the tree, with its root still latched.
///
/// Nothing else can reach a detached subtree's root, but threads that were
/// already inside it may still be working below; they never climb back up, so
/// only the root needs to stay latched while it is moved.
pub(crate) struct Detached {
    owned: OwnedNodePtr,
    locked: NodeRef<marker::Locked>,
}

impl Detached {
    /// Latch a subtree we just took out of a slot.
    pub fn lock(owned: OwnedNodePtr) -> Self {
        let locked = owned.share().lock();
        Detached { owned, locked }
    }

    /// Pair an already-latched node with the pointer that owns it.
    pub fn from_locked(owned: OwnedNodePtr, locked: NodeRef<marker::Locked>) -> Self {
        assert!(
            locked.is(&owned),
            "detached subtree root doesn't match its owner"
        );
        Detached { owned, locked }
    }

    fn into_parts(self) -> (OwnedNodePtr, NodeRef<marker::Locked>) {
        (self.owned, self.locked)
    }
}

/// Relocates `subtree` into the first empty `direction` slot reachable from
/// `start` by following `direction` edges only. Both `start` and the subtree
/// root arrive latched; every latch is released on return. Values are never
/// compared: callers are responsible for picking a frontier where the subtree
/// keeps search order.
pub(crate) fn find_gap(start: NodeRef<marker::Locked>, subtree: Detached, direction: Direction) {
    let mut gap_parent = find_frontier(start, direction);
    let (owned, subtree_root) = subtree.into_parts();
    debug_println!(
        "regrafting {:?} {:?} of {:?}",
        subtree_root,
        direction,
        gap_parent
    );
    gap_parent.attach_child(direction, owned);
    gap_parent.unlock();
    subtree_root.unlock();
}
