use std::fmt::{self, Debug};
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::latch::LatchVersion;
use crate::node::{Direction, Node, OwnedNodePtr, Value};
use marker::LockState;

pub mod marker {
    pub trait LockState {}
    pub struct Unlocked;
    impl LockState for Unlocked {}
    pub struct Locked;
    impl LockState for Locked {}
}

/// A borrowed handle to a node, tagged with whether this thread holds its latch.
///
/// Unlocked refs are only valid while the caller holds the latch of whatever
/// owns the node (its parent, or the root slot); that is what keeps the node
/// from being freed underneath us. Locked refs are not `Copy`: `unlock` consumes
/// them, so a latch can't be released twice through the same handle.
pub(crate) struct NodeRef<L: LockState> {
    node: NonNull<Node>,
    phantom: PhantomData<L>,
}

impl<L: LockState> NodeRef<L> {
    pub fn value(&self) -> Value {
        self.node().value()
    }

    #[allow(unused)]
    pub fn version(&self) -> LatchVersion {
        self.node().version()
    }

    pub fn is(&self, owned: &OwnedNodePtr) -> bool {
        self.node == owned.as_ptr()
    }

    fn node(&self) -> &Node {
        unsafe { self.node.as_ref() }
    }

    unsafe fn cast<L2: LockState>(self) -> NodeRef<L2> {
        NodeRef {
            node: self.node,
            phantom: PhantomData,
        }
    }
}

impl NodeRef<marker::Unlocked> {
    /// # Safety
    ///
    /// `node` must point at a live node owned by the tree.
    pub unsafe fn from_ptr(node: NonNull<Node>) -> Self {
        NodeRef {
            node,
            phantom: PhantomData,
        }
    }

    pub fn lock(self) -> NodeRef<marker::Locked> {
        debug_println!("locking {:?}", self);
        self.node().lock();
        debug_println!("locked {:?}", self);
        unsafe { self.cast::<marker::Locked>() }
    }
}

impl NodeRef<marker::Locked> {
    pub fn unlock(self) -> NodeRef<marker::Unlocked> {
        debug_println!("unlocking {:?}", self);
        self.node().unlock();
        unsafe { self.cast::<marker::Unlocked>() }
    }

    pub fn child(&self, direction: Direction) -> Option<NodeRef<marker::Unlocked>> {
        unsafe { self.node().children() }
            .slot(direction)
            .as_ref()
            .map(|owned| owned.share())
    }

    pub fn has_child(&self, direction: Direction) -> bool {
        unsafe { self.node().children() }.slot(direction).is_some()
    }

    /// The child slot itself, for splicing. The borrow ties the slot to this
    /// handle, so the latch can't be released while the slot is in use.
    pub fn slot_mut(&mut self, direction: Direction) -> &mut Option<OwnedNodePtr> {
        unsafe { self.node().children_mut() }.slot_mut(direction)
    }

    pub fn take_child(&mut self, direction: Direction) -> Option<OwnedNodePtr> {
        self.slot_mut(direction).take()
    }

    pub fn attach_child(&mut self, direction: Direction, child: OwnedNodePtr) {
        let slot = self.slot_mut(direction);
        assert!(slot.is_none(), "attaching into an occupied {direction:?} slot");
        *slot = Some(child);
    }
}

impl Clone for NodeRef<marker::Unlocked> {
    fn clone(&self) -> Self {
        *self
    }
}
impl Copy for NodeRef<marker::Unlocked> {}

impl<L: LockState> Debug for NodeRef<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ node: {:p} value: {} }}", self.node, self.value())
    }
}

impl<L1: LockState, L2: LockState> PartialEq<NodeRef<L2>> for NodeRef<L1> {
    fn eq(&self, other: &NodeRef<L2>) -> bool {
        self.node == other.node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_state_round_trip() {
        let owned = OwnedNodePtr::new(7);
        let unlocked = owned.share();
        assert_eq!(unlocked.value(), 7);

        let mut locked = unlocked.lock();
        assert!(unsafe { owned.node() }.is_locked());
        assert!(!locked.has_child(Direction::Left));

        locked.attach_child(Direction::Left, OwnedNodePtr::new(3));
        locked.attach_child(Direction::Right, OwnedNodePtr::new(9));
        assert_eq!(locked.child(Direction::Left).map(|c| c.value()), Some(3));
        assert_eq!(locked.child(Direction::Right).map(|c| c.value()), Some(9));

        let right = locked.take_child(Direction::Right).unwrap();
        assert_eq!(unsafe { right.node() }.value(), 9);
        assert!(!locked.has_child(Direction::Right));

        let unlocked = locked.unlock();
        assert!(!unsafe { owned.node() }.is_locked());
        assert_eq!(unlocked, owned.share());
        assert_eq!(unlocked.version(), LatchVersion(1));
    }

    #[test]
    fn test_is_matches_only_the_owning_pointer() {
        let owned = OwnedNodePtr::new(4);
        let other = OwnedNodePtr::new(4);
        assert!(owned.share().is(&owned));
        assert!(!owned.share().is(&other));

        let locked = owned.share().lock();
        assert!(locked.is(&owned));
        locked.unlock();
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn test_attach_into_occupied_slot_panics() {
        let owned = OwnedNodePtr::new(5);
        let mut locked = owned.share().lock();
        locked.attach_child(Direction::Right, OwnedNodePtr::new(6));
        locked.attach_child(Direction::Right, OwnedNodePtr::new(7));
    }
}
