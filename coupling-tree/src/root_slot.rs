use std::cell::UnsafeCell;

use crate::latch::Latch;
use crate::node::OwnedNodePtr;
use crate::node_ref::{NodeRef, marker};

/// The single storage location for the top of the tree. Its latch protects the
/// slot, not the node in it: swapping the root in or out needs this latch, while
/// changing the root node's children needs the root node's own latch.
pub(crate) struct RootSlot {
    latch: Latch,
    top: UnsafeCell<Option<OwnedNodePtr>>,
}

unsafe impl Send for RootSlot {}
unsafe impl Sync for RootSlot {}

impl RootSlot {
    pub fn new() -> Self {
        RootSlot {
            latch: Latch::new(),
            top: UnsafeCell::new(None),
        }
    }

    pub fn lock(&self) -> LockedRoot<'_> {
        debug_println!("locking root slot");
        self.latch.lock();
        debug_println!("locked root slot");
        LockedRoot { slot: self }
    }
}

/// Proof that the root latch is held. Not `Clone`; [`LockedRoot::unlock`]
/// consumes it, so the root latch can only be released once per acquisition.
#[must_use = "the root latch stays held until `unlock` is called"]
pub(crate) struct LockedRoot<'a> {
    slot: &'a RootSlot,
}

impl<'a> LockedRoot<'a> {
    pub fn top(&self) -> Option<NodeRef<marker::Unlocked>> {
        unsafe { &*self.slot.top.get() }
            .as_ref()
            .map(|owned| owned.share())
    }

    pub fn is_empty(&self) -> bool {
        unsafe { &*self.slot.top.get() }.is_none()
    }

    pub fn slot_mut(&mut self) -> &mut Option<OwnedNodePtr> {
        unsafe { &mut *self.slot.top.get() }
    }

    pub fn unlock(self) {
        debug_println!("unlocking root slot");
        self.slot.latch.unlock();
    }
}
