use std::cell::UnsafeCell;
use std::fmt::{self, Debug};
use std::mem;
use std::ptr::NonNull;

use crate::latch::{Latch, LatchVersion};
use crate::node_ref::{NodeRef, marker};

/// Values stored in the tree. The tree carries no payload beyond the value itself.
pub type Value = i64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Left, Direction::Right];

    pub fn opposite(&self) -> Direction {
        match *self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    fn index(&self) -> usize {
        match *self {
            Direction::Left => 0,
            Direction::Right => 1,
        }
    }
}

pub(crate) struct Node {
    value: Value,
    latch: Latch,
    // only touched while `latch` is held, or with exclusive access to the whole tree
    children: UnsafeCell<Children>,
}

#[derive(Default)]
pub(crate) struct Children {
    slots: [Option<OwnedNodePtr>; 2],
}

impl Children {
    pub fn slot(&self, direction: Direction) -> &Option<OwnedNodePtr> {
        &self.slots[direction.index()]
    }
    pub fn slot_mut(&mut self, direction: Direction) -> &mut Option<OwnedNodePtr> {
        &mut self.slots[direction.index()]
    }
}

impl Node {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            latch: Latch::new(),
            children: UnsafeCell::new(Children::default()),
        }
    }
    pub fn value(&self) -> Value {
        self.value
    }
    pub fn lock(&self) {
        self.latch.lock();
    }
    pub fn unlock(&self) {
        self.latch.unlock();
    }
    pub fn is_locked(&self) -> bool {
        self.latch.is_locked()
    }
    pub fn version(&self) -> LatchVersion {
        self.latch.version()
    }

    /// # Safety
    ///
    /// The caller must hold this node's latch (or own the whole tree) and must
    /// not create a second live reference to the children.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn children_mut(&self) -> &mut Children {
        unsafe { &mut *self.children.get() }
    }

    /// # Safety
    ///
    /// The caller must hold this node's latch (or own the whole tree).
    pub unsafe fn children(&self) -> &Children {
        unsafe { &*self.children.get() }
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {{ value: {}, {:?} }}", self.value, self.latch)
    }
}

/// The owning pointer held in a child slot (or the root slot). Dropping it
/// frees the whole subtree.
pub(crate) struct OwnedNodePtr {
    ptr: NonNull<Node>,
}

impl OwnedNodePtr {
    pub fn new(value: Value) -> Self {
        let ptr = Box::into_raw(Box::new(Node::new(value)));
        Self {
            // Box never hands out null
            ptr: unsafe { NonNull::new_unchecked(ptr) },
        }
    }

    pub fn share(&self) -> NodeRef<marker::Unlocked> {
        unsafe { NodeRef::from_ptr(self.ptr) }
    }

    pub fn as_ptr(&self) -> NonNull<Node> {
        self.ptr
    }

    /// Access to the node without taking its latch.
    ///
    /// # Safety
    ///
    /// No other thread may be touching this subtree.
    #[allow(unused)]
    pub unsafe fn node(&self) -> &Node {
        unsafe { self.ptr.as_ref() }
    }

    fn into_raw(self) -> NonNull<Node> {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl Debug for OwnedNodePtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OwnedNodePtr({:p})", self.ptr)
    }
}

// Degenerate trees are as deep as they are large, so free iteratively.
impl Drop for OwnedNodePtr {
    fn drop(&mut self) {
        let mut pending = vec![self.ptr];
        while let Some(ptr) = pending.pop() {
            let node: Node = *unsafe { Box::from_raw(ptr.as_ptr()) };
            debug_assert!(
                std::thread::panicking() || !node.is_locked(),
                "freeing a node that is still latched"
            );
            let Children { slots } = node.children.into_inner();
            for child in slots.into_iter().flatten() {
                pending.push(child.into_raw());
            }
        }
    }
}

// Nodes are only reached through the latch protocol; the raw pointers are never
// dereferenced for mutation without the owning latch held.
unsafe impl Send for OwnedNodePtr {}
unsafe impl Sync for OwnedNodePtr {}
