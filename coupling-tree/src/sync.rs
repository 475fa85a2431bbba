pub use std::sync::atomic::Ordering;

/// Very similar to `lock_api::RawMutex`, but without the const constructor constraint
pub trait RawMutex {
    fn new() -> Self;
    fn lock(&self);
    fn try_lock(&self) -> bool;
    fn is_locked(&self) -> bool;
    fn unlock(&self);
}

// Counters and the completion flag use normal atomics everywhere (miri,
// shuttle, normal). The shuttle tests are after lock-protocol bugs, and the
// workers never spin on these, so there's nothing for the scheduler to explore.
pub type AtomicUsize = std::sync::atomic::AtomicUsize;
pub type AtomicU64 = std::sync::atomic::AtomicU64;
pub type AtomicBool = std::sync::atomic::AtomicBool;

// Mutex has two implementations: one for miri and shuttle,
// and one for normal
#[cfg(all(not(miri), not(feature = "shuttle")))]
pub type Mutex = WrappedUsyncMutex;
#[cfg(any(miri, feature = "shuttle"))]
pub type Mutex = BasicSpinMutex;

use lock_api::RawRwLock as UsyncRawRwLock;

/// usync's word-sized lock, only ever taken exclusively. One word per node
/// keeps the tree cheap to populate.
pub struct WrappedUsyncMutex {
    inner: usync::RawRwLock,
}
impl RawMutex for WrappedUsyncMutex {
    fn new() -> Self {
        Self {
            inner: UsyncRawRwLock::INIT,
        }
    }
    fn lock(&self) {
        self.inner.lock_exclusive();
    }
    fn try_lock(&self) -> bool {
        self.inner.try_lock_exclusive()
    }
    fn is_locked(&self) -> bool {
        self.inner.is_locked_exclusive()
    }
    fn unlock(&self) {
        unsafe { self.inner.unlock_exclusive() };
    }
}

#[cfg(feature = "shuttle")]
type SpinLockAtomicBool = shuttle::sync::atomic::AtomicBool;
#[cfg(all(miri, not(feature = "shuttle")))]
type SpinLockAtomicBool = std::sync::atomic::AtomicBool;

#[cfg(any(feature = "shuttle", miri))]
pub struct BasicSpinMutex {
    locked: SpinLockAtomicBool,
}

#[cfg(any(feature = "shuttle", miri))]
/// A `RawMutex` implementation for shuttle and miri. We don't care about performance, just simplicity and correctness.
impl RawMutex for BasicSpinMutex {
    fn new() -> Self {
        Self {
            locked: SpinLockAtomicBool::new(false),
        }
    }

    fn lock(&self) {
        loop {
            match self
                .locked
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => break,
                Err(_) => {
                    std::hint::spin_loop();
                    #[cfg(feature = "shuttle")]
                    shuttle::hint::spin_loop();
                    continue;
                }
            }
        }
    }

    fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    fn unlock(&self) {
        let res = self
            .locked
            .compare_exchange(true, false, Ordering::Release, Ordering::Relaxed);
        assert!(res.is_ok(), "unlock called on a spin mutex that isn't held");
    }
}
