use crate::sync::RawMutex;
use crate::sync::{AtomicU64, Mutex, Ordering};
use std::fmt::{Debug, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchVersion(pub u64);

impl LatchVersion {
    const INITIAL: u64 = 0;

    pub fn initial() -> Self {
        Self(Self::INITIAL)
    }

    /// Number of completed lock/unlock cycles since `other`.
    pub fn releases_since(&self, other: LatchVersion) -> u64 {
        self.0 - other.0
    }
}

impl Display for LatchVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// An exclusive-only latch. The version is bumped on every release, which
/// lets tests observe whether a node was touched at all.
// doesn't handle poisoning
pub(crate) struct Latch {
    mutex: Mutex,
    version: AtomicU64,
}

impl Debug for Latch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Latch {{ {:p} }}", self)
    }
}

impl Latch {
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(),
            version: AtomicU64::new(LatchVersion::INITIAL),
        }
    }

    pub fn lock(&self) {
        self.mutex.lock();
    }

    #[allow(unused)]
    pub fn try_lock(&self) -> bool {
        self.mutex.try_lock()
    }

    pub fn is_locked(&self) -> bool {
        self.mutex.is_locked()
    }

    pub fn unlock(&self) {
        assert!(
            self.mutex.is_locked(),
            "unlock called on a latch that isn't held"
        );
        self.version.fetch_add(1, Ordering::Release);
        self.mutex.unlock();
    }

    pub fn version(&self) -> LatchVersion {
        LatchVersion(self.version.load(Ordering::Acquire))
    }
}
