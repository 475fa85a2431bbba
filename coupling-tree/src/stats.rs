use crate::sync::{AtomicUsize, Ordering};

/// Operation counters shared by every worker.
///
/// All updates are relaxed. Readers may see a slightly stale total while workers
/// are running; after they join, the totals are exact.
#[derive(Debug, Default)]
pub struct TreeStats {
    inserts: AtomicUsize,
    insert_attempts: AtomicUsize,
    deletes: AtomicUsize,
    delete_attempts: AtomicUsize,
    balances: AtomicUsize,
    rebalance_ops: AtomicUsize,
}

impl TreeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_insert_attempt(&self) {
        self.insert_attempts.fetch_add(1, Ordering::Relaxed);
    }
    pub(crate) fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_delete_attempt(&self) {
        self.delete_attempts.fetch_add(1, Ordering::Relaxed);
    }
    pub fn record_balance(&self) {
        self.balances.fetch_add(1, Ordering::Relaxed);
    }
    pub(crate) fn record_rebalance_ops(&self, ops: usize) {
        self.rebalance_ops.fetch_add(ops, Ordering::Relaxed);
    }

    pub fn inserts(&self) -> usize {
        self.inserts.load(Ordering::Relaxed)
    }
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::Relaxed)
    }
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::Relaxed)
    }
    pub fn delete_attempts(&self) -> usize {
        self.delete_attempts.load(Ordering::Relaxed)
    }
    pub fn balances(&self) -> usize {
        self.balances.load(Ordering::Relaxed)
    }
    /// Regrafts performed by rebalancing, summed over every pass.
    pub fn rebalance_ops(&self) -> usize {
        self.rebalance_ops.load(Ordering::Relaxed)
    }
}
