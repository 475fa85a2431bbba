use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::WorkloadConfig;
use crate::poisson::PoissonArrivals;
use crate::summary::RunSummary;
use crate::sync::{AtomicBool, Ordering};
use crate::tree::CouplingTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Inserter,
    Deleter,
    Balancer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Inserter, Role::Deleter, Role::Balancer];

    /// Seed for the role's value picks.
    pub(crate) fn value_seed(self, seed: u64) -> u64 {
        seed ^ self.salt()
    }

    /// Seed for the role's arrival delays; offset from the value seed.
    pub(crate) fn arrival_seed(self, seed: u64) -> u64 {
        seed.wrapping_sub(101) ^ self.salt()
    }

    fn salt(self) -> u64 {
        match self {
            Role::Inserter => 0x9e37_79b9_7f4a_7c15,
            Role::Deleter => 0xbf58_476d_1ce4_e5b9,
            Role::Balancer => 0x94d0_49bb_1331_11eb,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Inserter => "inserter",
            Role::Deleter => "deleter",
            Role::Balancer => "balancer",
        };
        f.write_str(name)
    }
}

/// Set once by the Inserter after its quota, polled by the other roles.
///
/// Relaxed on both sides: a poller may miss the store for a while and run one
/// more operation than strictly needed. Nothing is ordered by this flag; the
/// thread joins at the end of `run_workload` provide all the synchronization
/// the final counters need.
#[derive(Debug, Default)]
pub struct CompletionFlag {
    finished: AtomicBool,
}

impl CompletionFlag {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Relaxed);
    }
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Finished,
}

/// One of the three workload loops, bound to a tree and the shared flag.
pub struct Worker<'a> {
    role: Role,
    tree: &'a CouplingTree,
    done: &'a CompletionFlag,
    insert_quota: usize,
    values: StdRng,
    arrivals: PoissonArrivals<StdRng>,
    state: WorkerState,
}

impl<'a> Worker<'a> {
    /// Value picks and arrival delays come from separate generators, both
    /// derived from `seed` and the role, so a seed reproduces each role's
    /// random streams exactly.
    pub fn new(
        role: Role,
        tree: &'a CouplingTree,
        done: &'a CompletionFlag,
        config: &WorkloadConfig,
        seed: u64,
    ) -> Self {
        let arrivals = config.arrivals(role);
        Worker {
            role,
            tree,
            done,
            insert_quota: config.insert_quota,
            values: StdRng::seed_from_u64(role.value_seed(seed)),
            arrivals: PoissonArrivals::new(
                StdRng::seed_from_u64(role.arrival_seed(seed)),
                arrivals.mean,
                arrivals.tick,
            ),
            state: WorkerState::Idle,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs the role's loop to completion. Runs at most once.
    pub fn run(&mut self) {
        if self.state != WorkerState::Idle {
            return;
        }
        self.transition(WorkerState::Running);
        match self.role {
            Role::Inserter => self.run_inserter(),
            Role::Deleter => self.run_deleter(),
            Role::Balancer => self.run_balancer(),
        }
        self.transition(WorkerState::Finished);
    }

    fn transition(&mut self, next: WorkerState) {
        debug!(role = %self.role, from = ?self.state, to = ?next, "worker state");
        self.state = next;
    }

    fn run_inserter(&mut self) {
        for _ in 0..self.insert_quota {
            self.arrivals.wait();
            self.tree.insert_random(&mut self.values);
            self.tree.stats().record_insert_attempt();
        }
        self.done.finish();
    }

    fn run_deleter(&mut self) {
        while !self.done.is_finished() {
            self.arrivals.wait();
            self.tree.remove_random(&mut self.values);
            self.tree.stats().record_delete_attempt();
        }
    }

    fn run_balancer(&mut self) {
        while !self.done.is_finished() {
            self.arrivals.wait();
            self.tree.rebalance_tree();
            info!("Balanced");
            self.tree.stats().record_balance();
        }
        self.tree.rebalance_tree();
    }
}

/// Runs the three roles against `tree` on their own threads and waits for
/// all of them. Random values come from the tree's range, which must match
/// `config.value_range`.
pub fn run_workload(tree: &CouplingTree, config: &WorkloadConfig, seed: u64) -> RunSummary {
    debug_assert_eq!(
        tree.value_range(),
        config.value_range,
        "tree and workload disagree on the value range"
    );
    let done = CompletionFlag::new();
    std::thread::scope(|s| {
        for role in Role::ALL {
            let done = &done;
            s.spawn(move || Worker::new(role, tree, done, config, seed).run());
        }
    });
    RunSummary::from_stats(seed, tree.stats())
}
