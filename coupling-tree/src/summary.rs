use std::fmt;

use serde::Serialize;

use crate::stats::TreeStats;

/// Final counters of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub seed: u64,
    pub inserts: usize,
    pub insert_attempts: usize,
    pub deletes: usize,
    pub delete_attempts: usize,
    pub balances: usize,
    pub rebalance_ops: usize,
}

impl RunSummary {
    pub fn from_stats(seed: u64, stats: &TreeStats) -> Self {
        RunSummary {
            seed,
            inserts: stats.inserts(),
            insert_attempts: stats.insert_attempts(),
            deletes: stats.deletes(),
            delete_attempts: stats.delete_attempts(),
            balances: stats.balances(),
            rebalance_ops: stats.rebalance_ops(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Adds:\t\t{} ({} attempts)",
            self.inserts, self.insert_attempts
        )?;
        writeln!(
            f,
            "Deletes:\t{} ({} attempts)",
            self.deletes, self.delete_attempts
        )?;
        write!(f, "Balances:\t{}", self.balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunSummary {
        RunSummary {
            seed: 9,
            inserts: 612,
            insert_attempts: 1000,
            deletes: 301,
            delete_attempts: 1003,
            balances: 40,
            rebalance_ops: 1234,
        }
    }

    #[test]
    fn test_display_report() {
        assert_eq!(
            sample().to_string(),
            "Adds:\t\t612 (1000 attempts)\nDeletes:\t301 (1003 attempts)\nBalances:\t40"
        );
    }

    #[test]
    fn test_json_field_names() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["insert_attempts"], 1000);
        assert_eq!(json["rebalance_ops"], 1234);
        assert_eq!(json["seed"], 9);
    }

    #[test]
    fn test_from_stats() {
        let stats = TreeStats::new();
        stats.record_insert();
        stats.record_insert_attempt();
        stats.record_insert_attempt();
        stats.record_balance();
        let summary = RunSummary::from_stats(3, &stats);
        assert_eq!(summary.inserts, 1);
        assert_eq!(summary.insert_attempts, 2);
        assert_eq!(summary.balances, 1);
        assert_eq!(summary.deletes, 0);
    }
}
