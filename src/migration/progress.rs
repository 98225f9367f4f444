use std::fmt;

/// Migration phases in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MigrationPhase {
    Vendors,
    Themes,
    Addons,
    Packages,
    WorkStatuses,
    Orders,
    Invoices,
    Transactions,
    Profile,
    Cleanup,
}

impl MigrationPhase {
    pub fn name(self) -> &'static str {
        match self {
            MigrationPhase::Vendors => "vendors",
            MigrationPhase::Themes => "themes",
            MigrationPhase::Addons => "addons",
            MigrationPhase::Packages => "packages",
            MigrationPhase::WorkStatuses => "work_statuses",
            MigrationPhase::Orders => "orders",
            MigrationPhase::Invoices => "invoices",
            MigrationPhase::Transactions => "transactions",
            MigrationPhase::Profile => "profile",
            MigrationPhase::Cleanup => "cleanup",
        }
    }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot handed to the progress callback after every finished unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationProgress {
    pub phase: MigrationPhase,
    pub completed: usize,
    pub failed: usize,
    /// Units planned for the whole run, fixed before the first insert
    pub total: usize,
}

impl MigrationProgress {
    pub(crate) fn new(total: usize) -> Self {
        Self {
            phase: MigrationPhase::Vendors,
            completed: 0,
            failed: 0,
            total,
        }
    }

    pub fn processed(&self) -> usize {
        self.completed + self.failed
    }

    /// Share of processed units in `0.0..=1.0`
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed() as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let mut progress = MigrationProgress::new(4);
        assert_eq!(progress.fraction(), 0.0);
        progress.completed = 2;
        progress.failed = 1;
        assert_eq!(progress.processed(), 3);
        assert_eq!(progress.fraction(), 0.75);
        assert_eq!(MigrationProgress::new(0).fraction(), 1.0);
    }
}
