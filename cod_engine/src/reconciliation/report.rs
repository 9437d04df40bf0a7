use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{ChangeRecord, StatusSource};

/// Why updates did not produce a change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipTally {
    pub no_match: usize,
    pub terminal: usize,
    pub manual_hold: usize,
    pub unchanged: usize,
    pub unmapped: usize,
    pub malformed: usize,
}

impl SkipTally {
    pub fn total(&self) -> usize {
        self.no_match + self.terminal + self.manual_hold + self.unchanged + self.unmapped + self.malformed
    }
}

impl Display for SkipTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} not in ledger, {} final, {} on hold, {} unchanged, {} unmapped, {} malformed",
            self.no_match, self.terminal, self.manual_hold, self.unchanged, self.unmapped, self.malformed
        )
    }
}

/// The result of reconciling one batch of updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    pub changes: Vec<ChangeRecord>,
    pub skipped: SkipTally,
}

/// The result of a full sync run against one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub source: StatusSource,
    pub changes: Vec<ChangeRecord>,
    pub skipped: SkipTally,
    pub pages_fetched: u32,
    pub truncation: Option<String>,
}

impl SyncReport {
    pub fn new(source: StatusSource) -> Self {
        Self { source, changes: vec![], skipped: SkipTally::default(), pages_fetched: 0, truncation: None }
    }

    pub fn is_truncated(&self) -> bool {
        self.truncation.is_some()
    }
}
