use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{ChangeRecord, StatusSource},
    fraud::ScanSummary,
};

/// Published after every reconciliation run, whether or not anything changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSyncCompletedEvent {
    pub source: StatusSource,
    pub changes: Vec<ChangeRecord>,
    pub timestamp: DateTime<Utc>,
}

impl StatusSyncCompletedEvent {
    pub fn new(source: StatusSource, changes: Vec<ChangeRecord>) -> Self {
        Self { source, changes, timestamp: Utc::now() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudScanCompletedEvent {
    pub summary: ScanSummary,
    pub timestamp: DateTime<Utc>,
}

impl FraudScanCompletedEvent {
    pub fn new(summary: ScanSummary) -> Self {
        Self { summary, timestamp: Utc::now() }
    }
}

/// Every event the engine publishes, for sinks that log them all in one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EventType {
    StatusSyncCompleted(StatusSyncCompletedEvent),
    FraudScanCompleted(FraudScanCompletedEvent),
}

impl From<StatusSyncCompletedEvent> for EventType {
    fn from(value: StatusSyncCompletedEvent) -> Self {
        EventType::StatusSyncCompleted(value)
    }
}

impl From<FraudScanCompletedEvent> for EventType {
    fn from(value: FraudScanCompletedEvent) -> Self {
        EventType::FraudScanCompleted(value)
    }
}
