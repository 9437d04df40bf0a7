use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{StatusSource, StatusUpdate},
    helpers::extract_worksheet_order_id,
    status_mapper::StatusMapper,
};

/// One row of the manually imported worksheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorksheetRow {
    /// e.g. `"Tienda Sur - 10452"`
    pub formatted_id: String,
    pub status: String,
}

impl WorksheetRow {
    pub fn new<S: Into<String>>(formatted_id: S, status: S) -> Self {
        Self { formatted_id: formatted_id.into(), status: status.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorksheetUpdates {
    pub updates: Vec<StatusUpdate>,
    /// Rows whose id does not end in `- <digits>`
    pub malformed: usize,
    /// Rows whose status has no canonical equivalent
    pub unmapped: usize,
}

pub fn worksheet_updates(rows: &[WorksheetRow], mapper: &StatusMapper) -> WorksheetUpdates {
    let mut result = WorksheetUpdates::default();
    for row in rows {
        let Some(id) = extract_worksheet_order_id(&row.formatted_id) else {
            trace!("🔄️ Worksheet id '{}' has no trailing order number. Skipping it.", row.formatted_id);
            result.malformed += 1;
            continue;
        };
        let Some(reported) = mapper.map_status(&row.status, StatusSource::Worksheet) else {
            result.unmapped += 1;
            continue;
        };
        let update = StatusUpdate::new(id, reported, StatusSource::Worksheet).with_source_status(row.status.trim());
        result.updates.push(update);
    }
    result
}
