//! The CLI keeps the order ledger as a JSON array of orders on disk, and reads worksheet exports in the same way.
use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use cod_engine::{db_types::Order, sync::WorksheetRow};
use log::*;

pub fn load_ledger(path: &Path) -> Result<Vec<Order>> {
    if !path.exists() {
        return Err(anyhow!("The ledger file {} does not exist", path.display()));
    }
    let json = fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    let orders = serde_json::from_str::<Vec<Order>>(&json)
        .with_context(|| format!("{} is not a valid order ledger", path.display()))?;
    debug!("🗃️ Loaded {} orders from {}", orders.len(), path.display());
    Ok(orders)
}

/// Writes the ledger next to `path` first and then moves it into place, so a failed write never truncates the
/// existing file.
pub fn save_ledger(path: &Path, orders: &[Order]) -> Result<()> {
    let json = serde_json::to_string_pretty(orders)?;
    let mut tmp = PathBuf::from(path);
    tmp.set_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Could not write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Could not replace {}", path.display()))?;
    debug!("🗃️ Saved {} orders to {}", orders.len(), path.display());
    Ok(())
}

/// A missing worksheet file reads as an empty worksheet, which the worksheet sync rejects.
pub fn load_worksheet(path: &Path) -> Result<Vec<WorksheetRow>> {
    if !path.exists() {
        warn!("🗃️ The worksheet {} does not exist", path.display());
        return Ok(Vec::new());
    }
    let json = fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("{} is not a valid worksheet", path.display()))
}
