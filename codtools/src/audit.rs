//! Appends every engine event to a JSON-lines audit log.
use std::path::{Path, PathBuf};

use cod_engine::events::{EventHooks, EventType};
use log::*;
use tokio::{fs::OpenOptions, io::AsyncWriteExt};

pub async fn append_event(path: &Path, event: EventType) -> std::io::Result<()> {
    let mut line = serde_json::to_string(&event)?;
    line.push('\n');
    let mut file = OpenOptions::new().create(true).append(true).open(path).await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await
}

async fn record(path: PathBuf, event: EventType) {
    match append_event(&path, event).await {
        Ok(()) => trace!("📬️ Audit event written to {}", path.display()),
        Err(e) => warn!("📬️ Could not write to the audit log {}. {e}", path.display()),
    }
}

/// Hooks that write sync and scan completions to `path`. Hooks are empty when no audit log is configured.
pub fn audit_hooks(path: Option<&Path>) -> EventHooks {
    let mut hooks = EventHooks::default();
    let Some(path) = path else {
        return hooks;
    };
    let sync_path = path.to_path_buf();
    hooks.on_sync_completed(move |ev| {
        info!("📬️ {} sync completed with {} changes", ev.source, ev.changes.len());
        Box::pin(record(sync_path.clone(), ev.into()))
    });
    let scan_path = path.to_path_buf();
    hooks.on_scan_completed(move |ev| {
        info!("📬️ Fraud scan ({}) scored {} orders", ev.summary.mode, ev.summary.processed);
        Box::pin(record(scan_path.clone(), ev.into()))
    });
    hooks
}
