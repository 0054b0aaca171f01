use serde::Serialize;
use tracing::info;

use reaper_core::{Item, ItemState};

/// A structured audit event for one resource's lifecycle transition.
///
/// Emitted via `tracing` rather than written anywhere directly — whatever
/// log sink the operator points `RUST_LOG`/the subscriber at (stdout,
/// CloudWatch, a file) captures these the same way it captures every
/// other `tracing` event.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub account_id: String,
    pub region: String,
    pub resource_type: String,
    pub resource_id: String,
    pub state: String,
    pub reason: Option<String>,
}

impl AuditEvent {
    pub fn from_item(item: &Item, account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            region: item.region.clone(),
            resource_type: item.kind.clone(),
            resource_id: item.resource.identity(),
            state: format!("{:?}", item.state),
            reason: (!item.reason.is_empty()).then(|| item.reason.clone()),
        }
    }

    /// Emit this audit event as a structured `tracing` record.
    pub fn emit(&self) {
        info!(
            audit.account_id = %self.account_id,
            audit.region = %self.region,
            audit.resource_type = %self.resource_type,
            audit.resource_id = %self.resource_id,
            audit.state = %self.state,
            audit.reason = self.reason.as_deref().unwrap_or(""),
            "audit event"
        );
    }
}

/// Emit one [`AuditEvent`] per item currently in a terminal state
/// (`Filtered` or `Finished`) or in `Failed` — the states worth a
/// permanent audit record. Called once after the run loop (or after the
/// scan, in dry-run mode) completes.
pub fn record_terminal_items<'a>(items: impl IntoIterator<Item = &'a Item>, account_id: &str) {
    for item in items {
        if matches!(item.state, ItemState::Filtered | ItemState::Finished | ItemState::Failed) {
            AuditEvent::from_item(item, account_id).emit();
        }
    }
}
