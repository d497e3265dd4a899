//! Side-channel collaborators of the engine. Their failures are logged
//! and never abort a link or delete operation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::db::enums::{AuditAction, EntityKind};
use crate::error::StoreError;

/// Schedules deferred cleanup of collected history after items are
/// deleted.
#[async_trait]
pub trait Housekeeper: Send + Sync {
    async fn schedule_history_deletion(
        &self,
        item_ids: &[u64],
        tables: &[String],
    ) -> Result<(), StoreError>;
}

/// Notified before triggers disappear so cached runtime state can be
/// dropped.
#[async_trait]
pub trait StatusNotifier: Send + Sync {
    async fn triggers_removed(&self, trigger_ids: &[u64]) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entity: EntityKind,
    pub entity_id: u64,
    pub action: AuditAction,
    pub details: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        entity: EntityKind,
        entity_id: u64,
        action: AuditAction,
        details: serde_json::Value,
    ) -> Self {
        Self {
            entity,
            entity_id,
            action,
            details,
            recorded_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

/// Records an audit entry, downgrading sink failures to an error log.
pub(crate) async fn audit(
    sink: &dyn AuditSink,
    entity: EntityKind,
    entity_id: u64,
    action: AuditAction,
    details: serde_json::Value,
) {
    if let Err(e) = sink.record(AuditEntry::new(entity, entity_id, action, details)).await {
        error!("Failed to record audit entry for {:?} {}: {}", entity, entity_id, e);
    }
}

/// No-op housekeeper for embedders without history storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHousekeeper;

#[async_trait]
impl Housekeeper for NullHousekeeper {
    async fn schedule_history_deletion(
        &self,
        _item_ids: &[u64],
        _tables: &[String],
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatusNotifier;

#[async_trait]
impl StatusNotifier for NullStatusNotifier {
    async fn triggers_removed(&self, _trigger_ids: &[u64]) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn record(&self, _entry: AuditEntry) -> Result<(), StoreError> {
        Ok(())
    }
}
