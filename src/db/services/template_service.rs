//! Entry point of the engine. Links and unlinks run inside a single
//! store transaction: any collision or store failure rolls the whole
//! operation back.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::db::entities::TemplateLink;
use crate::db::enums::{AuditAction, EntityKind};
use crate::db::services::delete_service::{
    delete_template_applications, delete_template_graphs, delete_template_items,
    delete_template_triggers,
};
use crate::db::services::merge_service::{
    copy_template_applications, copy_template_graphs, copy_template_items,
    copy_template_triggers,
};
use crate::db::services::validation_service::{
    distinct_ids, validate_host_compatibility, validate_template_set,
};
use crate::db::store::{ConfigStore, IdDomain};
use crate::error::EngineError;
use crate::external::{AuditSink, Housekeeper, StatusNotifier, audit};

pub struct TemplateService {
    store: Arc<dyn ConfigStore>,
    housekeeper: Arc<dyn Housekeeper>,
    status: Arc<dyn StatusNotifier>,
    audit: Arc<dyn AuditSink>,
    config: EngineConfig,
}

impl TemplateService {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        housekeeper: Arc<dyn Housekeeper>,
        status: Arc<dyn StatusNotifier>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self::with_config(store, housekeeper, status, audit, EngineConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ConfigStore>,
        housekeeper: Arc<dyn Housekeeper>,
        status: Arc<dyn StatusNotifier>,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            housekeeper,
            status,
            audit,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Links templates to a host and propagates their configuration
    /// onto it. Templates already linked are ignored, so repeating a
    /// link is a no-op. All-or-nothing: on any error the host is left
    /// exactly as it was.
    pub async fn link_templates(
        &self,
        host_id: u64,
        template_ids: &[u64],
    ) -> Result<(), EngineError> {
        self.store.host(host_id).await?;

        let linked: Vec<u64> = self
            .store
            .template_links(host_id)
            .await?
            .into_iter()
            .map(|l| l.template_id)
            .collect();
        let mut fresh = distinct_ids(template_ids.iter().copied());
        fresh.retain(|id| !linked.contains(id));
        if fresh.is_empty() {
            debug!("host {} already linked to the requested templates", host_id);
            return Ok(());
        }
        let full_set = distinct_ids(linked.iter().chain(fresh.iter()).copied());

        self.store.begin().await?;
        match self.apply_link(host_id, &full_set, &fresh).await {
            Ok(()) => {
                self.store.commit().await?;
                info!("linked {} templates to host {}", fresh.len(), host_id);
                Ok(())
            }
            Err(e) => {
                warn!("cannot link templates to host {}: {}", host_id, e);
                self.store.rollback().await?;
                Err(e)
            }
        }
    }

    async fn apply_link(
        &self,
        host_id: u64,
        full_set: &[u64],
        fresh: &[u64],
    ) -> Result<(), EngineError> {
        validate_template_set(&*self.store, full_set).await?;
        validate_host_compatibility(&*self.store, host_id, fresh).await?;

        let first = self
            .store
            .allocate_ids(IdDomain::TemplateLinks, fresh.len() as u64)
            .await?;
        let links = fresh
            .iter()
            .enumerate()
            .map(|(offset, template_id)| TemplateLink {
                link_id: first + offset as u64,
                host_id,
                template_id: *template_id,
            })
            .collect();
        self.store.insert_template_links(links).await?;
        for template_id in fresh {
            audit(
                &*self.audit,
                EntityKind::TemplateLink,
                *template_id,
                AuditAction::Link,
                json!({ "host_id": host_id }),
            )
            .await;
        }

        copy_template_applications(&*self.store, &*self.audit, host_id, fresh).await?;
        copy_template_items(&*self.store, &*self.audit, &self.config, host_id, fresh).await?;
        copy_template_triggers(&*self.store, &*self.audit, host_id, fresh).await?;
        copy_template_graphs(&*self.store, &*self.audit, host_id, fresh).await?;
        Ok(())
    }

    /// Unlinks templates from a host and removes the configuration
    /// inherited from them. Templates not actually linked are ignored.
    /// The templates that stay linked must still form a consistent set,
    /// otherwise the operation is rolled back.
    pub async fn unlink_templates(
        &self,
        host_id: u64,
        template_ids: &[u64],
    ) -> Result<(), EngineError> {
        self.store.host(host_id).await?;

        let linked: Vec<u64> = self
            .store
            .template_links(host_id)
            .await?
            .into_iter()
            .map(|l| l.template_id)
            .collect();
        let mut doomed = distinct_ids(template_ids.iter().copied());
        doomed.retain(|id| linked.contains(id));
        if doomed.is_empty() {
            debug!("none of the requested templates are linked to host {}", host_id);
            return Ok(());
        }
        let remaining: Vec<u64> =
            distinct_ids(linked.into_iter().filter(|id| !doomed.contains(id)));

        self.store.begin().await?;
        match self.apply_unlink(host_id, &doomed, &remaining).await {
            Ok(()) => {
                self.store.commit().await?;
                info!("unlinked {} templates from host {}", doomed.len(), host_id);
                Ok(())
            }
            Err(e) => {
                warn!("cannot unlink templates from host {}: {}", host_id, e);
                self.store.rollback().await?;
                Err(e)
            }
        }
    }

    async fn apply_unlink(
        &self,
        host_id: u64,
        doomed: &[u64],
        remaining: &[u64],
    ) -> Result<(), EngineError> {
        validate_template_set(&*self.store, remaining).await?;

        delete_template_graphs(&*self.store, &*self.audit, host_id, doomed).await?;
        delete_template_triggers(&*self.store, &*self.status, &*self.audit, host_id, doomed)
            .await?;
        delete_template_items(
            &*self.store,
            &*self.housekeeper,
            &*self.status,
            &*self.audit,
            &self.config,
            host_id,
            doomed,
        )
        .await?;
        delete_template_applications(&*self.store, &*self.audit, host_id, doomed).await?;

        self.store.delete_template_links(host_id, doomed).await?;
        for template_id in doomed {
            audit(
                &*self.audit,
                EntityKind::TemplateLink,
                *template_id,
                AuditAction::Unlink,
                json!({ "host_id": host_id }),
            )
            .await;
        }
        Ok(())
    }
}
