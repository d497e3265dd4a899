//! Cascading deletion. Every entry point first widens the requested id
//! set with the transitive discovery descendants, then removes
//! presentation rows, runtime state and finally the entities
//! themselves, so no dangling reference survives.

use std::collections::HashSet;
use std::future::Future;

use serde_json::json;
use tracing::{debug, error};

use crate::config::EngineConfig;
use crate::db::enums::{AuditAction, EntityKind, ResourceKind};
use crate::db::services::validation_service::distinct_ids;
use crate::db::store::ConfigStore;
use crate::error::EngineError;
use crate::external::{AuditSink, Housekeeper, StatusNotifier, audit};

/// Deletes triggers plus everything discovery stamped from them.
pub async fn delete_triggers(
    store: &dyn ConfigStore,
    notifier: &dyn StatusNotifier,
    sink: &dyn AuditSink,
    trigger_ids: &[u64],
) -> Result<(), EngineError> {
    if trigger_ids.is_empty() {
        return Ok(());
    }
    let all = discovery_closure(trigger_ids, |frontier| async move {
        Ok(store
            .trigger_discovery_by_parents(&frontier)
            .await?
            .into_iter()
            .map(|d| d.trigger_id)
            .collect())
    })
    .await?;

    if let Err(e) = notifier.triggers_removed(&all).await {
        error!("Failed to notify about removed triggers: {}", e);
    }

    store.delete_map_elements_by_triggers(&all).await?;
    store.delete_action_conditions_by_triggers(&all).await?;
    store.delete_screen_items(ResourceKind::Trigger, &all).await?;
    store.delete_favorites(ResourceKind::Trigger, &all).await?;
    store.delete_events_by_triggers(&all).await?;

    for trigger_id in &all {
        audit(sink, EntityKind::Trigger, *trigger_id, AuditAction::Delete, json!({})).await;
    }
    store.delete_triggers(&all).await?;
    debug!("deleted {} triggers", all.len());
    Ok(())
}

/// Deletes graphs plus everything discovery stamped from them.
pub async fn delete_graphs(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    graph_ids: &[u64],
) -> Result<(), EngineError> {
    if graph_ids.is_empty() {
        return Ok(());
    }
    let all = discovery_closure(graph_ids, |frontier| async move {
        Ok(store
            .graph_discovery_by_parents(&frontier)
            .await?
            .into_iter()
            .map(|d| d.graph_id)
            .collect())
    })
    .await?;

    store.delete_screen_items(ResourceKind::Graph, &all).await?;
    store.delete_favorites(ResourceKind::Graph, &all).await?;

    for graph_id in &all {
        audit(sink, EntityKind::Graph, *graph_id, AuditAction::Delete, json!({})).await;
    }
    store.delete_graphs(&all).await?;
    debug!("deleted {} graphs", all.len());
    Ok(())
}

/// Deletes items plus their discovery descendants, the triggers that
/// evaluate them and the graphs left without any other item, and asks
/// the housekeeper to sweep the collected history.
pub async fn delete_items(
    store: &dyn ConfigStore,
    housekeeper: &dyn Housekeeper,
    notifier: &dyn StatusNotifier,
    sink: &dyn AuditSink,
    config: &EngineConfig,
    item_ids: &[u64],
) -> Result<(), EngineError> {
    if item_ids.is_empty() {
        return Ok(());
    }
    let all = discovery_closure(item_ids, |frontier| async move {
        Ok(store
            .item_discovery_by_parents(&frontier)
            .await?
            .into_iter()
            .map(|d| d.item_id)
            .collect())
    })
    .await?;
    let doomed: HashSet<u64> = all.iter().copied().collect();

    // A graph dies with its items only if every line it draws is gone.
    let graphs = store.graphs_referencing_items(&all).await?;
    if !graphs.is_empty() {
        let graph_ids = distinct_ids(graphs.iter().map(|g| g.graph_id));
        let lines = store.graph_items_by_graphs(&graph_ids).await?;
        let orphaned: Vec<u64> = graph_ids
            .into_iter()
            .filter(|graph_id| {
                lines
                    .iter()
                    .filter(|gi| gi.graph_id == *graph_id)
                    .all(|gi| doomed.contains(&gi.item_id))
            })
            .collect();
        delete_graphs(store, sink, &orphaned).await?;
    }

    let trigger_ids = distinct_ids(
        store
            .functions_by_items(&all)
            .await?
            .into_iter()
            .map(|f| f.trigger_id),
    );
    delete_triggers(store, notifier, sink, &trigger_ids).await?;

    if let Err(e) = housekeeper
        .schedule_history_deletion(&all, &config.history_tables)
        .await
    {
        error!("Failed to schedule history deletion: {}", e);
    }

    store.delete_screen_items(ResourceKind::Item, &all).await?;
    store.delete_favorites(ResourceKind::Item, &all).await?;

    for item_id in &all {
        audit(sink, EntityKind::Item, *item_id, AuditAction::Delete, json!({})).await;
    }
    store.delete_items(&all).await?;
    debug!("deleted {} items", all.len());
    Ok(())
}

/// Deletes applications, except those still referenced by a web
/// scenario; such applications are kept and demoted to local rows.
pub async fn delete_applications(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    application_ids: &[u64],
) -> Result<(), EngineError> {
    if application_ids.is_empty() {
        return Ok(());
    }

    let scenarios = store.web_scenarios_by_applications(application_ids).await?;
    let retained: HashSet<u64> = scenarios.iter().filter_map(|s| s.application_id).collect();
    if !retained.is_empty() {
        let mut updates = Vec::new();
        for app in store
            .applications_by_ids(&distinct_ids(retained.iter().copied()))
            .await?
        {
            if let Some(scenario) = scenarios
                .iter()
                .find(|s| s.application_id == Some(app.application_id))
            {
                debug!(
                    "application \"{}\" is used by web scenario \"{}\", keeping it",
                    app.name, scenario.name
                );
            }
            let mut row = app;
            row.template_id = None;
            updates.push(row);
        }
        store.update_applications(updates).await?;
    }

    let doomed: Vec<u64> = distinct_ids(
        application_ids
            .iter()
            .copied()
            .filter(|id| !retained.contains(id)),
    );
    for application_id in &doomed {
        audit(sink, EntityKind::Application, *application_id, AuditAction::Delete, json!({}))
            .await;
    }
    store.delete_applications(&doomed).await?;
    Ok(())
}

/// Removes the host graphs inherited from the given templates.
pub async fn delete_template_graphs(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let template_graph_ids: HashSet<u64> = store
        .graphs_by_hosts(template_ids)
        .await?
        .into_iter()
        .map(|g| g.graph_id)
        .collect();
    let doomed: Vec<u64> = store
        .graphs_by_hosts(&[host_id])
        .await?
        .into_iter()
        .filter(|g| {
            g.template_id
                .map(|id| template_graph_ids.contains(&id))
                .unwrap_or(false)
        })
        .map(|g| g.graph_id)
        .collect();
    delete_graphs(store, sink, &distinct_ids(doomed)).await
}

/// Removes the host triggers inherited from the given templates.
pub async fn delete_template_triggers(
    store: &dyn ConfigStore,
    notifier: &dyn StatusNotifier,
    sink: &dyn AuditSink,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let template_trigger_ids: HashSet<u64> = store
        .triggers_by_hosts(template_ids)
        .await?
        .into_iter()
        .map(|t| t.trigger_id)
        .collect();
    let doomed: Vec<u64> = store
        .triggers_by_hosts(&[host_id])
        .await?
        .into_iter()
        .filter(|t| {
            t.template_id
                .map(|id| template_trigger_ids.contains(&id))
                .unwrap_or(false)
        })
        .map(|t| t.trigger_id)
        .collect();
    delete_triggers(store, notifier, sink, &distinct_ids(doomed)).await
}

/// Removes the host items inherited from the given templates.
pub async fn delete_template_items(
    store: &dyn ConfigStore,
    housekeeper: &dyn Housekeeper,
    notifier: &dyn StatusNotifier,
    sink: &dyn AuditSink,
    config: &EngineConfig,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let template_item_ids: HashSet<u64> = store
        .items_by_hosts(template_ids)
        .await?
        .into_iter()
        .map(|i| i.item_id)
        .collect();
    let doomed: Vec<u64> = store
        .items_by_hosts(&[host_id])
        .await?
        .into_iter()
        .filter(|i| {
            i.template_id
                .map(|id| template_item_ids.contains(&id))
                .unwrap_or(false)
        })
        .map(|i| i.item_id)
        .collect();
    delete_items(store, housekeeper, notifier, sink, config, &distinct_ids(doomed)).await
}

/// Removes the host applications inherited from the given templates.
pub async fn delete_template_applications(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let template_app_ids: HashSet<u64> = store
        .applications_by_hosts(template_ids)
        .await?
        .into_iter()
        .map(|a| a.application_id)
        .collect();
    let doomed: Vec<u64> = store
        .applications_by_hosts(&[host_id])
        .await?
        .into_iter()
        .filter(|a| {
            a.template_id
                .map(|id| template_app_ids.contains(&id))
                .unwrap_or(false)
        })
        .map(|a| a.application_id)
        .collect();
    delete_applications(store, sink, &distinct_ids(doomed)).await
}

/// Widens a seed id set with its transitive discovery descendants.
/// `fetch` maps a parent frontier to the child ids one level down.
async fn discovery_closure<F, Fut>(seed: &[u64], mut fetch: F) -> Result<Vec<u64>, EngineError>
where
    F: FnMut(Vec<u64>) -> Fut,
    Fut: Future<Output = Result<Vec<u64>, EngineError>>,
{
    let mut all: HashSet<u64> = seed.iter().copied().collect();
    let mut frontier = distinct_ids(seed.iter().copied());
    while !frontier.is_empty() {
        let children = fetch(frontier).await?;
        frontier = children.into_iter().filter(|id| all.insert(*id)).collect();
    }
    Ok(distinct_ids(all))
}
