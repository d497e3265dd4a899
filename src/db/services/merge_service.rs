//! Copies template entities onto a host. Existing host entities are
//! reused where possible: applications and items pair up by name and
//! key, triggers and graphs by structural equivalence. Everything else
//! is copied with freshly allocated ids.
//!
//! Collisions have been ruled out by validation before these functions
//! run; what can still fail per entity is key resolution, and such
//! entities are skipped with a warning rather than aborting the whole
//! link.

use std::collections::{HashMap, HashSet};

use futures::try_join;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::db::entities::*;
use crate::db::enums::{AuditAction, DiscoveryFlag, EntityKind, InterfaceKind, InterfaceRequirement, ItemType};
use crate::db::services::equivalence::{
    CopyDecision, FunctionRef, function_token, graph_items_equivalent, triggers_equivalent,
};
use crate::db::services::validation_service::distinct_ids;
use crate::db::store::{ConfigStore, IdDomain};
use crate::error::EngineError;
use crate::external::{AuditSink, audit};

/// Propagates template applications onto the host. A host application
/// with the same name is adopted and marked inherited; the rest are
/// created.
pub async fn copy_template_applications(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let host_only = [host_id];
    let (mut template_apps, host_apps) = try_join!(
        store.applications_by_hosts(template_ids),
        store.applications_by_hosts(&host_only),
    )?;
    template_apps.sort_by_key(|a| a.application_id);

    let by_name: HashMap<&str, &Application> =
        host_apps.iter().map(|a| (a.name.as_str(), a)).collect();

    let mut updates = Vec::new();
    let mut pending = Vec::new();
    for template_app in &template_apps {
        match by_name.get(template_app.name.as_str()) {
            Some(existing) => {
                let mut row = (*existing).clone();
                row.template_id = Some(template_app.application_id);
                updates.push(row);
            }
            None => pending.push(template_app),
        }
    }

    if !updates.is_empty() {
        for row in &updates {
            audit(
                sink,
                EntityKind::Application,
                row.application_id,
                AuditAction::Update,
                json!({ "name": row.name, "template_id": row.template_id }),
            )
            .await;
        }
        store.update_applications(updates).await?;
    }

    if !pending.is_empty() {
        let first = store
            .allocate_ids(IdDomain::Applications, pending.len() as u64)
            .await?;
        let mut rows = Vec::with_capacity(pending.len());
        for (offset, template_app) in pending.iter().enumerate() {
            rows.push(Application {
                application_id: first + offset as u64,
                host_id,
                name: template_app.name.clone(),
                template_id: Some(template_app.application_id),
            });
        }
        for row in &rows {
            audit(
                sink,
                EntityKind::Application,
                row.application_id,
                AuditAction::Create,
                json!({ "name": row.name }),
            )
            .await;
        }
        store.insert_applications(rows).await?;
    }

    Ok(())
}

pub(crate) fn resolve_interface(
    item_type: ItemType,
    defaults: &HashMap<InterfaceKind, u64>,
    priority: &[InterfaceKind],
) -> Option<u64> {
    match item_type.interface_requirement() {
        InterfaceRequirement::None => None,
        InterfaceRequirement::Kind(kind) => defaults.get(&kind).copied(),
        InterfaceRequirement::Any => priority.iter().find_map(|k| defaults.get(k).copied()),
    }
}

/// Propagates template items onto the host. A host item with the same
/// key is overwritten in place, keeping its id so history, functions
/// and graph lines survive; other items are created. Application
/// memberships and prototype ancestry rows are mirrored afterwards.
pub async fn copy_template_items(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    config: &EngineConfig,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let host_only = [host_id];
    let (mut template_items, host_items, interfaces) = try_join!(
        store.items_by_hosts(template_ids),
        store.items_by_hosts(&host_only),
        store.interfaces(host_id),
    )?;
    template_items.sort_by_key(|i| i.item_id);

    let defaults: HashMap<InterfaceKind, u64> = interfaces
        .iter()
        .filter(|i| i.main)
        .map(|i| (i.kind, i.interface_id))
        .collect();
    let host_by_key: HashMap<&str, &Item> =
        host_items.iter().map(|i| (i.key.as_str(), i)).collect();

    // template item id -> host item id, filled by both branches
    let mut item_map: HashMap<u64, u64> = HashMap::new();
    let mut created_prototypes: Vec<u64> = Vec::new();

    let mut updates = Vec::new();
    let mut pending: Vec<(&Item, Option<u64>)> = Vec::new();
    for template_item in &template_items {
        let interface_id =
            resolve_interface(template_item.item_type, &defaults, &config.interface_priority);
        match host_by_key.get(template_item.key.as_str()) {
            Some(existing) => {
                let mut row = existing.overwrite_from(template_item);
                row.interface_id = interface_id;
                item_map.insert(template_item.item_id, row.item_id);
                updates.push(row);
            }
            None => pending.push((template_item, interface_id)),
        }
    }

    if !updates.is_empty() {
        for row in &updates {
            audit(
                sink,
                EntityKind::Item,
                row.item_id,
                AuditAction::Update,
                json!({ "key": row.key, "template_id": row.template_id }),
            )
            .await;
        }
        store.update_items(updates).await?;
    }

    if !pending.is_empty() {
        let first = store
            .allocate_ids(IdDomain::Items, pending.len() as u64)
            .await?;
        let mut rows = Vec::with_capacity(pending.len());
        for (offset, (template_item, interface_id)) in pending.iter().enumerate() {
            let item_id = first + offset as u64;
            item_map.insert(template_item.item_id, item_id);
            if template_item.flags == DiscoveryFlag::Prototype {
                created_prototypes.push(template_item.item_id);
            }
            let mut row = (*template_item).clone();
            row.item_id = item_id;
            row.host_id = host_id;
            row.interface_id = *interface_id;
            row.template_id = Some(template_item.item_id);
            rows.push(row);
        }
        for row in &rows {
            audit(
                sink,
                EntityKind::Item,
                row.item_id,
                AuditAction::Create,
                json!({ "key": row.key }),
            )
            .await;
        }
        store.insert_items(rows).await?;
    }

    mirror_item_applications(store, host_id, &template_items, &item_map).await?;
    mirror_prototype_ancestry(store, &created_prototypes, &item_map).await?;

    Ok(())
}

/// Mirrors the application membership of template items onto the host
/// side, skipping pairs that already exist.
async fn mirror_item_applications(
    store: &dyn ConfigStore,
    host_id: u64,
    template_items: &[Item],
    item_map: &HashMap<u64, u64>,
) -> Result<(), EngineError> {
    let template_item_ids = distinct_ids(template_items.iter().map(|i| i.item_id));
    let template_links = store.item_applications_by_items(&template_item_ids).await?;
    if template_links.is_empty() {
        return Ok(());
    }

    let host_apps = store.applications_by_hosts(&[host_id]).await?;
    let app_map: HashMap<u64, u64> = host_apps
        .iter()
        .filter_map(|a| a.template_id.map(|t| (t, a.application_id)))
        .collect();
    let existing: HashSet<(u64, u64)> = store
        .item_applications_by_items(&distinct_ids(item_map.values().copied()))
        .await?
        .iter()
        .map(|ia| (ia.application_id, ia.item_id))
        .collect();

    let mut pairs: Vec<(u64, u64)> = Vec::new();
    for link in &template_links {
        let (Some(&application_id), Some(&item_id)) =
            (app_map.get(&link.application_id), item_map.get(&link.item_id))
        else {
            continue;
        };
        if !existing.contains(&(application_id, item_id)) {
            pairs.push((application_id, item_id));
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    if pairs.is_empty() {
        return Ok(());
    }

    let first = store
        .allocate_ids(IdDomain::ItemApplications, pairs.len() as u64)
        .await?;
    let rows = pairs
        .into_iter()
        .enumerate()
        .map(|(offset, (application_id, item_id))| ItemApplication {
            item_application_id: first + offset as u64,
            application_id,
            item_id,
        })
        .collect();
    store.insert_item_applications(rows).await?;
    Ok(())
}

/// Newly created prototype items get ancestry rows binding them to the
/// host-side copy of their discovery rule.
async fn mirror_prototype_ancestry(
    store: &dyn ConfigStore,
    created_prototypes: &[u64],
    item_map: &HashMap<u64, u64>,
) -> Result<(), EngineError> {
    if created_prototypes.is_empty() {
        return Ok(());
    }
    let ancestry = store
        .item_discovery_by_items(&distinct_ids(created_prototypes.iter().copied()))
        .await?;
    let mut pairs: Vec<(u64, u64)> = Vec::new();
    for row in &ancestry {
        let (Some(&item_id), Some(&parent_item_id)) =
            (item_map.get(&row.item_id), item_map.get(&row.parent_item_id))
        else {
            continue;
        };
        pairs.push((item_id, parent_item_id));
    }
    if pairs.is_empty() {
        return Ok(());
    }
    let first = store
        .allocate_ids(IdDomain::ItemDiscovery, pairs.len() as u64)
        .await?;
    let rows = pairs
        .into_iter()
        .enumerate()
        .map(|(offset, (item_id, parent_item_id))| ItemDiscovery {
            item_discovery_id: first + offset as u64,
            item_id,
            parent_item_id,
        })
        .collect();
    store.insert_item_discovery(rows).await?;
    Ok(())
}

/// Propagates template triggers onto the host, then mirrors dependency
/// edges between the resulting host triggers.
pub async fn copy_template_triggers(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let mut template_triggers = store.triggers_by_hosts(template_ids).await?;
    if template_triggers.is_empty() {
        return Ok(());
    }
    template_triggers.sort_by_key(|t| t.trigger_id);

    let host_items = store.items_by_hosts(&[host_id]).await?;
    let host_key_to_id: HashMap<&str, u64> =
        host_items.iter().map(|i| (i.key.as_str(), i.item_id)).collect();

    // template trigger id -> host trigger id, for triggers created here
    let mut created: HashMap<u64, u64> = HashMap::new();
    for template_trigger in &template_triggers {
        if let Some(trigger_id) =
            copy_trigger(store, sink, host_id, &host_key_to_id, template_trigger).await?
        {
            created.insert(template_trigger.trigger_id, trigger_id);
        }
    }

    let template_trigger_ids = distinct_ids(template_triggers.iter().map(|t| t.trigger_id));
    copy_dependencies(store, &created, &template_trigger_ids).await?;
    Ok(())
}

/// Copies one trigger, or links it onto an equivalent unlinked host
/// trigger with the same description. Returns the id of the created
/// trigger, or `None` when the trigger was linked or skipped.
async fn copy_trigger(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    host_id: u64,
    host_items: &HashMap<&str, u64>,
    template: &Trigger,
) -> Result<Option<u64>, EngineError> {
    let template_functions = store.functions_by_triggers(&[template.trigger_id]).await?;
    let template_items = store
        .items_by_ids(&distinct_ids(template_functions.iter().map(|f| f.item_id)))
        .await?;
    let template_key_of: HashMap<u64, &str> = template_items
        .iter()
        .map(|i| (i.item_id, i.key.as_str()))
        .collect();
    let template_refs: Vec<FunctionRef<'_>> = template_functions
        .iter()
        .filter_map(|f| {
            template_key_of.get(&f.item_id).copied().map(|key| FunctionRef {
                function_id: f.function_id,
                name: &f.name,
                parameter: &f.parameter,
                item_key: key,
            })
        })
        .collect();

    for candidate in store
        .host_triggers_by_description(host_id, &template.description)
        .await?
    {
        let functions = store.functions_by_triggers(&[candidate.trigger_id]).await?;
        let items = store
            .items_by_ids(&distinct_ids(functions.iter().map(|f| f.item_id)))
            .await?;
        let key_of: HashMap<u64, &str> =
            items.iter().map(|i| (i.item_id, i.key.as_str())).collect();
        let refs: Vec<FunctionRef<'_>> = functions
            .iter()
            .filter_map(|f| {
                key_of.get(&f.item_id).copied().map(|key| FunctionRef {
                    function_id: f.function_id,
                    name: &f.name,
                    parameter: &f.parameter,
                    item_key: key,
                })
            })
            .collect();
        if triggers_equivalent(
            &candidate.expression,
            &refs,
            &template.expression,
            &template_refs,
        ) {
            debug!(
                "linking trigger \"{}\" onto existing trigger {}",
                template.description, candidate.trigger_id
            );
            let mut row = candidate.clone();
            row.template_id = Some(template.trigger_id);
            row.flags = template.flags;
            audit(
                sink,
                EntityKind::Trigger,
                row.trigger_id,
                AuditAction::Update,
                json!({ "description": row.description, "template_id": row.template_id }),
            )
            .await;
            store.update_triggers(vec![row]).await?;
            return Ok(None);
        }
    }

    // Every referenced item key must resolve on the host; otherwise the
    // trigger is skipped, not the whole link.
    let mut resolved: Vec<(&Function, u64)> = Vec::with_capacity(template_functions.len());
    for function in &template_functions {
        let item_id = template_key_of
            .get(&function.item_id)
            .and_then(|key| host_items.get(key).copied());
        let Some(item_id) = item_id else {
            warn!(
                "cannot copy trigger \"{}\" to host {}: referenced item key is missing",
                template.description, host_id
            );
            return Ok(None);
        };
        resolved.push((function, item_id));
    }

    let trigger_id = store.allocate_ids(IdDomain::Triggers, 1).await?;
    let first_function = store
        .allocate_ids(IdDomain::Functions, resolved.len() as u64)
        .await?;
    let mut expression = template.expression.clone();
    let mut functions = Vec::with_capacity(resolved.len());
    for (offset, (function, item_id)) in resolved.iter().enumerate() {
        let function_id = first_function + offset as u64;
        expression = expression.replace(
            &function_token(function.function_id),
            &function_token(function_id),
        );
        functions.push(Function {
            function_id,
            item_id: *item_id,
            trigger_id,
            name: function.name.clone(),
            parameter: function.parameter.clone(),
        });
    }

    store
        .insert_triggers(vec![Trigger {
            trigger_id,
            description: template.description.clone(),
            expression,
            status: template.status,
            priority: template.priority,
            comments: template.comments.clone(),
            url: template.url.clone(),
            flags: template.flags,
            template_id: Some(template.trigger_id),
        }])
        .await?;
    store.insert_functions(functions).await?;
    audit(
        sink,
        EntityKind::Trigger,
        trigger_id,
        AuditAction::Create,
        json!({ "description": template.description }),
    )
    .await;
    Ok(Some(trigger_id))
}

/// Mirrors dependency edges onto the triggers created by this merge.
/// Adopted host triggers keep their own edges untouched. An "up"
/// endpoint without a freshly created copy stays pointed at the
/// template trigger so the dependency keeps holding across hosts.
async fn copy_dependencies(
    store: &dyn ConfigStore,
    created: &HashMap<u64, u64>,
    template_trigger_ids: &[u64],
) -> Result<(), EngineError> {
    if created.is_empty() {
        return Ok(());
    }

    let mut edges: Vec<(u64, u64)> = Vec::new();
    for dep in store.dependencies_touching(template_trigger_ids).await? {
        let Some(&down) = created.get(&dep.trigger_down_id) else {
            continue;
        };
        let up = created
            .get(&dep.trigger_up_id)
            .copied()
            .unwrap_or(dep.trigger_up_id);
        edges.push((down, up));
    }
    edges.sort_unstable();
    edges.dedup();

    let existing: HashSet<(u64, u64)> = store
        .dependencies_touching(&distinct_ids(created.values().copied()))
        .await?
        .iter()
        .map(|d| (d.trigger_down_id, d.trigger_up_id))
        .collect();
    edges.retain(|edge| !existing.contains(edge));
    if edges.is_empty() {
        return Ok(());
    }

    let first = store
        .allocate_ids(IdDomain::TriggerDependencies, edges.len() as u64)
        .await?;
    let rows = edges
        .into_iter()
        .enumerate()
        .map(|(offset, (trigger_down_id, trigger_up_id))| TriggerDependency {
            dependency_id: first + offset as u64,
            trigger_down_id,
            trigger_up_id,
        })
        .collect();
    store.insert_dependencies(rows).await?;
    Ok(())
}

/// Propagates template graphs onto the host. An unlinked host graph
/// with the same name, same discovery role and the same item key
/// sequence is adopted and overwritten; otherwise a copy is created.
pub async fn copy_template_graphs(
    store: &dyn ConfigStore,
    sink: &dyn AuditSink,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    let mut template_graphs = store.graphs_by_hosts(template_ids).await?;
    if template_graphs.is_empty() {
        return Ok(());
    }
    template_graphs.sort_by_key(|g| g.graph_id);

    let host_only = [host_id];
    let (template_items, host_items) = try_join!(
        store.items_by_hosts(template_ids),
        store.items_by_hosts(&host_only),
    )?;
    let template_key_of: HashMap<u64, &str> = template_items
        .iter()
        .map(|i| (i.item_id, i.key.as_str()))
        .collect();
    let host_key_to_id: HashMap<&str, u64> =
        host_items.iter().map(|i| (i.key.as_str(), i.item_id)).collect();
    let host_id_to_key: HashMap<u64, &str> =
        host_items.iter().map(|i| (i.item_id, i.key.as_str())).collect();

    let template_lines_all = store
        .graph_items_by_graphs(&distinct_ids(template_graphs.iter().map(|g| g.graph_id)))
        .await?;
    let host_graphs = store.graphs_by_hosts(&[host_id]).await?;
    let host_lines_all = store
        .graph_items_by_graphs(&distinct_ids(host_graphs.iter().map(|g| g.graph_id)))
        .await?;

    'graphs: for template_graph in &template_graphs {
        let mut lines: Vec<(&str, &GraphItem)> = template_lines_all
            .iter()
            .filter(|gi| gi.graph_id == template_graph.graph_id)
            .filter_map(|gi| template_key_of.get(&gi.item_id).map(|key| (*key, gi)))
            .collect();
        lines.sort_by(|a, b| a.0.cmp(b.0).then(a.1.graph_item_id.cmp(&b.1.graph_item_id)));

        let mut resolved: Vec<u64> = Vec::with_capacity(lines.len());
        for (key, _) in &lines {
            let Some(&item_id) = host_key_to_id.get(key) else {
                warn!(
                    "cannot copy graph \"{}\" to host {}: no item with key \"{}\"",
                    template_graph.name, host_id, key
                );
                continue 'graphs;
            };
            resolved.push(item_id);
        }

        let template_keys: Vec<&str> = lines.iter().map(|(key, _)| *key).collect();
        let decision = host_graphs
            .iter()
            .filter(|hg| {
                hg.template_id.is_none()
                    && hg.name == template_graph.name
                    && hg.flags == template_graph.flags
            })
            .find_map(|hg| {
                let mut host_keys: Vec<&str> = host_lines_all
                    .iter()
                    .filter(|gi| gi.graph_id == hg.graph_id)
                    .filter_map(|gi| host_id_to_key.get(&gi.item_id).copied())
                    .collect();
                host_keys.sort_unstable();
                graph_items_equivalent(&host_keys, &template_keys).then_some(hg.graph_id)
            })
            .map(CopyDecision::Link)
            .unwrap_or(CopyDecision::Create);

        let ymin_item_id =
            resolve_axis_item(template_graph.ymin_item_id, &template_key_of, &host_key_to_id);
        let ymax_item_id =
            resolve_axis_item(template_graph.ymax_item_id, &template_key_of, &host_key_to_id);

        match decision {
            CopyDecision::Link(host_graph_id) => {
                let mut row = template_graph.clone();
                row.graph_id = host_graph_id;
                row.template_id = Some(template_graph.graph_id);
                row.ymin_item_id = ymin_item_id;
                row.ymax_item_id = ymax_item_id;
                audit(
                    sink,
                    EntityKind::Graph,
                    host_graph_id,
                    AuditAction::Update,
                    json!({ "name": row.name, "template_id": row.template_id }),
                )
                .await;
                store.update_graphs(vec![row]).await?;

                let mut host_lines: Vec<&GraphItem> = host_lines_all
                    .iter()
                    .filter(|gi| gi.graph_id == host_graph_id)
                    .collect();
                host_lines.sort_by(|a, b| {
                    let ka = host_id_to_key.get(&a.item_id).copied().unwrap_or("");
                    let kb = host_id_to_key.get(&b.item_id).copied().unwrap_or("");
                    ka.cmp(kb).then(a.graph_item_id.cmp(&b.graph_item_id))
                });
                let mut updates = Vec::with_capacity(host_lines.len());
                for (host_line, (_, template_line)) in host_lines.iter().zip(lines.iter()) {
                    let mut updated = (*host_line).clone();
                    updated.draw_type = template_line.draw_type;
                    updated.sort_order = template_line.sort_order;
                    updated.color = template_line.color.clone();
                    updated.y_side = template_line.y_side;
                    updated.calc_fnc = template_line.calc_fnc;
                    updates.push(updated);
                }
                store.update_graph_items(updates).await?;
            }
            CopyDecision::Create => {
                let graph_id = store.allocate_ids(IdDomain::Graphs, 1).await?;
                let first_line = store
                    .allocate_ids(IdDomain::GraphItems, lines.len() as u64)
                    .await?;
                let mut row = template_graph.clone();
                row.graph_id = graph_id;
                row.template_id = Some(template_graph.graph_id);
                row.ymin_item_id = ymin_item_id;
                row.ymax_item_id = ymax_item_id;
                audit(
                    sink,
                    EntityKind::Graph,
                    graph_id,
                    AuditAction::Create,
                    json!({ "name": row.name }),
                )
                .await;
                store.insert_graphs(vec![row]).await?;

                let mut rows = Vec::with_capacity(lines.len());
                for (offset, ((_, template_line), item_id)) in
                    lines.iter().zip(resolved.iter()).enumerate()
                {
                    rows.push(GraphItem {
                        graph_item_id: first_line + offset as u64,
                        graph_id,
                        item_id: *item_id,
                        draw_type: template_line.draw_type,
                        sort_order: template_line.sort_order,
                        color: template_line.color.clone(),
                        y_side: template_line.y_side,
                        calc_fnc: template_line.calc_fnc,
                    });
                }
                store.insert_graph_items(rows).await?;
            }
        }
    }

    Ok(())
}

fn resolve_axis_item(
    template_item: Option<u64>,
    template_keys: &HashMap<u64, &str>,
    host_items: &HashMap<&str, u64>,
) -> Option<u64> {
    template_item
        .and_then(|id| template_keys.get(&id))
        .and_then(|key| host_items.get(key).copied())
}
