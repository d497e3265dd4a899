//! Pre-flight checks for template linking. Both entry points are pure
//! reads; any reported collision aborts the operation before a single
//! row is written.

use std::collections::{HashMap, HashSet};

use crate::db::entities::Item;
use crate::db::enums::{HostStatus, InterfaceKind, InterfaceRequirement};
use crate::db::store::ConfigStore;
use crate::error::{CollisionError, EngineError};

pub(crate) fn distinct_ids<I: IntoIterator<Item = u64>>(ids: I) -> Vec<u64> {
    let mut out: Vec<u64> = ids.into_iter().collect();
    out.sort_unstable();
    out.dedup();
    out
}

/// Checks that the templates of a prospective link set are mutually
/// compatible: no colliding application names, item keys, graph names
/// or web scenario names between set members, and no trigger reaching
/// out of the set into an unlinked template, either through its
/// expression or through a dependency edge.
pub async fn validate_template_set(
    store: &dyn ConfigStore,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    if template_ids.is_empty() {
        return Ok(());
    }

    let items = store.items_by_hosts(template_ids).await?;

    if template_ids.len() > 1 {
        let applications = store.applications_by_hosts(template_ids).await?;
        let mut app_names: HashMap<&str, u64> = HashMap::new();
        for app in &applications {
            if let Some(other_host) = app_names.insert(app.name.as_str(), app.host_id) {
                if other_host != app.host_id {
                    return Err(CollisionError::ApplicationName(app.name.clone()).into());
                }
            }
        }

        let mut item_keys: HashMap<&str, u64> = HashMap::new();
        for item in &items {
            if let Some(other_host) = item_keys.insert(item.key.as_str(), item.host_id) {
                if other_host != item.host_id {
                    return Err(CollisionError::ItemKey(item.key.clone()).into());
                }
            }
        }
    }

    let set_item_ids: HashSet<u64> = items.iter().map(|i| i.item_id).collect();
    let set_functions = store
        .functions_by_items(&distinct_ids(set_item_ids.iter().copied()))
        .await?;
    let trigger_ids = distinct_ids(set_functions.iter().map(|f| f.trigger_id));

    // A trigger of the set must not also evaluate items of a template
    // outside the set.
    let all_functions = store.functions_by_triggers(&trigger_ids).await?;
    let outside_item_ids =
        distinct_ids(all_functions.iter().map(|f| f.item_id).filter(|id| !set_item_ids.contains(id)));
    if !outside_item_ids.is_empty() {
        let outside_items = store.items_by_ids(&outside_item_ids).await?;
        let hosts = store
            .hosts_by_ids(&distinct_ids(outside_items.iter().map(|i| i.host_id)))
            .await?;
        let foreign_templates: HashMap<u64, &str> = hosts
            .iter()
            .filter(|h| h.status == HostStatus::Template)
            .map(|h| (h.host_id, h.name.as_str()))
            .collect();
        for function in &all_functions {
            if set_item_ids.contains(&function.item_id) {
                continue;
            }
            let Some(item) = outside_items.iter().find(|i| i.item_id == function.item_id) else {
                continue;
            };
            if let Some(template_name) = foreign_templates.get(&item.host_id) {
                let description = store
                    .triggers_by_ids(&[function.trigger_id])
                    .await?
                    .into_iter()
                    .next()
                    .map(|t| t.description)
                    .unwrap_or_default();
                return Err(CollisionError::TriggerSpansTemplates(
                    description,
                    (*template_name).to_string(),
                )
                .into());
            }
        }
    }

    // Dependency edges may not cross into an unlinked template either.
    let in_set: HashSet<u64> = trigger_ids.iter().copied().collect();
    for dep in store.dependencies_touching(&trigger_ids).await? {
        let outside = if in_set.contains(&dep.trigger_down_id)
            && !in_set.contains(&dep.trigger_up_id)
        {
            dep.trigger_up_id
        } else if in_set.contains(&dep.trigger_up_id) && !in_set.contains(&dep.trigger_down_id) {
            dep.trigger_down_id
        } else {
            continue;
        };
        if let Some((_, host)) = trigger_context(store, outside).await? {
            if host.1 == HostStatus::Template {
                let (down_desc, down_host) =
                    describe(trigger_context(store, dep.trigger_down_id).await?);
                let (up_desc, up_host) =
                    describe(trigger_context(store, dep.trigger_up_id).await?);
                return Err(CollisionError::DependencyOutsideSet(
                    down_desc, down_host, up_desc, up_host,
                )
                .into());
            }
        }
    }

    if template_ids.len() > 1 {
        let mut graph_names: HashMap<String, u64> = HashMap::new();
        for graph in store.graphs_by_hosts(template_ids).await? {
            if let Some(other_id) = graph_names.insert(graph.name.clone(), graph.graph_id) {
                if other_id != graph.graph_id {
                    return Err(CollisionError::GraphName(graph.name).into());
                }
            }
        }

        let mut scenario_names: HashMap<String, u64> = HashMap::new();
        for scenario in store.web_scenarios_by_hosts(template_ids).await? {
            if let Some(other_id) = scenario_names.insert(scenario.name.clone(), scenario.scenario_id)
            {
                if other_id != scenario.scenario_id {
                    return Err(CollisionError::ScenarioName(scenario.name).into());
                }
            }
        }
    }

    Ok(())
}

/// Resolves a trigger to its description and the name and status of the
/// host owning its first item.
async fn trigger_context(
    store: &dyn ConfigStore,
    trigger_id: u64,
) -> Result<Option<(String, (String, HostStatus))>, EngineError> {
    let Some(trigger) = store.triggers_by_ids(&[trigger_id]).await?.into_iter().next() else {
        return Ok(None);
    };
    let functions = store.functions_by_triggers(&[trigger_id]).await?;
    let items = store
        .items_by_ids(&distinct_ids(functions.iter().map(|f| f.item_id)))
        .await?;
    let Some(item) = items.first() else {
        return Ok(None);
    };
    let host = store.host(item.host_id).await?;
    Ok(Some((trigger.description, (host.name, host.status))))
}

fn describe(context: Option<(String, (String, HostStatus))>) -> (String, String) {
    match context {
        Some((description, (host_name, _))) => (description, host_name),
        None => (String::new(), String::new()),
    }
}

/// Checks one host against the templates about to be linked to it:
/// inventory slot ownership stays unambiguous, same-named graphs and
/// same-keyed items agree on their discovery role, graph item sets of
/// same-named graphs are identical, and the host has a default
/// interface for every category the template items require.
pub async fn validate_host_compatibility(
    store: &dyn ConfigStore,
    host_id: u64,
    template_ids: &[u64],
) -> Result<(), EngineError> {
    if template_ids.is_empty() {
        return Ok(());
    }

    let host_only = [host_id];
    let (template_items, host_items) = futures::try_join!(
        store.items_by_hosts(template_ids),
        store.items_by_hosts(&host_only),
    )?;

    check_inventory_slots(&template_items, &host_items)?;

    for template_item in &template_items {
        let clash = host_items
            .iter()
            .any(|hi| hi.key == template_item.key && hi.flags != template_item.flags);
        if clash {
            return Err(CollisionError::ItemPrototypeKey(template_item.key.clone()).into());
        }
    }

    check_graph_compatibility(store, host_id, template_ids, &template_items, &host_items).await?;

    check_interface_coverage(store, host_id, &template_items).await?;

    Ok(())
}

fn check_inventory_slots(template_items: &[Item], host_items: &[Item]) -> Result<(), EngineError> {
    let mut slots: HashSet<u32> = HashSet::new();
    for item in template_items {
        if let Some(slot) = item.inventory_link {
            if !slots.insert(slot) {
                return Err(CollisionError::InventoryField.into());
            }
        }
    }

    // A host item keeps its slot only if the merge will not overwrite
    // it; overwritten items (same key as a template item) do not count.
    let template_keys: HashSet<&str> = template_items.iter().map(|i| i.key.as_str()).collect();
    for template_item in template_items {
        let Some(slot) = template_item.inventory_link else {
            continue;
        };
        let clash = host_items.iter().any(|hi| {
            hi.inventory_link == Some(slot)
                && hi.key != template_item.key
                && !template_keys.contains(hi.key.as_str())
        });
        if clash {
            return Err(CollisionError::InventoryField.into());
        }
    }
    Ok(())
}

async fn check_graph_compatibility(
    store: &dyn ConfigStore,
    host_id: u64,
    template_ids: &[u64],
    template_items: &[Item],
    host_items: &[Item],
) -> Result<(), EngineError> {
    let host_only = [host_id];
    let (template_graphs, host_graphs) = futures::try_join!(
        store.graphs_by_hosts(template_ids),
        store.graphs_by_hosts(&host_only),
    )?;
    if template_graphs.is_empty() || host_graphs.is_empty() {
        return Ok(());
    }

    let graph_ids = distinct_ids(
        template_graphs
            .iter()
            .chain(host_graphs.iter())
            .map(|g| g.graph_id),
    );
    let graph_items = store.graph_items_by_graphs(&graph_ids).await?;
    let key_of: HashMap<u64, &str> = template_items
        .iter()
        .chain(host_items.iter())
        .map(|i| (i.item_id, i.key.as_str()))
        .collect();
    let signature = |graph_id: u64| -> Vec<&str> {
        let mut keys: Vec<&str> = graph_items
            .iter()
            .filter(|gi| gi.graph_id == graph_id)
            .filter_map(|gi| key_of.get(&gi.item_id).copied())
            .collect();
        keys.sort_unstable();
        keys
    };

    for template_graph in &template_graphs {
        for host_graph in host_graphs
            .iter()
            .filter(|g| g.template_id.is_none() && g.name == template_graph.name)
        {
            if host_graph.flags != template_graph.flags {
                return Err(
                    CollisionError::GraphPrototypeName(template_graph.name.clone()).into(),
                );
            }
            if signature(host_graph.graph_id) != signature(template_graph.graph_id) {
                return Err(CollisionError::GraphItemsDiffer(template_graph.name.clone()).into());
            }
        }
    }
    Ok(())
}

async fn check_interface_coverage(
    store: &dyn ConfigStore,
    host_id: u64,
    template_items: &[Item],
) -> Result<(), EngineError> {
    let mut required: HashSet<InterfaceKind> = HashSet::new();
    let mut any_required = false;
    for item in template_items {
        match item.item_type.interface_requirement() {
            InterfaceRequirement::None => {}
            InterfaceRequirement::Any => any_required = true,
            InterfaceRequirement::Kind(kind) => {
                required.insert(kind);
            }
        }
    }
    if required.is_empty() && !any_required {
        return Ok(());
    }

    let available: HashSet<InterfaceKind> = store
        .interfaces(host_id)
        .await?
        .into_iter()
        .filter(|i| i.main)
        .map(|i| i.kind)
        .collect();

    for kind in [
        InterfaceKind::Agent,
        InterfaceKind::Snmp,
        InterfaceKind::Ipmi,
        InterfaceKind::Jmx,
    ] {
        if required.contains(&kind) && !available.contains(&kind) {
            return Err(CollisionError::MissingInterface(kind).into());
        }
    }
    if any_required && available.is_empty() {
        return Err(CollisionError::NoInterfaces.into());
    }
    Ok(())
}
