use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::db::entities::*;
use crate::db::enums::ResourceKind;
use crate::db::store::{ConfigStore, IdDomain};
use crate::error::StoreError;

#[derive(Debug, Default, Clone)]
struct State {
    hosts: BTreeMap<u64, Host>,
    interfaces: BTreeMap<u64, Interface>,
    template_links: BTreeMap<u64, TemplateLink>,
    applications: BTreeMap<u64, Application>,
    item_applications: BTreeMap<u64, ItemApplication>,
    items: BTreeMap<u64, Item>,
    functions: BTreeMap<u64, Function>,
    triggers: BTreeMap<u64, Trigger>,
    dependencies: BTreeMap<u64, TriggerDependency>,
    graphs: BTreeMap<u64, Graph>,
    graph_items: BTreeMap<u64, GraphItem>,
    item_discovery: BTreeMap<u64, ItemDiscovery>,
    trigger_discovery: Vec<TriggerDiscovery>,
    graph_discovery: Vec<GraphDiscovery>,
    events: BTreeMap<u64, Event>,
    screen_items: BTreeMap<u64, ScreenItem>,
    favorites: BTreeMap<u64, Favorite>,
    map_elements: BTreeMap<u64, MapElement>,
    action_conditions: BTreeMap<u64, ActionCondition>,
    web_scenarios: BTreeMap<u64, WebScenario>,
}

#[derive(Debug, Default)]
struct Inner {
    state: State,
    snapshot: Option<State>,
    next_id: u64,
}

/// Reference [`ConfigStore`] keeping every table in process memory.
/// Transactions snapshot the whole state on `begin` and restore it on
/// `rollback`. Used by the test suite and by embedders that do not need
/// durable storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 100_000,
                ..Inner::default()
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn lock_seed(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Fixture seeding and inspection, outside the store contract.
impl MemoryStore {
    pub fn add_host(&self, row: Host) {
        self.lock_seed().state.hosts.insert(row.host_id, row);
    }

    pub fn add_interface(&self, row: Interface) {
        self.lock_seed()
            .state
            .interfaces
            .insert(row.interface_id, row);
    }

    pub fn add_template_link(&self, row: TemplateLink) {
        self.lock_seed()
            .state
            .template_links
            .insert(row.link_id, row);
    }

    pub fn add_application(&self, row: Application) {
        self.lock_seed()
            .state
            .applications
            .insert(row.application_id, row);
    }

    pub fn add_item_application(&self, row: ItemApplication) {
        self.lock_seed()
            .state
            .item_applications
            .insert(row.item_application_id, row);
    }

    pub fn add_item(&self, row: Item) {
        self.lock_seed().state.items.insert(row.item_id, row);
    }

    pub fn add_function(&self, row: Function) {
        self.lock_seed().state.functions.insert(row.function_id, row);
    }

    pub fn add_trigger(&self, row: Trigger) {
        self.lock_seed().state.triggers.insert(row.trigger_id, row);
    }

    pub fn add_dependency(&self, row: TriggerDependency) {
        self.lock_seed()
            .state
            .dependencies
            .insert(row.dependency_id, row);
    }

    pub fn add_graph(&self, row: Graph) {
        self.lock_seed().state.graphs.insert(row.graph_id, row);
    }

    pub fn add_graph_item(&self, row: GraphItem) {
        self.lock_seed()
            .state
            .graph_items
            .insert(row.graph_item_id, row);
    }

    pub fn add_item_discovery(&self, row: ItemDiscovery) {
        self.lock_seed()
            .state
            .item_discovery
            .insert(row.item_discovery_id, row);
    }

    pub fn add_trigger_discovery(&self, row: TriggerDiscovery) {
        self.lock_seed().state.trigger_discovery.push(row);
    }

    pub fn add_graph_discovery(&self, row: GraphDiscovery) {
        self.lock_seed().state.graph_discovery.push(row);
    }

    pub fn add_event(&self, row: Event) {
        self.lock_seed().state.events.insert(row.event_id, row);
    }

    pub fn add_screen_item(&self, row: ScreenItem) {
        self.lock_seed()
            .state
            .screen_items
            .insert(row.screen_item_id, row);
    }

    pub fn add_favorite(&self, row: Favorite) {
        self.lock_seed().state.favorites.insert(row.favorite_id, row);
    }

    pub fn add_map_element(&self, row: MapElement) {
        self.lock_seed()
            .state
            .map_elements
            .insert(row.map_element_id, row);
    }

    pub fn add_action_condition(&self, row: ActionCondition) {
        self.lock_seed()
            .state
            .action_conditions
            .insert(row.condition_id, row);
    }

    pub fn add_web_scenario(&self, row: WebScenario) {
        self.lock_seed()
            .state
            .web_scenarios
            .insert(row.scenario_id, row);
    }

    pub fn all_template_links(&self) -> Vec<TemplateLink> {
        self.lock_seed().state.template_links.values().cloned().collect()
    }

    pub fn all_applications(&self) -> Vec<Application> {
        self.lock_seed().state.applications.values().cloned().collect()
    }

    pub fn all_item_applications(&self) -> Vec<ItemApplication> {
        self.lock_seed()
            .state
            .item_applications
            .values()
            .cloned()
            .collect()
    }

    pub fn all_items(&self) -> Vec<Item> {
        self.lock_seed().state.items.values().cloned().collect()
    }

    pub fn all_functions(&self) -> Vec<Function> {
        self.lock_seed().state.functions.values().cloned().collect()
    }

    pub fn all_triggers(&self) -> Vec<Trigger> {
        self.lock_seed().state.triggers.values().cloned().collect()
    }

    pub fn all_dependencies(&self) -> Vec<TriggerDependency> {
        self.lock_seed().state.dependencies.values().cloned().collect()
    }

    pub fn all_graphs(&self) -> Vec<Graph> {
        self.lock_seed().state.graphs.values().cloned().collect()
    }

    pub fn all_graph_items(&self) -> Vec<GraphItem> {
        self.lock_seed().state.graph_items.values().cloned().collect()
    }

    pub fn all_item_discovery(&self) -> Vec<ItemDiscovery> {
        self.lock_seed().state.item_discovery.values().cloned().collect()
    }

    pub fn all_events(&self) -> Vec<Event> {
        self.lock_seed().state.events.values().cloned().collect()
    }

    pub fn all_screen_items(&self) -> Vec<ScreenItem> {
        self.lock_seed().state.screen_items.values().cloned().collect()
    }

    pub fn all_favorites(&self) -> Vec<Favorite> {
        self.lock_seed().state.favorites.values().cloned().collect()
    }

    pub fn all_map_elements(&self) -> Vec<MapElement> {
        self.lock_seed().state.map_elements.values().cloned().collect()
    }

    pub fn all_action_conditions(&self) -> Vec<ActionCondition> {
        self.lock_seed()
            .state
            .action_conditions
            .values()
            .cloned()
            .collect()
    }

    pub fn all_web_scenarios(&self) -> Vec<WebScenario> {
        self.lock_seed().state.web_scenarios.values().cloned().collect()
    }
}

impl State {
    fn remove_items(&mut self, item_ids: &[u64]) {
        for id in item_ids {
            self.items.remove(id);
        }
        self.functions.retain(|_, f| !item_ids.contains(&f.item_id));
        self.graph_items
            .retain(|_, gi| !item_ids.contains(&gi.item_id));
        self.item_applications
            .retain(|_, ia| !item_ids.contains(&ia.item_id));
        self.item_discovery.retain(|_, d| {
            !item_ids.contains(&d.item_id) && !item_ids.contains(&d.parent_item_id)
        });
    }

    fn remove_triggers(&mut self, trigger_ids: &[u64]) {
        for id in trigger_ids {
            self.triggers.remove(id);
        }
        self.functions
            .retain(|_, f| !trigger_ids.contains(&f.trigger_id));
        self.dependencies.retain(|_, d| {
            !trigger_ids.contains(&d.trigger_down_id) && !trigger_ids.contains(&d.trigger_up_id)
        });
        self.trigger_discovery.retain(|d| {
            !trigger_ids.contains(&d.trigger_id) && !trigger_ids.contains(&d.parent_trigger_id)
        });
    }

    fn remove_graphs(&mut self, graph_ids: &[u64]) {
        for id in graph_ids {
            self.graphs.remove(id);
        }
        self.graph_items
            .retain(|_, gi| !graph_ids.contains(&gi.graph_id));
        self.graph_discovery.retain(|d| {
            !graph_ids.contains(&d.graph_id) && !graph_ids.contains(&d.parent_graph_id)
        });
    }

    fn remove_applications(&mut self, application_ids: &[u64]) {
        for id in application_ids {
            self.applications.remove(id);
        }
        self.item_applications
            .retain(|_, ia| !application_ids.contains(&ia.application_id));
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn begin(&self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.snapshot.is_some() {
            return Err(StoreError::Constraint("transaction already open".into()));
        }
        inner.snapshot = Some(inner.state.clone());
        Ok(())
    }

    async fn commit(&self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.snapshot.take().ok_or(StoreError::NoTransaction)?;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let snapshot = inner.snapshot.take().ok_or(StoreError::NoTransaction)?;
        inner.state = snapshot;
        Ok(())
    }

    async fn allocate_ids(&self, _domain: IdDomain, count: u64) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let first = inner.next_id;
        inner.next_id += count;
        Ok(first)
    }

    async fn host(&self, host_id: u64) -> Result<Host, StoreError> {
        self.lock()?
            .state
            .hosts
            .get(&host_id)
            .cloned()
            .ok_or(StoreError::UnknownId("host", host_id))
    }

    async fn hosts_by_ids(&self, host_ids: &[u64]) -> Result<Vec<Host>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .hosts
            .values()
            .filter(|h| host_ids.contains(&h.host_id))
            .cloned()
            .collect())
    }

    async fn interfaces(&self, host_id: u64) -> Result<Vec<Interface>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .interfaces
            .values()
            .filter(|i| i.host_id == host_id)
            .cloned()
            .collect())
    }

    async fn template_links(&self, host_id: u64) -> Result<Vec<TemplateLink>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .template_links
            .values()
            .filter(|l| l.host_id == host_id)
            .cloned()
            .collect())
    }

    async fn insert_template_links(&self, links: Vec<TemplateLink>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for link in links {
            inner.state.template_links.insert(link.link_id, link);
        }
        Ok(())
    }

    async fn delete_template_links(
        &self,
        host_id: u64,
        template_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .state
            .template_links
            .retain(|_, l| l.host_id != host_id || !template_ids.contains(&l.template_id));
        Ok(())
    }

    async fn applications_by_hosts(
        &self,
        host_ids: &[u64],
    ) -> Result<Vec<Application>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .applications
            .values()
            .filter(|a| host_ids.contains(&a.host_id))
            .cloned()
            .collect())
    }

    async fn applications_by_ids(
        &self,
        application_ids: &[u64],
    ) -> Result<Vec<Application>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .applications
            .values()
            .filter(|a| application_ids.contains(&a.application_id))
            .cloned()
            .collect())
    }

    async fn insert_applications(&self, rows: Vec<Application>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.applications.insert(row.application_id, row);
        }
        Ok(())
    }

    async fn update_applications(&self, rows: Vec<Application>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            if !inner.state.applications.contains_key(&row.application_id) {
                return Err(StoreError::UnknownId("application", row.application_id));
            }
            inner.state.applications.insert(row.application_id, row);
        }
        Ok(())
    }

    async fn delete_applications(&self, application_ids: &[u64]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.state.remove_applications(application_ids);
        Ok(())
    }

    async fn item_applications_by_items(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<ItemApplication>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .item_applications
            .values()
            .filter(|ia| item_ids.contains(&ia.item_id))
            .cloned()
            .collect())
    }

    async fn insert_item_applications(
        &self,
        rows: Vec<ItemApplication>,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner
                .state
                .item_applications
                .insert(row.item_application_id, row);
        }
        Ok(())
    }

    async fn items_by_hosts(&self, host_ids: &[u64]) -> Result<Vec<Item>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .items
            .values()
            .filter(|i| host_ids.contains(&i.host_id))
            .cloned()
            .collect())
    }

    async fn items_by_ids(&self, item_ids: &[u64]) -> Result<Vec<Item>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .items
            .values()
            .filter(|i| item_ids.contains(&i.item_id))
            .cloned()
            .collect())
    }

    async fn insert_items(&self, rows: Vec<Item>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.items.insert(row.item_id, row);
        }
        Ok(())
    }

    async fn update_items(&self, rows: Vec<Item>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            if !inner.state.items.contains_key(&row.item_id) {
                return Err(StoreError::UnknownId("item", row.item_id));
            }
            inner.state.items.insert(row.item_id, row);
        }
        Ok(())
    }

    async fn delete_items(&self, item_ids: &[u64]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.state.remove_items(item_ids);
        Ok(())
    }

    async fn functions_by_triggers(
        &self,
        trigger_ids: &[u64],
    ) -> Result<Vec<Function>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .functions
            .values()
            .filter(|f| trigger_ids.contains(&f.trigger_id))
            .cloned()
            .collect())
    }

    async fn functions_by_items(&self, item_ids: &[u64]) -> Result<Vec<Function>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .functions
            .values()
            .filter(|f| item_ids.contains(&f.item_id))
            .cloned()
            .collect())
    }

    async fn insert_functions(&self, rows: Vec<Function>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.functions.insert(row.function_id, row);
        }
        Ok(())
    }

    async fn triggers_by_ids(&self, trigger_ids: &[u64]) -> Result<Vec<Trigger>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .triggers
            .values()
            .filter(|t| trigger_ids.contains(&t.trigger_id))
            .cloned()
            .collect())
    }

    async fn triggers_by_hosts(&self, host_ids: &[u64]) -> Result<Vec<Trigger>, StoreError> {
        let inner = self.lock()?;
        let item_ids: Vec<u64> = inner
            .state
            .items
            .values()
            .filter(|i| host_ids.contains(&i.host_id))
            .map(|i| i.item_id)
            .collect();
        let trigger_ids: Vec<u64> = inner
            .state
            .functions
            .values()
            .filter(|f| item_ids.contains(&f.item_id))
            .map(|f| f.trigger_id)
            .collect();
        Ok(inner
            .state
            .triggers
            .values()
            .filter(|t| trigger_ids.contains(&t.trigger_id))
            .cloned()
            .collect())
    }

    async fn host_triggers_by_description(
        &self,
        host_id: u64,
        description: &str,
    ) -> Result<Vec<Trigger>, StoreError> {
        let inner = self.lock()?;
        let item_ids: Vec<u64> = inner
            .state
            .items
            .values()
            .filter(|i| i.host_id == host_id)
            .map(|i| i.item_id)
            .collect();
        let trigger_ids: Vec<u64> = inner
            .state
            .functions
            .values()
            .filter(|f| item_ids.contains(&f.item_id))
            .map(|f| f.trigger_id)
            .collect();
        Ok(inner
            .state
            .triggers
            .values()
            .filter(|t| {
                t.template_id.is_none()
                    && t.description == description
                    && trigger_ids.contains(&t.trigger_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_triggers(&self, rows: Vec<Trigger>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.triggers.insert(row.trigger_id, row);
        }
        Ok(())
    }

    async fn update_triggers(&self, rows: Vec<Trigger>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            if !inner.state.triggers.contains_key(&row.trigger_id) {
                return Err(StoreError::UnknownId("trigger", row.trigger_id));
            }
            inner.state.triggers.insert(row.trigger_id, row);
        }
        Ok(())
    }

    async fn delete_triggers(&self, trigger_ids: &[u64]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.state.remove_triggers(trigger_ids);
        Ok(())
    }

    async fn dependencies_touching(
        &self,
        trigger_ids: &[u64],
    ) -> Result<Vec<TriggerDependency>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .dependencies
            .values()
            .filter(|d| {
                trigger_ids.contains(&d.trigger_down_id) || trigger_ids.contains(&d.trigger_up_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_dependencies(&self, rows: Vec<TriggerDependency>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.dependencies.insert(row.dependency_id, row);
        }
        Ok(())
    }

    async fn graphs_by_ids(&self, graph_ids: &[u64]) -> Result<Vec<Graph>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .graphs
            .values()
            .filter(|g| graph_ids.contains(&g.graph_id))
            .cloned()
            .collect())
    }

    async fn graphs_by_hosts(&self, host_ids: &[u64]) -> Result<Vec<Graph>, StoreError> {
        let inner = self.lock()?;
        let item_ids: Vec<u64> = inner
            .state
            .items
            .values()
            .filter(|i| host_ids.contains(&i.host_id))
            .map(|i| i.item_id)
            .collect();
        let graph_ids: Vec<u64> = inner
            .state
            .graph_items
            .values()
            .filter(|gi| item_ids.contains(&gi.item_id))
            .map(|gi| gi.graph_id)
            .collect();
        Ok(inner
            .state
            .graphs
            .values()
            .filter(|g| graph_ids.contains(&g.graph_id))
            .cloned()
            .collect())
    }

    async fn graphs_referencing_items(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<Graph>, StoreError> {
        let inner = self.lock()?;
        let graph_ids: Vec<u64> = inner
            .state
            .graph_items
            .values()
            .filter(|gi| item_ids.contains(&gi.item_id))
            .map(|gi| gi.graph_id)
            .collect();
        Ok(inner
            .state
            .graphs
            .values()
            .filter(|g| graph_ids.contains(&g.graph_id))
            .cloned()
            .collect())
    }

    async fn insert_graphs(&self, rows: Vec<Graph>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.graphs.insert(row.graph_id, row);
        }
        Ok(())
    }

    async fn update_graphs(&self, rows: Vec<Graph>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            if !inner.state.graphs.contains_key(&row.graph_id) {
                return Err(StoreError::UnknownId("graph", row.graph_id));
            }
            inner.state.graphs.insert(row.graph_id, row);
        }
        Ok(())
    }

    async fn delete_graphs(&self, graph_ids: &[u64]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.state.remove_graphs(graph_ids);
        Ok(())
    }

    async fn graph_items_by_graphs(
        &self,
        graph_ids: &[u64],
    ) -> Result<Vec<GraphItem>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .graph_items
            .values()
            .filter(|gi| graph_ids.contains(&gi.graph_id))
            .cloned()
            .collect())
    }

    async fn insert_graph_items(&self, rows: Vec<GraphItem>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner.state.graph_items.insert(row.graph_item_id, row);
        }
        Ok(())
    }

    async fn update_graph_items(&self, rows: Vec<GraphItem>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            if !inner.state.graph_items.contains_key(&row.graph_item_id) {
                return Err(StoreError::UnknownId("graph item", row.graph_item_id));
            }
            inner.state.graph_items.insert(row.graph_item_id, row);
        }
        Ok(())
    }

    async fn item_discovery_by_items(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<ItemDiscovery>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .item_discovery
            .values()
            .filter(|d| item_ids.contains(&d.item_id))
            .cloned()
            .collect())
    }

    async fn item_discovery_by_parents(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<ItemDiscovery>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .item_discovery
            .values()
            .filter(|d| item_ids.contains(&d.parent_item_id))
            .cloned()
            .collect())
    }

    async fn insert_item_discovery(&self, rows: Vec<ItemDiscovery>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        for row in rows {
            inner
                .state
                .item_discovery
                .insert(row.item_discovery_id, row);
        }
        Ok(())
    }

    async fn trigger_discovery_by_parents(
        &self,
        trigger_ids: &[u64],
    ) -> Result<Vec<TriggerDiscovery>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .trigger_discovery
            .iter()
            .filter(|d| trigger_ids.contains(&d.parent_trigger_id))
            .cloned()
            .collect())
    }

    async fn graph_discovery_by_parents(
        &self,
        graph_ids: &[u64],
    ) -> Result<Vec<GraphDiscovery>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .graph_discovery
            .iter()
            .filter(|d| graph_ids.contains(&d.parent_graph_id))
            .cloned()
            .collect())
    }

    async fn delete_events_by_triggers(&self, trigger_ids: &[u64]) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .state
            .events
            .retain(|_, e| !trigger_ids.contains(&e.trigger_id));
        Ok(())
    }

    async fn delete_map_elements_by_triggers(
        &self,
        trigger_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .state
            .map_elements
            .retain(|_, m| !trigger_ids.contains(&m.trigger_id));
        Ok(())
    }

    async fn delete_action_conditions_by_triggers(
        &self,
        trigger_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .state
            .action_conditions
            .retain(|_, c| !trigger_ids.contains(&c.trigger_id));
        Ok(())
    }

    async fn delete_screen_items(
        &self,
        kind: ResourceKind,
        resource_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .state
            .screen_items
            .retain(|_, s| s.resource_kind != kind || !resource_ids.contains(&s.resource_id));
        Ok(())
    }

    async fn delete_favorites(
        &self,
        kind: ResourceKind,
        resource_ids: &[u64],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner
            .state
            .favorites
            .retain(|_, f| f.resource_kind != kind || !resource_ids.contains(&f.resource_id));
        Ok(())
    }

    async fn web_scenarios_by_hosts(
        &self,
        host_ids: &[u64],
    ) -> Result<Vec<WebScenario>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .web_scenarios
            .values()
            .filter(|s| host_ids.contains(&s.host_id))
            .cloned()
            .collect())
    }

    async fn web_scenarios_by_applications(
        &self,
        application_ids: &[u64],
    ) -> Result<Vec<WebScenario>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .state
            .web_scenarios
            .values()
            .filter(|s| {
                s.application_id
                    .map(|id| application_ids.contains(&id))
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
