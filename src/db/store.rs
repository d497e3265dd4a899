use async_trait::async_trait;

use crate::db::entities::*;
use crate::db::enums::ResourceKind;
use crate::error::StoreError;

/// Id spaces handed out by [`ConfigStore::allocate_ids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdDomain {
    TemplateLinks,
    Applications,
    ItemApplications,
    Items,
    Functions,
    Triggers,
    TriggerDependencies,
    Graphs,
    GraphItems,
    ItemDiscovery,
}

/// Typed access to the configuration tables.
///
/// All mutation performed by the engine happens between `begin` and
/// `commit`; `rollback` must restore the state observed at `begin`.
/// Bulk deletes cascade to rows that reference the deleted entity
/// directly: deleting an item drops its functions, graph lines,
/// application memberships and discovery rows, deleting a trigger drops
/// its functions, dependency edges and discovery rows, deleting a graph
/// drops its lines and discovery row, and deleting an application drops
/// its item memberships. Cross-entity cleanup beyond that is the
/// engine's job.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn begin(&self) -> Result<(), StoreError>;
    async fn commit(&self) -> Result<(), StoreError>;
    async fn rollback(&self) -> Result<(), StoreError>;

    /// Reserves `count` consecutive ids in `domain` and returns the
    /// first one.
    async fn allocate_ids(&self, domain: IdDomain, count: u64) -> Result<u64, StoreError>;

    async fn host(&self, host_id: u64) -> Result<Host, StoreError>;
    async fn hosts_by_ids(&self, host_ids: &[u64]) -> Result<Vec<Host>, StoreError>;
    async fn interfaces(&self, host_id: u64) -> Result<Vec<Interface>, StoreError>;

    async fn template_links(&self, host_id: u64) -> Result<Vec<TemplateLink>, StoreError>;
    async fn insert_template_links(&self, links: Vec<TemplateLink>) -> Result<(), StoreError>;
    async fn delete_template_links(
        &self,
        host_id: u64,
        template_ids: &[u64],
    ) -> Result<(), StoreError>;

    async fn applications_by_hosts(&self, host_ids: &[u64])
    -> Result<Vec<Application>, StoreError>;
    async fn applications_by_ids(
        &self,
        application_ids: &[u64],
    ) -> Result<Vec<Application>, StoreError>;
    async fn insert_applications(&self, rows: Vec<Application>) -> Result<(), StoreError>;
    async fn update_applications(&self, rows: Vec<Application>) -> Result<(), StoreError>;
    async fn delete_applications(&self, application_ids: &[u64]) -> Result<(), StoreError>;

    async fn item_applications_by_items(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<ItemApplication>, StoreError>;
    async fn insert_item_applications(&self, rows: Vec<ItemApplication>)
    -> Result<(), StoreError>;

    async fn items_by_hosts(&self, host_ids: &[u64]) -> Result<Vec<Item>, StoreError>;
    async fn items_by_ids(&self, item_ids: &[u64]) -> Result<Vec<Item>, StoreError>;
    async fn insert_items(&self, rows: Vec<Item>) -> Result<(), StoreError>;
    async fn update_items(&self, rows: Vec<Item>) -> Result<(), StoreError>;
    async fn delete_items(&self, item_ids: &[u64]) -> Result<(), StoreError>;

    async fn functions_by_triggers(&self, trigger_ids: &[u64])
    -> Result<Vec<Function>, StoreError>;
    async fn functions_by_items(&self, item_ids: &[u64]) -> Result<Vec<Function>, StoreError>;
    async fn insert_functions(&self, rows: Vec<Function>) -> Result<(), StoreError>;

    async fn triggers_by_ids(&self, trigger_ids: &[u64]) -> Result<Vec<Trigger>, StoreError>;
    /// Distinct triggers that reference at least one item of the given
    /// hosts through their functions.
    async fn triggers_by_hosts(&self, host_ids: &[u64]) -> Result<Vec<Trigger>, StoreError>;
    /// Unlinked triggers on `host_id` carrying the given description.
    async fn host_triggers_by_description(
        &self,
        host_id: u64,
        description: &str,
    ) -> Result<Vec<Trigger>, StoreError>;
    async fn insert_triggers(&self, rows: Vec<Trigger>) -> Result<(), StoreError>;
    async fn update_triggers(&self, rows: Vec<Trigger>) -> Result<(), StoreError>;
    async fn delete_triggers(&self, trigger_ids: &[u64]) -> Result<(), StoreError>;

    /// Dependency edges with either endpoint in `trigger_ids`.
    async fn dependencies_touching(
        &self,
        trigger_ids: &[u64],
    ) -> Result<Vec<TriggerDependency>, StoreError>;
    async fn insert_dependencies(&self, rows: Vec<TriggerDependency>) -> Result<(), StoreError>;

    async fn graphs_by_ids(&self, graph_ids: &[u64]) -> Result<Vec<Graph>, StoreError>;
    /// Distinct graphs drawing at least one item of the given hosts.
    async fn graphs_by_hosts(&self, host_ids: &[u64]) -> Result<Vec<Graph>, StoreError>;
    /// Distinct graphs drawing at least one of the given items.
    async fn graphs_referencing_items(&self, item_ids: &[u64]) -> Result<Vec<Graph>, StoreError>;
    async fn insert_graphs(&self, rows: Vec<Graph>) -> Result<(), StoreError>;
    async fn update_graphs(&self, rows: Vec<Graph>) -> Result<(), StoreError>;
    async fn delete_graphs(&self, graph_ids: &[u64]) -> Result<(), StoreError>;

    async fn graph_items_by_graphs(&self, graph_ids: &[u64])
    -> Result<Vec<GraphItem>, StoreError>;
    async fn insert_graph_items(&self, rows: Vec<GraphItem>) -> Result<(), StoreError>;
    async fn update_graph_items(&self, rows: Vec<GraphItem>) -> Result<(), StoreError>;

    /// Ancestry rows whose child item is in `item_ids`.
    async fn item_discovery_by_items(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<ItemDiscovery>, StoreError>;
    /// Ancestry rows whose parent item is in `item_ids`.
    async fn item_discovery_by_parents(
        &self,
        item_ids: &[u64],
    ) -> Result<Vec<ItemDiscovery>, StoreError>;
    async fn insert_item_discovery(&self, rows: Vec<ItemDiscovery>) -> Result<(), StoreError>;

    async fn trigger_discovery_by_parents(
        &self,
        trigger_ids: &[u64],
    ) -> Result<Vec<TriggerDiscovery>, StoreError>;
    async fn graph_discovery_by_parents(
        &self,
        graph_ids: &[u64],
    ) -> Result<Vec<GraphDiscovery>, StoreError>;

    async fn delete_events_by_triggers(&self, trigger_ids: &[u64]) -> Result<(), StoreError>;
    async fn delete_map_elements_by_triggers(&self, trigger_ids: &[u64])
    -> Result<(), StoreError>;
    async fn delete_action_conditions_by_triggers(
        &self,
        trigger_ids: &[u64],
    ) -> Result<(), StoreError>;
    async fn delete_screen_items(
        &self,
        kind: ResourceKind,
        resource_ids: &[u64],
    ) -> Result<(), StoreError>;
    async fn delete_favorites(
        &self,
        kind: ResourceKind,
        resource_ids: &[u64],
    ) -> Result<(), StoreError>;

    async fn web_scenarios_by_hosts(&self, host_ids: &[u64])
    -> Result<Vec<WebScenario>, StoreError>;
    async fn web_scenarios_by_applications(
        &self,
        application_ids: &[u64],
    ) -> Result<Vec<WebScenario>, StoreError>;
}
