#![allow(dead_code)]

use std::sync::Arc;

use template_engine::db::entities::*;
use template_engine::db::enums::*;
use template_engine::db::memory::MemoryStore;
use template_engine::db::services::TemplateService;
use template_engine::external::{NullAuditSink, NullHousekeeper, NullStatusNotifier};

/// Builds configuration fixtures against a shared [`MemoryStore`],
/// handing out ids from its own counter so tests stay readable.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    next_id: u64,
}

impl Fixture {
    pub fn new() -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        Self {
            store: Arc::new(MemoryStore::new()),
            next_id: 1,
        }
    }

    pub fn id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn service(&self) -> TemplateService {
        TemplateService::new(
            self.store.clone(),
            Arc::new(NullHousekeeper),
            Arc::new(NullStatusNotifier),
            Arc::new(NullAuditSink),
        )
    }

    pub fn template(&mut self, name: &str) -> u64 {
        let host_id = self.id();
        self.store.add_host(Host {
            host_id,
            name: name.into(),
            status: HostStatus::Template,
        });
        host_id
    }

    pub fn host(&mut self, name: &str) -> u64 {
        let host_id = self.id();
        self.store.add_host(Host {
            host_id,
            name: name.into(),
            status: HostStatus::Monitored,
        });
        host_id
    }

    pub fn agent_interface(&mut self, host_id: u64) -> u64 {
        let interface_id = self.id();
        self.store.add_interface(Interface {
            interface_id,
            host_id,
            kind: InterfaceKind::Agent,
            main: true,
            address: "127.0.0.1".into(),
            port: 10050,
        });
        interface_id
    }

    pub fn interface(&mut self, host_id: u64, kind: InterfaceKind) -> u64 {
        let interface_id = self.id();
        self.store.add_interface(Interface {
            interface_id,
            host_id,
            kind,
            main: true,
            address: "127.0.0.1".into(),
            port: 10050,
        });
        interface_id
    }

    pub fn item(&mut self, host_id: u64, key: &str) -> u64 {
        self.item_with(host_id, key, |_| {})
    }

    pub fn agent_item(&mut self, host_id: u64, key: &str) -> u64 {
        self.item_with(host_id, key, |item| item.item_type = ItemType::Agent)
    }

    pub fn item_with(
        &mut self,
        host_id: u64,
        key: &str,
        customize: impl FnOnce(&mut Item),
    ) -> u64 {
        let item_id = self.id();
        let mut item = Item {
            item_id,
            host_id,
            key: key.into(),
            name: key.into(),
            item_type: ItemType::Trapper,
            value_type: ValueType::Unsigned,
            status: EntityStatus::Enabled,
            flags: DiscoveryFlag::Normal,
            delay: 60,
            history: 90,
            trends: 365,
            units: String::new(),
            params: String::new(),
            inventory_link: None,
            interface_id: None,
            template_id: None,
            description: String::new(),
        };
        customize(&mut item);
        self.store.add_item(item);
        item_id
    }

    pub fn application(&mut self, host_id: u64, name: &str) -> u64 {
        let application_id = self.id();
        self.store.add_application(Application {
            application_id,
            host_id,
            name: name.into(),
            template_id: None,
        });
        application_id
    }

    pub fn item_application(&mut self, application_id: u64, item_id: u64) -> u64 {
        let item_application_id = self.id();
        self.store.add_item_application(ItemApplication {
            item_application_id,
            application_id,
            item_id,
        });
        item_application_id
    }

    /// Trigger with a single `last(0)` function on `item_id`; the
    /// expression becomes `{<function_id>}<condition>`.
    pub fn trigger(&mut self, description: &str, item_id: u64, condition: &str) -> u64 {
        let trigger_id = self.id();
        let function_id = self.id();
        self.store.add_trigger(Trigger {
            trigger_id,
            description: description.into(),
            expression: format!("{{{function_id}}}{condition}"),
            status: EntityStatus::Enabled,
            priority: 3,
            comments: String::new(),
            url: String::new(),
            flags: DiscoveryFlag::Normal,
            template_id: None,
        });
        self.store.add_function(Function {
            function_id,
            item_id,
            trigger_id,
            name: "last".into(),
            parameter: "0".into(),
        });
        trigger_id
    }

    /// Adds one more function to an existing trigger and returns its
    /// expression token.
    pub fn function(&mut self, trigger_id: u64, item_id: u64) -> u64 {
        let function_id = self.id();
        self.store.add_function(Function {
            function_id,
            item_id,
            trigger_id,
            name: "last".into(),
            parameter: "0".into(),
        });
        function_id
    }

    pub fn graph(&mut self, name: &str, item_ids: &[u64]) -> u64 {
        let graph_id = self.id();
        self.store.add_graph(Graph {
            graph_id,
            name: name.into(),
            width: 900,
            height: 200,
            ymin_type: AxisScale::Calculated,
            ymax_type: AxisScale::Calculated,
            ymin: 0.0,
            ymax: 100.0,
            ymin_item_id: None,
            ymax_item_id: None,
            show_legend: true,
            flags: DiscoveryFlag::Normal,
            template_id: None,
        });
        for (index, item_id) in item_ids.iter().enumerate() {
            let graph_item_id = self.id();
            self.store.add_graph_item(GraphItem {
                graph_item_id,
                graph_id,
                item_id: *item_id,
                draw_type: 0,
                sort_order: index as u8,
                color: "1A7C11".into(),
                y_side: 0,
                calc_fnc: 2,
            });
        }
        graph_id
    }

    pub fn dependency(&mut self, trigger_down_id: u64, trigger_up_id: u64) -> u64 {
        let dependency_id = self.id();
        self.store.add_dependency(TriggerDependency {
            dependency_id,
            trigger_down_id,
            trigger_up_id,
        });
        dependency_id
    }

    pub fn web_scenario(&mut self, host_id: u64, name: &str, application_id: Option<u64>) -> u64 {
        let scenario_id = self.id();
        self.store.add_web_scenario(WebScenario {
            scenario_id,
            host_id,
            name: name.into(),
            application_id,
        });
        scenario_id
    }

    pub fn host_items(&self, host_id: u64) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .store
            .all_items()
            .into_iter()
            .filter(|i| i.host_id == host_id)
            .collect();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        items
    }

    pub fn host_applications(&self, host_id: u64) -> Vec<Application> {
        let mut apps: Vec<Application> = self
            .store
            .all_applications()
            .into_iter()
            .filter(|a| a.host_id == host_id)
            .collect();
        apps.sort_by(|a, b| a.name.cmp(&b.name));
        apps
    }

    /// Triggers whose functions reference at least one item of the
    /// host.
    pub fn host_triggers(&self, host_id: u64) -> Vec<Trigger> {
        let item_ids: Vec<u64> = self
            .store
            .all_items()
            .into_iter()
            .filter(|i| i.host_id == host_id)
            .map(|i| i.item_id)
            .collect();
        let trigger_ids: Vec<u64> = self
            .store
            .all_functions()
            .into_iter()
            .filter(|f| item_ids.contains(&f.item_id))
            .map(|f| f.trigger_id)
            .collect();
        let mut triggers: Vec<Trigger> = self
            .store
            .all_triggers()
            .into_iter()
            .filter(|t| trigger_ids.contains(&t.trigger_id))
            .collect();
        triggers.sort_by(|a, b| a.description.cmp(&b.description));
        triggers
    }

    /// Graphs drawing at least one item of the host.
    pub fn host_graphs(&self, host_id: u64) -> Vec<Graph> {
        let item_ids: Vec<u64> = self
            .store
            .all_items()
            .into_iter()
            .filter(|i| i.host_id == host_id)
            .map(|i| i.item_id)
            .collect();
        let graph_ids: Vec<u64> = self
            .store
            .all_graph_items()
            .into_iter()
            .filter(|gi| item_ids.contains(&gi.item_id))
            .map(|gi| gi.graph_id)
            .collect();
        let mut graphs: Vec<Graph> = self
            .store
            .all_graphs()
            .into_iter()
            .filter(|g| graph_ids.contains(&g.graph_id))
            .collect();
        graphs.sort_by(|a, b| a.name.cmp(&b.name));
        graphs
    }

    pub fn linked_templates(&self, host_id: u64) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .store
            .all_template_links()
            .into_iter()
            .filter(|l| l.host_id == host_id)
            .map(|l| l.template_id)
            .collect();
        ids.sort_unstable();
        ids
    }
}
