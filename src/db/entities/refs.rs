use serde::{Deserialize, Serialize};

use crate::db::enums::ResourceKind;

/// A dashboard cell pinned to an item, trigger or graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenItem {
    pub screen_item_id: u64,
    pub screen_id: u64,
    pub resource_kind: ResourceKind,
    pub resource_id: u64,
}

/// A per-user bookmark of an item, trigger or graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub favorite_id: u64,
    pub user_id: u64,
    pub resource_kind: ResourceKind,
    pub resource_id: u64,
}

/// A map node pinned to a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapElement {
    pub map_element_id: u64,
    pub map_id: u64,
    pub trigger_id: u64,
}

/// An alerting condition filtering on a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCondition {
    pub condition_id: u64,
    pub action_id: u64,
    pub trigger_id: u64,
}

/// A scripted availability check. Scenarios can pin their collected
/// metrics to an application; such applications survive template
/// unlinking as local rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebScenario {
    pub scenario_id: u64,
    pub host_id: u64,
    pub name: String,
    pub application_id: Option<u64>,
}
