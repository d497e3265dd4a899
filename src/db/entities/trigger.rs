use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::enums::{DiscoveryFlag, EntityStatus};

/// A problem condition over one or more items. The expression embeds
/// function tokens as `{<function_id>}`; the functions bind the trigger
/// to concrete items, and through them to hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub trigger_id: u64,
    pub description: String,
    pub expression: String,
    pub status: EntityStatus,
    pub priority: u8,
    pub comments: String,
    pub url: String,
    pub flags: DiscoveryFlag,
    pub template_id: Option<u64>,
}

/// One `{function_id}` token of a trigger expression, evaluated against
/// a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub function_id: u64,
    pub item_id: u64,
    pub trigger_id: u64,
    pub name: String,
    pub parameter: String,
}

/// Directed edge: `trigger_down_id` fires only while `trigger_up_id`
/// is not in a problem state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDependency {
    pub dependency_id: u64,
    pub trigger_down_id: u64,
    pub trigger_up_id: u64,
}

/// Prototype ancestry row for triggers spawned by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDiscovery {
    pub trigger_id: u64,
    pub parent_trigger_id: u64,
}

/// A recorded state change of a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: u64,
    pub trigger_id: u64,
    pub value: bool,
    pub occurred_at: DateTime<Utc>,
}
