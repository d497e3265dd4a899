use serde::{Deserialize, Serialize};

use crate::db::enums::{DiscoveryFlag, EntityStatus, ItemType, ValueType};

/// A single metric definition. `key` is unique per host; inherited
/// items keep a back-reference to the template item in `template_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: u64,
    pub host_id: u64,
    pub key: String,
    pub name: String,
    pub item_type: ItemType,
    pub value_type: ValueType,
    pub status: EntityStatus,
    pub flags: DiscoveryFlag,
    /// Collection interval in seconds.
    pub delay: u32,
    /// Raw history retention in days.
    pub history: u32,
    /// Trend retention in days.
    pub trends: u32,
    pub units: String,
    pub params: String,
    /// Host inventory slot this item populates, if any. At most one
    /// enabled item per host may target a given slot.
    pub inventory_link: Option<u32>,
    pub interface_id: Option<u64>,
    pub template_id: Option<u64>,
    pub description: String,
}

impl Item {
    /// Copies every template-defined attribute of `source` onto an
    /// existing host item, preserving identity and host placement.
    pub fn overwrite_from(&self, source: &Item) -> Item {
        Item {
            item_id: self.item_id,
            host_id: self.host_id,
            interface_id: self.interface_id,
            template_id: Some(source.item_id),
            key: source.key.clone(),
            name: source.name.clone(),
            item_type: source.item_type,
            value_type: source.value_type,
            status: source.status,
            flags: source.flags,
            delay: source.delay,
            history: source.history,
            trends: source.trends,
            units: source.units.clone(),
            params: source.params.clone(),
            inventory_link: source.inventory_link,
            description: source.description.clone(),
        }
    }
}

/// Prototype ancestry row: `item_id` was stamped from (or mirrors)
/// `parent_item_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDiscovery {
    pub item_discovery_id: u64,
    pub item_id: u64,
    pub parent_item_id: u64,
}
